//! Handles for tracked splats, renderers, and clear barriers.

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Opaque handle to a tracked splat.
///
/// Wraps an arena index, so a handle to a retired splat never aliases a later
/// splat reusing the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SplatId(pub(crate) Index);

impl SplatId {
    pub fn from_raw_parts(slot: usize, generation: u64) -> Self {
        Self(Index::from_raw_parts(slot, generation))
    }

    #[inline]
    pub fn slot(self) -> usize {
        self.0.into_raw_parts().0
    }

    #[inline]
    pub fn generation(self) -> u64 {
        self.0.into_raw_parts().1
    }
}

/// Handle to anything the color registry can paint.
///
/// Splats get their renderer handle from the cache; every other dynamic or static
/// visual is identified by a host-chosen integer (an ECS entity's bits, say).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RendererId {
    Splat(SplatId),
    External(u64),
}

impl From<SplatId> for RendererId {
    fn from(id: SplatId) -> Self {
        RendererId::Splat(id)
    }
}

/// Identifier of one clear-all invocation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct BarrierId(pub u32);

/// Monotonic allocator for BarrierId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_barrier: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_barrier(&mut self) -> BarrierId {
        let id = BarrierId(self.next_barrier);
        self.next_barrier = self.next_barrier.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_barrier(), BarrierId(0));
        assert_eq!(alloc.alloc_barrier(), BarrierId(1));
    }

    #[test]
    fn splat_renderer_ids_do_not_collide_with_external() {
        let splat = SplatId::from_raw_parts(7, 0);
        assert_ne!(RendererId::from(splat), RendererId::External(7));
    }
}
