//! One-shot "clear everything and wait" barrier.
//!
//! While a barrier is active the cache's eviction loop is suspended. The barrier
//! waits exactly one fade-out duration after its snapshot started fading, then
//! the cache drops whatever is left of the snapshot and resumes eviction.

use indexmap::IndexSet;

use crate::fade::TIME_EPSILON;
use crate::ids::{BarrierId, SplatId};

/// Returned by `clear_all`; poll it with `SplatCache::clear_status`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClearTicket {
    pub barrier: BarrierId,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClearStatus {
    Pending { remaining: f32 },
    Complete,
}

impl ClearStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, ClearStatus::Complete)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ClearBarrier {
    pub(crate) id: BarrierId,
    /// Splats queued when the clear was issued (plus any added by a joining call).
    pub(crate) snapshot: IndexSet<SplatId>,
    waited: f32,
}

impl ClearBarrier {
    pub(crate) fn new(id: BarrierId, snapshot: IndexSet<SplatId>) -> Self {
        Self {
            id,
            snapshot,
            waited: 0.0,
        }
    }

    pub(crate) fn ticket(&self) -> ClearTicket {
        ClearTicket { barrier: self.id }
    }

    /// Add more splats and restart the wait so they get a full fade.
    pub(crate) fn join(&mut self, more: impl IntoIterator<Item = SplatId>) -> usize {
        let before = self.snapshot.len();
        self.snapshot.extend(more);
        self.waited = 0.0;
        self.snapshot.len() - before
    }

    pub(crate) fn remaining(&self, fade_out_duration: f32) -> f32 {
        (fade_out_duration - self.waited).max(0.0)
    }

    /// Accumulate `dt`; true once the full fade duration has elapsed.
    pub(crate) fn tick(&mut self, dt: f32, fade_out_duration: f32) -> bool {
        self.waited += dt.max(0.0);
        self.waited + TIME_EPSILON >= fade_out_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_exactly_the_fade_duration() {
        let mut b = ClearBarrier::new(BarrierId(0), IndexSet::new());
        assert!(!b.tick(0.1, 0.3));
        assert!(!b.tick(0.1, 0.3));
        assert!(b.tick(0.1, 0.3));
    }

    #[test]
    fn join_restarts_the_wait() {
        let mut b = ClearBarrier::new(BarrierId(0), IndexSet::new());
        b.tick(0.2, 0.3);
        let added = b.join([SplatId::from_raw_parts(0, 0)]);
        assert_eq!(added, 1);
        assert!((b.remaining(0.3) - 0.3).abs() < 1e-6);
        assert!(!b.tick(0.2, 0.3));
    }
}
