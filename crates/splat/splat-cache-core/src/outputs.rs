//! Output contracts from the splat cache.
//!
//! Outputs carry this tick's fade values keyed by splat handle, and a separate
//! list of lifecycle events. Adapters apply changes to the host's renderers and
//! despawn whatever retired.

use serde::{Deserialize, Serialize};

use crate::appearance::{SplatAppearance, Vec2};
use crate::fade::FadeState;
use crate::ids::{BarrierId, SplatId};

/// Why a splat began fading out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FadeReason {
    Capacity,
    Clear,
}

/// Fade value of one splat after this tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeChange {
    pub id: SplatId,
    pub state: FadeState,
    pub progress: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SplatEvent {
    Spawned {
        id: SplatId,
        position: Vec2,
        appearance: SplatAppearance,
    },
    FadeOutStarted {
        id: SplatId,
        reason: FadeReason,
    },
    /// The splat is gone; its handle is stale from here on.
    Retired {
        id: SplatId,
    },
    ClearStarted {
        barrier: BarrierId,
        snapshot: usize,
    },
    /// `forced` counts snapshot splats that had not retired on their own when the wait ended.
    ClearCompleted {
        barrier: BarrierId,
        forced: usize,
    },
}

/// Outputs accumulated since the host last drained them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CacheOutputs {
    #[serde(default)]
    pub changes: Vec<FadeChange>,
    #[serde(default)]
    pub events: Vec<SplatEvent>,
}

impl CacheOutputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: FadeChange) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: SplatEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Append `other`, keeping order.
    pub fn extend(&mut self, other: CacheOutputs) {
        self.changes.extend(other.changes);
        self.events.extend(other.events);
    }

    pub fn retired(&self) -> impl Iterator<Item = SplatId> + '_ {
        self.events.iter().filter_map(|e| match e {
            SplatEvent::Retired { id } => Some(*id),
            _ => None,
        })
    }
}
