//! Level-to-level flow that waits for a clean slate before loading.
//!
//! A request waits `load_delay`, then issues a clear on the cache and holds until
//! the barrier reports complete, and only then announces the next level.

use serde::{Deserialize, Serialize};

use crate::barrier::ClearTicket;
use crate::cache::SplatCache;
use crate::fade::TIME_EPSILON;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Seconds between the request and the start of the clear.
    pub load_delay: f32,
    /// Number of levels; indices at or past this end the game.
    pub level_count: usize,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            load_delay: 1.0,
            level_count: 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionEvent {
    LoadLevel { index: usize },
    /// The requested level does not exist.
    GameComplete { requested: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TransitionPhase {
    Idle,
    Delaying { remaining: f32 },
    Clearing { ticket: ClearTicket },
}

#[derive(Debug, Clone)]
pub struct LevelTransition {
    cfg: TransitionConfig,
    current: Option<usize>,
    phase: TransitionPhase,
}

impl LevelTransition {
    pub fn new(cfg: TransitionConfig) -> Self {
        Self {
            cfg,
            current: None,
            phase: TransitionPhase::Idle,
        }
    }

    #[inline]
    pub fn current_level(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    fn resolve(&mut self, index: usize) -> TransitionEvent {
        if index >= self.cfg.level_count {
            log::warn!(
                "level {index} does not exist ({} levels); game complete",
                self.cfg.level_count
            );
            return TransitionEvent::GameComplete { requested: index };
        }
        self.current = Some(index);
        TransitionEvent::LoadLevel { index }
    }

    /// Load a level right away, without delay or clear. Used for the first level.
    pub fn load_level(&mut self, index: usize) -> TransitionEvent {
        self.resolve(index)
    }

    /// Begin moving to the next level. Ignored (returns `false`) while a transition runs.
    pub fn request_next_level(&mut self) -> bool {
        if self.is_busy() {
            log::debug!("next-level request ignored; transition already running");
            return false;
        }
        self.phase = TransitionPhase::Delaying {
            remaining: self.cfg.load_delay.max(0.0),
        };
        true
    }

    /// Step the flow. Call after `SplatCache::advance` for the same frame.
    pub fn advance(&mut self, dt: f32, cache: &mut SplatCache) -> Option<TransitionEvent> {
        match self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::Delaying { remaining } => {
                let remaining = remaining - dt.max(0.0);
                if remaining <= TIME_EPSILON {
                    let ticket = cache.clear_all();
                    self.phase = TransitionPhase::Clearing { ticket };
                } else {
                    self.phase = TransitionPhase::Delaying { remaining };
                }
                None
            }
            TransitionPhase::Clearing { ticket } => {
                if !cache.clear_status(ticket).is_complete() {
                    return None;
                }
                self.phase = TransitionPhase::Idle;
                let next = self.current.map_or(0, |i| i + 1);
                Some(self.resolve(next))
            }
        }
    }
}
