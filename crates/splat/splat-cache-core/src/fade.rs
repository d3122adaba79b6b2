//! Per-splat reveal/retire timeline.
//!
//! `Appearing -> Idle -> FadingOut -> Retired`. Progress rises from 0 to 1 while
//! appearing, sits at 1 while idle, and falls to 0 while fading out. `Retired` is
//! terminal.

use serde::{Deserialize, Serialize};

/// Slack for float time comparisons so accumulated frame deltas land on boundaries.
pub(crate) const TIME_EPSILON: f32 = 1e-5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FadeState {
    Appearing,
    Idle,
    FadingOut,
    Retired,
}

/// Result of one `advance` call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FadeStep {
    /// No state change (progress may still have moved).
    Unchanged,
    BecameIdle,
    Retired,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeTimeline {
    state: FadeState,
    progress: f32,
    /// Time spent in the current phase.
    elapsed: f32,
    appear_duration: f32,
    /// Progress when the fade-out began; the fade lerps from here to 0.
    fade_from: f32,
}

impl FadeTimeline {
    /// Start a timeline in `Appearing`, or directly `Idle` when there is nothing to reveal.
    pub fn new(appear_duration: f32) -> Self {
        let skip = appear_duration <= 0.0;
        Self {
            state: if skip {
                FadeState::Idle
            } else {
                FadeState::Appearing
            },
            progress: if skip { 1.0 } else { 0.0 },
            elapsed: 0.0,
            appear_duration: appear_duration.max(0.0),
            fade_from: 1.0,
        }
    }

    #[inline]
    pub fn state(&self) -> FadeState {
        self.state
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.state == FadeState::Retired
    }

    /// Start retiring. Returns `false` (and does nothing) when already fading or retired.
    pub fn begin_fade_out(&mut self) -> bool {
        match self.state {
            FadeState::FadingOut | FadeState::Retired => false,
            FadeState::Appearing | FadeState::Idle => {
                self.state = FadeState::FadingOut;
                self.fade_from = self.progress;
                self.elapsed = 0.0;
                true
            }
        }
    }

    /// Jump straight to `Retired`. Returns `false` when already retired.
    pub fn force_retire(&mut self) -> bool {
        if self.is_retired() {
            return false;
        }
        self.state = FadeState::Retired;
        self.progress = 0.0;
        true
    }

    /// Move the timeline forward by `dt` seconds.
    ///
    /// `fade_out_duration` is owned by the cache so every splat retires at the same rate.
    pub fn advance(&mut self, dt: f32, fade_out_duration: f32) -> FadeStep {
        let dt = dt.max(0.0);
        match self.state {
            FadeState::Idle | FadeState::Retired => FadeStep::Unchanged,
            FadeState::Appearing => {
                self.elapsed += dt;
                if self.elapsed + TIME_EPSILON >= self.appear_duration {
                    self.state = FadeState::Idle;
                    self.progress = 1.0;
                    self.elapsed = 0.0;
                    FadeStep::BecameIdle
                } else {
                    self.progress = (self.elapsed / self.appear_duration).clamp(0.0, 1.0);
                    FadeStep::Unchanged
                }
            }
            FadeState::FadingOut => {
                self.elapsed += dt;
                if fade_out_duration <= 0.0 || self.elapsed + TIME_EPSILON >= fade_out_duration {
                    self.state = FadeState::Retired;
                    self.progress = 0.0;
                    FadeStep::Retired
                } else {
                    let t = self.elapsed / fade_out_duration;
                    self.progress = (self.fade_from * (1.0 - t)).clamp(0.0, 1.0);
                    FadeStep::Unchanged
                }
            }
        }
    }
}
