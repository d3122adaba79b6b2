//! Spawn-time visual attributes of a splat.

use serde::{Deserialize, Serialize};

use crate::config::AppearanceConfig;

/// World-space spawn position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Index into the host's list of splat sprites.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub u32);

/// Immutable visuals picked when a splat is spawned.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplatAppearance {
    /// `None` when no usable variant exists; the splat still runs its lifecycle.
    pub variant: Option<VariantId>,
    pub rotation_degrees: f32,
    pub scale: f32,
}

impl Default for SplatAppearance {
    fn default() -> Self {
        Self {
            variant: None,
            rotation_degrees: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppearanceRoller {
    cfg: AppearanceConfig,
    rng: fastrand::Rng,
}

impl AppearanceRoller {
    pub(crate) fn new(cfg: AppearanceConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { cfg, rng }
    }

    fn in_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.rng.f32()
    }

    fn pick_variant(&mut self, requested: Option<VariantId>) -> Option<VariantId> {
        let count = self.cfg.variant_count;
        match requested {
            Some(v) if v.0 < count => Some(v),
            Some(v) => {
                log::warn!(
                    "splat variant {} requested but only {} configured; spawning without visuals",
                    v.0,
                    count
                );
                None
            }
            None if count == 0 => {
                log::warn!("no splat variants configured; spawning without visuals");
                None
            }
            None => Some(VariantId(self.rng.u32(0..count))),
        }
    }

    pub(crate) fn roll(&mut self, requested: Option<VariantId>) -> SplatAppearance {
        let variant = self.pick_variant(requested);
        let rotation_degrees = if self.cfg.random_rotation {
            self.in_range(self.cfg.min_rotation, self.cfg.max_rotation)
        } else {
            0.0
        };
        let scale = if self.cfg.random_scale {
            self.in_range(self.cfg.min_scale, self.cfg.max_scale)
        } else {
            1.0
        };
        SplatAppearance {
            variant,
            rotation_degrees,
            scale,
        }
    }
}
