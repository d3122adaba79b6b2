use bevy::prelude::*;
use splat_cache_core::{BarrierId, Palette, TransitionEvent, VariantId};

/// Ask for a splat at a world position, e.g. from a particle collision.
#[derive(Event, Debug, Clone, Copy)]
pub struct SpawnSplat {
    pub position: Vec2,
    pub variant: Option<VariantId>,
}

/// Make a palette current and repaint every registered renderer.
#[derive(Event, Debug, Clone)]
pub struct ApplyPalette(pub Palette);

/// Repaint with the current palette.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ReapplyPalette;

/// Start a clear-all. Several requests in one frame issue a single clear.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ClearSplats;

/// Sent once a clear barrier completes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplatsCleared {
    pub barrier: BarrierId,
    pub forced: usize,
}

/// Move to the next level once the delay and clear have run.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RequestNextLevel;

/// The scene is clean; the host should load (or finish) accordingly.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelLoad(pub TransitionEvent);
