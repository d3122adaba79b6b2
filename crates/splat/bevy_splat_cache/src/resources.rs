use bevy::prelude::*;
use hashbrown::HashMap;
use splat_cache_core::{
    CacheOutputs, LevelTransition, RendererColorRegistry, SplatCache, SplatId,
};

#[derive(Resource)]
pub struct SplatCacheResource(pub SplatCache);

#[derive(Resource, Default)]
pub struct ColorRegistryResource(pub RendererColorRegistry);

#[derive(Resource)]
pub struct LevelTransitionResource(pub LevelTransition);

/// Splat handle to the entity rendering it.
#[derive(Resource, Default)]
pub struct SplatEntities {
    pub map: HashMap<SplatId, Entity>,
}

/// Outputs staged from `SplatCache::advance` to be applied in a separate system
/// (keeps ordering explicit: Compute -> Apply).
#[derive(Resource, Default)]
pub struct PendingSplatOutputs {
    pub outputs: CacheOutputs,
}

/// Where the cache's per-frame `dt` comes from.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub enum SplatClock {
    /// `Time::delta_seconds` of the current frame.
    #[default]
    Frame,
    /// A fixed step per update (tests, replays).
    Fixed(f32),
}

impl SplatClock {
    pub fn dt(&self, time: &Time) -> f32 {
        match *self {
            SplatClock::Frame => time.delta_seconds(),
            SplatClock::Fixed(dt) => dt,
        }
    }
}

/// Sprite textures indexed by splat variant, plus an optional display size.
#[derive(Resource, Default, Clone)]
pub struct SplatVisuals {
    pub textures: Vec<Handle<Image>>,
    pub size: Option<Vec2>,
}
