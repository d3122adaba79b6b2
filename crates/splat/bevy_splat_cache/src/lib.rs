//! Bevy integration for `splat-cache-core`.
//!
//! Send `SpawnSplat` from gameplay code, tag static sprites with `PaletteCategory`,
//! and the plugin keeps sprites, fades, palette colors and level clears in sync
//! with the core cache.

use bevy::prelude::*;
use splat_cache_core::{
    CacheConfig, ConfigError, LevelTransition, Palette, RendererColorRegistry, SplatCache,
    TransitionConfig, ValidatedConfig,
};

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;

pub use components::{PaletteCategory, Splat};
pub use events::{
    ApplyPalette, ClearSplats, LevelLoad, ReapplyPalette, RequestNextLevel, SpawnSplat,
    SplatsCleared,
};
pub use resources::{
    ColorRegistryResource, LevelTransitionResource, PendingSplatOutputs, SplatCacheResource,
    SplatClock, SplatEntities, SplatVisuals,
};

pub struct SplatCachePlugin {
    config: ValidatedConfig,
    palette: Option<Palette>,
    transition: TransitionConfig,
}

impl SplatCachePlugin {
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validate()?,
            palette: None,
            transition: TransitionConfig::default(),
        })
    }

    /// Palette that is current from the first frame.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }
}

impl Plugin for SplatCachePlugin {
    fn build(&self, app: &mut App) {
        let registry = match &self.palette {
            Some(palette) => RendererColorRegistry::with_palette(palette.clone()),
            None => RendererColorRegistry::new(),
        };

        app.insert_resource(SplatCacheResource(SplatCache::new(self.config.clone())))
            .insert_resource(ColorRegistryResource(registry))
            .insert_resource(LevelTransitionResource(LevelTransition::new(
                self.transition.clone(),
            )))
            .init_resource::<SplatEntities>()
            .init_resource::<PendingSplatOutputs>()
            .init_resource::<SplatClock>()
            .add_event::<SpawnSplat>()
            .add_event::<ApplyPalette>()
            .add_event::<ReapplyPalette>()
            .add_event::<ClearSplats>()
            .add_event::<SplatsCleared>()
            .add_event::<RequestNextLevel>()
            .add_event::<LevelLoad>()
            .add_systems(
                Update,
                (
                    systems::unregister_palette_renderers_system,
                    systems::register_palette_renderers_system,
                    systems::apply_palette_system,
                    systems::spawn_splats_system,
                    systems::clear_requests_system,
                    systems::tick_cache_system,
                    systems::level_transition_system,
                    systems::apply_splat_outputs_system,
                )
                    .chain(),
            );
        app.add_systems(Startup, systems::load_first_level_system);
        if self.palette.is_some() {
            // Paint the background once the renderer's ClearColor exists.
            app.add_systems(Startup, systems::request_initial_paint_system);
        }
    }
}
