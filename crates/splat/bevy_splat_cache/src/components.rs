use bevy::prelude::*;
use splat_cache_core::{Category, SplatId};

/// Entity that renders a tracked splat. Spawned and despawned by the plugin.
#[derive(Component, Debug, Clone, Copy)]
pub struct Splat {
    pub id: SplatId,
}

/// Opt a sprite into palette recoloring.
///
/// Adding the component registers the entity with the color registry and paints
/// it right away; removing it (or despawning) unregisters it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteCategory(pub Category);

impl PaletteCategory {
    pub fn from_sorting_layer(layer: &str) -> Option<Self> {
        Category::from_sorting_layer(layer).map(Self)
    }
}
