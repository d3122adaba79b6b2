use bevy::color::Alpha;
use bevy::log::{debug, warn};
use bevy::prelude::*;
use splat_cache_core::{
    Category, Color as SplatColor, ColorSink, PaintBatch, RendererId, SplatEvent,
    Vec2 as SplatVec2,
};

use crate::components::{PaletteCategory, Splat};
use crate::events::{
    ApplyPalette, ClearSplats, LevelLoad, ReapplyPalette, RequestNextLevel, SpawnSplat,
    SplatsCleared,
};
use crate::resources::{
    ColorRegistryResource, LevelTransitionResource, PendingSplatOutputs, SplatCacheResource,
    SplatClock, SplatEntities, SplatVisuals,
};

pub fn to_bevy_color(c: SplatColor) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a)
}

/// Handle for a static sprite registered through `PaletteCategory`.
pub fn external_renderer(entity: Entity) -> RendererId {
    RendererId::External(entity.to_bits())
}

/// Paints registry colors onto sprites. Splats keep their fade alpha.
struct SpriteSink<'a, 'w, 's> {
    sprites: &'a mut Query<'w, 's, &'static mut Sprite>,
    entities: &'a SplatEntities,
    background: Option<&'a mut ClearColor>,
}

impl SpriteSink<'_, '_, '_> {
    fn entity_for(&self, renderer: RendererId) -> Option<Entity> {
        match renderer {
            RendererId::Splat(id) => self.entities.map.get(&id).copied(),
            RendererId::External(bits) => Entity::try_from_bits(bits).ok(),
        }
    }
}

impl ColorSink for SpriteSink<'_, '_, '_> {
    fn is_alive(&self, renderer: RendererId) -> bool {
        self.entity_for(renderer)
            .is_some_and(|e| self.sprites.get(e).is_ok())
    }

    fn paint(&mut self, renderer: RendererId, _category: Category, color: SplatColor) {
        let Some(entity) = self.entity_for(renderer) else {
            return;
        };
        let Ok(mut sprite) = self.sprites.get_mut(entity) else {
            return;
        };
        let color = to_bevy_color(color);
        sprite.color = match renderer {
            RendererId::Splat(_) => color.with_alpha(sprite.color.alpha()),
            RendererId::External(_) => color,
        };
    }

    fn paint_background(&mut self, color: SplatColor) {
        if let Some(clear) = self.background.as_mut() {
            clear.0 = to_bevy_color(color);
        }
    }
}

/// Registers sprites that just gained a `PaletteCategory`, painting them with the current palette.
pub fn register_palette_renderers_system(
    added: Query<(Entity, &PaletteCategory), Added<PaletteCategory>>,
    mut registry: ResMut<ColorRegistryResource>,
    entities: Res<SplatEntities>,
    mut sprites: Query<&'static mut Sprite>,
) {
    if added.is_empty() {
        return;
    }
    let mut sink = SpriteSink {
        sprites: &mut sprites,
        entities: &entities,
        background: None,
    };
    for (entity, category) in added.iter() {
        if !registry
            .0
            .register(external_renderer(entity), category.0, &mut sink)
        {
            warn!("entity {entity:?} has PaletteCategory but no Sprite; not recolored");
        }
    }
}

pub fn unregister_palette_renderers_system(
    mut removed: RemovedComponents<PaletteCategory>,
    mut registry: ResMut<ColorRegistryResource>,
) {
    for entity in removed.read() {
        registry.0.unregister(external_renderer(entity));
    }
}

/// Applies the last requested palette of the frame, or repaints on `ReapplyPalette`.
pub fn apply_palette_system(
    mut applies: EventReader<ApplyPalette>,
    mut reapplies: EventReader<ReapplyPalette>,
    mut registry: ResMut<ColorRegistryResource>,
    entities: Res<SplatEntities>,
    mut sprites: Query<&'static mut Sprite>,
    mut clear_color: Option<ResMut<ClearColor>>,
) {
    let palette = applies.read().last().map(|ev| ev.0.clone());
    let reapply = reapplies.read().count() > 0;
    if palette.is_none() && !reapply {
        return;
    }
    let mut sink = SpriteSink {
        sprites: &mut sprites,
        entities: &entities,
        background: clear_color.as_deref_mut(),
    };
    let pruned = match palette {
        Some(palette) => registry.0.apply_palette(palette, &mut sink),
        None => registry.0.reapply(&mut sink),
    };
    if pruned > 0 {
        debug!("pruned {pruned} despawned renderers from the color registry");
    }
}

pub fn request_initial_paint_system(mut reapply: EventWriter<ReapplyPalette>) {
    reapply.send(ReapplyPalette);
}

/// Spawns cache entries and their sprites for each `SpawnSplat` request.
pub fn spawn_splats_system(
    mut commands: Commands,
    mut requests: EventReader<SpawnSplat>,
    mut cache: ResMut<SplatCacheResource>,
    mut registry: ResMut<ColorRegistryResource>,
    mut entities: ResMut<SplatEntities>,
    visuals: Option<Res<SplatVisuals>>,
) {
    let visuals = visuals.as_deref();
    let mut batch = PaintBatch::new();
    for request in requests.read() {
        batch.clear();
        let position = SplatVec2::new(request.position.x, request.position.y);
        let id = cache
            .0
            .spawn(position, request.variant, &mut registry.0, &mut batch);
        let Some(splat) = cache.0.get(id) else {
            continue;
        };
        let appearance = *splat.appearance();
        let base = batch
            .paints
            .last()
            .map(|p| to_bevy_color(p.color))
            .unwrap_or(Color::WHITE);

        let texture = appearance
            .variant
            .and_then(|v| visuals.and_then(|vis| vis.textures.get(v.0 as usize).cloned()));
        if let (Some(variant), None) = (appearance.variant, &texture) {
            warn!("no texture for splat variant {}; drawing untextured", variant.0);
        }

        let transform = Transform::from_xyz(position.x, position.y, 0.0)
            .with_rotation(Quat::from_rotation_z(appearance.rotation_degrees.to_radians()))
            .with_scale(Vec3::new(appearance.scale, appearance.scale, 1.0));
        let entity = commands
            .spawn((
                Splat { id },
                SpriteBundle {
                    sprite: Sprite {
                        color: base.with_alpha(splat.progress()),
                        custom_size: visuals.and_then(|vis| vis.size),
                        ..default()
                    },
                    texture: texture.unwrap_or_default(),
                    transform,
                    ..default()
                },
            ))
            .id();
        entities.map.insert(id, entity);
    }
}

pub fn clear_requests_system(
    mut requests: EventReader<ClearSplats>,
    mut cache: ResMut<SplatCacheResource>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    let ticket = cache.0.clear_all();
    debug!("clear requested: {:?}", ticket.barrier);
}

/// Steps the cache and stashes its outputs into `PendingSplatOutputs`.
pub fn tick_cache_system(
    time: Res<Time>,
    clock: Res<SplatClock>,
    mut cache: ResMut<SplatCacheResource>,
    mut registry: ResMut<ColorRegistryResource>,
    mut pending: ResMut<PendingSplatOutputs>,
) {
    let out = cache.0.advance(clock.dt(&time), &mut registry.0);
    pending.outputs.extend(out);
}

/// Loads the first level, so the first `RequestNextLevel` moves on to level 1.
pub fn load_first_level_system(
    mut flow: ResMut<LevelTransitionResource>,
    mut loads: EventWriter<LevelLoad>,
) {
    let event = flow.0.load_level(0);
    loads.send(LevelLoad(event));
}

pub fn level_transition_system(
    time: Res<Time>,
    clock: Res<SplatClock>,
    mut requests: EventReader<RequestNextLevel>,
    mut flow: ResMut<LevelTransitionResource>,
    mut cache: ResMut<SplatCacheResource>,
    mut loads: EventWriter<LevelLoad>,
) {
    for _ in requests.read() {
        flow.0.request_next_level();
    }
    if let Some(event) = flow.0.advance(clock.dt(&time), &mut cache.0) {
        loads.send(LevelLoad(event));
    }
}

/// Writes fade alpha onto splat sprites and despawns retired splats.
pub fn apply_splat_outputs_system(
    mut commands: Commands,
    mut pending: ResMut<PendingSplatOutputs>,
    mut entities: ResMut<SplatEntities>,
    mut sprites: Query<&mut Sprite, With<Splat>>,
    mut cleared: EventWriter<SplatsCleared>,
) {
    let outputs = std::mem::take(&mut pending.outputs);
    for change in &outputs.changes {
        let Some(&entity) = entities.map.get(&change.id) else {
            continue;
        };
        if let Ok(mut sprite) = sprites.get_mut(entity) {
            sprite.color.set_alpha(change.progress);
        }
    }
    for event in &outputs.events {
        match event {
            SplatEvent::Retired { id } => {
                if let Some(entity) = entities.map.remove(id) {
                    if let Some(mut ec) = commands.get_entity(entity) {
                        ec.despawn();
                    }
                }
            }
            SplatEvent::ClearCompleted { barrier, forced } => {
                cleared.send(SplatsCleared {
                    barrier: *barrier,
                    forced: *forced,
                });
            }
            _ => {}
        }
    }
}
