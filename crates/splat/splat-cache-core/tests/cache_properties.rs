use std::collections::HashMap;

use splat_cache_core::{
    CacheConfig, CacheOutputs, FadeReason, FadeState, PaintBatch, RendererColorRegistry,
    SplatCache, SplatEvent, SplatId, Vec2,
};

fn mk_cache(capacity: usize, wave_delay: f32, appear: f32, fade_out: f32) -> SplatCache {
    let cfg = CacheConfig {
        capacity,
        appear_duration: appear,
        fade_out_duration: fade_out,
        wave_delay,
        ..CacheConfig::default()
    };
    SplatCache::new(cfg.validate().expect("valid config"))
}

fn spawn(cache: &mut SplatCache, reg: &mut RendererColorRegistry, n: usize) -> Vec<SplatId> {
    let mut sink = PaintBatch::new();
    (0..n)
        .map(|i| cache.spawn(Vec2::new(i as f32, -(i as f32)), None, reg, &mut sink))
        .collect()
}

fn fade_starts(outputs: &CacheOutputs) -> Vec<(SplatId, FadeReason)> {
    outputs
        .events
        .iter()
        .filter_map(|e| match e {
            SplatEvent::FadeOutStarted { id, reason } => Some((*id, *reason)),
            _ => None,
        })
        .collect()
}

#[test]
fn five_spawns_into_three_slots_shrink_in_two_waves() {
    let mut cache = mk_cache(3, 0.1, 0.5, 0.3);
    let mut reg = RendererColorRegistry::new();
    let ids = spawn(&mut cache, &mut reg, 5);
    assert_eq!(cache.len(), 5);

    cache.advance(0.1, &mut reg);
    assert_eq!(cache.len(), 4);
    cache.advance(0.1, &mut reg);
    assert_eq!(cache.len(), 3);

    for id in &ids[..2] {
        let state = cache.fade_state(*id).unwrap();
        assert!(matches!(state, FadeState::FadingOut | FadeState::Retired));
    }
    for id in &ids[2..] {
        assert_eq!(cache.fade_state(*id), Some(FadeState::Appearing));
    }
    assert_eq!(cache.queue().collect::<Vec<_>>(), ids[2..].to_vec());
}

#[test]
fn eviction_is_strictly_oldest_first() {
    let mut cache = mk_cache(2, 0.0, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    let ids = spawn(&mut cache, &mut reg, 3);
    let out = cache.advance(1.0 / 60.0, &mut reg);
    assert_eq!(fade_starts(&out), vec![(ids[0], FadeReason::Capacity)]);
}

#[test]
fn excess_never_outlives_one_tick_without_wave_delay() {
    let mut cache = mk_cache(4, 0.0, 0.2, 0.3);
    let mut reg = RendererColorRegistry::new();
    for tick in 0..120 {
        spawn(&mut cache, &mut reg, (tick * 7) % 5);
        cache.advance(1.0 / 60.0, &mut reg);
        assert!(cache.len() <= cache.capacity(), "tick {tick}: {}", cache.len());
    }
}

#[test]
fn wave_eviction_makes_steady_progress() {
    let mut cache = mk_cache(5, 0.05, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    spawn(&mut cache, &mut reg, 25);
    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;
    while cache.len() > cache.capacity() {
        cache.advance(dt, &mut reg);
        elapsed += dt;
        assert!(elapsed < 2.0, "eviction stalled at {}", cache.len());
    }
    // 20 evictions, first immediate, then one per 50ms.
    assert!(elapsed >= 19.0 * 0.05 - 1e-3, "too fast: {elapsed}");
}

#[test]
fn every_splat_retires_exactly_once() {
    let mut cache = mk_cache(3, 0.05, 0.1, 0.2);
    let mut reg = RendererColorRegistry::new();
    let mut retired: HashMap<SplatId, usize> = HashMap::new();
    let mut all = Vec::new();

    for round in 0..6 {
        all.extend(spawn(&mut cache, &mut reg, 4));
        for _ in 0..5 {
            let out = cache.advance(0.05, &mut reg);
            for id in out.retired() {
                *retired.entry(id).or_default() += 1;
            }
        }
        if round % 2 == 1 {
            let (_, out) = cache.clear_all_and_wait(&mut reg, 0.05);
            for id in out.retired() {
                *retired.entry(id).or_default() += 1;
            }
        }
    }
    let (_, out) = cache.clear_all_and_wait(&mut reg, 0.05);
    for id in out.retired() {
        *retired.entry(id).or_default() += 1;
    }
    for _ in 0..20 {
        for id in cache.advance(0.05, &mut reg).retired() {
            *retired.entry(id).or_default() += 1;
        }
    }

    assert_eq!(cache.live_count(), 0);
    assert!(reg.is_empty());
    for id in all {
        assert_eq!(retired.get(&id), Some(&1), "{id:?}");
        assert_eq!(cache.fade_state(id), Some(FadeState::Retired));
    }
}

#[test]
fn clear_all_waits_full_fade_and_empties_queue() {
    let mut cache = mk_cache(150, 0.1, 0.5, 0.3);
    let mut reg = RendererColorRegistry::new();
    let ids = spawn(&mut cache, &mut reg, 10);
    cache.advance(0.2, &mut reg);

    let ticket = cache.clear_all();
    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0_f32;
    let mut out = CacheOutputs::default();
    while !cache.clear_status(ticket).is_complete() {
        out.extend(cache.advance(dt, &mut reg));
        elapsed += dt;
    }

    assert!(elapsed >= 0.3 - 1e-4, "returned after {elapsed}");
    assert_eq!(cache.len(), 0);
    for id in &ids {
        assert_eq!(cache.fade_state(*id), Some(FadeState::Retired));
    }
    let cleared = fade_starts(&out);
    assert_eq!(cleared.len(), 10);
    assert!(cleared.iter().all(|(_, reason)| *reason == FadeReason::Clear));
    assert!(out.events.iter().any(|e| matches!(
        e,
        SplatEvent::ClearCompleted { forced: 0, .. }
    )));
}

#[test]
fn clear_all_and_wait_reports_the_snapshot() {
    let mut cache = mk_cache(150, 0.1, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    spawn(&mut cache, &mut reg, 10);
    let (ticket, out) = cache.clear_all_and_wait(&mut reg, 0.1);

    assert!(cache.clear_status(ticket).is_complete());
    assert!(out.events.iter().any(|e| matches!(
        e,
        SplatEvent::ClearStarted { snapshot: 10, .. }
    )));
    assert_eq!(out.retired().count(), 10);
    assert!(cache.is_empty());
    assert!(reg.is_empty());
}

#[test]
fn spawns_during_clear_survive_with_their_own_timeline() {
    let mut cache = mk_cache(10, 0.1, 0.4, 0.3);
    let mut reg = RendererColorRegistry::new();
    let old = spawn(&mut cache, &mut reg, 3);
    let ticket = cache.clear_all();

    cache.advance(0.1, &mut reg);
    let late = spawn(&mut cache, &mut reg, 1)[0];
    assert_eq!(cache.fade_state(late), Some(FadeState::Appearing));

    while !cache.clear_status(ticket).is_complete() {
        cache.advance(0.05, &mut reg);
    }
    for id in old {
        assert_eq!(cache.fade_state(id), Some(FadeState::Retired));
    }
    let survivor = cache.get(late).expect("late splat survives the clear");
    assert_eq!(survivor.fade_state(), FadeState::Appearing);
    assert!(survivor.progress() > 0.0 && survivor.progress() < 1.0);
    assert_eq!(cache.queue().collect::<Vec<_>>(), vec![late]);

    cache.advance(0.2, &mut reg);
    assert_eq!(cache.fade_state(late), Some(FadeState::Idle));
}

#[test]
fn no_capacity_eviction_while_clearing() {
    let mut cache = mk_cache(1, 0.0, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    spawn(&mut cache, &mut reg, 1);
    let ticket = cache.clear_all();
    spawn(&mut cache, &mut reg, 4);

    while !cache.clear_status(ticket).is_complete() {
        let out = cache.advance(0.05, &mut reg);
        if cache.is_clearing() {
            assert!(fade_starts(&out)
                .iter()
                .all(|(_, reason)| *reason != FadeReason::Capacity));
        }
    }
    assert!(!cache.eviction_suspended());
}

#[test]
fn evicted_splats_caught_by_clear_retire_once() {
    let mut cache = mk_cache(1, 0.0, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    let ids = spawn(&mut cache, &mut reg, 2);
    cache.advance(0.1, &mut reg);
    assert_eq!(cache.fade_state(ids[0]), Some(FadeState::FadingOut));

    let (_, out) = cache.clear_all_and_wait(&mut reg, 0.1);
    let retired: Vec<_> = out.retired().collect();
    assert_eq!(retired.iter().filter(|id| **id == ids[0]).count(), 1);
    assert_eq!(retired.iter().filter(|id| **id == ids[1]).count(), 1);
    assert_eq!(cache.live_count(), 0);
}

#[test]
fn second_clear_joins_the_first() {
    let mut cache = mk_cache(10, 0.0, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    spawn(&mut cache, &mut reg, 2);
    let first = cache.clear_all();
    cache.advance(0.2, &mut reg);
    let late = spawn(&mut cache, &mut reg, 1)[0];

    let second = cache.clear_all();
    assert_eq!(first, second);
    assert_eq!(cache.fade_state(late), Some(FadeState::FadingOut));

    cache.advance(0.2, &mut reg);
    assert!(!cache.clear_status(first).is_complete());
    cache.advance(0.1, &mut reg);
    assert!(cache.clear_status(first).is_complete());
    assert_eq!(cache.live_count(), 0);
    assert!(cache.is_empty());
}

#[test]
fn joined_clear_drops_retired_splats_from_the_queue() {
    let mut cache = mk_cache(10, 0.0, 0.0, 0.3);
    let mut reg = RendererColorRegistry::new();
    let early = spawn(&mut cache, &mut reg, 2);
    cache.clear_all();
    cache.advance(0.2, &mut reg);
    let late = spawn(&mut cache, &mut reg, 1)[0];
    let ticket = cache.clear_all();

    cache.advance(0.1, &mut reg);
    for id in &early {
        assert_eq!(cache.fade_state(*id), Some(FadeState::Retired));
    }
    assert!(!cache.clear_status(ticket).is_complete());
    assert!(cache.queue().all(|id| cache.get(id).is_some()));
    assert_eq!(cache.queue().collect::<Vec<_>>(), vec![late]);
    assert_eq!(cache.len(), cache.live_count());
}

#[test]
fn fade_changes_track_progress() {
    let mut cache = mk_cache(5, 0.0, 0.4, 0.3);
    let mut reg = RendererColorRegistry::new();
    let id = spawn(&mut cache, &mut reg, 1)[0];
    let out = cache.advance(0.1, &mut reg);
    let change = out.changes.iter().find(|c| c.id == id).unwrap();
    assert_eq!(change.state, FadeState::Appearing);
    assert!((change.progress - 0.25).abs() < 1e-4);

    cache.advance(0.3, &mut reg);
    let idle = cache.advance(0.1, &mut reg);
    assert!(idle.changes.is_empty());
}
