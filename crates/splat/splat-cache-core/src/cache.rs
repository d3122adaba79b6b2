//! Bounded, FIFO-ordered splat cache with a staggered eviction loop.
//!
//! The host drives everything through [`SplatCache::advance`] once per frame.
//! Each tick: timelines advance and finished ones are destroyed, an active clear
//! barrier is progressed, then (unless a clear is running) the eviction loop
//! retires the oldest queued splats, one per `wave_delay`.

use std::collections::VecDeque;

use generational_arena::Arena;
use indexmap::IndexSet;

use crate::appearance::{AppearanceRoller, SplatAppearance, VariantId, Vec2};
use crate::barrier::{ClearBarrier, ClearStatus, ClearTicket};
use crate::config::{CacheConfig, ValidatedConfig};
use crate::fade::{FadeState, FadeStep, FadeTimeline, TIME_EPSILON};
use crate::ids::{BarrierId, IdAllocator, RendererId, SplatId};
use crate::outputs::{CacheOutputs, FadeChange, FadeReason, SplatEvent};
use crate::palette::Category;
use crate::registry::{ColorSink, RendererColorRegistry};

/// A live splat owned by the cache.
#[derive(Debug, Clone)]
pub struct TrackedSplat {
    id: SplatId,
    position: Vec2,
    appearance: SplatAppearance,
    timeline: FadeTimeline,
}

impl TrackedSplat {
    #[inline]
    pub fn id(&self) -> SplatId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn appearance(&self) -> &SplatAppearance {
        &self.appearance
    }

    #[inline]
    pub fn fade_state(&self) -> FadeState {
        self.timeline.state()
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    #[inline]
    pub fn renderer(&self) -> RendererId {
        RendererId::Splat(self.id)
    }
}

#[derive(Debug, Clone, Default)]
struct EvictionLoop {
    suspended: bool,
    /// Time left before the next eviction may happen.
    cooldown: f32,
}

#[derive(Debug)]
pub struct SplatCache {
    cfg: ValidatedConfig,
    ids: IdAllocator,
    arena: Arena<TrackedSplat>,
    /// One past the highest arena slot ever handed out.
    slots_issued: usize,
    /// Oldest at the front.
    queue: VecDeque<SplatId>,
    eviction: EvictionLoop,
    clear: Option<ClearBarrier>,
    roller: AppearanceRoller,
    outputs: CacheOutputs,
}

impl SplatCache {
    pub fn new(cfg: ValidatedConfig) -> Self {
        Self {
            ids: IdAllocator::new(),
            arena: Arena::with_capacity(cfg.capacity + 1),
            slots_issued: 0,
            queue: VecDeque::with_capacity(cfg.capacity + 1),
            eviction: EvictionLoop::default(),
            clear: None,
            roller: AppearanceRoller::new(cfg.appearance.clone()),
            outputs: CacheOutputs::default(),
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        self.cfg.get()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cfg.capacity
    }

    /// Queued splats, including any over-capacity excess not yet evicted.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Every splat not yet retired, queued or already fading out.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.arena.len()
    }

    /// Queue contents, oldest first.
    pub fn queue(&self) -> impl Iterator<Item = SplatId> + '_ {
        self.queue.iter().copied()
    }

    pub fn get(&self, id: SplatId) -> Option<&TrackedSplat> {
        self.arena.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSplat> {
        self.arena.iter().map(|(_, s)| s)
    }

    #[inline]
    pub fn is_alive(&self, id: SplatId) -> bool {
        self.arena.contains(id.0)
    }

    /// Fade state of `id`. Handles whose splat was destroyed report `Retired`;
    /// handles this cache never issued report `None`.
    pub fn fade_state(&self, id: SplatId) -> Option<FadeState> {
        match self.arena.get(id.0) {
            Some(splat) => Some(splat.fade_state()),
            None if id.slot() < self.slots_issued => Some(FadeState::Retired),
            None => None,
        }
    }

    #[inline]
    pub fn is_clearing(&self) -> bool {
        self.clear.is_some()
    }

    #[inline]
    pub fn eviction_suspended(&self) -> bool {
        self.eviction.suspended
    }

    /// Track a new splat at the tail of the queue and register it for palette paints.
    ///
    /// Never fails. A splat without usable visuals still runs its lifecycle.
    pub fn spawn(
        &mut self,
        position: Vec2,
        variant: Option<VariantId>,
        registry: &mut RendererColorRegistry,
        sink: &mut dyn ColorSink,
    ) -> SplatId {
        let appearance = self.roller.roll(variant);
        let appear_duration = self.cfg.appear_duration;
        let id = SplatId(self.arena.insert_with(|index| TrackedSplat {
            id: SplatId(index),
            position,
            appearance,
            timeline: FadeTimeline::new(appear_duration),
        }));
        self.slots_issued = self.slots_issued.max(id.slot() + 1);
        debug_assert!(!self.queue.contains(&id), "splat {id:?} queued twice");
        self.queue.push_back(id);

        if !registry.register(RendererId::Splat(id), Category::Paint, sink) {
            log::warn!("splat {id:?} has no live renderer; it will not follow palette changes");
        }
        self.outputs.push_event(SplatEvent::Spawned {
            id,
            position,
            appearance,
        });
        id
    }

    /// Advance all timelines, the clear barrier, and the eviction loop by `dt` seconds.
    ///
    /// Returns everything emitted since the previous call, spawns included.
    pub fn advance(&mut self, dt: f32, registry: &mut RendererColorRegistry) -> CacheOutputs {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let fade_out = self.cfg.fade_out_duration;

        let mut retired = Vec::new();
        for (index, splat) in self.arena.iter_mut() {
            let id = SplatId(index);
            let before = splat.timeline.state();
            if matches!(before, FadeState::Idle | FadeState::Retired) {
                continue;
            }
            match splat.timeline.advance(dt, fade_out) {
                FadeStep::Retired => retired.push(id),
                FadeStep::BecameIdle | FadeStep::Unchanged => {
                    self.outputs.push_change(FadeChange {
                        id,
                        state: splat.timeline.state(),
                        progress: splat.timeline.progress(),
                    });
                }
            }
        }
        if !retired.is_empty() {
            for id in retired {
                self.destroy(id, registry);
            }
            self.prune_queue();
        }

        if let Some(barrier) = self.clear.as_mut() {
            if barrier.tick(dt, fade_out) {
                self.finish_clear(registry);
            }
        }

        if !self.eviction.suspended {
            self.run_eviction(dt);
        }

        std::mem::take(&mut self.outputs)
    }

    /// One pass of the eviction loop: while over capacity and off cooldown, start
    /// fading the oldest queued splat.
    ///
    /// Evictions land on tick boundaries, so time never banks up: with a positive
    /// `wave_delay` at most one splat goes per tick. A zero delay drains all excess.
    fn run_eviction(&mut self, dt: f32) {
        let capacity = self.cfg.capacity;
        let wave_delay = self.cfg.wave_delay;

        self.eviction.cooldown = (self.eviction.cooldown - dt).max(0.0);
        while self.eviction.cooldown <= TIME_EPSILON && self.queue.len() > capacity {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            let Some(splat) = self.arena.get_mut(id.0) else {
                continue;
            };
            if splat.timeline.begin_fade_out() {
                log::debug!("evicting splat {id:?} ({} queued)", self.queue.len());
                self.outputs.push_event(SplatEvent::FadeOutStarted {
                    id,
                    reason: FadeReason::Capacity,
                });
            }
            self.eviction.cooldown += wave_delay;
        }
    }

    /// Start a hard clear of everything currently queued.
    ///
    /// Suspends the eviction loop and starts every queued splat fading at once. The
    /// barrier completes `fade_out_duration` later. Splats spawned after this call
    /// are not part of the clear. Calling again while a clear runs joins it: newly
    /// queued splats are added and the wait restarts.
    pub fn clear_all(&mut self) -> ClearTicket {
        let snapshot: IndexSet<SplatId> = self.queue.iter().copied().collect();

        if let Some(mut barrier) = self.clear.take() {
            let fresh: Vec<SplatId> = snapshot
                .into_iter()
                .filter(|id| !barrier.snapshot.contains(id))
                .collect();
            self.fade_for_clear(&fresh);
            let added = barrier.join(fresh);
            log::info!("clear {:?} joined, {added} more splats", barrier.id);
            let ticket = barrier.ticket();
            self.clear = Some(barrier);
            return ticket;
        }

        self.eviction.suspended = true;
        let id = self.ids.alloc_barrier();
        let ids: Vec<SplatId> = snapshot.iter().copied().collect();
        self.fade_for_clear(&ids);
        log::info!("clear {id:?} started with {} splats", snapshot.len());
        self.outputs.push_event(SplatEvent::ClearStarted {
            barrier: id,
            snapshot: snapshot.len(),
        });
        let barrier = ClearBarrier::new(id, snapshot);
        let ticket = barrier.ticket();
        self.clear = Some(barrier);
        ticket
    }

    fn fade_for_clear(&mut self, ids: &[SplatId]) {
        for &id in ids {
            let Some(splat) = self.arena.get_mut(id.0) else {
                continue;
            };
            if splat.timeline.begin_fade_out() {
                self.outputs.push_event(SplatEvent::FadeOutStarted {
                    id,
                    reason: FadeReason::Clear,
                });
            }
        }
    }

    pub fn clear_status(&self, ticket: ClearTicket) -> ClearStatus {
        match &self.clear {
            Some(barrier) if barrier.id == ticket.barrier => ClearStatus::Pending {
                remaining: barrier.remaining(self.cfg.fade_out_duration),
            },
            _ => ClearStatus::Complete,
        }
    }

    /// The active barrier, if any.
    pub fn active_clear(&self) -> Option<BarrierId> {
        self.clear.as_ref().map(|b| b.id)
    }

    /// Issue a clear and tick in `step`-second increments until it completes.
    ///
    /// For hosts without a frame loop. Returns the ticket and all outputs produced
    /// while waiting.
    pub fn clear_all_and_wait(
        &mut self,
        registry: &mut RendererColorRegistry,
        step: f32,
    ) -> (ClearTicket, CacheOutputs) {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            self.cfg.fade_out_duration
        };
        let ticket = self.clear_all();
        let mut collected = CacheOutputs::default();
        while !self.clear_status(ticket).is_complete() {
            collected.extend(self.advance(step, registry));
        }
        (ticket, collected)
    }

    /// Drop what remains of the snapshot and resume eviction.
    fn finish_clear(&mut self, registry: &mut RendererColorRegistry) {
        let Some(barrier) = self.clear.take() else {
            return;
        };
        let mut forced = 0;
        for &id in &barrier.snapshot {
            if self.arena.contains(id.0) {
                forced += 1;
                self.destroy(id, registry);
            }
        }
        self.queue.retain(|id| !barrier.snapshot.contains(id));
        if forced > 0 {
            log::warn!(
                "clear {:?} force-retired {forced} splats that outlived the fade",
                barrier.id
            );
        }
        log::info!(
            "clear {:?} complete, {} splats survive",
            barrier.id,
            self.queue.len()
        );
        self.outputs.push_event(SplatEvent::ClearCompleted {
            barrier: barrier.id,
            forced,
        });
        self.eviction = EvictionLoop::default();
    }

    /// Drop queue entries whose splat no longer exists. Snapshot splats of a
    /// joined clear can retire while the barrier is still waiting.
    fn prune_queue(&mut self) {
        let arena = &self.arena;
        self.queue.retain(|id| arena.contains(id.0));
    }

    /// Retire and free one splat. Runs at most once per splat: the arena hands the
    /// value out only once.
    fn destroy(&mut self, id: SplatId, registry: &mut RendererColorRegistry) {
        let Some(mut splat) = self.arena.remove(id.0) else {
            return;
        };
        splat.timeline.force_retire();
        registry.unregister(splat.renderer());
        log::debug!("splat {id:?} retired");
        self.outputs.push_event(SplatEvent::Retired { id });
    }
}
