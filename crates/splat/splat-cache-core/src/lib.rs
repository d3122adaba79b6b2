//! Splat Cache Core (engine-agnostic)
//!
//! Bounded lifecycle manager for short-lived decorative marks ("splats"). The
//! cache keeps at most `capacity` splats queued, retires the oldest in a staggered
//! wave, and offers a clear-all barrier for level transitions. A side registry
//! keeps dynamically spawned renderers in step with the active color palette.
//!
//! Everything is driven by an explicit per-frame `advance(dt)`; adapters (Bevy)
//! call it from their schedule and apply the returned outputs to the host.

pub mod appearance;
pub mod barrier;
pub mod cache;
pub mod config;
pub mod fade;
pub mod ids;
pub mod outputs;
pub mod palette;
pub mod registry;
pub mod transition;

// Re-exports for consumers (adapters)
pub use appearance::{SplatAppearance, VariantId, Vec2};
pub use barrier::{ClearStatus, ClearTicket};
pub use cache::{SplatCache, TrackedSplat};
pub use config::{AppearanceConfig, CacheConfig, ConfigError, ValidatedConfig};
pub use fade::{FadeState, FadeStep, FadeTimeline};
pub use ids::{BarrierId, RendererId, SplatId};
pub use outputs::{CacheOutputs, FadeChange, FadeReason, SplatEvent};
pub use palette::{Category, Color, Palette};
pub use registry::{ColorSink, Paint, PaintBatch, RendererColorRegistry};
pub use transition::{LevelTransition, TransitionConfig, TransitionEvent, TransitionPhase};
