//! inkfade turns an on-screen ink stroke into a swarm of particles and back out of existence.
//!
//! A conversion runs three time-normalized processes off one frame-stepped timeline:
//!
//! 1. **Emit**: particles spawn along the stroke in arc-length order.
//! 2. **Reveal**: after a delay the stroke redraws itself from its first point.
//! 3. **Decay**: every particle the reveal front passes starts fading, shrinking and
//!    spinning until it destroys itself.
//!
//! When the timeline ends, particles the front never reached decay in a staggered wave,
//! and the stroke erases head to tail before it is destroyed.
//!
//! The crate owns no scene objects. Hosts implement [`Scene`] (or use [`MemoryScene`]),
//! start conversions with [`StrokeDissolver::begin_conversion`], and call
//! [`StrokeDissolver::tick`] once per frame with that frame's elapsed time.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic given a seed**: all randomness comes from the dissolver's injected RNG.
//! - **Fail quiet**: bad input or vanished objects skip work, they never abort the frame.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod dissolve;
mod foundation;
mod geometry;

/// Host scene contract and the in-memory reference host.
pub mod scene;

pub use dissolve::config::{DissolveConfig, DissolveTiming};
pub use dissolve::controller::StrokeDissolver;
pub use dissolve::decay::{DecayParams, DecayPhase, DecayPool, DecayUnit, MIN_SCALE_FACTOR};
pub use dissolve::session::{
    ConversionSession, MAX_TARGET_PARTICLES, SessionPhase, SessionSnapshot,
};
pub use foundation::core::{
    CameraPose, Quat, Rgba, Transform, Vec3, billboard_rotation, clamp01, look_rotation,
};
pub use foundation::error::{InkfadeError, InkfadeResult};
pub use foundation::ids::{ParticleId, StrokeId};
pub use geometry::polyline::{Polyline, sample_at, total_length};
pub use scene::memory::{MemoryScene, ParticleRecord, ParticleTemplate, SceneStats, StrokeRecord};
pub use scene::{BlendFactor, BlendMode, Frame, Material, Scene};
