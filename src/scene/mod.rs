//! Contract between the dissolve controller and the host that owns the scene graph.
//!
//! The controller never owns strokes or particles. It reads and writes them through
//! [`Scene`], keeps only [`StrokeId`]/[`ParticleId`] handles, and treats
//! [`InkfadeError::StaleReference`](crate::InkfadeError::StaleReference) from any call as
//! "the object is gone, skip this action".

pub mod memory;

use crate::foundation::core::{CameraPose, Rgba, Transform, Vec3};
use crate::foundation::error::InkfadeResult;
use crate::foundation::ids::{ParticleId, StrokeId};

/// Blend factor for one side of the blend equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendFactor {
    /// Constant one.
    One,
    /// Constant zero.
    Zero,
    /// Source alpha.
    SrcAlpha,
    /// One minus source alpha.
    OneMinusSrcAlpha,
}

/// Source/destination blend factor pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlendMode {
    /// Factor applied to the incoming fragment.
    pub src: BlendFactor,
    /// Factor applied to the framebuffer.
    pub dst: BlendFactor,
}

impl BlendMode {
    /// Overwrite the destination.
    pub const OPAQUE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
    };

    /// Classic straight-alpha "over" blending.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Per-instance material state.
///
/// Materials are plain values: handing one to [`Scene::set_particle_material`] or
/// [`Scene::set_stroke_material`] gives that object its own copy, so tinting one
/// particle can never alias another particle or the stroke.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Material {
    /// Tint color.
    pub color: Rgba,
    /// Blend factors.
    pub blend: BlendMode,
    /// Whether the material writes depth.
    pub depth_write: bool,
    /// Draw-order key; higher draws later.
    pub draw_order: i32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            blend: BlendMode::OPAQUE,
            depth_write: true,
            draw_order: 2000,
        }
    }
}

/// Per-frame input from the host clock.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Frame {
    /// Wall time elapsed since the previous frame, in seconds. Variable.
    pub dt: f32,
    /// Camera pose used for billboarding.
    pub camera: CameraPose,
}

impl Frame {
    /// Frame with the given step and camera.
    pub fn new(dt: f32, camera: CameraPose) -> Self {
        Self { dt, camera }
    }

    /// Step usable for timers: negative or non-finite steps count as zero.
    pub(crate) fn step(&self) -> f32 {
        if self.dt.is_finite() && self.dt > 0.0 {
            self.dt
        } else {
            0.0
        }
    }
}

/// Host scene operations the dissolve needs.
///
/// Every method returns `StaleReference` when the handle no longer names a live object.
/// Destruction may be deferred by the host; callers drop their handle right after
/// requesting it either way.
pub trait Scene {
    /// Current points of the stroke, in order.
    fn stroke_points(&self, stroke: StrokeId) -> InkfadeResult<Vec<Vec3>>;

    /// Replace the displayed points; the visible point count becomes `points.len()`.
    fn set_stroke_points(&mut self, stroke: StrokeId, points: &[Vec3]) -> InkfadeResult<()>;

    /// Color at the start of the stroke.
    fn stroke_start_color(&self, stroke: StrokeId) -> InkfadeResult<Rgba>;

    /// Copy of the stroke's material.
    fn stroke_material(&self, stroke: StrokeId) -> InkfadeResult<Material>;

    /// Give the stroke its own material.
    fn set_stroke_material(&mut self, stroke: StrokeId, material: Material) -> InkfadeResult<()>;

    /// Request destruction of the stroke object.
    fn destroy_stroke(&mut self, stroke: StrokeId) -> InkfadeResult<()>;

    /// Instantiate the particle template at `position` with identity rotation.
    fn spawn_particle(&mut self, position: Vec3) -> InkfadeResult<ParticleId>;

    /// Current transform of a particle.
    fn particle_transform(&self, particle: ParticleId) -> InkfadeResult<Transform>;

    /// Replace a particle's transform.
    fn set_particle_transform(
        &mut self,
        particle: ParticleId,
        transform: Transform,
    ) -> InkfadeResult<()>;

    /// Copy of the particle's material, `None` when the template has no renderer.
    fn particle_material(&self, particle: ParticleId) -> InkfadeResult<Option<Material>>;

    /// Give the particle its own material.
    fn set_particle_material(
        &mut self,
        particle: ParticleId,
        material: Material,
    ) -> InkfadeResult<()>;

    /// Request destruction of a particle.
    fn destroy_particle(&mut self, particle: ParticleId) -> InkfadeResult<()>;
}
