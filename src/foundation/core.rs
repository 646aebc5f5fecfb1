pub use glam::{Mat3, Quat, Vec3};

/// Clamp into `[0, 1]`.
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Straight (non-premultiplied) RGBA color with `f32` channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from all four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same RGB, alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// `true` when every channel is a finite number.
    pub fn is_finite(self) -> bool {
        [self.r, self.g, self.b, self.a].iter().all(|c| c.is_finite())
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Position, orientation and scale of a scene entity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// World position.
    pub translation: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Local scale, default `(1, 1, 1)`.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity rotation and unit scale at `translation`.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Rotate around the entity's own Z axis (the view axis for billboards).
    pub fn spin_local_z(&mut self, degrees: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_z(degrees.to_radians())).normalize();
    }
}

/// Camera pose supplied by the host once per frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    /// Camera world position.
    pub position: Vec3,
    /// Camera world orientation.
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -10.0),
            rotation: Quat::IDENTITY,
        }
    }
}

/// Orientation whose local +Z points from `eye` to `target`, keeping world +Y as up where possible.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let Some(forward) = (target - eye).try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = Vec3::Y
        .cross(forward)
        .try_normalize()
        .unwrap_or_else(|| forward.any_orthonormal_vector());
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Orientation for a quad at `position` whose visible face looks at `camera`,
/// twisted by `twist_degrees` around the view axis.
pub fn billboard_rotation(position: Vec3, camera: Vec3, twist_degrees: f32) -> Quat {
    // The quad's front faces -Z, so turn the look-at result half way around Y.
    let facing = look_rotation(position, camera) * Quat::from_rotation_y(std::f32::consts::PI);
    (facing * Quat::from_rotation_z(twist_degrees.to_radians())).normalize()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
