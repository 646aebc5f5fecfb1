use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Rgba;
use crate::foundation::error::{InkfadeError, InkfadeResult};

/// Tunables of one stroke-to-particles dissolve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DissolveConfig {
    /// Particles spawned per unit of stroke length.
    pub particles_per_unit: f32,
    /// Seconds for a decaying particle to fade to zero alpha.
    pub fade_duration: f32,
    /// Seconds over which a decaying particle shrinks.
    pub scale_duration: f32,
    /// Spin rate in degrees per second when no range is set.
    pub rotation_speed: f32,
    /// Per-particle spin rate drawn uniformly from `[min, max]`, degrees per second.
    pub rotation_speed_range: Option<[f32; 2]>,
    /// Tint applied to every spawned particle.
    pub particle_color: Rgba,
    /// Phase timing and placement constants.
    pub timing: DissolveTiming,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            particles_per_unit: 10.0,
            fade_duration: 1.0,
            scale_duration: 0.8,
            rotation_speed: 180.0,
            rotation_speed_range: Some([100.0, 300.0]),
            particle_color: Rgba::rgb(1.0, 0.5, 0.0),
            timing: DissolveTiming::default(),
        }
    }
}

/// Timeline and placement constants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DissolveTiming {
    /// Seconds the emission sweep (and, delayed, the reveal sweep) takes.
    pub total_duration: f32,
    /// Seconds between the start of emission and the start of the reveal.
    pub line_delay: f32,
    /// Extra decay delay per particle the reveal never reached.
    pub drain_stagger: f32,
    /// Pause between draining and the tail fade.
    pub settle_pause: f32,
    /// Seconds the stroke takes to erase head to tail.
    pub tail_fade_duration: f32,
    /// Distance particles are pulled towards the camera off the stroke.
    pub camera_bias: f32,
    /// Half-extents of the uniform placement jitter on x, y, z.
    pub jitter: [f32; 3],
    /// Uniform scale multiplier range `[min, max)` for a spawned particle.
    pub scale_range: [f32; 2],
    /// Draw-order key given to the stroke's private material.
    pub stroke_draw_order: i32,
    /// Draw-order key given to particle materials.
    pub particle_draw_order: i32,
    /// Hide the stroke entirely at conversion start instead of collapsing it to its
    /// two-point head.
    pub hide_stroke_on_begin: bool,
}

impl Default for DissolveTiming {
    fn default() -> Self {
        Self {
            total_duration: 0.4,
            line_delay: 0.3,
            drain_stagger: 0.02,
            settle_pause: 0.2,
            tail_fade_duration: 1.0,
            camera_bias: 0.9,
            jitter: [0.3, 0.3, 0.1],
            scale_range: [0.3, 0.8],
            stroke_draw_order: 2000,
            particle_draw_order: 3100,
            hide_stroke_on_begin: false,
        }
    }
}

fn positive(name: &str, v: f32) -> InkfadeResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(InkfadeError::config(format!(
            "{name} must be finite and > 0, got {v}"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, v: f32) -> InkfadeResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(InkfadeError::config(format!(
            "{name} must be finite and >= 0, got {v}"
        )));
    }
    Ok(())
}

fn ordered_range(name: &str, [lo, hi]: [f32; 2]) -> InkfadeResult<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(InkfadeError::config(format!(
            "{name} must be an ordered finite range, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}

impl DissolveConfig {
    /// Check every field; a dissolver only ever runs on a validated config.
    pub fn validate(&self) -> InkfadeResult<()> {
        non_negative("particles_per_unit", self.particles_per_unit)?;
        positive("fade_duration", self.fade_duration)?;
        positive("scale_duration", self.scale_duration)?;
        if !self.rotation_speed.is_finite() {
            return Err(InkfadeError::config("rotation_speed must be finite"));
        }
        if let Some(range) = self.rotation_speed_range {
            ordered_range("rotation_speed_range", range)?;
        }
        if !self.particle_color.is_finite() {
            return Err(InkfadeError::config("particle_color must be finite"));
        }
        self.timing.validate()
    }

    /// Parse a JSON config; missing fields take their defaults.
    #[tracing::instrument(skip(json))]
    pub fn from_json_str(json: &str) -> InkfadeResult<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| InkfadeError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> InkfadeResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read dissolve config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Pretty JSON form.
    pub fn to_json_pretty(&self) -> InkfadeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| InkfadeError::serde(e.to_string()))
    }
}

impl DissolveTiming {
    /// Check every field.
    pub fn validate(&self) -> InkfadeResult<()> {
        positive("timing.total_duration", self.total_duration)?;
        non_negative("timing.line_delay", self.line_delay)?;
        non_negative("timing.drain_stagger", self.drain_stagger)?;
        non_negative("timing.settle_pause", self.settle_pause)?;
        positive("timing.tail_fade_duration", self.tail_fade_duration)?;
        non_negative("timing.camera_bias", self.camera_bias)?;
        for (axis, j) in ["x", "y", "z"].iter().zip(self.jitter) {
            non_negative(&format!("timing.jitter.{axis}"), j)?;
        }
        ordered_range("timing.scale_range", self.scale_range)?;
        positive("timing.scale_range min", self.scale_range[0])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dissolve/config.rs"]
mod tests;
