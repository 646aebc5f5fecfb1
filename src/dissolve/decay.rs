//! Per-particle fade, shrink and spin, ending in the particle's destruction.
//!
//! A [`DecayUnit`] only ever touches its own particle. Once attached it is driven by
//! [`DecayPool::update`] once per frame and never reads controller state.

use std::collections::HashSet;

use crate::foundation::core::{Rgba, Vec3, clamp01};
use crate::foundation::error::InkfadeResult;
use crate::foundation::ids::ParticleId;
use crate::scene::Scene;

/// Smallest fraction of the baseline scale a decaying particle shrinks to.
pub const MIN_SCALE_FACTOR: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Timing of one particle's decay.
pub struct DecayParams {
    /// Seconds from decay start until alpha reaches zero and the particle is destroyed.
    pub fade_duration: f32,
    /// Seconds over which the scale shrinks towards [`MIN_SCALE_FACTOR`].
    pub scale_duration: f32,
    /// Spin around the local view axis, degrees per second.
    pub rotation_speed: f32,
    /// Seconds to wait, frozen, before decaying.
    pub start_delay: f32,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            fade_duration: 1.0,
            scale_duration: 0.8,
            rotation_speed: 180.0,
            start_delay: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Where a unit is in its lifecycle.
pub enum DecayPhase {
    /// Waiting out `start_delay`; nothing changes.
    Delayed,
    /// Fading, shrinking and spinning.
    Decaying,
    /// Particle destroyed (or found gone); the unit is finished.
    Destroyed,
}

/// Decay state of one particle.
#[derive(Clone, Debug)]
pub struct DecayUnit {
    particle: ParticleId,
    params: DecayParams,
    delay_left: f32,
    timer: f32,
    initial_scale: Vec3,
    initial_color: Option<Rgba>,
    phase: DecayPhase,
}

impl DecayUnit {
    /// Capture the particle's current scale and color as baselines.
    ///
    /// Fails with `StaleReference` when the particle is already gone.
    pub fn attach<S: Scene + ?Sized>(
        scene: &S,
        particle: ParticleId,
        params: DecayParams,
    ) -> InkfadeResult<Self> {
        let transform = scene.particle_transform(particle)?;
        let material = scene.particle_material(particle)?;
        let delay_left = params.start_delay.max(0.0);
        Ok(Self {
            particle,
            params,
            delay_left,
            timer: 0.0,
            initial_scale: transform.scale,
            initial_color: material.map(|m| m.color),
            phase: if delay_left > 0.0 {
                DecayPhase::Delayed
            } else {
                DecayPhase::Decaying
            },
        })
    }

    /// Particle this unit drives.
    pub fn particle(&self) -> ParticleId {
        self.particle
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> DecayPhase {
        self.phase
    }

    /// Seconds spent decaying (excludes the delay).
    pub fn elapsed(&self) -> f32 {
        self.timer
    }

    /// Parameters the unit was attached with.
    pub fn params(&self) -> DecayParams {
        self.params
    }

    /// Advance by `dt` seconds.
    pub fn update<S: Scene + ?Sized>(&mut self, scene: &mut S, dt: f32) -> DecayPhase {
        if self.phase == DecayPhase::Destroyed {
            return self.phase;
        }
        if self.delay_left > 0.0 {
            self.delay_left -= dt;
            return self.phase;
        }
        self.phase = DecayPhase::Decaying;
        self.timer += dt;

        if let Err(err) = self.apply(scene, dt) {
            if err.is_stale() {
                tracing::debug!(particle = self.particle.0, "decaying particle vanished");
                self.phase = DecayPhase::Destroyed;
                return self.phase;
            }
            tracing::debug!(particle = self.particle.0, %err, "decay step skipped");
        }

        if self.timer >= self.params.fade_duration {
            if let Err(err) = scene.destroy_particle(self.particle) {
                tracing::debug!(particle = self.particle.0, %err, "destroy skipped");
            }
            self.phase = DecayPhase::Destroyed;
        }
        self.phase
    }

    fn apply<S: Scene + ?Sized>(&self, scene: &mut S, dt: f32) -> InkfadeResult<()> {
        if let Some(base) = self.initial_color {
            if let Some(mut material) = scene.particle_material(self.particle)? {
                let alpha = clamp01(1.0 - self.timer / self.params.fade_duration);
                material.color = base.with_alpha(alpha);
                scene.set_particle_material(self.particle, material)?;
            }
        }

        let mut transform = scene.particle_transform(self.particle)?;
        if self.timer < self.params.scale_duration {
            let factor = (1.0 - self.timer / self.params.scale_duration).max(MIN_SCALE_FACTOR);
            transform.scale = self.initial_scale * factor;
        }
        transform.spin_local_z(self.params.rotation_speed * dt);
        scene.set_particle_transform(self.particle, transform)
    }
}

/// Active decay units, updated together once per frame.
#[derive(Debug, Default)]
pub struct DecayPool {
    units: Vec<DecayUnit>,
    tracked: HashSet<ParticleId>,
}

impl DecayPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decaying `particle`. Returns `Ok(false)` if it already has a unit.
    pub fn attach<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        particle: ParticleId,
        params: DecayParams,
    ) -> InkfadeResult<bool> {
        if self.tracked.contains(&particle) {
            return Ok(false);
        }
        let unit = DecayUnit::attach(scene, particle, params)?;
        self.tracked.insert(particle);
        self.units.push(unit);
        Ok(true)
    }

    /// Advance every unit by `dt`, dropping finished ones. Returns how many finished.
    pub fn update<S: Scene + ?Sized>(&mut self, scene: &mut S, dt: f32) -> usize {
        let before = self.units.len();
        for unit in &mut self.units {
            unit.update(scene, dt);
        }
        let tracked = &mut self.tracked;
        self.units.retain(|u| {
            let alive = u.phase() != DecayPhase::Destroyed;
            if !alive {
                tracked.remove(&u.particle());
            }
            alive
        });
        before - self.units.len()
    }

    /// Units still running.
    pub fn units(&self) -> &[DecayUnit] {
        &self.units
    }

    /// Number of running units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// `true` when no unit is running.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// `true` if `particle` has a running unit.
    pub fn contains(&self, particle: ParticleId) -> bool {
        self.tracked.contains(&particle)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dissolve/decay.rs"]
mod tests;
