//! One stroke's conversion, stepped once per frame.
//!
//! The timeline runs three normalized processes off one timer: particle emission,
//! stroke reveal (starting `line_delay` later), and decay hand-off for particles the
//! reveal front has passed. After the timer runs out, un-caught particles get staggered
//! decays, a short pause follows, then the stroke erases head to tail and is destroyed.

use rand::Rng;

use crate::dissolve::config::DissolveConfig;
use crate::dissolve::decay::{DecayParams, DecayPool};
use crate::foundation::core::{Transform, Vec3, billboard_rotation, clamp01};
use crate::foundation::error::{InkfadeError, InkfadeResult};
use crate::foundation::ids::{ParticleId, StrokeId};
use crate::geometry::polyline::Polyline;
use crate::scene::{BlendMode, Frame, Scene};

/// Largest particle count a single stroke may convert into.
pub const MAX_TARGET_PARTICLES: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Lifecycle of a conversion session.
pub enum SessionPhase {
    /// Emitting particles and redrawing the stroke.
    Revealing,
    /// Waiting for the last decays to register before the tail fade.
    Settling,
    /// Erasing the stroke from its head.
    TailFading,
    /// Stroke destroyed (or gone); nothing left to do.
    Disposed,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Point-in-time view of a session's counters.
pub struct SessionSnapshot {
    /// Stroke being converted.
    pub stroke: StrokeId,
    /// Current phase.
    pub phase: SessionPhase,
    /// Seconds on the main timeline.
    pub elapsed: f32,
    /// Seconds into the tail fade.
    pub tail_elapsed: f32,
    /// Particles the stroke converts into.
    pub target_particles: usize,
    /// Particles spawned so far.
    pub emitted: usize,
    /// Particles handed to decay so far.
    pub decay_triggered: usize,
    /// Points the stroke currently displays.
    pub visible_points: usize,
}

/// State of one conversion, advanced by [`ConversionSession::tick`].
#[derive(Clone, Debug)]
pub struct ConversionSession {
    stroke: StrokeId,
    line: Polyline,
    target_particles: usize,
    particles: Vec<ParticleId>,
    emit_cursor: usize,
    decay_cursor: usize,
    timer: f32,
    settle_left: f32,
    tail_timer: f32,
    visible_points: usize,
    phase: SessionPhase,
}

impl ConversionSession {
    /// Validate the stroke and set it up for conversion.
    ///
    /// All checks run before the first mutation, so an `Err` leaves the stroke untouched.
    pub fn begin<S: Scene + ?Sized>(
        scene: &mut S,
        stroke: StrokeId,
        cfg: &DissolveConfig,
    ) -> InkfadeResult<Self> {
        let line = Polyline::capture(scene.stroke_points(stroke)?)?;
        let target = (line.length() * cfg.particles_per_unit).ceil();
        if !target.is_finite() || target > MAX_TARGET_PARTICLES as f32 {
            return Err(InkfadeError::invalid_input(format!(
                "stroke of length {} needs {target} particles, limit is {MAX_TARGET_PARTICLES}",
                line.length()
            )));
        }
        let target_particles = target.max(0.0) as usize;
        let start_color = scene.stroke_start_color(stroke)?;
        let mut material = scene.stroke_material(stroke)?;

        material.draw_order = cfg.timing.stroke_draw_order;
        scene.set_stroke_material(stroke, material)?;

        let visible_points = if cfg.timing.hide_stroke_on_begin {
            0
        } else {
            2
        };
        scene.set_stroke_points(stroke, line.head(visible_points))?;

        tracing::debug!(
            stroke = stroke.0,
            points = line.len(),
            length = line.length(),
            target_particles,
            ?start_color,
            "conversion started"
        );

        Ok(Self {
            stroke,
            line,
            target_particles,
            particles: Vec::new(),
            emit_cursor: 0,
            decay_cursor: 0,
            timer: 0.0,
            settle_left: 0.0,
            tail_timer: 0.0,
            visible_points,
            phase: SessionPhase::Revealing,
        })
    }

    /// Stroke being converted.
    pub fn stroke(&self) -> StrokeId {
        self.stroke
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Captured polyline.
    pub fn line(&self) -> &Polyline {
        &self.line
    }

    /// Particles the stroke converts into: `ceil(length * particles_per_unit)`.
    pub fn target_particles(&self) -> usize {
        self.target_particles
    }

    /// Particles spawned so far.
    pub fn emitted(&self) -> usize {
        self.particles.len()
    }

    /// Particles handed to decay so far.
    pub fn decay_triggered(&self) -> usize {
        self.decay_cursor
    }

    /// Points the stroke currently displays.
    pub fn visible_points(&self) -> usize {
        self.visible_points
    }

    /// Seconds on the main timeline.
    pub fn elapsed(&self) -> f32 {
        self.timer
    }

    /// Spawned particle handles in spawn order (= order along the stroke).
    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    /// Counters as a serializable value.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stroke: self.stroke,
            phase: self.phase,
            elapsed: self.timer,
            tail_elapsed: self.tail_timer,
            target_particles: self.target_particles,
            emitted: self.particles.len(),
            decay_triggered: self.decay_cursor,
            visible_points: self.visible_points,
        }
    }

    /// Advance one frame.
    pub fn tick<S, R>(
        &mut self,
        scene: &mut S,
        frame: &Frame,
        cfg: &DissolveConfig,
        rng: &mut R,
        pool: &mut DecayPool,
    ) -> SessionPhase
    where
        S: Scene + ?Sized,
        R: Rng + ?Sized,
    {
        let dt = frame.step();
        match self.phase {
            SessionPhase::Revealing => {
                let t = &cfg.timing;
                if self.timer >= t.total_duration + t.line_delay {
                    self.drain(scene, cfg, rng, pool);
                    self.settle_left = t.settle_pause;
                    self.phase = SessionPhase::Settling;
                    tracing::debug!(stroke = self.stroke.0, "timeline finished, settling");
                } else {
                    self.timer += dt;
                    self.emit(scene, frame, cfg, rng);
                    self.reveal(scene, cfg, rng, pool);
                }
            }
            SessionPhase::Settling => {
                self.settle_left -= dt;
                if self.settle_left <= 0.0 {
                    self.phase = SessionPhase::TailFading;
                    tracing::debug!(stroke = self.stroke.0, "tail fade started");
                    self.tail_step(scene, cfg, dt);
                }
            }
            SessionPhase::TailFading => self.tail_step(scene, cfg, dt),
            SessionPhase::Disposed => {}
        }
        self.phase
    }

    fn emit<S, R>(&mut self, scene: &mut S, frame: &Frame, cfg: &DissolveConfig, rng: &mut R)
    where
        S: Scene + ?Sized,
        R: Rng + ?Sized,
    {
        if self.target_particles == 0 {
            return;
        }
        let progress = clamp01(self.timer / cfg.timing.total_duration);
        let due = ((self.target_particles as f32 * progress).floor() as usize)
            .min(self.target_particles);

        for i in self.emit_cursor..due {
            let t = i as f32 / self.target_particles as f32;
            let on_curve = self.line.sample(t);
            if !on_curve.is_finite() {
                tracing::debug!(index = i, "sampled position not finite, skipping");
                continue;
            }
            let id = match scene.spawn_particle(on_curve) {
                Ok(id) => id,
                Err(err) => {
                    tracing::debug!(index = i, %err, "particle spawn skipped");
                    continue;
                }
            };
            if let Err(err) = dress_particle(scene, id, on_curve, frame, cfg, rng) {
                tracing::debug!(index = i, %err, "particle placement skipped");
            }
            self.particles.push(id);
        }
        if due > self.emit_cursor {
            tracing::trace!(
                stroke = self.stroke.0,
                from = self.emit_cursor,
                to = due,
                "emitted"
            );
            self.emit_cursor = due;
        }
    }

    fn reveal<S, R>(
        &mut self,
        scene: &mut S,
        cfg: &DissolveConfig,
        rng: &mut R,
        pool: &mut DecayPool,
    ) where
        S: Scene + ?Sized,
        R: Rng + ?Sized,
    {
        let t = &cfg.timing;
        if self.timer <= t.line_delay {
            return;
        }
        let progress = clamp01((self.timer - t.line_delay) / t.total_duration);

        let caught = ((self.target_particles as f32 * progress).floor() as usize)
            .min(self.particles.len());
        for i in self.decay_cursor..caught {
            let params = decay_params(cfg, rng, 0.0);
            attach_decay(scene, pool, self.particles[i], params);
        }
        self.decay_cursor = self.decay_cursor.max(caught);

        let n = self.line.len();
        let visible = ((n as f32 * progress).ceil() as usize).clamp(2, n);
        if visible != self.visible_points {
            match scene.set_stroke_points(self.stroke, self.line.head(visible)) {
                Ok(()) => self.visible_points = visible,
                Err(err) => tracing::debug!(stroke = self.stroke.0, %err, "reveal skipped"),
            }
        }
    }

    /// Hand every particle the reveal never reached to decay, staggered in spawn order.
    fn drain<S, R>(
        &mut self,
        scene: &mut S,
        cfg: &DissolveConfig,
        rng: &mut R,
        pool: &mut DecayPool,
    ) where
        S: Scene + ?Sized,
        R: Rng + ?Sized,
    {
        let from = self.decay_cursor;
        for i in from..self.particles.len() {
            let delay = (i - from) as f32 * cfg.timing.drain_stagger;
            let params = decay_params(cfg, rng, delay);
            attach_decay(scene, pool, self.particles[i], params);
        }
        self.decay_cursor = self.particles.len();
        tracing::trace!(stroke = self.stroke.0, from, to = self.decay_cursor, "drained");
    }

    fn tail_step<S: Scene + ?Sized>(&mut self, scene: &mut S, cfg: &DissolveConfig, dt: f32) {
        let duration = cfg.timing.tail_fade_duration;
        if self.tail_timer >= duration {
            self.finish(scene);
            return;
        }
        self.tail_timer += dt;
        let progress = self.tail_timer / duration;
        let n = self.line.len();
        let remaining = ((n as f32 * (1.0 - progress)).ceil().max(2.0) as usize).min(n);
        match scene.set_stroke_points(self.stroke, self.line.tail(remaining)) {
            Ok(()) => self.visible_points = remaining,
            Err(err) if err.is_stale() => {
                tracing::debug!(stroke = self.stroke.0, "stroke vanished during tail fade");
                self.phase = SessionPhase::Disposed;
            }
            Err(err) => tracing::debug!(stroke = self.stroke.0, %err, "tail fade step skipped"),
        }
    }

    fn finish<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        let hidden = scene
            .set_stroke_points(self.stroke, &[])
            .and_then(|()| scene.destroy_stroke(self.stroke));
        match hidden {
            Ok(()) => self.visible_points = 0,
            Err(err) => tracing::debug!(stroke = self.stroke.0, %err, "stroke already gone"),
        }
        self.phase = SessionPhase::Disposed;
        tracing::debug!(stroke = self.stroke.0, "conversion disposed");
    }
}

fn decay_params<R>(cfg: &DissolveConfig, rng: &mut R, start_delay: f32) -> DecayParams
where
    R: Rng + ?Sized,
{
    let rotation_speed = match cfg.rotation_speed_range {
        Some([lo, hi]) => rng.random_range(lo..=hi),
        None => cfg.rotation_speed,
    };
    DecayParams {
        fade_duration: cfg.fade_duration,
        scale_duration: cfg.scale_duration,
        rotation_speed,
        start_delay,
    }
}

fn attach_decay<S: Scene + ?Sized>(
    scene: &mut S,
    pool: &mut DecayPool,
    particle: ParticleId,
    params: DecayParams,
) {
    if let Err(err) = pool.attach(&*scene, particle, params) {
        tracing::debug!(particle = particle.0, %err, "decay hand-off skipped");
    }
}

/// Pull a freshly spawned particle towards the camera, jitter, scale, billboard and tint it.
fn dress_particle<S, R>(
    scene: &mut S,
    id: ParticleId,
    on_curve: Vec3,
    frame: &Frame,
    cfg: &DissolveConfig,
    rng: &mut R,
) -> InkfadeResult<()>
where
    S: Scene + ?Sized,
    R: Rng + ?Sized,
{
    let t = &cfg.timing;
    let [jx, jy, jz] = t.jitter;
    let jitter = Vec3::new(
        rng.random_range(-jx..=jx),
        rng.random_range(-jy..=jy),
        rng.random_range(-jz..=jz),
    );
    let scale = rng.random_range(t.scale_range[0]..=t.scale_range[1]);
    let twist = rng.random_range(0.0..360.0f32);

    let camera = frame.camera.position;
    let to_camera = (camera - on_curve).normalize_or_zero();
    let position = on_curve + to_camera * t.camera_bias + jitter;

    let base = scene.particle_transform(id)?;
    scene.set_particle_transform(
        id,
        Transform {
            translation: position,
            rotation: billboard_rotation(position, camera, twist),
            scale: base.scale * scale,
        },
    )?;

    if let Some(mut material) = scene.particle_material(id)? {
        material.color = cfg.particle_color;
        material.blend = BlendMode::ALPHA;
        material.depth_write = false;
        material.draw_order = t.particle_draw_order;
        scene.set_particle_material(id, material)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/dissolve/session.rs"]
mod tests;
