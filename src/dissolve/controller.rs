use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dissolve::config::DissolveConfig;
use crate::dissolve::decay::DecayPool;
use crate::dissolve::session::{ConversionSession, SessionPhase, SessionSnapshot};
use crate::foundation::error::InkfadeResult;
use crate::foundation::ids::StrokeId;
use crate::scene::{Frame, Scene};

/// Runs stroke-to-particle conversions and the decays they spawn.
///
/// The host calls [`StrokeDissolver::begin_conversion`] to start a conversion and
/// [`StrokeDissolver::tick`] once per frame. Conversions cannot be cancelled; dropping the
/// dissolver drops every timeline without touching scene objects.
#[derive(Debug)]
pub struct StrokeDissolver<R = StdRng> {
    cfg: DissolveConfig,
    rng: R,
    sessions: Vec<ConversionSession>,
    pool: DecayPool,
}

impl StrokeDissolver<StdRng> {
    /// Dissolver with a deterministic RNG seeded from `seed`.
    pub fn with_seed(cfg: DissolveConfig, seed: u64) -> InkfadeResult<Self> {
        Self::new(cfg, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StrokeDissolver<R> {
    /// Validate `cfg` and build an idle dissolver drawing randomness from `rng`.
    pub fn new(cfg: DissolveConfig, rng: R) -> InkfadeResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            rng,
            sessions: Vec::new(),
            pool: DecayPool::new(),
        })
    }

    /// Start converting `stroke`. Fire-and-forget.
    ///
    /// Strokes with fewer than two points or a non-finite coordinate, strokes that are
    /// already gone, and strokes already being converted are ignored; nothing in the
    /// scene changes in those cases.
    #[tracing::instrument(skip_all, fields(stroke = stroke.0))]
    pub fn begin_conversion<S: Scene + ?Sized>(&mut self, scene: &mut S, stroke: StrokeId) {
        if self.sessions.iter().any(|s| s.stroke() == stroke) {
            tracing::debug!("stroke already converting, ignored");
            return;
        }
        match ConversionSession::begin(scene, stroke, &self.cfg) {
            Ok(session) => self.sessions.push(session),
            Err(err) => tracing::debug!(%err, "conversion skipped"),
        }
    }

    /// Advance one frame: running decays first, then every conversion.
    ///
    /// Decays handed off during this call start updating on the next one.
    pub fn tick<S: Scene + ?Sized>(&mut self, scene: &mut S, frame: &Frame) {
        let finished = self.pool.update(scene, frame.step());
        if finished > 0 {
            tracing::trace!(finished, remaining = self.pool.len(), "decays finished");
        }

        for session in &mut self.sessions {
            session.tick(scene, frame, &self.cfg, &mut self.rng, &mut self.pool);
        }
        self.sessions.retain(|s| s.phase() != SessionPhase::Disposed);
    }

    /// Config in use.
    pub fn config(&self) -> &DissolveConfig {
        &self.cfg
    }

    /// Conversions still running, in start order.
    pub fn sessions(&self) -> &[ConversionSession] {
        &self.sessions
    }

    /// Snapshot of every running conversion.
    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.sessions.iter().map(ConversionSession::snapshot).collect()
    }

    /// Decays still running.
    pub fn decay_pool(&self) -> &DecayPool {
        &self.pool
    }

    /// `true` when no conversion and no decay is running.
    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty() && self.pool.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dissolve/controller.rs"]
mod tests;
