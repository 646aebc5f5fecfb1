//! In-memory [`Scene`] host with generational handles and end-of-frame destruction.

use std::collections::HashSet;

use crate::foundation::core::{Rgba, Transform, Vec3};
use crate::foundation::error::{InkfadeError, InkfadeResult};
use crate::foundation::ids::{ParticleId, SlotKey, StrokeId};
use crate::scene::{Material, Scene};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Template every spawned particle is instantiated from.
pub struct ParticleTemplate {
    /// Local scale of a fresh instance.
    pub scale: Vec3,
    /// Renderer material, `None` for a template without a renderer.
    pub material: Option<Material>,
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        Self {
            scale: Vec3::splat(0.1),
            material: Some(Material::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Stroke object as stored by the scene.
pub struct StrokeRecord {
    /// Displayed points; the visible point count is `points.len()`.
    pub points: Vec<Vec3>,
    /// Start color of the stroke.
    pub start_color: Rgba,
    /// Stroke material.
    pub material: Material,
}

#[derive(Clone, Debug, PartialEq)]
/// Particle entity as stored by the scene.
pub struct ParticleRecord {
    /// Transform.
    pub transform: Transform,
    /// Own material copy, if the template has a renderer.
    pub material: Option<Material>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Lifetime counters.
pub struct SceneStats {
    /// Particles instantiated so far.
    pub particles_spawned: u64,
    /// Particles actually removed at frame end.
    pub particles_destroyed: u64,
    /// Strokes actually removed at frame end.
    pub strokes_destroyed: u64,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
struct Slots<T> {
    entries: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> SlotKey {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.entries[index as usize];
            slot.value = Some(value);
            return SlotKey {
                index,
                generation: slot.generation,
            };
        }
        let index = self.entries.len() as u32;
        self.entries.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotKey {
            index,
            generation: 0,
        }
    }

    fn get(&self, key: SlotKey) -> Option<&T> {
        self.entries
            .get(key.index as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_ref())
    }

    fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.entries
            .get_mut(key.index as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_mut())
    }

    fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.entries.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        Some(value)
    }

    fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|_| SlotKey {
                index: i as u32,
                generation: s.generation,
            })
        })
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|s| s.value.is_some()).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PendingDestroy {
    Stroke(SlotKey),
    Particle(SlotKey),
}

/// Scene host that keeps every object in memory.
///
/// Destruction requested through [`Scene`] is deferred to [`MemoryScene::end_frame`], the
/// way engine hosts flush destroyed objects after the frame's updates. Handles stay
/// readable until then. [`MemoryScene::remove_particle_now`] and
/// [`MemoryScene::remove_stroke_now`] simulate third-party code tearing objects down
/// immediately.
#[derive(Debug, Default)]
pub struct MemoryScene {
    template: ParticleTemplate,
    strokes: Slots<StrokeRecord>,
    particles: Slots<ParticleRecord>,
    pending: Vec<PendingDestroy>,
    pending_set: HashSet<PendingDestroy>,
    stats: SceneStats,
}

impl MemoryScene {
    /// Empty scene instantiating particles from `template`.
    pub fn new(template: ParticleTemplate) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    /// Add a stroke displaying all of `points` with a default material.
    pub fn add_stroke(&mut self, points: Vec<Vec3>, start_color: Rgba) -> StrokeId {
        self.add_stroke_with_material(points, start_color, Material::default())
    }

    /// Add a stroke with an explicit material.
    pub fn add_stroke_with_material(
        &mut self,
        points: Vec<Vec3>,
        start_color: Rgba,
        material: Material,
    ) -> StrokeId {
        let key = self.strokes.insert(StrokeRecord {
            points,
            start_color,
            material,
        });
        StrokeId(key.pack())
    }

    /// Stroke record, if the handle is live.
    pub fn stroke(&self, stroke: StrokeId) -> Option<&StrokeRecord> {
        self.strokes.get(SlotKey::unpack(stroke.0))
    }

    /// Particle record, if the handle is live.
    pub fn particle(&self, particle: ParticleId) -> Option<&ParticleRecord> {
        self.particles.get(SlotKey::unpack(particle.0))
    }

    /// Handles of every live particle, in slot order.
    pub fn particle_ids(&self) -> Vec<ParticleId> {
        self.particles
            .keys()
            .map(|k| ParticleId(k.pack()))
            .collect()
    }

    /// Number of live particles (including ones pending destruction).
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of live strokes (including ones pending destruction).
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// `true` when the particle's destruction was requested but not flushed yet.
    pub fn is_particle_pending_destroy(&self, particle: ParticleId) -> bool {
        let key = SlotKey::unpack(particle.0);
        self.pending_set.contains(&PendingDestroy::Particle(key))
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Remove every object whose destruction was requested during this frame.
    pub fn end_frame(&mut self) {
        self.pending_set.clear();
        for pending in std::mem::take(&mut self.pending) {
            match pending {
                PendingDestroy::Stroke(key) => {
                    if self.strokes.remove(key).is_some() {
                        self.stats.strokes_destroyed += 1;
                    }
                }
                PendingDestroy::Particle(key) => {
                    if self.particles.remove(key).is_some() {
                        self.stats.particles_destroyed += 1;
                    }
                }
            }
        }
    }

    /// Remove a particle immediately, bypassing the frame-end flush.
    pub fn remove_particle_now(&mut self, particle: ParticleId) -> bool {
        let removed = self.particles.remove(SlotKey::unpack(particle.0)).is_some();
        if removed {
            self.stats.particles_destroyed += 1;
        }
        removed
    }

    /// Remove a stroke immediately, bypassing the frame-end flush.
    pub fn remove_stroke_now(&mut self, stroke: StrokeId) -> bool {
        let removed = self.strokes.remove(SlotKey::unpack(stroke.0)).is_some();
        if removed {
            self.stats.strokes_destroyed += 1;
        }
        removed
    }

    fn stroke_ref(&self, stroke: StrokeId) -> InkfadeResult<&StrokeRecord> {
        self.stroke(stroke)
            .ok_or_else(|| InkfadeError::stale(format!("stroke {:#x} is gone", stroke.0)))
    }

    fn stroke_mut(&mut self, stroke: StrokeId) -> InkfadeResult<&mut StrokeRecord> {
        self.strokes
            .get_mut(SlotKey::unpack(stroke.0))
            .ok_or_else(|| InkfadeError::stale(format!("stroke {:#x} is gone", stroke.0)))
    }

    fn particle_ref(&self, particle: ParticleId) -> InkfadeResult<&ParticleRecord> {
        self.particle(particle)
            .ok_or_else(|| InkfadeError::stale(format!("particle {:#x} is gone", particle.0)))
    }

    fn particle_mut(&mut self, particle: ParticleId) -> InkfadeResult<&mut ParticleRecord> {
        self.particles
            .get_mut(SlotKey::unpack(particle.0))
            .ok_or_else(|| InkfadeError::stale(format!("particle {:#x} is gone", particle.0)))
    }
}

impl Scene for MemoryScene {
    fn stroke_points(&self, stroke: StrokeId) -> InkfadeResult<Vec<Vec3>> {
        Ok(self.stroke_ref(stroke)?.points.clone())
    }

    fn set_stroke_points(&mut self, stroke: StrokeId, points: &[Vec3]) -> InkfadeResult<()> {
        let rec = self.stroke_mut(stroke)?;
        rec.points.clear();
        rec.points.extend_from_slice(points);
        Ok(())
    }

    fn stroke_start_color(&self, stroke: StrokeId) -> InkfadeResult<Rgba> {
        Ok(self.stroke_ref(stroke)?.start_color)
    }

    fn stroke_material(&self, stroke: StrokeId) -> InkfadeResult<Material> {
        Ok(self.stroke_ref(stroke)?.material)
    }

    fn set_stroke_material(&mut self, stroke: StrokeId, material: Material) -> InkfadeResult<()> {
        self.stroke_mut(stroke)?.material = material;
        Ok(())
    }

    fn destroy_stroke(&mut self, stroke: StrokeId) -> InkfadeResult<()> {
        let key = SlotKey::unpack(stroke.0);
        self.stroke_ref(stroke)?;
        let pending = PendingDestroy::Stroke(key);
        if self.pending_set.insert(pending) {
            self.pending.push(pending);
        }
        Ok(())
    }

    fn spawn_particle(&mut self, position: Vec3) -> InkfadeResult<ParticleId> {
        let key = self.particles.insert(ParticleRecord {
            transform: Transform {
                translation: position,
                scale: self.template.scale,
                ..Transform::default()
            },
            material: self.template.material,
        });
        self.stats.particles_spawned += 1;
        Ok(ParticleId(key.pack()))
    }

    fn particle_transform(&self, particle: ParticleId) -> InkfadeResult<Transform> {
        Ok(self.particle_ref(particle)?.transform)
    }

    fn set_particle_transform(
        &mut self,
        particle: ParticleId,
        transform: Transform,
    ) -> InkfadeResult<()> {
        self.particle_mut(particle)?.transform = transform;
        Ok(())
    }

    fn particle_material(&self, particle: ParticleId) -> InkfadeResult<Option<Material>> {
        Ok(self.particle_ref(particle)?.material)
    }

    fn set_particle_material(
        &mut self,
        particle: ParticleId,
        material: Material,
    ) -> InkfadeResult<()> {
        self.particle_mut(particle)?.material = Some(material);
        Ok(())
    }

    fn destroy_particle(&mut self, particle: ParticleId) -> InkfadeResult<()> {
        let key = SlotKey::unpack(particle.0);
        self.particle_ref(particle)?;
        let pending = PendingDestroy::Particle(key);
        if self.pending_set.insert(pending) {
            self.pending.push(pending);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/memory.rs"]
mod tests;
