use super::*;
use crate::foundation::core::Transform;
use crate::scene::memory::{MemoryScene, ParticleTemplate};
use crate::scene::Material;

fn scene_with_particle() -> (MemoryScene, ParticleId) {
    let mut scene = MemoryScene::new(ParticleTemplate {
        scale: Vec3::splat(2.0),
        material: Some(Material {
            color: Rgba::rgb(1.0, 0.5, 0.0),
            ..Material::default()
        }),
    });
    let p = scene.spawn_particle(Vec3::ZERO).unwrap();
    (scene, p)
}

fn steady_params(start_delay: f32) -> DecayParams {
    DecayParams {
        fade_duration: 1.0,
        scale_duration: 0.8,
        rotation_speed: 180.0,
        start_delay,
    }
}

fn alpha(scene: &MemoryScene, p: ParticleId) -> f32 {
    scene.particle(p).unwrap().material.unwrap().color.a
}

#[test]
fn delay_freezes_then_unit_self_destructs() {
    let (mut scene, p) = scene_with_particle();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.1)).unwrap();
    assert_eq!(unit.phase(), DecayPhase::Delayed);
    let before = scene.particle(p).unwrap().clone();

    assert_eq!(unit.update(&mut scene, 0.1), DecayPhase::Delayed);
    assert_eq!(scene.particle(p).unwrap(), &before);
    assert_eq!(unit.elapsed(), 0.0);

    for _ in 0..3 {
        assert_eq!(unit.update(&mut scene, 0.25), DecayPhase::Decaying);
    }
    assert_eq!(unit.update(&mut scene, 0.25), DecayPhase::Destroyed);
    assert!(scene.is_particle_pending_destroy(p));
    scene.end_frame();
    assert!(scene.particle(p).is_none());
}

#[test]
fn alpha_fades_linearly_and_keeps_rgb() {
    let (mut scene, p) = scene_with_particle();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.0)).unwrap();
    unit.update(&mut scene, 0.25);
    assert!((alpha(&scene, p) - 0.75).abs() < 1e-6);
    unit.update(&mut scene, 0.25);
    assert!((alpha(&scene, p) - 0.5).abs() < 1e-6);
    let c = scene.particle(p).unwrap().material.unwrap().color;
    assert_eq!((c.r, c.g, c.b), (1.0, 0.5, 0.0));
}

#[test]
fn scale_shrinks_but_never_below_floor() {
    let (mut scene, p) = scene_with_particle();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.0)).unwrap();
    unit.update(&mut scene, 0.25);
    let s = scene.particle(p).unwrap().transform.scale;
    assert!((s.x - 2.0 * 0.6875).abs() < 1e-5);

    unit.update(&mut scene, 0.5);
    let s = scene.particle(p).unwrap().transform.scale;
    assert!((s.x - 2.0 * MIN_SCALE_FACTOR).abs() < 1e-5);

    // Past scale_duration the scale is left where it was.
    unit.update(&mut scene, 0.125);
    let s = scene.particle(p).unwrap().transform.scale;
    assert!((s.x - 2.0 * MIN_SCALE_FACTOR).abs() < 1e-5);
    assert!(alpha(&scene, p) > 0.0);
}

#[test]
fn spin_applies_only_after_delay() {
    let (mut scene, p) = scene_with_particle();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.5)).unwrap();
    unit.update(&mut scene, 0.25);
    assert_eq!(scene.particle(p).unwrap().transform.rotation, Transform::default().rotation);
    unit.update(&mut scene, 0.25);
    unit.update(&mut scene, 0.5);
    // 180 deg/s for 0.5 s turns local X onto Y.
    let x = scene.particle(p).unwrap().transform.rotation * Vec3::X;
    assert!((x - Vec3::Y).length() < 1e-5);
}

#[test]
fn vanished_particle_retires_unit() {
    let (mut scene, p) = scene_with_particle();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.0)).unwrap();
    scene.remove_particle_now(p);
    assert_eq!(unit.update(&mut scene, 0.1), DecayPhase::Destroyed);
    assert_eq!(unit.update(&mut scene, 0.1), DecayPhase::Destroyed);
    assert!(DecayUnit::attach(&scene, p, steady_params(0.0)).unwrap_err().is_stale());
}

#[test]
fn particle_without_renderer_still_shrinks() {
    let mut scene = MemoryScene::new(ParticleTemplate {
        scale: Vec3::ONE,
        material: None,
    });
    let p = scene.spawn_particle(Vec3::ZERO).unwrap();
    let mut unit = DecayUnit::attach(&scene, p, steady_params(0.0)).unwrap();
    unit.update(&mut scene, 0.4);
    assert!(scene.particle(p).unwrap().material.is_none());
    assert!((scene.particle(p).unwrap().transform.scale.x - 0.5).abs() < 1e-5);
}

#[test]
fn pool_never_double_attaches_and_drops_finished_units() {
    let (mut scene, p) = scene_with_particle();
    let q = scene.spawn_particle(Vec3::ONE).unwrap();
    let mut pool = DecayPool::new();
    assert!(pool.attach(&scene, p, steady_params(0.0)).unwrap());
    assert!(!pool.attach(&scene, p, steady_params(0.0)).unwrap());
    assert!(pool.attach(&scene, q, steady_params(0.5)).unwrap());
    assert_eq!(pool.len(), 2);
    assert!(pool.contains(p));

    assert_eq!(pool.update(&mut scene, 1.0), 1);
    assert!(!pool.contains(p));
    assert_eq!(pool.units()[0].particle(), q);

    assert_eq!(pool.update(&mut scene, 0.5), 0);
    assert_eq!(pool.update(&mut scene, 1.0), 1);
    assert!(pool.is_empty());
}
