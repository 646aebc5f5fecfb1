use super::*;

fn line() -> Vec<Vec3> {
    vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)]
}

#[test]
fn stroke_points_roundtrip_and_truncate() {
    let mut scene = MemoryScene::default();
    let id = scene.add_stroke(line(), Rgba::rgb(0.0, 0.0, 1.0));
    assert_eq!(scene.stroke_points(id).unwrap(), line());
    assert_eq!(scene.stroke_start_color(id).unwrap(), Rgba::rgb(0.0, 0.0, 1.0));

    scene.set_stroke_points(id, &line()[..2]).unwrap();
    assert_eq!(scene.stroke(id).unwrap().points.len(), 2);
    scene.set_stroke_points(id, &[]).unwrap();
    assert!(scene.stroke(id).unwrap().points.is_empty());
}

#[test]
fn spawned_particles_copy_the_template() {
    let template = ParticleTemplate {
        scale: Vec3::splat(2.0),
        material: Some(Material {
            draw_order: 7,
            ..Material::default()
        }),
    };
    let mut scene = MemoryScene::new(template);
    let a = scene.spawn_particle(Vec3::new(1.0, 2.0, 3.0)).unwrap();
    let b = scene.spawn_particle(Vec3::ZERO).unwrap();
    assert_ne!(a, b);

    let t = scene.particle_transform(a).unwrap();
    assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(t.scale, Vec3::splat(2.0));

    let mut tinted = scene.particle_material(a).unwrap().unwrap();
    tinted.color = Rgba::rgb(1.0, 0.0, 0.0);
    scene.set_particle_material(a, tinted).unwrap();
    assert_eq!(
        scene.particle_material(b).unwrap().unwrap().color,
        Rgba::WHITE
    );
    assert_eq!(scene.stats().particles_spawned, 2);
}

#[test]
fn destruction_is_deferred_until_end_frame() {
    let mut scene = MemoryScene::default();
    let p = scene.spawn_particle(Vec3::ZERO).unwrap();
    scene.destroy_particle(p).unwrap();
    scene.destroy_particle(p).unwrap();
    assert!(scene.is_particle_pending_destroy(p));
    assert!(scene.particle_transform(p).is_ok());

    scene.end_frame();
    assert_eq!(scene.particle_count(), 0);
    assert_eq!(scene.stats().particles_destroyed, 1);
    assert!(scene.particle_transform(p).unwrap_err().is_stale());
    assert!(scene.destroy_particle(p).unwrap_err().is_stale());
}

#[test]
fn reused_slots_do_not_revive_old_handles() {
    let mut scene = MemoryScene::default();
    let old = scene.spawn_particle(Vec3::ZERO).unwrap();
    assert!(scene.remove_particle_now(old));
    let new = scene.spawn_particle(Vec3::ONE).unwrap();
    assert_ne!(old, new);
    assert!(scene.particle(old).is_none());
    assert_eq!(scene.particle(new).unwrap().transform.translation, Vec3::ONE);
    assert_eq!(scene.particle_ids(), vec![new]);
}

#[test]
fn strokes_report_stale_after_removal() {
    let mut scene = MemoryScene::default();
    let id = scene.add_stroke(line(), Rgba::WHITE);
    let mut mat = scene.stroke_material(id).unwrap();
    mat.draw_order = 2000;
    scene.set_stroke_material(id, mat).unwrap();

    scene.destroy_stroke(id).unwrap();
    assert_eq!(scene.stroke_count(), 1);
    scene.end_frame();
    assert_eq!(scene.stroke_count(), 0);
    assert_eq!(scene.stats().strokes_destroyed, 1);
    assert!(scene.stroke_points(id).unwrap_err().is_stale());

    let other = scene.add_stroke(line(), Rgba::WHITE);
    assert!(scene.remove_stroke_now(other));
    assert!(!scene.remove_stroke_now(other));
    assert!(scene.set_stroke_points(other, &line()).unwrap_err().is_stale());
}

#[test]
fn mass_destruction_flushes_each_particle_once() {
    let mut scene = MemoryScene::default();
    let ids: Vec<_> = (0..5_000)
        .map(|i| scene.spawn_particle(Vec3::splat(i as f32)).unwrap())
        .collect();
    for _ in 0..2 {
        for &id in &ids {
            scene.destroy_particle(id).unwrap();
        }
    }
    assert!(ids.iter().all(|&id| scene.is_particle_pending_destroy(id)));

    scene.end_frame();
    assert_eq!(scene.particle_count(), 0);
    assert_eq!(scene.stats().particles_destroyed, 5_000);
    assert!(!scene.is_particle_pending_destroy(ids[0]));

    let fresh = scene.spawn_particle(Vec3::ZERO).unwrap();
    assert!(!scene.is_particle_pending_destroy(fresh));
}
