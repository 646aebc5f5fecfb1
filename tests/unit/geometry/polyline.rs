use super::*;

fn staircase() -> Vec<Vec3> {
    // Arc distance of any point on this path is `x + y`.
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(2.0, 3.0, 0.0),
    ]
}

#[test]
fn total_length_sums_segments() {
    assert_eq!(total_length(&staircase()), 5.0);
    assert_eq!(total_length(&[Vec3::ONE]), 0.0);
    assert_eq!(total_length(&[]), 0.0);
}

#[test]
fn endpoints_are_exact() {
    let pts = vec![
        Vec3::new(0.3, -1.7, 2.2),
        Vec3::new(4.1, 0.9, -3.3),
        Vec3::new(-2.5, 8.0, 0.1),
    ];
    assert_eq!(sample_at(&pts, 0.0), pts[0]);
    assert_eq!(sample_at(&pts, 1.0), pts[2]);
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}

#[test]
fn interpolates_by_arc_length() {
    let pts = staircase();
    assert!(approx(sample_at(&pts, 0.1), Vec3::new(0.5, 0.0, 0.0)));
    assert!(approx(sample_at(&pts, 0.3), Vec3::new(1.0, 0.5, 0.0)));
    assert!(approx(sample_at(&pts, 0.8), Vec3::new(2.0, 2.0, 0.0)));
}

#[test]
fn progression_is_monotonic() {
    let pts = staircase();
    let mut prev = -1.0f32;
    for i in 0..=200 {
        let p = sample_at(&pts, i as f32 / 200.0);
        let dist = p.x + p.y;
        assert!(dist + 1e-5 >= prev, "t={} went backwards", i as f32 / 200.0);
        prev = dist;
    }
}

#[test]
fn zero_length_segments_do_not_produce_nan() {
    let a = Vec3::new(1.0, 1.0, 1.0);
    let b = Vec3::new(3.0, 1.0, 1.0);
    let pts = vec![a, a, a, b, b];
    for i in 0..=20 {
        let p = sample_at(&pts, i as f32 / 20.0);
        assert!(p.is_finite());
    }
    assert!(approx(sample_at(&pts, 0.5), Vec3::new(2.0, 1.0, 1.0)));

    let all_same = vec![a, a];
    assert_eq!(sample_at(&all_same, 0.5), a);
}

#[test]
fn tiny_segments_are_still_interpolated() {
    let pts = vec![Vec3::ZERO, Vec3::new(1e-8, 0.0, 0.0)];
    let mid = sample_at(&pts, 0.5);
    assert!((mid.x - 5e-9).abs() < 1e-12, "{mid:?}");
    assert_eq!(mid.y, 0.0);

    let quarter = sample_at(&pts, 0.25);
    assert!(quarter.x > 0.0 && quarter.x < mid.x);
}

#[test]
fn out_of_range_t_is_clamped() {
    let pts = staircase();
    assert_eq!(sample_at(&pts, -3.0), pts[0]);
    assert_eq!(sample_at(&pts, 7.0), pts[4]);
}

#[test]
fn sampling_is_bit_identical_across_calls() {
    let pts = vec![
        Vec3::new(0.123, 4.56, -7.89),
        Vec3::new(1.0e-3, 2.5, 3.75),
        Vec3::new(-9.5, 0.25, 6.125),
    ];
    for i in 0..50 {
        let t = i as f32 / 49.0;
        let a = sample_at(&pts, t);
        let b = sample_at(&pts, t);
        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
    }
}

#[test]
fn capture_rejects_short_and_non_finite_input() {
    assert!(matches!(
        Polyline::capture(vec![Vec3::ZERO]),
        Err(InkfadeError::InvalidInput(_))
    ));
    assert!(matches!(
        Polyline::capture(Vec::<Vec3>::new()),
        Err(InkfadeError::InvalidInput(_))
    ));
    let err = Polyline::capture(vec![Vec3::ZERO, Vec3::new(1.0, f32::NAN, 0.0)]).unwrap_err();
    assert!(err.to_string().contains("point 1"));
}

#[test]
fn capture_rejects_overflowing_length() {
    let err = Polyline::capture(vec![
        Vec3::new(-3e38, 0.0, 0.0),
        Vec3::new(3e38, 0.0, 0.0),
    ])
    .unwrap_err();
    assert!(matches!(err, InkfadeError::InvalidInput(_)));
    assert!(err.to_string().contains("length"));
}

#[test]
fn capture_caches_length_and_slices() {
    let line = Polyline::capture(staircase()).unwrap();
    assert_eq!(line.len(), 5);
    assert!(!line.is_empty());
    assert_eq!(line.length(), 5.0);
    assert_eq!(line.head(2), &staircase()[..2]);
    assert_eq!(line.head(99).len(), 5);
    assert_eq!(line.tail(2), &staircase()[3..]);
    assert_eq!(line.sample(1.0), Vec3::new(2.0, 3.0, 0.0));
}
