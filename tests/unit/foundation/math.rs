use super::*;

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn solve_maps_all_three_points() {
    let src = [
        Point::new(10.0, 20.0),
        Point::new(50.0, 20.0),
        Point::new(30.0, 60.0),
    ];
    let dst = [
        Point::new(-3.0, 7.0),
        Point::new(40.0, 90.0),
        Point::new(12.5, -4.0),
    ];
    let m = solve_affine_3pt(src, dst).unwrap();
    for (s, d) in src.iter().zip(dst.iter()) {
        assert!(close(m * *s, *d), "{:?} -> {:?}, want {:?}", s, m * *s, d);
    }
}

#[test]
fn solve_recovers_pure_translation() {
    let src = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ];
    let dst = src.map(|p| p + Vec2::new(5.0, -2.0));
    let m = solve_affine_3pt(src, dst).unwrap();
    assert_eq!(m.as_coeffs(), [1.0, 0.0, 0.0, 1.0, 5.0, -2.0]);
}

#[test]
fn solve_rejects_collinear_and_non_finite() {
    let collinear = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(2.0, 2.0),
    ];
    assert!(solve_affine_3pt(collinear, collinear).is_none());

    let nan = [
        Point::new(f64::NAN, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ];
    assert!(solve_affine_3pt(nan, nan).is_none());
}

#[test]
fn perpendicular_rotates_quarter_turn() {
    assert_eq!(perpendicular(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
    assert_eq!(perpendicular(Vec2::new(0.0, 2.0)), Vec2::new(-2.0, 0.0));
}

#[test]
fn clamp_or_min_handles_nan() {
    assert_eq!(clamp_or_min(f64::NAN, 0.1, 1.0), 0.1);
    assert_eq!(clamp_or_min(5.0, 0.1, 1.0), 1.0);
    assert_eq!(clamp_or_min(0.0, 0.1, 1.0), 0.1);
    assert_eq!(clamp_or_min(0.5, 0.1, 1.0), 0.5);
}
