use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!((c.width, c.height), (4, 3));
}

#[test]
fn rgb8_deserializes_from_array() {
    let c: Rgb8 = serde_json::from_str("[10, 20, 30]").unwrap();
    assert_eq!(c, Rgb8::new(10, 20, 30));
    assert_eq!(serde_json::to_string(&c).unwrap(), "[10,20,30]");
}

#[test]
fn finiteness_requires_both_coordinates() {
    assert!(is_finite_point(Point::new(1.0, 2.0)));
    assert!(!is_finite_point(Point::new(f64::NAN, 2.0)));
    assert!(!is_finite_point(Point::new(1.0, f64::INFINITY)));
    assert!(!is_finite_point(MISSING_POINT));
}
