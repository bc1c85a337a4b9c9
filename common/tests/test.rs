use common::collision_detection::*;
use common::shapes::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_new_and_getters() {
    let rect = Rectangle::new(0.0, 0.0, 4.0, 6.0);
    assert_eq!(rect.width(), 4.0);
    assert_eq!(rect.height(), 6.0);
    assert_eq!(rect.center_x(), 2.0);
    assert_eq!(rect.center_y(), 3.0);
    assert!(rect.is_finite());
    assert!(!Rectangle::new(0.0, f32::NEG_INFINITY, 4.0, 6.0).is_finite());
    // Finite edges, overflowing extent.
    let huge = Rectangle::new(-3e38, -3e38, 3e38, 3e38);
    assert!(huge.is_finite());
    assert!(huge.width().is_infinite());
}

#[test]
fn test_from_center() {
    let rect = Rectangle::from_center(2.0, 3.0, 4.0, 6.0);
    assert_eq!(rect, Rectangle::new(0.0, 0.0, 4.0, 6.0));
}

#[test]
fn test_contains_point() {
    let rect = Rectangle::new(0.0, 0.0, 4.0, 6.0);
    assert!(rect.contains_point(2.0, 3.0));
    assert!(rect.contains_point(4.0, 6.0));
    assert!(!rect.contains_point(6.0, 3.0));
    assert!(!rect.contains_point(2.0, 8.0));
}

#[test]
fn test_contains_rectangle() {
    let outer = Rectangle::new(0.0, 0.0, 10.0, 10.0);
    assert!(outer.contains_rectangle(&Rectangle::new(1.0, 1.0, 9.0, 9.0)));
    assert!(outer.contains_rectangle(&outer));
    assert!(!outer.contains_rectangle(&Rectangle::new(5.0, 5.0, 11.0, 9.0)));
}

#[test]
fn test_expand_to_include() {
    let mut rect = Rectangle::new(0.0, 0.0, 4.0, 6.0);
    rect.expand_to_include(&Rectangle::new(4.0, 4.0, 8.0, 6.0));
    assert_eq!(rect, Rectangle::new(0.0, 0.0, 8.0, 6.0));
}

#[test]
fn test_circle_bounding_box() {
    let circle = Circle::new(5.0, 5.0, 2.0);
    assert_eq!(circle.bounding_box(), Rectangle::new(3.0, 3.0, 7.0, 7.0));
    let shape = ShapeEnum::Circle(circle);
    assert_eq!(shape.bounding_box(), circle.bounding_box());
}

#[test]
fn test_random_rectangle_inside() {
    let bounds = Rectangle::new(-50.0, -50.0, 50.0, 50.0);
    let mut rng = StdRng::seed_from_u64(123);
    for _ in 0..100 {
        let rect = bounds.random_rectangle_inside(7.5, 3.0, &mut rng);
        assert!(bounds.contains_rectangle(&rect));
        assert!((rect.width() - 7.5).abs() < 1e-4);
    }
}

#[test]
fn test_random_rectangle_inside_oversized() {
    let bounds = Rectangle::new(0.0, 0.0, 2.0, 2.0);
    let mut rng = StdRng::seed_from_u64(123);
    let rect = bounds.random_rectangle_inside(4.0, 4.0, &mut rng);
    // Pinned to the top-left corner.
    assert_eq!(rect.left, 0.0);
    assert_eq!(rect.top, 0.0);
}

#[test]
fn test_random_circle_inside() {
    let bounds = Rectangle::new(0.0, 0.0, 20.0, 20.0);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let circle = bounds.random_circle_inside(2.0, &mut rng);
        assert!(bounds.contains_rectangle(&circle.bounding_box()));
    }
}

#[test]
fn test_rectangle_rectangle() {
    let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
    assert!(rectangle_rectangle(&a, &Rectangle::new(5.0, 5.0, 15.0, 15.0)));
    assert!(rectangle_rectangle(&a, &Rectangle::new(10.0, 0.0, 20.0, 10.0)));
    assert!(!rectangle_rectangle(&a, &Rectangle::new(11.0, 0.0, 20.0, 10.0)));
}

#[test]
fn test_circle_shapes() {
    let circle = Circle::new(0.0, 0.0, 1.0);
    assert!(circle_circle(&circle, &Circle::new(1.5, 0.0, 1.0)));
    assert!(!circle_circle(&circle, &Circle::new(3.0, 0.0, 1.0)));
    assert!(circle_rectangle(&circle, &Rectangle::new(0.5, -1.0, 3.0, 1.0)));
    // Corner is sqrt(2) away.
    assert!(!circle_rectangle(&circle, &Rectangle::new(1.0, 1.0, 3.0, 3.0)));
    assert!(shape_shape(
        &ShapeEnum::Rectangle(Rectangle::new(0.5, -1.0, 3.0, 1.0)),
        &ShapeEnum::Circle(circle)
    ));
}
