use toroid_geom::{Aabb, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_arithmetic() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    assert!(vec3_approx_eq(a + b, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq((a + b) - a, b, 1e-6));
    assert!(vec3_approx_eq(a * 2.0, Vec3::new(2.0, 4.0, 6.0), 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));
}

#[test]
fn cross_of_axes_follows_right_hand_rule() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);
    assert!(vec3_approx_eq(x.cross(y), Vec3::new(0.0, 0.0, 1.0), 1e-6));
}

#[test]
fn normalization_rejects_zero_vector() {
    assert!(Vec3::ZERO.try_normalized().is_none());
    let n = Vec3::new(3.0, 4.0, 0.0).try_normalized().unwrap();
    assert!(approx_eq(n.length(), 1.0, 1e-6));
}

#[test]
fn aabb_include_grows_from_empty() {
    let mut bb = Aabb::EMPTY;
    assert!(bb.is_empty());
    bb.include(Vec3::new(1.0, 2.0, 3.0));
    bb.include(Vec3::new(-1.0, 5.0, 0.0));
    assert!(!bb.is_empty());
    assert_eq!(bb.min, Vec3::new(-1.0, 2.0, 0.0));
    assert_eq!(bb.max, Vec3::new(1.0, 5.0, 3.0));
    assert!(bb.contains(Vec3::new(0.0, 3.0, 1.0)));
    assert!(!bb.contains(Vec3::new(0.0, 6.0, 1.0)));
}
