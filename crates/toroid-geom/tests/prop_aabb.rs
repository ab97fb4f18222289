use proptest::prelude::*;
use toroid_geom::{Aabb, Vec3};

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (-1_000.0f32..1_000.0, -1_000.0f32..1_000.0, -1_000.0f32..1_000.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // every included point stays inside the box
    #[test]
    fn include_contains_all_points(points in prop::collection::vec(small_vec3(), 1..32)) {
        let mut bb = Aabb::EMPTY;
        for p in &points {
            bb.include(*p);
        }
        for p in &points {
            prop_assert!(bb.contains(*p));
        }
    }

    #[test]
    fn dot_is_symmetric(a in small_vec3(), b in small_vec3()) {
        prop_assert_eq!(a.dot(b), b.dot(a));
    }
}
