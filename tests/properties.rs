//! Property-based tests for the solid invariants using the `proptest` crate.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use proptest::prelude::*;

use geosolid::config::Properties;
use geosolid::csg::{combine, BooleanOp, Composite, PointClassification};
use geosolid::math::{Point3, Vector3};
use geosolid::shapes::{BoxShape, ConeFrustum, Cylinder, Ellipsoid, Sphere, Torus, Tube};
use geosolid::{FaceIdentifier, Placement, Shape, Solid};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_point() -> impl Strategy<Value = Point3> {
    (-50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn arb_dim() -> impl Strategy<Value = f64> {
    0.5f64..20.0
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -std::f64::consts::PI..std::f64::consts::PI
}

fn arb_direction() -> impl Strategy<Value = Vector3> {
    (arb_angle(), 0.0f64..std::f64::consts::PI).prop_map(|(phi, theta)| {
        Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
    })
}

fn arb_placement() -> impl Strategy<Value = Placement> {
    (
        (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0),
        arb_angle(),
        arb_angle(),
        arb_angle(),
    )
        .prop_map(|((x, y, z), phi, theta, delta)| {
            Placement::from_euler_zyz(Vector3::new(x, y, z), phi, theta, delta)
        })
}

/// A solid primitive whose origin lies in its material.
fn arb_primitive() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (arb_dim(), arb_dim(), arb_dim()).prop_map(|(x, y, z)| Shape::from(BoxShape::new(x, y, z).unwrap())),
        (arb_dim(), arb_dim()).prop_map(|(r, z)| Shape::from(Cylinder::new(r, z).unwrap())),
        (arb_dim(), arb_dim()).prop_map(|(r, z)| Shape::from(Tube::new(0.0, r, z).unwrap())),
        arb_dim().prop_map(|r| Shape::from(Sphere::new(r).unwrap())),
        (arb_dim(), 0.0f64..20.0, arb_dim())
            .prop_map(|(rb, rt, z)| Shape::from(ConeFrustum::new(rb, rt, z).unwrap())),
        (arb_dim(), arb_dim(), arb_dim()).prop_map(|(a, b, c)| Shape::from(Ellipsoid::new(a, b, c).unwrap())),
    ]
}

fn arb_torus() -> impl Strategy<Value = Shape> {
    (5.0f64..20.0, 0.5f64..4.5, 0.0f64..0.8)
        .prop_map(|(sweep, tube, hollow)| Shape::from(Torus::new(sweep, tube, tube * hollow).unwrap()))
}

/// Primitives cut to angular sectors, some hollowed.
fn arb_sector() -> impl Strategy<Value = Shape> {
    let start = 0.0f64..std::f64::consts::PI;
    let delta = 0.3f64..std::f64::consts::PI;
    prop_oneof![
        (arb_dim(), 0.0f64..0.9, start.clone(), delta.clone(), 0.0f64..1.0, 0.5f64..2.0).prop_map(
            |(r, hollow, phi0, dphi, theta0, dtheta)| {
                let sphere = Sphere::hollow(r * hollow, r)
                    .unwrap()
                    .with_phi(phi0, dphi)
                    .unwrap()
                    .with_theta(theta0, dtheta)
                    .unwrap();
                Shape::from(sphere)
            }
        ),
        (5.0f64..20.0, 0.5f64..4.5, start.clone(), delta.clone())
            .prop_map(|(sweep, tube, phi0, dphi)| Shape::from(Torus::new(sweep, tube, 0.0).unwrap().with_phi(phi0, dphi).unwrap())),
        (arb_dim(), 0.0f64..20.0, arb_dim(), 0.0f64..0.9, start, delta).prop_map(|(rb, rt, z, hollow, a0, da)| {
            let cone = ConeFrustum::new(rb, rt, z)
                .unwrap()
                .with_inner(rb * hollow, rt * hollow)
                .unwrap()
                .with_angle(a0, da)
                .unwrap();
            Shape::from(cone)
        }),
    ]
}

/// Every primitive kind, including those whose origin is not material.
fn arb_any_primitive() -> impl Strategy<Value = Shape> {
    prop_oneof![arb_primitive(), arb_torus(), arb_sector()]
}

fn classify(shape: &dyn Solid, p: &Point3) -> PointClassification {
    PointClassification::of(shape, p, 0.0).unwrap()
}

fn size_of(shape: &Shape) -> f64 {
    shape.bounding_data().unwrap().max_dimension()
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn placement_round_trip(pl in arb_placement(), p in arb_point()) {
        let back = pl.child_to_mother(&pl.mother_to_child(&p).unwrap()).unwrap();
        let scale = p.coords.norm().max(1.0);
        prop_assert!((back - p).norm() <= 1e-9 * scale, "{p:?} -> {back:?}");
    }

    #[test]
    fn placement_text_round_trip(pl in arb_placement(), p in arb_point()) {
        let parsed: Placement = pl.to_string().parse().unwrap();
        let a = pl.child_to_mother(&p).unwrap();
        let b = parsed.child_to_mother(&p).unwrap();
        prop_assert!((a - b).norm() <= 1e-6 * p.coords.norm().max(1.0));
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn centroid_is_inside(shape in arb_primitive()) {
        prop_assert!(shape.is_inside(&Point3::origin(), 0.0).unwrap());
        prop_assert!(!shape.is_outside(&Point3::origin(), 0.0).unwrap());
    }

    #[test]
    fn torus_tube_centre_is_inside(sweep in 5.0f64..20.0, tube in 0.5f64..4.5) {
        let torus = Torus::new(sweep, tube, 0.0).unwrap();
        prop_assert!(torus.is_inside(&Point3::new(sweep, 0.0, 0.0), 0.0).unwrap());
        prop_assert!(torus.is_outside(&Point3::origin(), 0.0).unwrap());
    }

    #[test]
    fn surface_normals_have_unit_length(shape in arb_primitive(), dir in arb_direction()) {
        let hit = shape.find_intercept(&Point3::origin(), &dir, 1e-9).unwrap();
        prop_assume!(hit.is_some());
        let hit = hit.unwrap();
        let face = shape.on_surface(&hit.impact, &FaceIdentifier::any(), 0.01 * size_of(&shape)).unwrap();
        prop_assert!(!face.is_none());
        let n = shape.normal_on_surface(&hit.impact, &face).unwrap();
        prop_assert!((n.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exit_point_is_on_the_surface(shape in arb_primitive(), dir in arb_direction()) {
        let hit = shape.find_intercept(&Point3::origin(), &dir, 1e-9).unwrap().unwrap();
        prop_assert!(!shape.on_surface(&hit.impact, &FaceIdentifier::any(), 1e-6).unwrap().is_none());
        prop_assert!(!shape.is_inside(&hit.impact, 1e-6).unwrap());
        prop_assert!(!shape.is_outside(&hit.impact, 1e-6).unwrap());
    }

    #[test]
    fn intercepts_lie_on_the_surface(
        shape in arb_any_primitive(),
        dir in arb_direction(),
        (tx, ty, tz) in (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0),
        scale in prop_oneof![1e-6f64..1e-3, 1e-3f64..1.0, 1.0f64..1e3],
    ) {
        let size = size_of(&shape);
        let from = Point3::new(tx, ty, tz) - dir * (2.0 * size);
        let scaled = dir * scale;
        let hits = shape.intercepts(&from, &scaled, 1e-9).unwrap();
        for hit in &hits {
            let face = shape.on_surface(&hit.impact, &FaceIdentifier::any(), 1e-6 * size).unwrap();
            prop_assert!(!face.is_none(), "{:?} off {}", hit.impact, shape.shape_name());
            let along = from + scaled * hit.distance;
            prop_assert!((along - hit.impact).norm() <= 1e-6 * size, "{along:?} vs {:?}", hit.impact);
        }
        prop_assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn reset_and_reconfigure_is_idempotent(r in arb_dim(), z in arb_dim(), p in arb_point()) {
        let mut props = Properties::new();
        props.set_real("r", r).set_real("z", z);
        let lookup: HashMap<String, Shape> = HashMap::new();
        let mut shape = Shape::from(Cylinder::default());
        shape.configure(&props, &lookup).unwrap();
        let before = (shape.is_inside(&p, 1e-6).unwrap(), shape.volume().unwrap(), size_of(&shape));
        shape.reset();
        prop_assert!(!shape.is_valid());
        shape.configure(&props, &lookup).unwrap();
        let after = (shape.is_inside(&p, 1e-6).unwrap(), shape.volume().unwrap(), size_of(&shape));
        prop_assert_eq!(before, after);
    }
}

// ---------------------------------------------------------------------------
// Boolean composites
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn boolean_algebra(
        a in arb_primitive(),
        b in arb_primitive(),
        pl in arb_placement(),
        p in arb_point(),
    ) {
        let q = pl.mother_to_child(&p).unwrap();
        let (ca, cb) = (classify(&a, &p), classify(&b, &q));
        for op in BooleanOp::ALL {
            let composite = Composite::new(op, a.clone(), b.clone(), pl).unwrap();
            let expected = combine(op, ca, cb);
            prop_assert_eq!(
                composite.is_inside(&p, 0.0).unwrap(),
                expected == PointClassification::Inside,
                "{:?}", op
            );
            prop_assert_eq!(
                composite.is_outside(&p, 0.0).unwrap(),
                expected == PointClassification::Outside,
                "{:?}", op
            );
        }
        let inside_a = ca == PointClassification::Inside;
        let inside_b = cb == PointClassification::Inside;
        let union = Composite::union(a.clone(), b.clone(), pl).unwrap();
        prop_assert_eq!(union.is_inside(&p, 0.0).unwrap(), inside_a || inside_b);
        let intersection = Composite::intersection(a, b, pl).unwrap();
        prop_assert_eq!(intersection.is_inside(&p, 0.0).unwrap(), inside_a && inside_b);
    }

    #[test]
    fn union_is_commutative(
        a in arb_primitive(),
        b in arb_primitive(),
        pl in arb_placement(),
        p in arb_point(),
    ) {
        let ab = Composite::union(a.clone(), b.clone(), pl).unwrap();
        let ba = Composite::union(b, a, pl.inverse().unwrap()).unwrap();
        let q = pl.mother_to_child(&p).unwrap();
        let skin = 1e-6;
        // Skip points within rounding distance of a boundary.
        prop_assume!(ab.is_inside(&p, skin).unwrap() || ab.is_outside(&p, skin).unwrap());
        prop_assert_eq!(ab.is_inside(&p, skin).unwrap(), ba.is_inside(&q, skin).unwrap());
        prop_assert_eq!(ab.is_outside(&p, skin).unwrap(), ba.is_outside(&q, skin).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn union_and_intersection_volumes_add_up(a in arb_primitive(), b in arb_primitive(), pl in arb_placement()) {
        let total = a.volume().unwrap() + b.volume().unwrap();
        let union = Composite::union(a.clone(), b.clone(), pl).unwrap().volume().unwrap();
        let shared = Composite::intersection(a, b, pl).unwrap().volume().unwrap();
        prop_assert!(shared >= 0.0);
        prop_assert!(union <= total * (1.0 + 1e-12));
        prop_assert!((union + shared - total).abs() <= 1e-9 * total);
    }
}
