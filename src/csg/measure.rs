use crate::bounding::Aabb;
use crate::error::Result;
use crate::face::FaceIdentifier;
use crate::math::{Point3, DEFAULT_SKIN};
use crate::placement::Placement;
use crate::shapes::{MeasureOptions, Solid};

use super::{BooleanOp, Composite, Operand};

/// Volume by inclusion-exclusion over the children.
///
/// The shared volume is integrated with a midpoint grid over the overlap
/// of the children's bounding boxes.
pub(super) fn volume(composite: &Composite, options: &MeasureOptions) -> Result<f64> {
    let (a, b) = composite.children()?;
    let first = a.volume_with(options)?;
    let second = b.volume_with(options)?;
    let shared = shared_volume(composite, options)?;
    Ok(match composite.op() {
        BooleanOp::Union => first + second - shared,
        BooleanOp::Subtraction => first - shared,
        BooleanOp::Intersection => shared,
    })
}

fn shared_volume(composite: &Composite, options: &MeasureOptions) -> Result<f64> {
    let (a, b) = composite.children()?;
    let overlap = a
        .bounding_data()?
        .intersection(&b.bounding_data()?.transformed(composite.placement())?);
    let Some(region) = overlap.aabb() else {
        return Ok(0.0);
    };
    let n = options.grid.max(1);
    let mut count = 0usize;
    for p in grid_midpoints(region, n) {
        if a.is_inside(&p, 0.0)? && b.is_inside(&composite.placement().mother_to_child(&p)?, 0.0)? {
            count += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let cell = region.volume() / (n * n * n) as f64;
    #[allow(clippy::cast_precision_loss)]
    Ok(count as f64 * cell)
}

fn grid_midpoints(region: &Aabb, n: usize) -> impl Iterator<Item = Point3> + '_ {
    #[allow(clippy::cast_precision_loss)]
    let step = region.size() / n as f64;
    (0..n).flat_map(move |i| {
        (0..n).flat_map(move |j| {
            (0..n).map(move |k| {
                #[allow(clippy::cast_precision_loss)]
                let offset = [i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5];
                Point3::new(
                    region.min.x + offset[0] * step.x,
                    region.min.y + offset[1] * step.y,
                    region.min.z + offset[2] * step.z,
                )
            })
        })
    })
}

/// Area of the child faces matched by `mask` that lie on the composite
/// boundary, by face-sample quadrature.
pub(super) fn surface(composite: &Composite, mask: &FaceIdentifier, options: &MeasureOptions) -> Result<f64> {
    let (a, b) = composite.children()?;
    let identity = Placement::identity();
    let operands = [
        (Operand::First, a, &identity),
        (Operand::Second, b, composite.placement()),
    ];

    let mut total = 0.0;
    for (operand, child, placement) in operands {
        let Some(child_mask) = mask.child_mask(operand.part()) else {
            continue;
        };
        let mut faces = Vec::new();
        child.compute_faces(&mut faces)?;
        for face in faces.iter().filter(|f| child_mask.matches(&f.id)) {
            for (p, weight) in face.samples(options.face_samples)? {
                let p = placement.child_to_mother(&p)?;
                if composite.keeps(operand, &p, DEFAULT_SKIN)? {
                    total += weight;
                }
            }
        }
    }
    Ok(total)
}
