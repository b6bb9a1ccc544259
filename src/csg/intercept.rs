use crate::error::Result;
use crate::face::FaceInterceptInfo;
use crate::math::{neighbour_step, Point3, Vector3, TOLERANCE};
use crate::placement::Placement;
use crate::shapes::primitive::unit_direction;
use crate::shapes::Solid;

use super::{Composite, Operand};

/// Ray intercepts of a composite.
///
/// Candidates from both children are merged, grouped when closer than the
/// skin, and kept only where containment in the composite flips across the
/// group.
pub(super) fn intercepts(
    composite: &Composite,
    from: &Point3,
    dir: &Vector3,
    skin: f64,
) -> Result<Vec<FaceInterceptInfo>> {
    let (a, b) = composite.children()?;
    let Some((unit, speed)) = unit_direction(dir) else {
        tracing::trace!(shape = composite.op().type_id(), "zero-length ray direction");
        return Ok(Vec::new());
    };
    let dir = &unit;

    let placement = composite.placement();
    let identity = Placement::identity();
    let mut candidates = Vec::new();
    for hit in a.intercepts(from, dir, skin)? {
        candidates.push(hit.into_parent(Operand::First.part(), &identity)?);
    }
    let local_from = placement.mother_to_child(from)?;
    let local_dir = placement.mother_to_child_direction(dir)?;
    for hit in b.intercepts(&local_from, &local_dir, skin)? {
        candidates.push(hit.into_parent(Operand::Second.part(), placement)?);
    }
    candidates.sort_by(|x, y| x.distance.total_cmp(&y.distance));

    let merge = skin.max(TOLERANCE);
    let delta = neighbour_step(skin);
    let mut out = Vec::new();
    let mut rest = candidates.as_slice();
    while let Some(head) = rest.first() {
        let len = rest
            .iter()
            .take_while(|c| c.distance - head.distance <= merge)
            .count();
        let (group, tail) = rest.split_at(len);
        rest = tail;

        let t0 = head.distance;
        let t1 = group.last().map_or(t0, |c| c.distance);
        let before = from + dir * (t0 - delta);
        let after = from + dir * (t1 + delta);
        if composite.is_inside(&before, 0.0)? == composite.is_inside(&after, 0.0)? {
            tracing::trace!(
                shape = composite.op().type_id(),
                distance = t0,
                candidates = group.len(),
                "rejected tangential or internal intercept"
            );
            continue;
        }

        let mut chosen = head;
        for candidate in group {
            if !composite.on_surface(&candidate.impact, &candidate.face, skin)?.is_none() {
                chosen = candidate;
                break;
            }
        }
        let mut chosen = chosen.clone();
        chosen.distance /= speed;
        out.push(chosen);
    }
    Ok(out)
}
