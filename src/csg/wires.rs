use crate::error::Result;
use crate::math::{Point3, DEFAULT_SKIN};
use crate::placement::Placement;
use crate::shapes::WireRenderable;
use crate::tessellation::{Polyline, WireOptions};

use super::{Composite, Operand};

/// Wires of both children in the composite frame, trimmed to the composite
/// boundary unless `options.trim_composites` is off.
pub(super) fn generate(composite: &Composite, out: &mut Vec<Polyline>, options: &WireOptions) -> Result<()> {
    let (a, b) = composite.children()?;
    let mut first = Vec::new();
    a.generate_wires(&mut first, &Placement::identity(), options)?;
    let mut second = Vec::new();
    b.generate_wires(&mut second, composite.placement(), options)?;

    if !options.trim_composites {
        out.extend(first);
        out.extend(second);
        return Ok(());
    }

    let extent = a
        .bounding_data()?
        .union(&b.bounding_data()?.transformed(composite.placement())?)
        .max_dimension();
    #[allow(clippy::cast_precision_loss)]
    let step = extent / options.sampling.segments() as f64;
    if !(step.is_finite() && step > 0.0) {
        tracing::warn!(
            shape = composite.op().type_id(),
            extent,
            "cannot subdivide composite wires, keeping them untrimmed"
        );
        out.extend(first);
        out.extend(second);
        return Ok(());
    }

    for (operand, wires) in [(Operand::First, first), (Operand::Second, second)] {
        for wire in wires {
            trim(composite, operand, &wire, step, out)?;
        }
    }
    Ok(())
}

/// Appends the runs of `wire` whose points lie on the composite boundary.
fn trim(composite: &Composite, operand: Operand, wire: &Polyline, step: f64, out: &mut Vec<Polyline>) -> Result<()> {
    let dense = wire.subdivided(step);
    let mut kept = Vec::with_capacity(dense.len());
    for p in &dense.points {
        kept.push(composite.keeps(operand, p, DEFAULT_SKIN)?);
    }
    if kept.iter().all(|k| *k) {
        out.push(wire.clone());
        return Ok(());
    }

    let mut run = Vec::new();
    for (p, keep) in dense.points.iter().zip(&kept) {
        if *keep {
            run.push(*p);
        } else {
            flush(&mut run, out);
        }
    }
    flush(&mut run, out);
    Ok(())
}

fn flush(run: &mut Vec<Point3>, out: &mut Vec<Polyline>) {
    if run.len() >= 2 {
        out.push(Polyline::open(std::mem::take(run)));
    } else {
        run.clear();
    }
}
