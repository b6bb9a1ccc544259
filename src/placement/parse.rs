use std::fmt;
use std::str::FromStr;

use crate::error::PlacementError;
use crate::math::units::{angle_unit, length_unit};
use crate::math::Vector3;

use super::{Axis, Placement};

/// Splits off a leading `(unit)` group, returning the unit and the remainder.
fn take_unit(input: &str) -> Result<(Option<&str>, &str), String> {
    let input = input.trim_start();
    let Some(rest) = input.strip_prefix('(') else {
        return Ok((None, input));
    };
    let close = rest
        .find(')')
        .ok_or_else(|| "unterminated unit group".to_string())?;
    Ok((Some(rest[..close].trim()), &rest[close + 1..]))
}

fn take_numbers<'a>(input: &'a str, count: usize, what: &str) -> Result<(Vec<f64>, &'a str), String> {
    let mut rest = input;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '(' | '/' | '@'))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(format!("expected {count} {what} values"));
        }
        let value = rest[..end]
            .parse::<f64>()
            .map_err(|_| format!("invalid {what} value '{}'", &rest[..end]))?;
        values.push(value);
        rest = &rest[end..];
    }
    Ok((values, rest))
}

fn parse_placement(input: &str) -> Result<Placement, String> {
    let (xyz, rest) = take_numbers(input, 3, "coordinate")?;
    let (unit, rest) = take_unit(rest)?;
    let lunit = length_unit(unit.unwrap_or("mm")).map_err(|e| e.to_string())?;
    let translation = Vector3::new(xyz[0], xyz[1], xyz[2]) * lunit;

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(Placement::from_translation(translation));
    }

    let mut chars = rest.chars();
    let separator = chars.next();
    let rest = chars.as_str();
    let (angles, axis, rest) = match separator {
        Some('/') => {
            let rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let axis = Axis::from_label(&rest[..end])
                .ok_or_else(|| format!("invalid rotation axis '{}'", &rest[..end]))?;
            let (angles, rest) = take_numbers(&rest[end..], 1, "angle")?;
            (angles, Some(axis), rest)
        }
        Some('@') => {
            let (angles, rest) = take_numbers(rest, 3, "angle")?;
            (angles, None, rest)
        }
        _ => return Err("expected '/' or '@' after the translation".into()),
    };

    let (unit, rest) = take_unit(rest)?;
    if !rest.trim().is_empty() {
        return Err(format!("unexpected trailing text '{}'", rest.trim()));
    }
    let aunit = angle_unit(unit.unwrap_or("degree")).map_err(|e| e.to_string())?;

    Ok(match axis {
        Some(axis) => Placement::from_axis_angle(translation, axis, angles[0] * aunit),
        None => Placement::from_euler_zyz(
            translation,
            angles[0] * aunit,
            angles[1] * aunit,
            angles[2] * aunit,
        ),
    })
}

impl FromStr for Placement {
    type Err = PlacementError;

    /// Parses `tx ty tz [(unit)] [/ axis angle [(unit)]]` or
    /// `tx ty tz [(unit)] [@ phi theta delta [(unit)]]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_placement(s).map_err(|reason| PlacementError::Parse {
            input: s.to_string(),
            reason,
        })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "(invalid)");
        }
        let t = self.translation();
        write!(f, "{} {} {} (mm)", t.x, t.y, t.z)?;
        if self.is_pure_translation() {
            return Ok(());
        }
        if let Some((axis, angle)) = self.principal_rotation() {
            write!(f, " / {} {} (degree)", axis.label(), angle.to_degrees())
        } else {
            let (phi, theta, delta) = self.euler_zyz();
            write!(
                f,
                " @ {} {} {} (degree)",
                phi.to_degrees(),
                theta.to_degrees(),
                delta.to_degrees()
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Point3;

    #[test]
    fn translation_only_defaults_to_mm() {
        let pl: Placement = "3 0 0".parse().unwrap();
        assert_relative_eq!(*pl.translation(), Vector3::new(3.0, 0.0, 0.0));
        assert!(pl.is_pure_translation());
    }

    #[test]
    fn translation_with_unit() {
        let pl: Placement = "1 2 3 (cm)".parse().unwrap();
        assert_relative_eq!(*pl.translation(), Vector3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn axis_rotation() {
        let pl: Placement = "0 0 0 (mm) / z 90 (degree)".parse().unwrap();
        let p = pl.child_to_mother(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn euler_rotation_in_radians() {
        let pl: Placement = "1 1 1 @ 0.1 0.2 0.3 (rad)".parse().unwrap();
        let (phi, theta, delta) = pl.euler_zyz();
        assert_relative_eq!(phi, 0.1, epsilon = 1e-12);
        assert_relative_eq!(theta, 0.2, epsilon = 1e-12);
        assert_relative_eq!(delta, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn display_parses_back() {
        for text in ["1 2 3 (mm)", "0 0 5 (mm) / x 30 (degree)", "1 -1 0 (mm) @ 10 20 30 (degree)"] {
            let pl: Placement = text.parse().unwrap();
            let again: Placement = pl.to_string().parse().unwrap();
            let p = Point3::new(0.3, -0.7, 1.9);
            assert_relative_eq!(
                pl.child_to_mother(&p).unwrap(),
                again.child_to_mother(&p).unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn parse_errors() {
        for bad in ["", "1 2", "1 2 3 (furlong)", "1 2 3 / w 10", "1 2 3 # 4", "1 2 3 @ 1 2", "1 2 3 (mm"] {
            assert!(
                matches!(bad.parse::<Placement>(), Err(PlacementError::Parse { .. })),
                "'{bad}' should fail"
            );
        }
    }
}
