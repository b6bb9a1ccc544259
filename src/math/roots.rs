use super::TOLERANCE;

/// Maximum number of bisection steps used by [`bisect`].
pub const MAX_BISECTION_STEPS: usize = 80;

/// Solves `a t² + b t + c = 0` for real roots, sorted ascending.
///
/// Falls back to the linear equation when `a` is negligible next to `b`
/// and `c`; the test is relative so short ray directions keep both roots.
/// A double root is reported once.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() <= f64::EPSILON * (b.abs() + c.abs()) {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }

    // Numerically stable form avoiding cancellation.
    let sqrt_disc = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    let (t1, t2) = if q.abs() < f64::MIN_POSITIVE {
        let r = sqrt_disc / (2.0 * a);
        (-r, r)
    } else {
        (q / a, c / q)
    };
    if t1 <= t2 {
        vec![t1, t2]
    } else {
        vec![t2, t1]
    }
}

/// Refines a root of `f` inside `[lo, hi]` where `f(lo)` and `f(hi)` differ in sign.
///
/// Returns `None` when the bracket does not straddle a sign change.
pub fn bisect<F>(f: F, mut lo: f64, mut hi: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return None;
    }

    for _ in 0..MAX_BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo) < TOLERANCE * (1.0 + mid.abs()) {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Maximum number of golden-section steps used by [`minimize`].
pub const MAX_MINIMIZE_STEPS: usize = 100;

/// Golden-section search for a minimum of `f` on `[lo, hi]`.
///
/// Returns the abscissa and value of the smallest evaluation. Only a local
/// minimum is found when `f` is not unimodal on the interval.
pub fn minimize<F>(f: F, mut lo: f64, mut hi: f64) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let (mut f1, mut f2) = (f(x1), f(x2));
    for _ in 0..MAX_MINIMIZE_STEPS {
        if (hi - lo) < TOLERANCE * (1.0 + x1.abs()) {
            break;
        }
        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
    }
    if f1 <= f2 {
        (x1, f1)
    } else {
        (x2, f2)
    }
}

/// Finds the roots of `f` over `[lo, hi]` from `samples` intervals.
///
/// Every sign change between samples is refined by [`bisect`]. A sample
/// closer to zero than its neighbours, all of one sign, may hide a pair of
/// roots between them: the dip is located with [`minimize`] and both sides
/// are bisected when it crosses zero. Roots are sorted ascending.
pub fn bracketed_roots<F>(f: F, lo: f64, hi: f64, samples: usize) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let samples = samples.max(2);
    #[allow(clippy::cast_precision_loss)]
    let step = (hi - lo) / samples as f64;
    #[allow(clippy::cast_precision_loss)]
    let ts: Vec<f64> = (0..=samples)
        .map(|i| if i == samples { hi } else { lo + step * i as f64 })
        .collect();
    let fs: Vec<f64> = ts.iter().map(|&t| f(t)).collect();

    let mut roots = Vec::new();
    for (i, (&t, &ft)) in ts.iter().zip(&fs).enumerate() {
        if ft == 0.0 {
            roots.push(t);
        } else if i > 0 && fs[i - 1] != 0.0 && fs[i - 1].signum() != ft.signum() {
            roots.extend(bisect(&f, ts[i - 1], t));
        }
    }

    for (i, &ft) in fs.iter().enumerate() {
        if ft == 0.0 {
            continue;
        }
        let sign = ft.signum();
        let left = i.checked_sub(1).map(|k| sign * fs[k]);
        let right = fs.get(i + 1).map(|r| sign * r);
        let here = sign * ft;
        let is_dip = left.is_none_or(|l| l > here) && right.is_none_or(|r| r >= here);
        if !is_dip || left.is_some_and(|l| l <= 0.0) || right.is_some_and(|r| r <= 0.0) {
            continue;
        }
        let a = ts[i.saturating_sub(1)];
        let b = ts[(i + 1).min(samples)];
        let (tm, gm) = minimize(|t| sign * f(t), a, b);
        if gm < 0.0 {
            roots.extend(bisect(&f, a, tm));
            roots.extend(bisect(&f, tm, b));
        }
    }

    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() <= TOLERANCE * (1.0 + b.abs()));
    roots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_two_roots() {
        let roots = solve_quadratic(1.0, -3.0, 2.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1.0).abs() < 1e-12);
        assert!((roots[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn quadratic_no_root() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn quadratic_degenerates_to_linear() {
        let roots = solve_quadratic(0.0, 2.0, -4.0);
        assert_eq!(roots, vec![2.0]);
    }

    #[test]
    fn quadratic_with_small_leading_coefficient() {
        // |d|² for a direction of length 5e-6, starting 5 units from a unit sphere.
        let roots = solve_quadratic(2.5e-11, -5e-5, 24.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 8.0e5).abs() < 1e-3);
        assert!((roots[1] - 1.2e6).abs() < 1e-3);
    }

    #[test]
    fn quadratic_symmetric_roots() {
        let roots = solve_quadratic(1.0, 0.0, -4.0);
        assert!((roots[0] + 2.0).abs() < 1e-12);
        assert!((roots[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bisect_finds_sqrt_two() {
        let r = bisect(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((r - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn bisect_rejects_bad_bracket() {
        assert!(bisect(|x| x * x + 1.0, -1.0, 1.0).is_none());
    }

    #[test]
    fn bracketed_roots_of_cubic() {
        let roots = bracketed_roots(|x| (x - 1.0) * (x - 2.5) * (x + 3.0), -5.0, 5.0, 97);
        assert_eq!(roots.len(), 3);
        assert!((roots[0] + 3.0).abs() < 1e-8);
        assert!((roots[1] - 1.0).abs() < 1e-8);
        assert!((roots[2] - 2.5).abs() < 1e-8);
    }

    #[test]
    fn bracketed_roots_inside_one_sample_interval() {
        let roots = bracketed_roots(|x| (x - 0.5037).powi(2) - 1e-6, 0.0, 1.0, 10);
        assert_eq!(roots.len(), 2, "{roots:?}");
        assert!((roots[0] - 0.5027).abs() < 1e-8);
        assert!((roots[1] - 0.5047).abs() < 1e-8);
    }

    #[test]
    fn bracketed_roots_near_an_end() {
        let roots = bracketed_roots(|x: f64| (x - 0.02).abs() - 0.01, 0.0, 1.0, 8);
        assert_eq!(roots.len(), 2, "{roots:?}");
        assert!((roots[0] - 0.01).abs() < 1e-8);
        assert!((roots[1] - 0.03).abs() < 1e-8);
    }

    #[test]
    fn bracketed_roots_ignore_shallow_dips() {
        assert!(bracketed_roots(|x| (x - 0.5037).powi(2) + 1e-6, 0.0, 1.0, 10).is_empty());
    }

    #[test]
    fn minimize_parabola() {
        let (x, fx) = minimize(|x| (x - 0.3).powi(2) + 2.0, -1.0, 1.0);
        assert!((x - 0.3).abs() < 1e-6);
        assert!((fx - 2.0).abs() < 1e-12);
    }
}
