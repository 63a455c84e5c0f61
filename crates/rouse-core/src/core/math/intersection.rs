use super::interpolation::LinearInterpolator;
use crate::core::error::AnalysisError;
use crate::core::models::curve::Curve;
use tracing::debug;

pub const CONVERGENCE_TOLERANCE: f64 = 1e-7;
pub const MAX_BISECTION_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub x: f64,
    pub y: f64,
}

/// Locates one crossing of two piecewise-linear curves inside their common x range.
///
/// Returns `Ok(None)` when the ranges do not overlap, when the difference between the
/// curves has the same strict sign at both ends of the overlap, or when bisection fails to
/// reach [`CONVERGENCE_TOLERANCE`] within [`MAX_BISECTION_ITERATIONS`] (a discontinuous
/// curve can do that).
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if either curve is empty or holds a non-finite sample.
pub fn find_intersection(
    first: &Curve,
    second: &Curve,
) -> Result<Option<Intersection>, AnalysisError> {
    let first_interp = LinearInterpolator::new(first.x(), first.y())?;
    let second_interp = LinearInterpolator::new(second.x(), second.y())?;
    let diff = |x: f64| first_interp.interpolate(x) - second_interp.interpolate(x);

    let mut lower = first_interp.min_x().max(second_interp.min_x());
    let mut upper = first_interp.max_x().min(second_interp.max_x());
    if lower > upper {
        return Ok(None);
    }

    let mut diff_lower = diff(lower);
    let mut diff_upper = diff(upper);
    if (diff_lower > 0.0 && diff_upper > 0.0) || (diff_lower < 0.0 && diff_upper < 0.0) {
        return Ok(None);
    }

    let mut mid = (lower + upper) / 2.0;
    let mut diff_mid = diff(mid);
    let mut iterations = 0;

    while diff_mid.abs() > CONVERGENCE_TOLERANCE {
        // The side rule compares the current bracket ends, which are updated in step.
        let move_lower = if diff_lower > diff_upper {
            diff_mid > 0.0
        } else {
            diff_mid < 0.0
        };
        if move_lower {
            lower = mid;
            diff_lower = diff_mid;
        } else {
            upper = mid;
            diff_upper = diff_mid;
        }

        mid = (lower + upper) / 2.0;
        diff_mid = diff(mid);
        iterations += 1;
        if iterations > MAX_BISECTION_ITERATIONS {
            debug!(lower, upper, "Bisection did not converge.");
            return Ok(None);
        }
    }

    Ok(Some(Intersection {
        x: mid,
        y: first_interp.interpolate(mid),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(x: &[f64], y: &[f64]) -> Curve {
        Curve::new(x.to_vec(), y.to_vec()).unwrap()
    }

    #[test]
    fn finds_crossing_of_rising_and_falling_curves() {
        let rising = curve(&[1.0, 1.5, 2.0, 3.5, 4.0], &[0.0, 2.0, 4.0, 6.0, 8.0]);
        let falling = curve(&[1.0, 2.0, 3.0, 4.0, 5.0], &[8.0, 6.0, 4.0, 2.0, 0.0]);

        let hit = find_intersection(&rising, &falling).unwrap().unwrap();

        assert!(hit.x >= 2.0 && hit.x <= 3.5);
        let a = LinearInterpolator::new(rising.x(), rising.y()).unwrap();
        let b = LinearInterpolator::new(falling.x(), falling.y()).unwrap();
        assert!((a.interpolate(hit.x) - b.interpolate(hit.x)).abs() < 1e-6);
        assert!((hit.x - 2.6).abs() < 1e-6);
    }

    #[test]
    fn non_finite_samples_are_rejected_before_bisection() {
        let rising = curve(&[0.0, 1.0, 2.0], &[0.0, f64::NAN, 2.0]);
        let falling = curve(&[0.0, 2.0], &[2.0, 0.0]);
        assert!(matches!(
            find_intersection(&rising, &falling),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn argument_order_does_not_change_the_crossing() {
        let rising = curve(&[1.0, 1.5, 2.0, 3.5, 4.0], &[0.0, 2.0, 4.0, 6.0, 8.0]);
        let falling = curve(&[1.0, 2.0, 3.0, 4.0, 5.0], &[8.0, 6.0, 4.0, 2.0, 0.0]);

        let forward = find_intersection(&rising, &falling).unwrap().unwrap();
        let backward = find_intersection(&falling, &rising).unwrap().unwrap();
        assert!((forward.x - backward.x).abs() < 1e-6);
    }

    #[test]
    fn disjoint_ranges_have_no_intersection() {
        let left = curve(&[0.0, 1.0], &[0.0, 1.0]);
        let right = curve(&[2.0, 3.0], &[1.0, 0.0]);
        assert_eq!(find_intersection(&left, &right).unwrap(), None);
    }

    #[test]
    fn same_sign_at_both_ends_has_no_intersection() {
        let high = curve(&[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0]);
        let low = curve(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]);
        assert_eq!(find_intersection(&high, &low).unwrap(), None);
    }

    #[test]
    fn touching_at_the_boundary_is_found() {
        let a = curve(&[0.0, 2.0], &[0.0, 2.0]);
        let b = curve(&[0.0, 2.0], &[2.0, 2.0]);
        let hit = find_intersection(&a, &b).unwrap().unwrap();
        assert!((hit.x - 2.0).abs() < 1e-6);
        assert!((hit.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn empty_curve_is_invalid() {
        let empty = Curve::default();
        let other = curve(&[0.0, 1.0], &[0.0, 1.0]);
        assert!(matches!(
            find_intersection(&empty, &other),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
