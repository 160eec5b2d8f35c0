//! Bracketing root search for scalar functions of one variable.

use crate::error::NumericError;

/// Convergence controls for [`find_root`].
#[derive(Debug, Clone, Copy)]
pub struct RootOptions {
    /// Absolute width of the final bracket.
    pub tolerance: f64,
    /// Maximum number of bisection steps before giving up.
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 200,
        }
    }
}

/// An interval `[lo, hi]` together with the function values at its ends.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub lo: f64,
    pub hi: f64,
    pub f_lo: f64,
    pub f_hi: f64,
}

impl Bracket {
    /// Builds a bracket by evaluating `f` at both ends.
    pub fn evaluate<F: FnMut(f64) -> f64>(mut f: F, lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            f_lo: f(lo),
            f_hi: f(hi),
        }
    }

    /// Returns `true` if the end values fall in different sign groups.
    ///
    /// Values `>= 0` form one group and values `< 0` the other, so an exact
    /// zero at one end counts as non-negative.
    #[must_use]
    pub fn has_sign_change(&self) -> bool {
        is_negative(self.f_lo) != is_negative(self.f_hi)
    }
}

fn is_negative(v: f64) -> bool {
    v < 0.0
}

/// Finds a parameter in `bracket` where `f` changes sign group.
///
/// Bisection keeps the invariant that the two ends have different sign
/// groups, so the returned value always lies inside the initial bracket and
/// next to the boundary of the negative group.
///
/// # Errors
///
/// - [`NumericError::NoSignChange`] if the bracket ends share a sign group
///   or a value is not finite.
/// - [`NumericError::NonConvergence`] if the bracket has not shrunk below
///   `options.tolerance` after `options.max_iterations` steps.
pub fn find_root<F: FnMut(f64) -> f64>(
    mut f: F,
    bracket: Bracket,
    options: RootOptions,
) -> Result<f64, NumericError> {
    let Bracket {
        mut lo,
        mut hi,
        f_lo,
        f_hi,
    } = bracket;
    if !f_lo.is_finite() || !f_hi.is_finite() || !bracket.has_sign_change() {
        return Err(NumericError::NoSignChange { lo, hi, f_lo, f_hi });
    }
    let lo_negative = is_negative(f_lo);

    for _ in 0..options.max_iterations {
        let mid = 0.5 * (lo + hi);
        if (hi - lo).abs() <= options.tolerance {
            return Ok(mid);
        }
        // Exact zeros count as non-negative; no early exit on them.
        if is_negative(f(mid)) == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if (hi - lo).abs() <= options.tolerance {
        Ok(0.5 * (lo + hi))
    } else {
        Err(NumericError::NonConvergence {
            iterations: options.max_iterations,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_of_sine() {
        let f = f64::sin;
        let bracket = Bracket::evaluate(f, 3.0, 4.0);
        let x = find_root(f, bracket, RootOptions::default()).unwrap();
        assert!((x - std::f64::consts::PI).abs() < 1e-12, "x={x}");
    }

    #[test]
    fn finds_root_with_reversed_signs() {
        let f = |t: f64| 0.25 - t;
        let bracket = Bracket::evaluate(f, 0.0, 1.0);
        let x = find_root(f, bracket, RootOptions::default()).unwrap();
        assert!((x - 0.25).abs() < 1e-12, "x={x}");
    }

    #[test]
    fn root_stays_inside_bracket() {
        let f = |t: f64| t * t - 2.0;
        let bracket = Bracket::evaluate(f, 1.0, 2.0);
        let x = find_root(f, bracket, RootOptions::default()).unwrap();
        assert!((1.0..=2.0).contains(&x));
        assert!((x - 2.0_f64.sqrt()).abs() < 1e-12, "x={x}");
    }

    #[test]
    fn zero_plateau_converges_to_the_negative_boundary() {
        // Clamped in-circle values are exactly zero over a whole interval.
        let f = |t: f64| if t < 0.7 { 0.0 } else { 0.7 - t };
        let bracket = Bracket::evaluate(f, 0.0, 1.0);
        let x = find_root(f, bracket, RootOptions::default()).unwrap();
        assert!((x - 0.7).abs() < 1e-12, "x={x}");
    }

    #[test]
    fn no_sign_change_is_rejected() {
        let f = |t: f64| t * t + 1.0;
        let bracket = Bracket::evaluate(f, -1.0, 1.0);
        assert!(!bracket.has_sign_change());
        let err = find_root(f, bracket, RootOptions::default()).unwrap_err();
        assert!(matches!(err, NumericError::NoSignChange { .. }));
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let f = |t: f64| t - 0.3;
        let bracket = Bracket::evaluate(f, 0.0, 1.0);
        let options = RootOptions {
            tolerance: 1e-14,
            max_iterations: 5,
        };
        let err = find_root(f, bracket, options).unwrap_err();
        assert!(matches!(err, NumericError::NonConvergence { iterations: 5 }));
    }
}
