use crate::VhError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, VhError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(VhError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, VhError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(VhError::NonPositive { what, value: v })
    }
}

/// Finite and not below zero.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, VhError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(VhError::Negative { what, value: v })
    }
}

/// `n` evenly spaced points over `[start, end]`, endpoint included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let delta = (end - start) / (n - 1) as Real;
            let mut points: Vec<Real> = (0..n).map(|i| start + i as Real * delta).collect();
            // Ensure exact endpoint
            points[n - 1] = end;
            points
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(0.75, "mass").is_ok());
        assert!(matches!(
            ensure_positive(0.0, "mass"),
            Err(VhError::NonPositive { what: "mass", .. })
        ));
        assert!(ensure_positive(-1.0, "mass").is_err());
        assert!(ensure_positive(Real::INFINITY, "mass").is_err());
    }

    #[test]
    fn ensure_non_negative_allows_zero() {
        assert_eq!(ensure_non_negative(0.0, "k").unwrap(), 0.0);
        assert!(ensure_non_negative(-1e-9, "k").is_err());
    }

    #[test]
    fn linspace_includes_endpoints() {
        let pts = linspace(-20.0, 50.0, 8);
        assert_eq!(pts.len(), 8);
        assert_eq!(pts[0], -20.0);
        assert_eq!(pts[7], 50.0);
        assert!((pts[1] - -10.0).abs() < 1e-12);

        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(3.0, 9.0, 0).is_empty());
    }
}
