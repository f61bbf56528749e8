//! Partial-function arithmetic for derived metrics.
//!
//! Every ratio in the KPI chain follows one rule: an undefined input or a
//! zero denominator makes the result undefined. `None` is the only
//! representation of "no data" — a missing value is never smuggled
//! downstream as 0.0, infinity, or NaN.

/// Filters non-finite values out of an optional metric.
pub fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `num / den`. Undefined when either side is undefined or `den` is zero.
pub fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    let n = defined(num)?;
    let d = defined(den)?;
    if d == 0.0 {
        None
    } else {
        Some(n / d)
    }
}

/// `a × b`. Undefined when either side is undefined.
pub fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(defined(a)? * defined(b)?)
}

/// `a − b`. Undefined when either side is undefined.
pub fn diff(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(defined(a)? - defined(b)?)
}

/// `value × factor`, for scenario perturbations and unit changes.
pub fn scale(value: Option<f64>, factor: f64) -> Option<f64> {
    defined(value).map(|v| v * factor)
}
