//! Shared null-propagating numeric helpers.
//!
//! Every displayed ratio flows through these functions. Their silent-null
//! behavior on absent operands and zero denominators is what lets a
//! partial measurement set still produce a best-effort grade instead of
//! failing outright.

/// Round to 2 decimal places, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Divide, absorbing absent operands and a zero denominator into `None`.
///
/// Present operands with a non-zero denominator yield the quotient
/// rounded to 2 decimals.
pub fn guarded_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(round2(n / d)),
        _ => None,
    }
}

/// Average two optional values.
///
/// Both absent yields `None`. Exactly one present passes that value
/// through unrounded. Both present yields the mean rounded to 2 decimals.
pub fn average2(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(round2((a + b) / 2.0)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

// Threshold votes: a measurement votes only when present, so absence never
// counts as a negative finding.

pub(crate) fn at_most(value: Option<f64>, cutoff: f64) -> bool {
    value.is_some_and(|v| v <= cutoff)
}

pub(crate) fn at_least(value: Option<f64>, cutoff: f64) -> bool {
    value.is_some_and(|v| v >= cutoff)
}

pub(crate) fn above(value: Option<f64>, cutoff: f64) -> bool {
    value.is_some_and(|v| v > cutoff)
}

pub(crate) fn below(value: Option<f64>, cutoff: f64) -> bool {
    value.is_some_and(|v| v < cutoff)
}
