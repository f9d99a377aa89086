//! Precision policies.
//!
//! Stored hotspot coordinates carry one decimal place. This module owns the
//! rounding rule and a deterministic float ordering used for tie-breaks.

use core::cmp::Ordering;

/// Decimal places kept for persisted spherical coordinates.
pub const STORED_DECIMALS: i32 = 1;

/// Canonicalize a floating-point value for deterministic ordering and output.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Round to the persisted precision (one decimal), half away from zero.
///
/// The result is canonicalized so `-0.04` is stored as `0.0`, not `-0.0`.
pub fn round_to_tenth(v: f64) -> f64 {
    let scale = 10f64.powi(STORED_DECIMALS);
    canonical_f64((v * scale).round() / scale)
}

/// Deterministic total ordering for floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}
