//! Rounded support values and total-ordered map keys.
//!
//! Supports are compared and stored *after* rounding to a parameter's
//! significant-digit precision. Rounding first is what makes "the same
//! point inserted twice" a label merge instead of a duplicate.

use crate::error::SupportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default significant-digit precision for support rounding.
pub const DEFAULT_SIG_DIGITS: u32 = 12;

/// Default number of supports a generation request asks for.
pub const DEFAULT_SUPPORT_COUNT: usize = 10;

/// Round `value` to `sig_digits` significant digits.
///
/// Zero and non-finite values pass through unchanged.
pub fn round_sig(value: f64, sig_digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = sig_digits.max(1) as i32;
    let shift = digits - 1 - value.abs().log10().floor() as i32;
    // A single 10^shift overflows to infinity for magnitudes near the
    // subnormal range, so scale in two steps.
    let (head, tail) = (shift / 2, shift - shift / 2);
    let (head, tail) = (10f64.powi(head), 10f64.powi(tail));
    (value * head * tail).round() / head / tail
}

/// A finite, already-rounded support value usable as an ordered map key.
///
/// Ordering is `f64::total_cmp`; construction rejects NaN and infinities
/// and normalizes `-0.0` to `0.0` so the total order never distinguishes
/// the two zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportKey(f64);

impl SupportKey {
    pub fn new(value: f64) -> Result<Self, SupportError> {
        if !value.is_finite() {
            return Err(SupportError::NonFiniteValue { value });
        }
        let value = if value == 0.0 { 0.0 } else { value };
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Eq for SupportKey {}

impl PartialOrd for SupportKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SupportKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for SupportKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for SupportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
