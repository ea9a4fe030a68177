//! Numbers on the wire.
//!
//! Integral values are written without a fractional part so the JSON matches
//! what a script runtime would print. Non-finite values become `null`, and a
//! `null` read back where a number is expected becomes NaN.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A number in wire form.
#[derive(Copy, Clone, Debug)]
pub(crate) struct WireNumber(pub f64);

impl Serialize for WireNumber {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is integral and within the safe integer range"
    )]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.0;
        if !n.is_finite() {
            serializer.serialize_none()
        } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !is_negative_zero(n) {
            serializer.serialize_i64(n as i64)
        } else {
            serializer.serialize_f64(n)
        }
    }
}

impl<'de> Deserialize<'de> for WireNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = Option::<f64>::deserialize(deserializer)?;
        Ok(WireNumber(n.unwrap_or(f64::NAN)))
    }
}

pub(crate) fn is_negative_zero(n: f64) -> bool {
    n == 0.0 && n.is_sign_negative()
}

/// `serialize_with` helper for number sequences.
pub(crate) fn serialize_seq<S: Serializer>(items: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(items.iter().map(|n| WireNumber(*n)))
}

/// `deserialize_with` helper for number sequences with `null` holes.
pub(crate) fn deserialize_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let items = Vec::<WireNumber>::deserialize(deserializer)?;
    Ok(items.into_iter().map(|n| n.0).collect())
}
