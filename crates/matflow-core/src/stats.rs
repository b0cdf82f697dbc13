//! Aggregate flow statistics.

use crate::material::MaterialRelationship;
use serde::{Deserialize, Serialize};

/// Summary counts for a layout. Serializes in the renderer's camelCase schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStats {
    /// Every supplied relationship, resolved or not.
    pub total_flows: usize,
    /// Relationships classified as recycling (backward, or forward with
    /// recycling semantics).
    pub recycling_flows: usize,
    /// Recycling share of total quantity as a percentage with one decimal
    /// place, or `"0"` when there is no quantity at all.
    pub recycling_rate: String,
}

impl FlowStats {
    /// Stats for an empty layout.
    pub fn empty() -> Self {
        Self {
            total_flows: 0,
            recycling_flows: 0,
            recycling_rate: "0".to_string(),
        }
    }

    /// The recycling rate as a number. `None` only if the string was
    /// constructed by hand and does not parse.
    pub fn recycling_rate_percent(&self) -> Option<f64> {
        self.recycling_rate.parse().ok()
    }
}

impl Default for FlowStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Sum of quantities, with missing quantities counted as zero.
///
/// Starts from positive zero, so an empty sum is `0.0` and never `-0.0`.
pub fn total_quantity(relationships: &[MaterialRelationship]) -> f64 {
    relationships
        .iter()
        .fold(0.0, |acc, r| acc + r.effective_quantity())
}

/// Format a recycling rate the way the legend displays it.
pub fn format_recycling_rate(recycling_quantity: f64, total_quantity: f64) -> String {
    if total_quantity > 0.0 {
        format_tenths(recycling_quantity / total_quantity * 100.0)
    } else {
        "0".to_string()
    }
}

/// Format `value` with exactly one decimal place.
///
/// Rounds to the nearest tenth of the exact binary value. Exact ties go to
/// the larger magnitude (`6.25` gives `"6.3"`, where `{:.1}` would give
/// `"6.2"`). Zero of either sign prints as `"0.0"`; negative values that
/// round to zero keep their sign (`-0.01` gives `"-0.0"`).
pub fn format_tenths(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    match rounded_up_tie(magnitude) {
        Some(tenths) => format!("{sign}{}.{}", tenths / 10, tenths % 10),
        None => format!("{sign}{magnitude:.1}"),
    }
}

/// If `x` lies exactly halfway between two multiples of `0.1` (`20 * x` is an
/// odd integer), the number of tenths in the larger one. Decided on the
/// exact binary value of `x`, which must be finite and non-negative.
fn rounded_up_tie(x: f64) -> Option<u128> {
    let bits = x.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);

    // x = mantissa * 2^exponent
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased_exponent - 1075)
    };
    if mantissa == 0 || exponent >= 0 {
        // Zero and integers are never ties.
        return None;
    }

    let scaled = u128::from(mantissa) * 20;
    let shift = exponent.unsigned_abs();
    if shift >= 128 || scaled.trailing_zeros() < shift {
        return None;
    }
    // twenty_x = 2k + 1; the tie sits between k and k + 1 tenths.
    let twenty_x = scaled >> shift;
    (twenty_x & 1 == 1).then(|| twenty_x.div_ceil(2))
}

/// Compute stats over all `relationships` and the `recycling_flows` subset.
pub fn compute_stats(
    relationships: &[MaterialRelationship],
    recycling_flows: &[MaterialRelationship],
) -> FlowStats {
    let total = total_quantity(relationships);
    let recycling = total_quantity(recycling_flows);

    FlowStats {
        total_flows: relationships.len(),
        recycling_flows: recycling_flows.len(),
        recycling_rate: format_recycling_rate(recycling, total),
    }
}
