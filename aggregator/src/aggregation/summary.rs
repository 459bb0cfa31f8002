//! Per-group statistical summaries: sentinel-corrected totals, mean,
//! median, and outcome-rate triples.

use crate::helper_functions::{mean, median, ratio};
use crate::models::{BloodProduct, CaseRecord, Outcome, OutcomeSummary};

// Raw exports pack an out-of-band flag into some unit counts: FFP counts
// above 100 carry a +999 sentinel, platelet counts a +245 one. The exact
// upstream encoding is an open data-contract question (see DESIGN.md); the
// correction below restores the plausible true count before summation.
const SENTINEL_THRESHOLD: u32 = 100;
const FFP_SENTINEL_OFFSET: f64 = 999.0;
const PLT_SENTINEL_OFFSET: f64 = 245.0;

/// Unit count with the sentinel encoding stripped.
pub fn corrected_value(product: BloodProduct, raw: u32) -> f64 {
    match product {
        BloodProduct::Ffp if raw > SENTINEL_THRESHOLD => raw as f64 - FFP_SENTINEL_OFFSET,
        BloodProduct::Plt if raw > SENTINEL_THRESHOLD => raw as f64 - PLT_SENTINEL_OFFSET,
        _ => raw as f64,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSummary {
    /// Uncapped sum of corrected values.
    pub total: f64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub count: usize,
}

pub fn summarize_units(records: &[&CaseRecord], product: BloodProduct) -> ValueSummary {
    let values: Vec<f64> = records
        .iter()
        .map(|r| corrected_value(product, r.units(product)))
        .collect();

    ValueSummary {
        total: values.iter().sum(),
        mean: mean(&values),
        median: median(&values),
        count: values.len(),
    }
}

/// `{actual_val, calculated, out_of_total}` for a binary outcome.
/// `calculated` is undefined for an empty group.
pub fn summarize_outcome(records: &[&CaseRecord], outcome: Outcome) -> OutcomeSummary {
    let positive = records.iter().filter(|r| r.outcome(outcome)).count() as f64;
    OutcomeSummary {
        actual_val: positive,
        calculated: ratio(positive, records.len()),
        out_of_total: records.len(),
    }
}
