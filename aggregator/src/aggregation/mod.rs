//! The aggregation core: key resolution, binning, density estimation,
//! summarizing, comparison partitioning, cost projection, and the
//! extra-pair registry. Everything here is a pure function over a record
//! snapshot; recomputation replaces prior output wholesale.

pub mod binning;
pub mod comparison;
pub mod cost;
pub mod density;
pub mod extra_pair;
pub mod grouping;
pub mod summary;

use crate::models::{BloodProduct, CaseRecord, ContinuousField, GroupAggregate};

/// Everything needed to aggregate one set of records: the target product,
/// its display cap, and the density-estimation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateContext {
    pub product: BloodProduct,
    pub cap: u32,
    pub density_field: ContinuousField,
    pub bandwidth: f64,
    /// When false, zero-valued cases are dropped from the density input
    /// only; bin and zero counts always reflect the full group.
    pub include_zero_cases: bool,
}

/// Run binner, summarizer, and density estimator over one cohort.
pub fn build_aggregate(records: &[&CaseRecord], ctx: &AggregateContext) -> GroupAggregate {
    let binned = binning::bin_units(records, ctx.product, ctx.cap);
    let summary = summary::summarize_units(records, ctx.product);
    let values = density_input(records, ctx);
    let density = density::estimate_density(&values, ctx.bandwidth, ctx.density_field.domain_max());

    GroupAggregate {
        case_count: records.len(),
        zero_case_count: binned.zero_count,
        total_value: summary.total,
        bins: binned.bins,
        mean: summary.mean,
        median: summary.median,
        patient_ids: grouping::patient_ids(records),
        case_ids: grouping::case_ids(records),
        density,
    }
}

/// Qualifying values for the density estimator: zero-transfusion cases are
/// dropped when the zero toggle is off, unset fields are excluded entirely
/// (never coerced to zero), and only positive values qualify.
pub fn density_input(records: &[&CaseRecord], ctx: &AggregateContext) -> Vec<f64> {
    records
        .iter()
        .filter(|r| ctx.include_zero_cases || r.units(ctx.product) > 0)
        .filter_map(|r| ctx.density_field.value_of(r))
        .filter(|v| *v > 0.0)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::models::CaseRecord;

    /// All-zero case record for tests; mutate the fields under study.
    pub fn blank_case(case_id: i64) -> CaseRecord {
        CaseRecord {
            case_id,
            patient_id: case_id + 1000,
            surgeon_id: 1,
            anesthesiologist_id: 1,
            year: 2020,
            quarter: 2,
            month: 6,
            surgery_type: "CABG".to_string(),
            case_date: NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date"),
            prbc_units: 0,
            ffp_units: 0,
            plt_units: 0,
            cryo_units: 0,
            cell_saver_ml: 0,
            death: false,
            vent: false,
            ecmo: false,
            stroke: false,
            b12: false,
            txa: false,
            amicar: false,
            drg_weight: None,
            preop_hgb: None,
            postop_hgb: None,
        }
    }
}
