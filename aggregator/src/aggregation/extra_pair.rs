//! Side-panel ("extra pair") summaries. Each named option resolves to a
//! builder over the aggregation primitives and yields a uniformly shaped
//! result tagged with the rendering-dispatch kind. Unknown option names are
//! logged and skipped, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregation::grouping::ResolvedGroup;
use crate::aggregation::{binning, density, density_input, summary, AggregateContext};
use crate::helper_functions::{median, ratio};
use crate::models::{ContinuousField, DensityDisplay, GroupKey, Outcome, OutcomeSummary};

/// Rendering-dispatch tag the chart layer switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraPairKind {
    BarChart,
    Basic,
    Violin,
    Outcomes,
}

/// The closed set of supported side-panel options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraPairOption {
    TotalTransfusion,
    PerCase,
    ZeroTransfusion,
    OutcomeRate(Outcome),
    RiskScore,
    PreopHgb,
    PostopHgb,
}

impl ExtraPairOption {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Total Transfusion" => Some(ExtraPairOption::TotalTransfusion),
            "Per Case" => Some(ExtraPairOption::PerCase),
            "Zero Transfusion" => Some(ExtraPairOption::ZeroTransfusion),
            "RISK" => Some(ExtraPairOption::RiskScore),
            "Preop HGB" => Some(ExtraPairOption::PreopHgb),
            "Postop HGB" => Some(ExtraPairOption::PostopHgb),
            other => Outcome::ALL
                .iter()
                .copied()
                .find(|o| o.label() == other)
                .map(ExtraPairOption::OutcomeRate),
        }
    }

    pub fn kind(self) -> ExtraPairKind {
        match self {
            ExtraPairOption::TotalTransfusion | ExtraPairOption::PerCase => ExtraPairKind::BarChart,
            ExtraPairOption::ZeroTransfusion => ExtraPairKind::Basic,
            ExtraPairOption::OutcomeRate(_) => ExtraPairKind::Outcomes,
            ExtraPairOption::RiskScore
            | ExtraPairOption::PreopHgb
            | ExtraPairOption::PostopHgb => ExtraPairKind::Violin,
        }
    }

    pub fn label(self) -> String {
        match self {
            ExtraPairOption::TotalTransfusion => "Total Transfusion".to_string(),
            ExtraPairOption::PerCase => "Per Case".to_string(),
            ExtraPairOption::ZeroTransfusion => "Zero Transfusion".to_string(),
            ExtraPairOption::OutcomeRate(outcome) => outcome.label().to_string(),
            ExtraPairOption::RiskScore => "RISK".to_string(),
            ExtraPairOption::PreopHgb => "Preop HGB".to_string(),
            ExtraPairOption::PostopHgb => "Postop HGB".to_string(),
        }
    }

}

/// Per-group payload, shaped by the option kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExtraPairValue {
    Bar {
        value: Option<f64>,
    },
    Basic {
        actual_val: f64,
        calculated: Option<f64>,
        out_of_total: usize,
    },
    Violin {
        density: DensityDisplay,
        median: Option<f64>,
    },
    Outcomes(OutcomeSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPairResult {
    pub label: String,
    pub kind: ExtraPairKind,
    pub per_group: BTreeMap<GroupKey, ExtraPairValue>,
}

/// Resolve each requested option name and build its per-group values.
/// Names outside the supported set are ignored.
pub fn build_extra_pairs(
    names: &[String],
    groups: &[ResolvedGroup<'_>],
    ctx: &AggregateContext,
) -> Vec<ExtraPairResult> {
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        match ExtraPairOption::from_name(name) {
            Some(option) => results.push(build_one(option, groups, ctx)),
            None => warn!("ignoring unknown extra-pair option {name:?}"),
        }
    }
    results
}

fn build_one(
    option: ExtraPairOption,
    groups: &[ResolvedGroup<'_>],
    ctx: &AggregateContext,
) -> ExtraPairResult {
    let mut per_group = BTreeMap::new();
    for group in groups {
        let value = match option {
            ExtraPairOption::TotalTransfusion => ExtraPairValue::Bar {
                value: Some(summary::summarize_units(&group.records, ctx.product).total),
            },
            ExtraPairOption::PerCase => ExtraPairValue::Bar {
                value: summary::summarize_units(&group.records, ctx.product).mean,
            },
            ExtraPairOption::ZeroTransfusion => {
                let binned = binning::bin_units(&group.records, ctx.product, ctx.cap);
                ExtraPairValue::Basic {
                    actual_val: binned.zero_count as f64,
                    calculated: ratio(binned.zero_count as f64, group.records.len()),
                    out_of_total: group.records.len(),
                }
            }
            ExtraPairOption::OutcomeRate(outcome) => {
                ExtraPairValue::Outcomes(summary::summarize_outcome(&group.records, outcome))
            }
            ExtraPairOption::RiskScore => violin_value(group, ContinuousField::RiskScore, ctx),
            ExtraPairOption::PreopHgb => violin_value(group, ContinuousField::PreopHgb, ctx),
            ExtraPairOption::PostopHgb => violin_value(group, ContinuousField::PostopHgb, ctx),
        };
        per_group.insert(group.key.clone(), value);
    }

    ExtraPairResult {
        label: option.label(),
        kind: option.kind(),
        per_group,
    }
}

/// Violin payload for one group. Goes through `density_input` so the
/// zero-inclusion toggle applies to side-panel violins exactly as it does
/// to the main chart.
fn violin_value(
    group: &ResolvedGroup<'_>,
    field: ContinuousField,
    ctx: &AggregateContext,
) -> ExtraPairValue {
    let violin_ctx = AggregateContext {
        density_field: field,
        ..ctx.clone()
    };
    let values = density_input(&group.records, &violin_ctx);
    ExtraPairValue::Violin {
        density: density::estimate_density(&values, ctx.bandwidth, field.domain_max()),
        median: median(&values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::density::DEFAULT_BANDWIDTH;
    use crate::aggregation::grouping::resolve_groups;
    use crate::aggregation::test_support::blank_case;
    use crate::models::{BloodProduct, CaseRecord, GroupingAttribute};

    fn ctx() -> AggregateContext {
        AggregateContext {
            product: BloodProduct::Prbc,
            cap: 5,
            density_field: ContinuousField::PreopHgb,
            bandwidth: DEFAULT_BANDWIDTH,
            include_zero_cases: true,
        }
    }

    fn cohort() -> Vec<CaseRecord> {
        (0..6)
            .map(|i| {
                let mut c = blank_case(i);
                c.surgeon_id = if i < 3 { 100 } else { 200 };
                c.prbc_units = i as u32;
                c.death = i == 0;
                c.drg_weight = Some(1.0 + i as f64);
                c
            })
            .collect()
    }

    #[test]
    fn option_names_resolve_to_the_closed_set() {
        assert_eq!(
            ExtraPairOption::from_name("Total Transfusion"),
            Some(ExtraPairOption::TotalTransfusion)
        );
        assert_eq!(
            ExtraPairOption::from_name("ECMO"),
            Some(ExtraPairOption::OutcomeRate(Outcome::Ecmo))
        );
        assert_eq!(ExtraPairOption::from_name("Shoe Size"), None);
    }

    #[test]
    fn unknown_options_are_skipped_not_fatal() {
        let owned = cohort();
        let groups = resolve_groups(&owned, GroupingAttribute::SurgeonId);
        let names = vec![
            "Total Transfusion".to_string(),
            "Shoe Size".to_string(),
            "Death".to_string(),
        ];
        let results = build_extra_pairs(&names, &groups, &ctx());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind, ExtraPairKind::BarChart);
        assert_eq!(results[1].kind, ExtraPairKind::Outcomes);
    }

    #[test]
    fn every_group_gets_a_value() {
        let owned = cohort();
        let groups = resolve_groups(&owned, GroupingAttribute::SurgeonId);
        let results = build_extra_pairs(&["Zero Transfusion".to_string()], &groups, &ctx());
        assert_eq!(results[0].per_group.len(), groups.len());
    }

    #[test]
    fn zero_transfusion_rates() {
        let owned = cohort();
        let groups = resolve_groups(&owned, GroupingAttribute::SurgeonId);
        let results = build_extra_pairs(&["Zero Transfusion".to_string()], &groups, &ctx());

        // surgeon 100 holds cases 0,1,2 -> one zero-transfusion case
        let ExtraPairValue::Basic {
            actual_val,
            calculated,
            out_of_total,
        } = &results[0].per_group["100"]
        else {
            panic!("expected basic payload");
        };
        assert_eq!(*actual_val, 1.0);
        assert_eq!(*calculated, Some(1.0 / 3.0));
        assert_eq!(*out_of_total, 3);
    }

    #[test]
    fn zero_toggle_filters_violin_inputs_too() {
        // one surgeon, half the cases without a transfusion, all with a
        // recorded preop hemoglobin
        let owned: Vec<CaseRecord> = (0..10)
            .map(|i| {
                let mut c = blank_case(i);
                c.prbc_units = if i < 5 { 0 } else { 2 };
                c.preop_hgb = Some(9.0 + i as f64 * 0.7);
                c
            })
            .collect();
        let groups = resolve_groups(&owned, GroupingAttribute::SurgeonId);
        let without_zero = AggregateContext {
            include_zero_cases: false,
            ..ctx()
        };

        let a = build_extra_pairs(&["Preop HGB".to_string()], &groups, &ctx());
        let b = build_extra_pairs(&["Preop HGB".to_string()], &groups, &without_zero);
        assert_ne!(a, b);

        // 10 qualifying values with zeros included, 5 without
        let ExtraPairValue::Violin { density, .. } = &a[0].per_group["1"] else {
            panic!("expected violin payload");
        };
        assert!(matches!(density, DensityDisplay::Curve(_)));
        let ExtraPairValue::Violin { density, .. } = &b[0].per_group["1"] else {
            panic!("expected violin payload");
        };
        match density {
            DensityDisplay::Points(points) => assert_eq!(points.len(), 5),
            DensityDisplay::Curve(_) => panic!("zero-transfusion cases should be filtered"),
        }
    }

    #[test]
    fn violin_option_reports_median_and_density() {
        let owned = cohort();
        let groups = resolve_groups(&owned, GroupingAttribute::SurgeonId);
        let results = build_extra_pairs(&["RISK".to_string()], &groups, &ctx());
        let ExtraPairValue::Violin { median, density } = &results[0].per_group["100"] else {
            panic!("expected violin payload");
        };
        assert_eq!(*median, Some(2.0));
        // 3 values -> insufficient for a curve
        assert!(matches!(density, DensityDisplay::Points(_)));
    }
}
