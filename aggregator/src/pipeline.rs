//! Pipeline orchestration. `recompute` is the single entry point the
//! reactive shell calls on every relevant input change: it rebuilds every
//! chart series from scratch and the caller replaces its previous output
//! wholesale. There are no caches and no interior mutability; identical
//! inputs produce deep-equal outputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::comparison::{compare_group, ComparisonPredicate};
use crate::aggregation::cost::project_costs;
use crate::aggregation::density::{KdeMaxTracker, DEFAULT_BANDWIDTH};
use crate::aggregation::extra_pair::{build_extra_pairs, ExtraPairResult};
use crate::aggregation::grouping::resolve_groups;
use crate::aggregation::{build_aggregate, AggregateContext};
use crate::models::{
    AggregateGroup, BloodProduct, CaseRecord, ComparisonGroup, ContinuousField, CostBreakdown,
    CostTable, GroupKey, GroupingAttribute, ProductCaps,
};

/// Everything the reactive shell owns and the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub grouping: GroupingAttribute,
    pub target_product: BloodProduct,
    pub density_field: ContinuousField,
    pub caps: ProductCaps,
    pub cost_table: CostTable,
    pub include_zero_cases: bool,
    pub cost_mode: bool,
    pub bandwidth: f64,
    pub comparison: Option<ComparisonPredicate>,
    pub extra_pairs: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            grouping: GroupingAttribute::SurgeonId,
            target_product: BloodProduct::Prbc,
            density_field: ContinuousField::PreopHgb,
            caps: ProductCaps::default(),
            cost_table: CostTable::default(),
            include_zero_cases: true,
            cost_mode: false,
            bandwidth: DEFAULT_BANDWIDTH,
            comparison: None,
            extra_pairs: Vec::new(),
        }
    }
}

/// Primary chart series: plain groups, or pre/post comparison groups when
/// a comparison predicate is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "groups")]
pub enum PipelineSeries {
    Single(Vec<AggregateGroup>),
    Comparison(Vec<ComparisonGroup>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCost {
    pub group_key: GroupKey,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub series: PipelineSeries,
    /// Maximum curve density across all groups, so violins share one scale.
    pub kde_max: f64,
    pub costs: Vec<GroupCost>,
    pub extra_pairs: Vec<ExtraPairResult>,
}

/// Recompute every chart input from a record snapshot and configuration.
pub fn recompute(records: &[CaseRecord], config: &PipelineConfig) -> PipelineOutput {
    let groups = resolve_groups(records, config.grouping);
    debug!(
        "recompute: {} records, {} groups, target {}",
        records.len(),
        groups.len(),
        config.target_product.label()
    );

    let ctx = AggregateContext {
        product: config.target_product,
        cap: config.caps.cap(config.target_product),
        density_field: config.density_field,
        bandwidth: config.bandwidth,
        include_zero_cases: config.include_zero_cases,
    };

    let mut kde_max = KdeMaxTracker::new();
    let series = match &config.comparison {
        None => PipelineSeries::Single(
            groups
                .iter()
                .map(|group| {
                    let aggregate = build_aggregate(&group.records, &ctx);
                    kde_max.observe(&aggregate.density);
                    AggregateGroup {
                        group_key: group.key.clone(),
                        aggregate,
                    }
                })
                .collect(),
        ),
        Some(predicate) => PipelineSeries::Comparison(
            groups
                .iter()
                .map(|group| {
                    let compared =
                        compare_group(group.key.clone(), &group.records, predicate, &ctx);
                    kde_max.observe(&compared.combined.density);
                    kde_max.observe(&compared.pre.density);
                    kde_max.observe(&compared.post.density);
                    compared
                })
                .collect(),
        ),
    };

    let costs = groups
        .iter()
        .map(|group| GroupCost {
            group_key: group.key.clone(),
            breakdown: project_costs(&group.records, &config.cost_table, config.cost_mode),
        })
        .collect();

    let extra_pairs = build_extra_pairs(&config.extra_pairs, &groups, &ctx);

    PipelineOutput {
        series,
        kde_max: kde_max.value(),
        costs,
        extra_pairs,
    }
}
