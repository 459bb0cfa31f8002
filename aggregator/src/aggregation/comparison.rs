//! Comparison partitioning: split a cohort into two disjoint halves (pre/
//! post an intervention date, or outcome-negative/positive) and aggregate
//! each half independently. The unsplit aggregate is always produced too,
//! so the rendering layer can collapse the split when a cell is too small.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregation::{build_aggregate, AggregateContext};
use crate::models::{CaseRecord, ComparisonGroup, GroupKey, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComparisonPredicate {
    /// Cases dated on/after the intervention date land in the post half.
    Intervention(NaiveDate),
    /// Outcome-positive cases land in the post half.
    Outcome(Outcome),
}

impl ComparisonPredicate {
    pub fn is_post(&self, record: &CaseRecord) -> bool {
        match self {
            ComparisonPredicate::Intervention(date) => record.case_date >= *date,
            ComparisonPredicate::Outcome(outcome) => record.outcome(*outcome),
        }
    }
}

/// Split `records` into (pre, post). Union equals the input, intersection
/// is empty by construction.
pub fn partition<'a>(
    records: &[&'a CaseRecord],
    predicate: &ComparisonPredicate,
) -> (Vec<&'a CaseRecord>, Vec<&'a CaseRecord>) {
    records.iter().copied().partition(|r| !predicate.is_post(r))
}

pub fn compare_group(
    group_key: GroupKey,
    records: &[&CaseRecord],
    predicate: &ComparisonPredicate,
    ctx: &AggregateContext,
) -> ComparisonGroup {
    let (pre, post) = partition(records, predicate);
    ComparisonGroup {
        group_key,
        combined: build_aggregate(records, ctx),
        pre: build_aggregate(&pre, ctx),
        post: build_aggregate(&post, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::density::DEFAULT_BANDWIDTH;
    use crate::aggregation::test_support::blank_case;
    use crate::models::{BloodProduct, ContinuousField};

    fn ctx() -> AggregateContext {
        AggregateContext {
            product: BloodProduct::Prbc,
            cap: 5,
            density_field: ContinuousField::PreopHgb,
            bandwidth: DEFAULT_BANDWIDTH,
            include_zero_cases: true,
        }
    }

    fn dated_cohort() -> Vec<CaseRecord> {
        (0..10)
            .map(|i| {
                let mut c = blank_case(i);
                c.prbc_units = i as u32 % 3;
                c.case_date = NaiveDate::from_ymd_opt(2020, 1 + i as u32, 1).expect("valid date");
                c
            })
            .collect()
    }

    #[test]
    fn halves_partition_the_cohort() {
        let owned = dated_cohort();
        let records: Vec<_> = owned.iter().collect();
        let cutoff = NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date");
        let predicate = ComparisonPredicate::Intervention(cutoff);

        let (pre, post) = partition(&records, &predicate);
        assert_eq!(pre.len() + post.len(), records.len());
        assert!(pre.iter().all(|r| r.case_date < cutoff));
        assert!(post.iter().all(|r| r.case_date >= cutoff));
    }

    #[test]
    fn comparison_group_counts_add_up() {
        let owned = dated_cohort();
        let records: Vec<_> = owned.iter().collect();
        let predicate = ComparisonPredicate::Intervention(
            NaiveDate::from_ymd_opt(2020, 4, 1).expect("valid date"),
        );

        let group = compare_group("2020".to_string(), &records, &predicate, &ctx());
        assert_eq!(
            group.pre.case_count + group.post.case_count,
            group.combined.case_count
        );
        assert_eq!(
            group.pre.total_value + group.post.total_value,
            group.combined.total_value
        );
    }

    #[test]
    fn outcome_predicate_splits_by_flag() {
        let mut owned = dated_cohort();
        owned[0].stroke = true;
        owned[3].stroke = true;
        let records: Vec<_> = owned.iter().collect();

        let predicate = ComparisonPredicate::Outcome(Outcome::Stroke);
        let (negative, positive) = partition(&records, &predicate);
        assert_eq!(positive.len(), 2);
        assert_eq!(negative.len(), 8);
    }

    #[test]
    fn id_sets_stay_disjoint_across_halves() {
        let owned = dated_cohort();
        let records: Vec<_> = owned.iter().collect();
        let predicate = ComparisonPredicate::Intervention(
            NaiveDate::from_ymd_opt(2020, 5, 1).expect("valid date"),
        );
        let group = compare_group("2020".to_string(), &records, &predicate, &ctx());

        assert!(group.pre.case_ids.is_disjoint(&group.post.case_ids));
        let union: std::collections::BTreeSet<_> =
            group.pre.case_ids.union(&group.post.case_ids).copied().collect();
        assert_eq!(union, group.combined.case_ids);
    }
}
