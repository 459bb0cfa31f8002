//! Aggregation key resolution: partition a flat case list by the chosen
//! grouping attribute. Each record lands in exactly one group; group order
//! is deterministic (sorted by key).

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CaseId, CaseRecord, GroupKey, GroupingAttribute, PatientId};

/// One cohort: all records sharing a grouping-attribute value.
#[derive(Debug, Clone)]
pub struct ResolvedGroup<'a> {
    pub key: GroupKey,
    pub records: Vec<&'a CaseRecord>,
}

impl ResolvedGroup<'_> {
    pub fn patient_ids(&self) -> BTreeSet<PatientId> {
        patient_ids(&self.records)
    }

    pub fn case_ids(&self) -> BTreeSet<CaseId> {
        case_ids(&self.records)
    }
}

/// Partition `records` by `attribute`. An empty input (or an attribute with
/// no values, which cannot occur with typed accessors) yields an empty
/// result rather than an error.
pub fn resolve_groups(
    records: &[CaseRecord],
    attribute: GroupingAttribute,
) -> Vec<ResolvedGroup<'_>> {
    let mut grouped: BTreeMap<GroupKey, Vec<&CaseRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(attribute.key_of(record))
            .or_default()
            .push(record);
    }
    grouped
        .into_iter()
        .map(|(key, records)| ResolvedGroup { key, records })
        .collect()
}

pub fn patient_ids(records: &[&CaseRecord]) -> BTreeSet<PatientId> {
    records.iter().map(|r| r.patient_id).collect()
}

pub fn case_ids(records: &[&CaseRecord]) -> BTreeSet<CaseId> {
    records.iter().map(|r| r.case_id).collect()
}
