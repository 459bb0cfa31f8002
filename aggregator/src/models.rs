//! Shared data model for the transfusion aggregation pipeline.
//!
//! Everything the chart layer consumes is defined here: the flat
//! `CaseRecord` input, the closed attribute enums with typed accessors,
//! and the aggregate output structures. Ordered collections
//! (`BTreeMap`/`BTreeSet`) keep serialized output deterministic.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type CaseId = i64;
pub type PatientId = i64;

/// Group keys are rendered labels; every grouping attribute formats into one.
pub type GroupKey = String;

/// Bin key -> count over a contiguous domain `[0, cap]`, or the sentinel
/// key `-1` plus 100-unit bands for the volume product.
pub type CountDictionary = BTreeMap<i32, u32>;

/// One surgical case, already filtered upstream by date range / cohort.
///
/// Continuous fields that were never recorded stay `None` and are excluded
/// from aggregates rather than coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: CaseId,
    pub patient_id: PatientId,
    pub surgeon_id: i64,
    pub anesthesiologist_id: i64,
    pub year: i32,
    pub quarter: u8,
    pub month: u8,
    pub surgery_type: String,
    pub case_date: NaiveDate,
    pub prbc_units: u32,
    pub ffp_units: u32,
    pub plt_units: u32,
    pub cryo_units: u32,
    pub cell_saver_ml: u32,
    pub death: bool,
    pub vent: bool,
    pub ecmo: bool,
    pub stroke: bool,
    pub b12: bool,
    pub txa: bool,
    pub amicar: bool,
    pub drg_weight: Option<f64>,
    pub preop_hgb: Option<f64>,
    pub postop_hgb: Option<f64>,
}

impl CaseRecord {
    /// Raw transfused quantity for a product, exactly as recorded upstream.
    pub fn units(&self, product: BloodProduct) -> u32 {
        match product {
            BloodProduct::Prbc => self.prbc_units,
            BloodProduct::Ffp => self.ffp_units,
            BloodProduct::Plt => self.plt_units,
            BloodProduct::Cryo => self.cryo_units,
            BloodProduct::CellSaverMl => self.cell_saver_ml,
        }
    }

    pub fn outcome(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Death => self.death,
            Outcome::Vent => self.vent,
            Outcome::Ecmo => self.ecmo,
            Outcome::Stroke => self.stroke,
            Outcome::B12 => self.b12,
            Outcome::Txa => self.txa,
            Outcome::Amicar => self.amicar,
        }
    }
}

/// The five tracked blood products. `CellSaverMl` is the single
/// volume-valued product (millilitres, not discrete units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodProduct {
    Prbc,
    Ffp,
    Plt,
    Cryo,
    CellSaverMl,
}

impl BloodProduct {
    pub const ALL: [BloodProduct; 5] = [
        BloodProduct::Prbc,
        BloodProduct::Ffp,
        BloodProduct::Plt,
        BloodProduct::Cryo,
        BloodProduct::CellSaverMl,
    ];

    /// Position in the ordered 5-element arrays (`CostTable`, `CostBreakdown`).
    pub fn index(self) -> usize {
        match self {
            BloodProduct::Prbc => 0,
            BloodProduct::Ffp => 1,
            BloodProduct::Plt => 2,
            BloodProduct::Cryo => 3,
            BloodProduct::CellSaverMl => 4,
        }
    }

    pub fn is_volume(self) -> bool {
        matches!(self, BloodProduct::CellSaverMl)
    }

    pub fn label(self) -> &'static str {
        match self {
            BloodProduct::Prbc => "PRBC_UNITS",
            BloodProduct::Ffp => "FFP_UNITS",
            BloodProduct::Plt => "PLT_UNITS",
            BloodProduct::Cryo => "CRYO_UNITS",
            BloodProduct::CellSaverMl => "CELL_SAVER_ML",
        }
    }
}

/// Attribute a chart groups cases by. Replaces dynamic string-keyed record
/// lookups with a closed accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupingAttribute {
    SurgeonId,
    AnesthesiologistId,
    Year,
    Quarter,
    Month,
    SurgeryType,
}

impl GroupingAttribute {
    pub fn key_of(self, record: &CaseRecord) -> GroupKey {
        match self {
            GroupingAttribute::SurgeonId => record.surgeon_id.to_string(),
            GroupingAttribute::AnesthesiologistId => record.anesthesiologist_id.to_string(),
            GroupingAttribute::Year => record.year.to_string(),
            GroupingAttribute::Quarter => format!("{}-Q{}", record.year, record.quarter),
            GroupingAttribute::Month => format!("{}-{:02}", record.year, record.month),
            GroupingAttribute::SurgeryType => record.surgery_type.clone(),
        }
    }
}

/// Binary per-case outcome flags, including the three intervention-adjunct
/// medication flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Death,
    Vent,
    Ecmo,
    Stroke,
    B12,
    Txa,
    Amicar,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Death,
        Outcome::Vent,
        Outcome::Ecmo,
        Outcome::Stroke,
        Outcome::B12,
        Outcome::Txa,
        Outcome::Amicar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Death => "Death",
            Outcome::Vent => "VENT",
            Outcome::Ecmo => "ECMO",
            Outcome::Stroke => "STROKE",
            Outcome::B12 => "B12",
            Outcome::Txa => "TXA",
            Outcome::Amicar => "AMICAR",
        }
    }
}

/// Continuous per-case measurements that feed the density estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousField {
    PreopHgb,
    PostopHgb,
    RiskScore,
}

impl ContinuousField {
    pub fn value_of(self, record: &CaseRecord) -> Option<f64> {
        match self {
            ContinuousField::PreopHgb => record.preop_hgb,
            ContinuousField::PostopHgb => record.postop_hgb,
            ContinuousField::RiskScore => record.drg_weight,
        }
    }

    /// Upper bound of the density domain for this field.
    pub fn domain_max(self) -> f64 {
        match self {
            ContinuousField::PreopHgb | ContinuousField::PostopHgb => 18.0,
            ContinuousField::RiskScore => 30.0,
        }
    }
}

/// Display caps per product; any raw value at or above the cap collapses
/// into the terminal bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCaps {
    pub prbc: u32,
    pub ffp: u32,
    pub plt: u32,
    pub cryo: u32,
    pub cell_saver_ml: u32,
}

impl ProductCaps {
    pub fn cap(&self, product: BloodProduct) -> u32 {
        match product {
            BloodProduct::Prbc => self.prbc,
            BloodProduct::Ffp => self.ffp,
            BloodProduct::Plt => self.plt,
            BloodProduct::Cryo => self.cryo,
            BloodProduct::CellSaverMl => self.cell_saver_ml,
        }
    }
}

impl Default for ProductCaps {
    fn default() -> Self {
        ProductCaps {
            prbc: 5,
            ffp: 10,
            plt: 10,
            cryo: 10,
            cell_saver_ml: 1000,
        }
    }
}

/// Per-unit dollar costs, user-adjustable at runtime. Cell salvage is
/// priced per case in which it was used rather than per millilitre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub per_unit: [f64; 5],
}

impl CostTable {
    pub fn cost(&self, product: BloodProduct) -> f64 {
        self.per_unit[product.index()]
    }
}

impl Default for CostTable {
    fn default() -> Self {
        CostTable {
            per_unit: [200.0, 55.0, 650.0, 70.0, 300.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Mirrored density curve: an ascending half starting and ending at
/// density 0, concatenated with its reversed, negated mirror, so
/// `points[i].y == -points[n-1-i].y` for all i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionCurve {
    pub points: Vec<CurvePoint>,
}

impl DistributionCurve {
    pub fn max_density(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(0.0, f64::max)
    }
}

/// What the violin layer should draw for one group: a mirrored curve, or
/// the raw qualifying values when there are too few for an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DensityDisplay {
    Curve(DistributionCurve),
    Points(Vec<f64>),
}

/// Full per-cohort summary shared by single and comparison series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub case_count: usize,
    pub zero_case_count: usize,
    /// Uncapped sum of the target-product values (sentinel-corrected).
    pub total_value: f64,
    pub bins: CountDictionary,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub patient_ids: BTreeSet<PatientId>,
    pub case_ids: BTreeSet<CaseId>,
    pub density: DensityDisplay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateGroup {
    pub group_key: GroupKey,
    pub aggregate: GroupAggregate,
}

/// A group split into two disjoint halves. For intervention comparisons the
/// halves are pre/post the intervention date; for outcome comparisons they
/// are the outcome-negative/positive subsets. The unsplit `combined`
/// aggregate is always produced so the rendering layer can fall back to it
/// when a cell is too small to draw both halves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonGroup {
    pub group_key: GroupKey,
    pub combined: GroupAggregate,
    pub pre: GroupAggregate,
    pub post: GroupAggregate,
}

/// Outcome-rate triple: raw positive count, rate over the group, and the
/// group size the rate is out of. `calculated` is `None` for empty groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub actual_val: f64,
    pub calculated: Option<f64>,
    pub out_of_total: usize,
}

/// Per-product dollar (cost mode) or per-case unit (unit mode) values in
/// `BloodProduct::index` order, plus the derived cell-salvage savings.
/// Elements are `None` for empty groups; `salvage_savings` is only
/// populated in cost mode and may legitimately be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub per_product: [Option<f64>; 5],
    pub salvage_savings: Option<f64>,
}
