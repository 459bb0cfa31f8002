//! Cost projection: per-case unit averages, dollar conversion through the
//! runtime-adjustable cost table, and the cell-salvage savings derivation.

use crate::aggregation::summary::corrected_value;
use crate::models::{BloodProduct, CaseRecord, CostBreakdown, CostTable};

/// Millilitres of salvaged blood treated as equivalent to one PRBC unit
/// when deriving potential savings.
pub const SALVAGE_ML_PER_UNIT: f64 = 200.0;

/// Project per-product values for one group. In cost mode each element is
/// `units_per_case * cost_per_unit`; in unit mode it is plain
/// `units_per_case`. Cell salvage contributes `usage_rate * cost_per_case`
/// in cost mode (it is priced per case used, not per millilitre) and
/// volume-per-case in unit mode. Empty groups yield all-`None` instead of
/// dividing by zero.
pub fn project_costs(
    records: &[&CaseRecord],
    table: &CostTable,
    cost_mode: bool,
) -> CostBreakdown {
    let case_count = records.len();
    let mut per_product: [Option<f64>; 5] = [None; 5];
    if case_count == 0 {
        return CostBreakdown {
            per_product,
            salvage_savings: None,
        };
    }

    let volume_per_case = records
        .iter()
        .map(|r| r.cell_saver_ml as f64)
        .sum::<f64>()
        / case_count as f64;

    for product in BloodProduct::ALL {
        let value = if product.is_volume() {
            let used = records.iter().filter(|r| r.cell_saver_ml > 0).count();
            let usage_rate = used as f64 / case_count as f64;
            if cost_mode {
                usage_rate * table.cost(product)
            } else {
                volume_per_case
            }
        } else {
            let total: f64 = records
                .iter()
                .map(|r| corrected_value(product, r.units(product)))
                .sum();
            let per_case = total / case_count as f64;
            if cost_mode {
                per_case * table.cost(product)
            } else {
                per_case
            }
        };
        per_product[product.index()] = Some(value);
    }

    // Savings a full-salvage policy would have realized; negative when the
    // salvage program cost more than the displaced PRBC units.
    let salvage_savings = if cost_mode {
        let potential =
            volume_per_case / SALVAGE_ML_PER_UNIT * table.cost(BloodProduct::Prbc);
        let actual = per_product[BloodProduct::CellSaverMl.index()].unwrap_or(0.0);
        Some(potential - actual)
    } else {
        None
    };

    CostBreakdown {
        per_product,
        salvage_savings,
    }
}
