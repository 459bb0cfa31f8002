//! Capped count binning. Discrete products bin onto the integers
//! `[0, cap]`; the volume product (cell-salvage mL) bins onto a sentinel
//! "exact zero" key plus 100-unit bands. Binning is total: every record
//! lands in exactly one bin, values above the cap clamp into the terminal
//! bin, nothing is dropped.

use crate::models::{BloodProduct, CaseRecord, CountDictionary};

/// Width of one volume band in millilitres.
pub const VOLUME_BAND_WIDTH: u32 = 100;

/// Bin key reserved for "exactly zero" in volume binning.
pub const ZERO_SENTINEL_BIN: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinnedCounts {
    pub bins: CountDictionary,
    /// Records that binned into the zero key (or the volume sentinel).
    pub zero_count: usize,
}

pub fn bin_units(records: &[&CaseRecord], product: BloodProduct, cap: u32) -> BinnedCounts {
    if product.is_volume() {
        bin_volume(records, product, cap)
    } else {
        bin_discrete(records, product, cap)
    }
}

fn bin_discrete(records: &[&CaseRecord], product: BloodProduct, cap: u32) -> BinnedCounts {
    // Prefill the whole domain so charts see every bin, counted or not.
    let mut bins: CountDictionary = (0..=cap as i32).map(|key| (key, 0)).collect();
    let mut zero_count = 0;

    for record in records {
        let raw = record.units(product);
        let key = raw.min(cap) as i32;
        if key == 0 {
            zero_count += 1;
        }
        *bins.entry(key).or_insert(0) += 1;
    }

    BinnedCounts { bins, zero_count }
}

fn bin_volume(records: &[&CaseRecord], product: BloodProduct, cap: u32) -> BinnedCounts {
    let cap_band = cap - cap % VOLUME_BAND_WIDTH;
    let mut bins: CountDictionary = std::iter::once((ZERO_SENTINEL_BIN, 0))
        .chain((0..=cap_band).step_by(VOLUME_BAND_WIDTH as usize).map(|band| (band as i32, 0)))
        .collect();
    let mut zero_count = 0;

    for record in records {
        let raw = record.units(product);
        let key = if raw == 0 {
            zero_count += 1;
            ZERO_SENTINEL_BIN
        } else {
            let band = raw - raw % VOLUME_BAND_WIDTH;
            band.min(cap_band) as i32
        };
        *bins.entry(key).or_insert(0) += 1;
    }

    BinnedCounts { bins, zero_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::test_support::blank_case;

    fn cases_with_prbc(units: &[u32]) -> Vec<crate::models::CaseRecord> {
        units
            .iter()
            .enumerate()
            .map(|(i, &u)| {
                let mut c = blank_case(i as i64);
                c.prbc_units = u;
                c
            })
            .collect()
    }

    fn cases_with_salvage(volumes: &[u32]) -> Vec<crate::models::CaseRecord> {
        volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut c = blank_case(i as i64);
                c.cell_saver_ml = v;
                c
            })
            .collect()
    }

    #[test]
    fn discrete_binning_matches_reference_example() {
        // cap 5, raw [0, 2, 6] -> {0:1, 1:0, 2:1, 3:0, 4:0, 5:1}
        let owned = cases_with_prbc(&[0, 2, 6]);
        let records: Vec<_> = owned.iter().collect();
        let binned = bin_units(&records, BloodProduct::Prbc, 5);

        let expected: Vec<(i32, u32)> = vec![(0, 1), (1, 0), (2, 1), (3, 0), (4, 0), (5, 1)];
        assert_eq!(binned.bins.iter().map(|(&k, &v)| (k, v)).collect::<Vec<_>>(), expected);
        assert_eq!(binned.zero_count, 1);
    }

    #[test]
    fn bin_counts_sum_to_record_count() {
        let owned = cases_with_prbc(&[0, 1, 1, 3, 7, 12, 2]);
        let records: Vec<_> = owned.iter().collect();
        let binned = bin_units(&records, BloodProduct::Prbc, 5);
        let total: u32 = binned.bins.values().sum();
        assert_eq!(total as usize, records.len());
    }

    #[test]
    fn volume_binning_uses_sentinel_and_bands() {
        let owned = cases_with_salvage(&[0, 150, 1200, 50]);
        let records: Vec<_> = owned.iter().collect();
        let binned = bin_units(&records, BloodProduct::CellSaverMl, 1000);

        assert_eq!(binned.bins[&ZERO_SENTINEL_BIN], 1);
        assert_eq!(binned.bins[&100], 1); // 150 rounds down
        assert_eq!(binned.bins[&1000], 1); // 1200 clamps to the cap band
        assert_eq!(binned.bins[&0], 1); // 50 is nonzero but below one band
        assert_eq!(binned.zero_count, 1);
    }

    #[test]
    fn volume_domain_is_prefilled() {
        let binned = bin_units(&[], BloodProduct::CellSaverMl, 1000);
        // sentinel + bands 0, 100, ..., 1000
        assert_eq!(binned.bins.len(), 12);
        assert!(binned.bins.values().all(|&v| v == 0));
    }

    #[test]
    fn zero_count_never_exceeds_case_count() {
        let owned = cases_with_prbc(&[0, 0, 4]);
        let records: Vec<_> = owned.iter().collect();
        let binned = bin_units(&records, BloodProduct::Prbc, 5);
        assert!(binned.zero_count <= records.len());
        assert_eq!(binned.zero_count, 2);
    }
}
