//! CSV case-record loader. One row per case; binary flags are 0/1 columns
//! and unset continuous measurements are empty cells, which deserialize to
//! `None` rather than zero.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::models::CaseRecord;

use super::retrieval::{CaseQuery, CaseRecordSource};

#[derive(Debug, Deserialize)]
struct CaseRow {
    case_id: i64,
    patient_id: i64,
    surgeon_id: i64,
    anesthesiologist_id: i64,
    year: i32,
    quarter: u8,
    month: u8,
    surgery_type: String,
    case_date: NaiveDate,
    prbc_units: u32,
    ffp_units: u32,
    plt_units: u32,
    cryo_units: u32,
    cell_saver_ml: u32,
    death: u8,
    vent: u8,
    ecmo: u8,
    stroke: u8,
    b12: u8,
    txa: u8,
    amicar: u8,
    drg_weight: Option<f64>,
    preop_hgb: Option<f64>,
    postop_hgb: Option<f64>,
}

impl From<CaseRow> for CaseRecord {
    fn from(row: CaseRow) -> Self {
        CaseRecord {
            case_id: row.case_id,
            patient_id: row.patient_id,
            surgeon_id: row.surgeon_id,
            anesthesiologist_id: row.anesthesiologist_id,
            year: row.year,
            quarter: row.quarter,
            month: row.month,
            surgery_type: row.surgery_type,
            case_date: row.case_date,
            prbc_units: row.prbc_units,
            ffp_units: row.ffp_units,
            plt_units: row.plt_units,
            cryo_units: row.cryo_units,
            cell_saver_ml: row.cell_saver_ml,
            death: row.death != 0,
            vent: row.vent != 0,
            ecmo: row.ecmo != 0,
            stroke: row.stroke != 0,
            b12: row.b12 != 0,
            txa: row.txa != 0,
            amicar: row.amicar != 0,
            drg_weight: row.drg_weight,
            preop_hgb: row.preop_hgb,
            postop_hgb: row.postop_hgb,
        }
    }
}

/// CSV-backed case source.
pub struct CsvCaseSource {
    pub path: PathBuf,
}

impl CsvCaseSource {
    pub fn load(&self) -> Result<Vec<CaseRecord>> {
        info!("Reading case records from {}", self.path.display());
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut records = Vec::new();
        for row in reader.deserialize::<CaseRow>() {
            let row = row.with_context(|| format!("parsing {}", self.path.display()))?;
            records.push(CaseRecord::from(row));
        }
        info!("Loaded {} case records", records.len());
        Ok(records)
    }
}

impl CaseRecordSource for CsvCaseSource {
    fn fetch(&self, query: &CaseQuery) -> Result<Vec<CaseRecord>> {
        let records = self.load()?;
        let filtered: Vec<CaseRecord> = records
            .into_iter()
            .filter(|r| r.case_date >= query.date_from && r.case_date <= query.date_to)
            .filter(|r| {
                query
                    .surgery_type
                    .as_ref()
                    .map_or(true, |wanted| r.surgery_type == *wanted)
            })
            .collect();
        info!("{} case records match the query window", filtered.len());
        Ok(filtered)
    }
}
