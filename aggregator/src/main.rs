use std::env;
use std::fs::File;

use anyhow::Result;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use aggregator::aggregation::comparison::ComparisonPredicate;
use aggregator::data_handling::case_loading::CsvCaseSource;
use aggregator::helper_functions::results_dir;
use aggregator::models::{CaseRecord, GroupingAttribute};
use aggregator::pipeline::{recompute, PipelineConfig, PipelineSeries};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting the transfusion aggregation pipeline");

    let records = match env::var("CASE_CSV") {
        Ok(path) => CsvCaseSource { path: path.into() }.load()?,
        Err(_) => {
            info!("CASE_CSV not set, synthesizing a demo cohort");
            synthesize_cohort(600)
        }
    };

    let out_dir = results_dir();
    std::fs::create_dir_all(&out_dir)?;

    // Per-surgeon PRBC view with the usual side panels
    let config = PipelineConfig {
        extra_pairs: vec![
            "Total Transfusion".to_string(),
            "Zero Transfusion".to_string(),
            "Preop HGB".to_string(),
            "Death".to_string(),
            "RISK".to_string(),
        ],
        ..PipelineConfig::default()
    };
    let output = recompute(&records, &config);
    let group_count = match &output.series {
        PipelineSeries::Single(groups) => groups.len(),
        PipelineSeries::Comparison(groups) => groups.len(),
    };
    info!(
        "surgeon/PRBC view: {} groups, kde_max {:.4}",
        group_count, output.kde_max
    );
    serde_json::to_writer_pretty(File::create(out_dir.join("surgeon_prbc.json"))?, &output)?;

    // Yearly pre/post intervention comparison with cost projection
    let intervention = NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date");
    let config = PipelineConfig {
        grouping: GroupingAttribute::Year,
        comparison: Some(ComparisonPredicate::Intervention(intervention)),
        cost_mode: true,
        extra_pairs: vec!["Per Case".to_string(), "TXA".to_string()],
        ..PipelineConfig::default()
    };
    let output = recompute(&records, &config);
    info!(
        "yearly comparison view: {} cost rows, kde_max {:.4}",
        output.costs.len(),
        output.kde_max
    );
    serde_json::to_writer_pretty(
        File::create(out_dir.join("yearly_comparison.json"))?,
        &output,
    )?;

    info!("Wrote chart inputs to {}", out_dir.display());
    Ok(())
}

/// Random but reproducible cohort for demo runs without a data export.
fn synthesize_cohort(n: usize) -> Vec<CaseRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    let surgery_types = ["CABG", "AVR", "MVR", "Transplant"];

    (0..n)
        .map(|i| {
            let year = rng.gen_range(2016..=2021);
            let month = rng.gen_range(1u32..=12);
            let day = rng.gen_range(1u32..=28);
            let used_salvage = rng.gen_bool(0.35);
            CaseRecord {
                case_id: i as i64,
                patient_id: rng.gen_range(1..=400),
                surgeon_id: rng.gen_range(100..=112),
                anesthesiologist_id: rng.gen_range(200..=220),
                year,
                quarter: (month as u8 - 1) / 3 + 1,
                month: month as u8,
                surgery_type: surgery_types[rng.gen_range(0..surgery_types.len())].to_string(),
                case_date: NaiveDate::from_ymd_opt(year, month, day).expect("valid date"),
                prbc_units: rng.gen_range(0..=8),
                ffp_units: rng.gen_range(0..=6),
                plt_units: rng.gen_range(0..=4),
                cryo_units: rng.gen_range(0..=3),
                cell_saver_ml: if used_salvage {
                    rng.gen_range(1..=14) * 100
                } else {
                    0
                },
                death: rng.gen_bool(0.03),
                vent: rng.gen_bool(0.12),
                ecmo: rng.gen_bool(0.02),
                stroke: rng.gen_bool(0.04),
                b12: rng.gen_bool(0.20),
                txa: rng.gen_bool(0.45),
                amicar: rng.gen_bool(0.25),
                drg_weight: if rng.gen_bool(0.9) {
                    Some(rng.gen_range(1.0..12.0))
                } else {
                    None
                },
                preop_hgb: if rng.gen_bool(0.95) {
                    Some(rng.gen_range(8.0..16.5))
                } else {
                    None
                },
                postop_hgb: if rng.gen_bool(0.95) {
                    Some(rng.gen_range(7.0..14.0))
                } else {
                    None
                },
            }
        })
        .collect()
}
