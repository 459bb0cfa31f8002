//! Aggregation and distribution-estimation core for a blood-product
//! transfusion dashboard: capped histograms, mirrored kernel-density
//! curves, pre/post comparison splits, outcome-rate summaries, and cost
//! projections over per-case surgical records. Rendering, reactive state,
//! and HTTP transport are external collaborators.

pub mod aggregation;
pub mod data_handling;
pub mod helper_functions;
pub mod models;
pub mod pipeline;
