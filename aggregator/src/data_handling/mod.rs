//! Case-record ingest and the retrieval boundary.

pub mod case_loading;
pub mod retrieval;
