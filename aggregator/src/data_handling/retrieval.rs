//! The retrieval boundary. Case records come from an upstream query
//! collaborator; transport, retries, and timeouts live on that side. The
//! core only enforces the stale-guard policy: a retrieval that was
//! superseded before it completed must never feed the aggregation
//! pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::models::CaseRecord;

/// Filter parameters the upstream query service accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseQuery {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub surgery_type: Option<String>,
}

/// The upstream query collaborator, already responsible for date-range and
/// cohort filtering.
pub trait CaseRecordSource {
    fn fetch(&self, query: &CaseQuery) -> Result<Vec<CaseRecord>>;
}

/// Generation counter guarding against stale retrievals. Issuing a new
/// ticket supersedes every outstanding one; `accept` only passes records
/// through for the newest ticket.
#[derive(Debug, Default)]
pub struct StaleGuard {
    generation: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalTicket {
    generation: u64,
}

impl StaleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new retrieval, invalidating all earlier tickets.
    pub fn begin(&self) -> RetrievalTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RetrievalTicket { generation }
    }

    pub fn is_current(&self, ticket: RetrievalTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Gate a completed retrieval. Superseded results are discarded, not
    /// treated as errors, and never handed to the pipeline.
    pub fn accept(&self, ticket: RetrievalTicket, records: Vec<CaseRecord>) -> Option<Vec<CaseRecord>> {
        if self.is_current(ticket) {
            Some(records)
        } else {
            debug!(
                "discarding stale retrieval (generation {} superseded)",
                ticket.generation
            );
            None
        }
    }
}
