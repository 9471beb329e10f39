//! Drives one column enrichment from validation to notification.
use super::plan::{apply_failure, apply_success, begin_enrichment, EnrichmentPlan, SettleStats};
use super::transport::EnrichTransport;
use crate::error::EnrichError;
use crate::grid::Grid;
use crate::notify::{Notification, NotificationSink};
use crate::store::GridStore;
use serde::Serialize;
use std::time::Instant;

pub const MISSING_HEADER_MESSAGE: &str = "Please set the column header";
pub const SUCCESS_MESSAGE: &str = "Cells enriched";
pub const FAILURE_MESSAGE: &str = "Enrichment failed";
pub const COLUMN_REMOVED_MESSAGE: &str = "Column was removed before enrichment finished";

/// What a successful enrichment did to its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    pub column_name: String,
    /// Rows sent to the service, blank keys included.
    pub rows: usize,
    pub applied: usize,
    pub skipped_edited: usize,
}

/// Terminal state of one enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The response was written into the column.
    Applied(EnrichSummary),
    /// Refused before any cell changed and before any network call.
    Rejected(EnrichError),
    /// The call or its response failed; loading was cleared, data kept.
    Failed(EnrichError),
    /// The column was deleted while the request was in flight.
    ColumnRemoved,
    /// The store was disposed; nothing was applied or reported.
    Abandoned,
}

impl EnrichOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EnrichOutcome::Applied(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichOutcome::Applied(_) => "applied",
            EnrichOutcome::Rejected(_) => "rejected",
            EnrichOutcome::Failed(_) => "failed",
            EnrichOutcome::ColumnRemoved => "column_removed",
            EnrichOutcome::Abandoned => "abandoned",
        }
    }

    pub fn error(&self) -> Option<&EnrichError> {
        match self {
            EnrichOutcome::Rejected(err) | EnrichOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The notification this outcome is reported with, if any.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            EnrichOutcome::Applied(_) => Some(Notification::success(SUCCESS_MESSAGE)),
            EnrichOutcome::Rejected(EnrichError::MissingHeader { .. }) => {
                Some(Notification::error(MISSING_HEADER_MESSAGE))
            }
            EnrichOutcome::Rejected(err) => Some(Notification::error(err.to_string())),
            EnrichOutcome::Failed(_) => Some(Notification::error(FAILURE_MESSAGE)),
            EnrichOutcome::ColumnRemoved => Some(Notification::info(COLUMN_REMOVED_MESSAGE)),
            EnrichOutcome::Abandoned => None,
        }
    }
}

/// Runs enrichments through a transport and reports them to a sink.
///
/// The store lock is only held while planning and while settling, never
/// across the network call, so other mutations and other columns proceed
/// while a batch is in flight.
#[derive(Debug)]
pub struct Coordinator<T, S> {
    transport: T,
    sink: S,
}

impl<T: EnrichTransport, S: NotificationSink> Coordinator<T, S> {
    pub fn new(transport: T, sink: S) -> Self {
        Self { transport, sink }
    }

    /// Enrich one column of the store's grid using `key_column` as the subject.
    ///
    /// Exactly one notification is emitted per call, after the final grid
    /// mutation, unless the store was disposed.
    pub fn enrich_column(
        &self,
        store: &GridStore,
        column: usize,
        key_column: usize,
    ) -> EnrichOutcome {
        let began = store.update_with(|grid| match begin_enrichment(grid, column, key_column) {
            Ok((next, plan)) => (next, Ok(plan)),
            Err(err) => (grid.clone(), Err(err)),
        });
        let plan = match began {
            None => {
                tracing::warn!(column, "grid store disposed; enrichment not started");
                return EnrichOutcome::Abandoned;
            }
            Some(Err(err)) => {
                tracing::warn!(column, %err, "enrichment rejected");
                return self.finish(EnrichOutcome::Rejected(err));
            }
            Some(Ok(plan)) => plan,
        };

        tracing::info!(
            column = %plan.request.column_name,
            rows = plan.request.rows.len(),
            eligible = plan.eligible_rows.len(),
            "enrichment dispatched"
        );
        let start = Instant::now();
        let response = self
            .transport
            .enrich_batch(&plan.request)
            .and_then(|response| response.validate(plan.request.rows.len()).map(|()| response));

        let settled = store.update_with(|grid| match &response {
            Ok(response) => {
                let (next, stats) = apply_success(grid, &plan, response);
                (next, Ok(stats))
            }
            Err(err) => {
                let (next, stats) = apply_failure(grid, &plan);
                (next, Err((err.clone(), stats)))
            }
        });
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let outcome = match settled {
            None => {
                tracing::warn!(
                    column = %plan.request.column_name,
                    elapsed_ms,
                    "grid store disposed; enrichment result dropped"
                );
                return EnrichOutcome::Abandoned;
            }
            Some(Err((err, _))) => {
                tracing::warn!(
                    column = %plan.request.column_name,
                    elapsed_ms,
                    %err,
                    "enrichment failed"
                );
                EnrichOutcome::Failed(err)
            }
            Some(Ok(stats)) if stats.column_missing => EnrichOutcome::ColumnRemoved,
            Some(Ok(stats)) => {
                tracing::info!(
                    column = %plan.request.column_name,
                    elapsed_ms,
                    applied = stats.applied,
                    skipped_edited = stats.skipped_edited,
                    "enrichment applied"
                );
                EnrichOutcome::Applied(summarize(&plan, stats))
            }
        };
        self.finish(outcome)
    }

    /// Enrich a column of a standalone grid, returning the settled grid.
    pub fn enrich_snapshot(
        &self,
        grid: &Grid,
        column: usize,
        key_column: usize,
    ) -> (Grid, EnrichOutcome) {
        let store = GridStore::new(grid.clone());
        let outcome = self.enrich_column(&store, column, key_column);
        (store.snapshot().as_ref().clone(), outcome)
    }

    fn finish(&self, outcome: EnrichOutcome) -> EnrichOutcome {
        if let Some(notification) = outcome.notification() {
            self.sink.notify(notification);
        }
        outcome
    }
}

fn summarize(plan: &EnrichmentPlan, stats: SettleStats) -> EnrichSummary {
    EnrichSummary {
        column_name: plan.request.column_name.clone(),
        rows: plan.request.rows.len(),
        applied: stats.applied,
        skipped_edited: stats.skipped_edited,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
