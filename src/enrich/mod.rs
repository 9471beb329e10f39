//! Column enrichment against the batch service.
//!
//! One enrichment sends every row of a column to the service in a single
//! request and writes the answers back into the grid by row position:
//! - `plan`: pure steps from snapshot to snapshot
//! - `protocol`: request and response wire types
//! - `transport`: the HTTP client and the trait tests fake
//! - `coordinator`: drives one attempt against a [`GridStore`](crate::store::GridStore)
mod coordinator;
pub mod plan;
pub mod protocol;
pub mod transport;

pub use coordinator::{
    Coordinator, EnrichOutcome, EnrichSummary, COLUMN_REMOVED_MESSAGE, FAILURE_MESSAGE,
    MISSING_HEADER_MESSAGE, SUCCESS_MESSAGE,
};
pub use plan::{
    apply_failure, apply_success, begin_enrichment, mark_loading, plan_enrichment,
    EnrichmentPlan, SettleStats,
};
pub use protocol::{BatchRequest, BatchResponse, HealthResponse};
pub use transport::{EnrichTransport, HttpTransport};
