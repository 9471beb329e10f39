//! Spreadsheet grid with per-column batch enrichment.
//!
//! The grid is an immutable snapshot value held by a [`store::GridStore`].
//! Structural edits go through [`grid::ops`]; whole columns are filled by an
//! [`enrich::Coordinator`], which sends one batch request per column and
//! reports each attempt to a [`notify::NotificationSink`].
pub mod config;
pub mod enrich;
pub mod error;
pub mod grid;
pub mod lifecycle;
pub mod notify;
pub mod store;
