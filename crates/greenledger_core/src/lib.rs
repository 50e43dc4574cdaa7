//! Core domain logic for the Green Ledger carbon tracker.
//! This crate is the single source of truth for entry invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::carbon_entry::{
    CarbonEntry, EntryDraft, EntryField, EntryId, EntryValidationError, FieldViolation,
};
pub use repo::entry_repo::{
    CategoryTotal, EntryRepository, MonthlyCarbon, RepoError, RepoResult, SqliteEntryRepository,
};
pub use service::entry_service::{CarbonSummary, EntryService};

/// Returns the core crate version, reported by the health endpoint.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
