//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entry store contract used by the service layer.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `CarbonEntry::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod entry_repo;
