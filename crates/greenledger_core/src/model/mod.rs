//! Domain model for carbon entries.
//!
//! # Responsibility
//! - Define the canonical entry record shared by the store and handlers.
//! - Own field-level validation rules applied before persistence.
//!
//! # Invariants
//! - Every persisted entry has a store-assigned `EntryId`.
//! - `carbon_amount` is strictly positive for any valid entry.
//! - `timestamp` is always present; it defaults to construction time.

pub mod carbon_entry;
pub mod timestamp;
