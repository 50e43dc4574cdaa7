//! Carbon entry use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete entry points for handler callers.
//! - Assemble the summary read model from repository aggregates.
//!
//! # Invariants
//! - Drafts are validated before any repository call (no partial writes).
//! - Update never changes `id` or `timestamp` of the stored entry.
//! - Service layer remains storage-agnostic.

use crate::model::carbon_entry::{CarbonEntry, EntryDraft, EntryId};
use crate::repo::entry_repo::{EntryRepository, MonthlyCarbon, RepoError, RepoResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view over every stored entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonSummary {
    /// Sum of `carbon_amount` over all entries; `0.0` when empty.
    pub total_carbon: f64,
    /// Only categories that currently have entries.
    pub category_breakdown: BTreeMap<String, f64>,
    /// Most recent month first.
    pub monthly_data: Vec<MonthlyCarbon>,
}

/// Use-case service wrapper for carbon entry operations.
pub struct EntryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> EntryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every entry, newest timestamp first.
    pub fn list_entries(&self) -> RepoResult<Vec<CarbonEntry>> {
        self.repo.find_all_order_by_timestamp_desc()
    }

    /// Gets one entry by id; `Ok(None)` when absent.
    pub fn get_entry(&self, id: EntryId) -> RepoResult<Option<CarbonEntry>> {
        self.repo.find_by_id(id)
    }

    /// Validates and persists a new entry.
    ///
    /// # Contract
    /// - Returns `RepoError::Validation` listing every violation when the
    ///   draft is invalid; nothing is written in that case.
    /// - The returned entry carries the assigned id and the effective
    ///   timestamp (draft value or creation time).
    pub fn create_entry(&self, draft: EntryDraft) -> RepoResult<CarbonEntry> {
        let entry = draft.into_entry()?;
        self.repo.save(&entry)
    }

    /// Overwrites the editable details of an existing entry.
    ///
    /// # Contract
    /// - Validation runs before the existence check.
    /// - Returns `RepoError::NotFound` when `id` has no entry.
    /// - `id` and `timestamp` keep their stored values; a draft timestamp
    ///   is ignored.
    pub fn update_entry(&self, id: EntryId, draft: EntryDraft) -> RepoResult<CarbonEntry> {
        let details = draft.into_entry()?;
        let mut entry = self.repo.find_by_id(id)?.ok_or(RepoError::NotFound(id))?;
        entry.apply_details(details);
        self.repo.save(&entry)
    }

    /// Deletes an entry after checking it exists.
    pub fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        if !self.repo.exists_by_id(id)? {
            return Err(RepoError::NotFound(id));
        }
        self.repo.delete_by_id(id)
    }

    /// Computes total, per-category and per-month carbon sums.
    pub fn summary(&self) -> RepoResult<CarbonSummary> {
        let total_carbon: f64 = self
            .repo
            .find_all()?
            .iter()
            .map(|entry| entry.carbon_amount)
            .sum();

        let category_breakdown = self
            .repo
            .sum_carbon_by_category()?
            .into_iter()
            .map(|total| (total.category, total.carbon_amount))
            .collect();

        Ok(CarbonSummary {
            total_carbon,
            category_breakdown,
            monthly_data: self.repo.monthly_carbon_sums()?,
        })
    }
}
