//! Carbon entry domain model.
//!
//! # Responsibility
//! - Define the persisted entry record and the client-supplied draft shape.
//! - Collect every field violation in one pass so callers can report them all.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, and never changes afterwards.
//! - `activity`, `category` and `location` contain non-whitespace text.
//! - `carbon_amount` is finite and strictly positive.
//! - `timestamp` has a year in `0000..=9999`.

use super::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned entry identifier.
pub type EntryId = i64;

/// Canonical carbon-emission record.
///
/// Serialized with camelCase field names to match the HTTP wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEntry {
    /// `None` before the first save.
    #[serde(default)]
    pub id: Option<EntryId>,
    pub activity: String,
    pub category: String,
    /// Emitted carbon, always > 0 for persisted rows.
    pub carbon_amount: f64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: NaiveDateTime,
}

impl CarbonEntry {
    /// Creates an unsaved entry stamped with the current time.
    ///
    /// Coordinates start empty. This constructor does not validate; call
    /// [`CarbonEntry::validate`] or go through [`EntryDraft::into_entry`].
    pub fn new(
        activity: impl Into<String>,
        category: impl Into<String>,
        carbon_amount: f64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            activity: activity.into(),
            category: category.into(),
            carbon_amount,
            location: location.into(),
            latitude: None,
            longitude: None,
            timestamp: timestamp::now(),
        }
    }

    /// Checks every field rule and reports all violations together.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        EntryValidationError::check(collect_violations(
            Some(self.activity.as_str()),
            Some(self.category.as_str()),
            Some(self.carbon_amount),
            Some(self.location.as_str()),
            Some(self.timestamp),
        ))
    }

    /// Overwrites the user-editable details with values from `details`.
    ///
    /// `id` and `timestamp` are left untouched.
    pub fn apply_details(&mut self, details: CarbonEntry) {
        self.activity = details.activity;
        self.category = details.category;
        self.carbon_amount = details.carbon_amount;
        self.location = details.location;
        self.latitude = details.latitude;
        self.longitude = details.longitude;
    }
}

/// Client-supplied entry fields for create and update requests.
///
/// Every field is optional at the wire level so missing values surface as
/// validation violations instead of decode failures. There is no `id`
/// field, so a client-supplied id is dropped during decoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub activity: Option<String>,
    pub category: Option<String>,
    pub carbon_amount: Option<f64>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub timestamp: Option<NaiveDateTime>,
}

impl EntryDraft {
    /// Checks every field rule without consuming the draft.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        EntryValidationError::check(self.violations())
    }

    /// Converts a valid draft into an unsaved entry.
    ///
    /// A missing `timestamp` defaults to the current time.
    pub fn into_entry(self) -> Result<CarbonEntry, EntryValidationError> {
        let violations = self.violations();
        match (self.activity, self.category, self.carbon_amount, self.location) {
            (Some(activity), Some(category), Some(carbon_amount), Some(location))
                if violations.is_empty() =>
            {
                Ok(CarbonEntry {
                    id: None,
                    activity,
                    category,
                    carbon_amount,
                    location,
                    latitude: self.latitude,
                    longitude: self.longitude,
                    timestamp: self.timestamp.unwrap_or_else(timestamp::now),
                })
            }
            _ => Err(EntryValidationError { violations }),
        }
    }

    fn violations(&self) -> Vec<FieldViolation> {
        collect_violations(
            self.activity.as_deref(),
            self.category.as_deref(),
            self.carbon_amount,
            self.location.as_deref(),
            self.timestamp,
        )
    }
}

/// Entry fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryField {
    Activity,
    Category,
    CarbonAmount,
    Location,
    Timestamp,
}

impl EntryField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Category => "category",
            Self::CarbonAmount => "carbonAmount",
            Self::Location => "location",
            Self::Timestamp => "timestamp",
        }
    }
}

/// One violated rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: EntryField,
    pub message: &'static str,
}

/// Validation failure listing every violated field, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryValidationError {
    pub violations: Vec<FieldViolation>,
}

impl EntryValidationError {
    fn check(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    /// Returns whether `field` has at least one violation.
    pub fn has_field(&self, field: EntryField) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field)
    }
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry validation failed")?;
        for (index, violation) in self.violations.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(
                f,
                "{separator}{}: {}",
                violation.field.as_str(),
                violation.message
            )?;
        }
        Ok(())
    }
}

impl Error for EntryValidationError {}

fn collect_violations(
    activity: Option<&str>,
    category: Option<&str>,
    carbon_amount: Option<f64>,
    location: Option<&str>,
    recorded_at: Option<NaiveDateTime>,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if is_blank(activity) {
        violations.push(FieldViolation {
            field: EntryField::Activity,
            message: "Activity is required",
        });
    }
    if is_blank(category) {
        violations.push(FieldViolation {
            field: EntryField::Category,
            message: "Category is required",
        });
    }
    match carbon_amount {
        None => violations.push(FieldViolation {
            field: EntryField::CarbonAmount,
            message: "Carbon amount is required",
        }),
        // Also rejects NaN.
        Some(amount) if !(amount.is_finite() && amount > 0.0) => {
            violations.push(FieldViolation {
                field: EntryField::CarbonAmount,
                message: "Carbon amount must be positive",
            });
        }
        Some(_) => {}
    }
    if is_blank(location) {
        violations.push(FieldViolation {
            field: EntryField::Location,
            message: "Location is required",
        });
    }
    if recorded_at.is_some_and(|value| !timestamp::is_storable(&value)) {
        violations.push(FieldViolation {
            field: EntryField::Timestamp,
            message: "Timestamp year must be between 0000 and 9999",
        });
    }

    violations
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}
