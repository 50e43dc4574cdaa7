//! Carbon entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/delete APIs over the `carbon_entries` table.
//! - Own the aggregate queries (per-category and per-month sums).
//!
//! # Invariants
//! - Write paths must call `CarbonEntry::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Timestamps are stored as `%Y-%m-%d %H:%M:%S%.f` text, so lexical order
//!   equals chronological order.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::carbon_entry::{CarbonEntry, EntryId, EntryValidationError};
use crate::model::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENTRY_TABLE: &str = "carbon_entries";
const STORAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    activity,
    category,
    carbon_amount,
    location,
    latitude,
    longitude,
    timestamp
FROM carbon_entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for entry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    Db(DbError),
    NotFound(EntryId),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "carbon entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "entry repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "entry repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Summed carbon for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub carbon_amount: f64,
}

/// Summed carbon for one `YYYY-MM` month key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCarbon {
    pub month: String,
    pub carbon_amount: f64,
}

/// Repository interface for carbon entry storage.
pub trait EntryRepository {
    /// Inserts when `entry.id` is `None`, otherwise updates the matching row.
    ///
    /// Returns the persisted record, with its assigned id on insert.
    fn save(&self, entry: &CarbonEntry) -> RepoResult<CarbonEntry>;
    /// Returns `Ok(None)` for a missing id.
    fn find_by_id(&self, id: EntryId) -> RepoResult<Option<CarbonEntry>>;
    fn exists_by_id(&self, id: EntryId) -> RepoResult<bool>;
    /// Returns `NotFound` when no row matched.
    fn delete_by_id(&self, id: EntryId) -> RepoResult<()>;
    fn find_all(&self) -> RepoResult<Vec<CarbonEntry>>;
    /// Newest first; equal timestamps fall back to `id DESC`.
    fn find_all_order_by_timestamp_desc(&self) -> RepoResult<Vec<CarbonEntry>>;
    /// One row per category present in storage.
    fn sum_carbon_by_category(&self) -> RepoResult<Vec<CategoryTotal>>;
    /// One row per `YYYY-MM` month key, most recent month first.
    fn monthly_carbon_sums(&self) -> RepoResult<Vec<MonthlyCarbon>>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable` when `carbon_entries` is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entry_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, entry: &CarbonEntry) -> RepoResult<CarbonEntry> {
        self.conn.execute(
            "INSERT INTO carbon_entries (
                activity,
                category,
                carbon_amount,
                location,
                latitude,
                longitude,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.activity.as_str(),
                entry.category.as_str(),
                entry.carbon_amount,
                entry.location.as_str(),
                entry.latitude,
                entry.longitude,
                format_storage_timestamp(entry.timestamp),
            ],
        )?;

        let mut saved = entry.clone();
        saved.id = Some(self.conn.last_insert_rowid());
        Ok(saved)
    }

    fn update(&self, id: EntryId, entry: &CarbonEntry) -> RepoResult<CarbonEntry> {
        let changed = self.conn.execute(
            "UPDATE carbon_entries
             SET
                activity = ?1,
                category = ?2,
                carbon_amount = ?3,
                location = ?4,
                latitude = ?5,
                longitude = ?6,
                timestamp = ?7
             WHERE id = ?8;",
            params![
                entry.activity.as_str(),
                entry.category.as_str(),
                entry.carbon_amount,
                entry.location.as_str(),
                entry.latitude,
                entry.longitude,
                format_storage_timestamp(entry.timestamp),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(entry.clone())
    }

    fn query_entries(&self, sql: &str) -> RepoResult<Vec<CarbonEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn save(&self, entry: &CarbonEntry) -> RepoResult<CarbonEntry> {
        entry.validate()?;

        match entry.id {
            None => self.insert(entry),
            Some(id) => self.update(id, entry),
        }
    }

    fn find_by_id(&self, id: EntryId) -> RepoResult<Option<CarbonEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn exists_by_id(&self, id: EntryId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM carbon_entries WHERE id = ?1;",
                [id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_by_id(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM carbon_entries WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_all(&self) -> RepoResult<Vec<CarbonEntry>> {
        self.query_entries(&format!("{ENTRY_SELECT_SQL} ORDER BY id ASC;"))
    }

    fn find_all_order_by_timestamp_desc(&self) -> RepoResult<Vec<CarbonEntry>> {
        self.query_entries(&format!(
            "{ENTRY_SELECT_SQL} ORDER BY timestamp DESC, id DESC;"
        ))
    }

    fn sum_carbon_by_category(&self) -> RepoResult<Vec<CategoryTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                category,
                SUM(carbon_amount) AS total
             FROM carbon_entries
             GROUP BY category
             ORDER BY category ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut totals = Vec::new();
        while let Some(row) = rows.next()? {
            totals.push(CategoryTotal {
                category: row.get("category")?,
                carbon_amount: row.get("total")?,
            });
        }

        Ok(totals)
    }

    fn monthly_carbon_sums(&self) -> RepoResult<Vec<MonthlyCarbon>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                strftime('%Y-%m', timestamp) AS month,
                SUM(carbon_amount) AS total
             FROM carbon_entries
             GROUP BY month
             ORDER BY month DESC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut months = Vec::new();
        while let Some(row) = rows.next()? {
            let month = row.get::<_, Option<String>>("month")?.ok_or_else(|| {
                RepoError::InvalidData(
                    "timestamp without a derivable month in carbon_entries.timestamp".to_string(),
                )
            })?;
            months.push(MonthlyCarbon {
                month,
                carbon_amount: row.get("total")?,
            });
        }

        Ok(months)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<CarbonEntry> {
    let timestamp_text: String = row.get("timestamp")?;
    let timestamp = parse_timestamp(&timestamp_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{timestamp_text}` in carbon_entries.timestamp"
        ))
    })?;

    let entry = CarbonEntry {
        id: Some(row.get("id")?),
        activity: row.get("activity")?,
        category: row.get("category")?,
        carbon_amount: row.get("carbon_amount")?,
        location: row.get("location")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        timestamp,
    };
    entry
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("row {:?}: {err}", entry.id)))?;
    Ok(entry)
}

fn format_storage_timestamp(value: NaiveDateTime) -> String {
    value.format(STORAGE_TIMESTAMP_FORMAT).to_string()
}

fn ensure_entry_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [ENTRY_TABLE],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(ENTRY_TABLE));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_storage_timestamp;
    use chrono::NaiveDate;

    #[test]
    fn storage_timestamp_keeps_sub_second_precision() {
        let value = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_nano_opt(7, 5, 1, 120_000_000)
            .unwrap();
        assert_eq!(format_storage_timestamp(value), "2024-03-09 07:05:01.120");
    }

    #[test]
    fn storage_timestamp_sorts_lexically_in_time_order() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let earlier = format_storage_timestamp(day.and_hms_opt(7, 5, 1).unwrap());
        let later =
            format_storage_timestamp(day.and_hms_nano_opt(7, 5, 1, 500_000_000).unwrap());
        assert!(earlier < later);
    }
}
