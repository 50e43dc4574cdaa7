use chrono::{NaiveDate, NaiveDateTime};
use greenledger_core::db::open_db_in_memory;
use greenledger_core::{CarbonEntry, EntryRepository, RepoError, SqliteEntryRepository};
use rusqlite::Connection;

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn entry_at(category: &str, amount: f64, timestamp: NaiveDateTime) -> CarbonEntry {
    let mut entry = CarbonEntry::new("activity", category, amount, "Somewhere");
    entry.timestamp = timestamp;
    entry
}

#[test]
fn save_without_id_inserts_and_assigns_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let entry = CarbonEntry::new("Car trip", "Travel", 12.5, "Leeds");
    let saved = repo.save(&entry).unwrap();

    let id = saved.id.expect("insert should assign an id");
    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.timestamp, entry.timestamp);
}

#[test]
fn ids_are_unique_and_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let first = repo.save(&CarbonEntry::new("a", "Food", 1.0, "x")).unwrap();
    let second = repo.save(&CarbonEntry::new("b", "Food", 1.0, "x")).unwrap();
    assert_ne!(first.id, second.id);

    repo.delete_by_id(second.id.unwrap()).unwrap();
    let third = repo.save(&CarbonEntry::new("c", "Food", 1.0, "x")).unwrap();
    assert!(third.id.unwrap() > second.id.unwrap());
}

#[test]
fn save_with_id_updates_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let mut saved = repo
        .save(&CarbonEntry::new("Lunch", "Food", 2.0, "Porto"))
        .unwrap();
    saved.carbon_amount = 3.25;
    saved.latitude = Some(41.15);
    saved.longitude = Some(-8.61);
    repo.save(&saved).unwrap();

    let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.carbon_amount, 3.25);
    assert_eq!(loaded.latitude, Some(41.15));
    assert_eq!(loaded.longitude, Some(-8.61));
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

#[test]
fn save_with_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let mut entry = CarbonEntry::new("Ghost", "Travel", 1.0, "Nowhere");
    entry.id = Some(404);
    let err = repo.save(&entry).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn save_rejects_invalid_entry_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let err = repo
        .save(&CarbonEntry::new("Walk", "Travel", 0.0, "Oslo"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn find_and_exists_report_absent_ids_without_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id(1).unwrap().is_none());
    assert!(!repo.exists_by_id(1).unwrap());

    let saved = repo
        .save(&CarbonEntry::new("Heating", "Energy", 30.0, "Graz"))
        .unwrap();
    assert!(repo.exists_by_id(saved.id.unwrap()).unwrap());
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let saved = repo
        .save(&CarbonEntry::new("Taxi", "Travel", 6.0, "Rome"))
        .unwrap();
    let id = saved.id.unwrap();
    repo.delete_by_id(id).unwrap();

    assert!(repo.find_by_id(id).unwrap().is_none());
    let err = repo.delete_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn list_is_sorted_by_timestamp_descending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save(&entry_at("Food", 1.0, at(2024, 3, 1, 9))).unwrap();
    repo.save(&entry_at("Food", 2.0, at(2024, 5, 1, 9))).unwrap();
    repo.save(&entry_at("Food", 3.0, at(2023, 12, 31, 23))).unwrap();
    repo.save(&entry_at("Food", 4.0, at(2024, 5, 1, 8))).unwrap();

    let amounts = repo
        .find_all_order_by_timestamp_desc()
        .unwrap()
        .into_iter()
        .map(|entry| entry.carbon_amount)
        .collect::<Vec<_>>();
    assert_eq!(amounts, vec![2.0, 4.0, 1.0, 3.0]);
}

#[test]
fn sub_second_timestamps_sort_after_whole_seconds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let whole = at(2024, 1, 1, 12);
    let fractional = whole + chrono::Duration::milliseconds(250);
    repo.save(&entry_at("Food", 1.0, whole)).unwrap();
    repo.save(&entry_at("Food", 2.0, fractional)).unwrap();

    let listed = repo.find_all_order_by_timestamp_desc().unwrap();
    assert_eq!(listed[0].timestamp, fractional);
    assert_eq!(listed[1].timestamp, whole);
}

#[test]
fn equal_timestamps_fall_back_to_newest_id_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let shared = at(2024, 7, 4, 10);
    let first = repo.save(&entry_at("Food", 1.0, shared)).unwrap();
    let second = repo.save(&entry_at("Food", 2.0, shared)).unwrap();

    let listed = repo.find_all_order_by_timestamp_desc().unwrap();
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn category_sums_only_include_present_categories() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    assert!(repo.sum_carbon_by_category().unwrap().is_empty());

    repo.save(&entry_at("Travel", 10.0, at(2024, 1, 1, 0))).unwrap();
    repo.save(&entry_at("Travel", 5.0, at(2024, 1, 2, 0))).unwrap();
    let food = repo.save(&entry_at("Food", 3.0, at(2024, 1, 3, 0))).unwrap();
    repo.delete_by_id(food.id.unwrap()).unwrap();

    let totals = repo.sum_carbon_by_category().unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].category, "Travel");
    assert_eq!(totals[0].carbon_amount, 15.0);
}

#[test]
fn monthly_sums_group_by_year_month_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save(&entry_at("Food", 1.0, at(2023, 12, 31, 23))).unwrap();
    repo.save(&entry_at("Travel", 2.0, at(2024, 2, 1, 0))).unwrap();
    repo.save(&entry_at("Energy", 4.0, at(2024, 2, 29, 22))).unwrap();
    repo.save(&entry_at("Food", 8.0, at(2024, 10, 15, 12))).unwrap();
    repo.save(&entry_at("Food", 16.0, at(2023, 2, 10, 12))).unwrap();

    let months = repo
        .monthly_carbon_sums()
        .unwrap()
        .into_iter()
        .map(|month| (month.month, month.carbon_amount))
        .collect::<Vec<_>>();
    assert_eq!(
        months,
        vec![
            ("2024-10".to_string(), 8.0),
            ("2024-02".to_string(), 6.0),
            ("2023-12".to_string(), 1.0),
            ("2023-02".to_string(), 16.0),
        ]
    );
}

#[test]
fn invalid_persisted_timestamp_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO carbon_entries
            (activity, category, carbon_amount, location, timestamp)
         VALUES ('Walk', 'Travel', 1.0, 'Oslo', 'not a date');",
        [],
    )
    .unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteEntryRepository::try_new(&conn)
        .err()
        .expect("raw connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}
