use super::schema::{BREED_VERSIONED_SCHEMAS, CATALOG_RECORD_ID};
use super::{BreedMap, BreedStore, CatalogRecord, StoreError, StoreResult};
use crate::server::metrics;
use crate::sqlite_persistence::open_versioned;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteBreedStore {
    db_path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBreedStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Self::open_connection(&db_path)?;
        Ok(Self {
            db_path,
            conn: Mutex::new(conn),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open_connection(path: &Path) -> anyhow::Result<Connection> {
        let conn = open_versioned(path, BREED_VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to open breed catalog database {:?}", path))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Runs `op` against the connection. A connection-level failure triggers
    /// exactly one reopen-and-retry; anything else propagates as is.
    fn with_connection<T, F>(&self, operation: &'static str, op: F) -> StoreResult<T>
    where
        F: Fn(&mut Connection) -> StoreResult<T>,
    {
        let start = Instant::now();
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::unavailable("breed catalog connection lock poisoned"))?;

        let result = match op(&mut *conn) {
            Err(err) if is_connection_error(&err) => {
                warn!(
                    "{} failed on the catalog connection ({}), reconnecting once",
                    operation, err
                );
                metrics::record_db_reconnect();
                *conn = Self::open_connection(&self.db_path)
                    .map_err(StoreError::StorageUnavailable)?;
                op(&mut *conn)
            }
            result => result,
        };

        metrics::record_db_query(operation, start.elapsed());
        result
    }
}

fn is_connection_error(err: &StoreError) -> bool {
    let StoreError::StorageUnavailable(source) = err else {
        return false;
    };
    match source.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(failure, _)) => matches!(
            failure.code,
            ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
        ),
        _ => false,
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_datetime(column: &'static str, s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| StoreError::CorruptedMetadata { column, source })
}

fn encode_types(name: &str, types: &[String]) -> StoreResult<String> {
    serde_json::to_string(types).map_err(|source| StoreError::CorruptedField {
        name: name.to_string(),
        source,
    })
}

fn decode_types(name: &str, types_json: &str) -> StoreResult<Vec<String>> {
    serde_json::from_str(types_json).map_err(|source| StoreError::CorruptedField {
        name: name.to_string(),
        source,
    })
}

/// Bumps `updated_at`, doubling as the presence check for the record.
fn touch_record(conn: &Connection) -> StoreResult<()> {
    let updated = conn.execute(
        "UPDATE catalog_record SET updated_at = ?1 WHERE id = ?2",
        params![format_datetime(&Utc::now()), CATALOG_RECORD_ID],
    )?;
    if updated == 0 {
        return Err(StoreError::RecordNotFound);
    }
    Ok(())
}

impl BreedStore for SqliteBreedStore {
    fn load_record(&self) -> StoreResult<CatalogRecord> {
        self.with_connection("load_record", |conn| {
            let tx = conn.transaction()?;

            let timestamps: Option<(String, String)> = tx
                .query_row(
                    "SELECT created_at, updated_at FROM catalog_record WHERE id = ?1",
                    params![CATALOG_RECORD_ID],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let (created_at, updated_at) = timestamps.ok_or(StoreError::RecordNotFound)?;

            let rows = {
                let mut stmt = tx.prepare("SELECT name, types FROM breeds ORDER BY position ASC")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            tx.finish()?;

            let mut breeds = BreedMap::with_capacity(rows.len());
            for (name, types_json) in rows {
                let types = decode_types(&name, &types_json)?;
                breeds.insert(name, types);
            }

            Ok(CatalogRecord {
                breeds,
                created_at: parse_datetime("created_at", &created_at)?,
                updated_at: parse_datetime("updated_at", &updated_at)?,
            })
        })
    }

    fn set_field(&self, name: &str, types: &[String]) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidFieldName);
        }
        let types_json = encode_types(name, types)?;

        self.with_connection("set_field", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            touch_record(&tx)?;
            tx.execute(
                "INSERT INTO breeds (name, types, position)
                 VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM breeds))
                 ON CONFLICT(name) DO UPDATE SET types = excluded.types",
                params![name, types_json],
            )?;
            tx.commit()?;
            debug!("Stored breed '{}' with {} types", name, types.len());
            Ok(())
        })
    }

    fn delete_field(&self, name: &str) -> StoreResult<()> {
        self.with_connection("delete_field", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            touch_record(&tx)?;
            let deleted = tx.execute("DELETE FROM breeds WHERE name = ?1", params![name])?;
            if deleted == 0 {
                return Err(StoreError::FieldNotFound(name.to_string()));
            }
            tx.commit()?;
            debug!("Deleted breed '{}'", name);
            Ok(())
        })
    }

    fn create_record(&self, initial: &BreedMap) -> StoreResult<()> {
        if initial.keys().any(|name| name.is_empty()) {
            return Err(StoreError::InvalidFieldName);
        }

        self.with_connection("create_record", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let exists = tx
                .query_row(
                    "SELECT 1 FROM catalog_record WHERE id = ?1",
                    params![CATALOG_RECORD_ID],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                return Err(StoreError::AlreadyExists);
            }

            let now = format_datetime(&Utc::now());
            tx.execute(
                "INSERT INTO catalog_record (id, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![CATALOG_RECORD_ID, now],
            )?;
            // Rows without a record are leftovers, never part of a live catalog.
            tx.execute("DELETE FROM breeds", [])?;
            {
                let mut stmt =
                    tx.prepare("INSERT INTO breeds (name, types, position) VALUES (?1, ?2, ?3)")?;
                for (index, (name, types)) in initial.iter().enumerate() {
                    stmt.execute(params![name, encode_types(name, types)?, index as i64 + 1])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct TestStore {
        store: SqliteBreedStore,
        _temp_dir: TempDir,
    }

    fn create_test_store() -> TestStore {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteBreedStore::new(temp_dir.path().join("breeds.db")).unwrap();
        TestStore {
            store,
            _temp_dir: temp_dir,
        }
    }

    fn types(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn seed() -> BreedMap {
        let mut breeds = BreedMap::new();
        breeds.insert("Labrador".to_string(), types(&["Yellow", "Black", "Chocolate"]));
        breeds.insert("GermanShepherd".to_string(), types(&["Sable"]));
        breeds
    }

    #[test]
    fn test_load_record_before_seeding() {
        let test = create_test_store();
        assert!(matches!(
            test.store.load_record(),
            Err(StoreError::RecordNotFound)
        ));
    }

    #[test]
    fn test_create_and_load_record() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();

        let record = test.store.load_record().unwrap();
        assert_eq!(record.breeds, seed());
        let names: Vec<&String> = record.breeds.keys().collect();
        assert_eq!(names, vec!["Labrador", "GermanShepherd"]);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_create_record_twice_fails() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        assert!(matches!(
            test.store.create_record(&BreedMap::new()),
            Err(StoreError::AlreadyExists)
        ));
        assert_eq!(test.store.load_record().unwrap().len(), 2);
    }

    #[test]
    fn test_set_field_without_record() {
        let test = create_test_store();
        assert!(matches!(
            test.store.set_field("Pug", &types(&["Fawn"])),
            Err(StoreError::RecordNotFound)
        ));
    }

    #[test]
    fn test_set_field_rejects_empty_name() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        assert!(matches!(
            test.store.set_field("", &[]),
            Err(StoreError::InvalidFieldName)
        ));
    }

    #[test]
    fn test_set_field_appends_and_upserts_in_place() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();

        test.store.set_field("Pug", &[]).unwrap();
        test.store.set_field("Labrador", &types(&["Black"])).unwrap();

        let record = test.store.load_record().unwrap();
        let names: Vec<&String> = record.breeds.keys().collect();
        assert_eq!(names, vec!["Labrador", "GermanShepherd", "Pug"]);
        assert_eq!(record.get("Labrador"), Some(&types(&["Black"])));
        assert_eq!(record.get("Pug"), Some(&vec![]));
    }

    #[test]
    fn test_set_field_keeps_duplicates_and_order() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();

        let value = types(&["b", "a", "b"]);
        test.store.set_field("Mix", &value).unwrap();
        assert_eq!(test.store.load_record().unwrap().get("Mix"), Some(&value));
    }

    #[test]
    fn test_set_field_bumps_updated_at() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        let before = test.store.load_record().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        test.store.set_field("Pug", &[]).unwrap();

        let after = test.store.load_record().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_delete_field() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();

        test.store.delete_field("Labrador").unwrap();
        let record = test.store.load_record().unwrap();
        assert!(!record.contains("Labrador"));
        assert_eq!(record.len(), 1);

        assert!(matches!(
            test.store.delete_field("Labrador"),
            Err(StoreError::FieldNotFound(name)) if name == "Labrador"
        ));
    }

    #[test]
    fn test_readded_breed_moves_to_end() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();

        test.store.delete_field("Labrador").unwrap();
        test.store.set_field("Labrador", &types(&["Yellow"])).unwrap();

        let record = test.store.load_record().unwrap();
        let names: Vec<&String> = record.breeds.keys().collect();
        assert_eq!(names, vec!["GermanShepherd", "Labrador"]);
    }

    #[test]
    fn test_delete_field_without_record() {
        let test = create_test_store();
        assert!(matches!(
            test.store.delete_field("Labrador"),
            Err(StoreError::RecordNotFound)
        ));
    }

    #[test]
    fn test_record_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("breeds.db");
        {
            let store = SqliteBreedStore::new(&db_path).unwrap();
            store.create_record(&seed()).unwrap();
            store.set_field("Pug", &types(&["Fawn"])).unwrap();
        }

        let reopened = SqliteBreedStore::new(&db_path).unwrap();
        let record = reopened.load_record().unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Pug"), Some(&types(&["Fawn"])));
    }

    #[test]
    fn test_concurrent_writes_to_different_breeds() {
        let test = create_test_store();
        test.store.create_record(&BreedMap::new()).unwrap();
        let store = Arc::new(test.store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .set_field(&format!("Breed{}", i), &[format!("Type{}", i)])
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = store.load_record().unwrap();
        assert_eq!(record.len(), 8);
        for i in 0..8 {
            assert_eq!(
                record.get(&format!("Breed{}", i)),
                Some(&vec![format!("Type{}", i)])
            );
        }
    }

    #[test]
    fn test_corrupted_types_are_reported() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        {
            let conn = test.store.conn.lock().unwrap();
            conn.execute(
                "UPDATE breeds SET types = 'not json' WHERE name = 'Labrador'",
                [],
            )
            .unwrap();
        }

        assert!(matches!(
            test.store.load_record(),
            Err(StoreError::CorruptedField { name, .. }) if name == "Labrador"
        ));
    }

    #[test]
    fn test_corrupted_timestamps_are_reported() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        {
            let conn = test.store.conn.lock().unwrap();
            conn.execute("UPDATE catalog_record SET updated_at = 'yesterday'", [])
                .unwrap();
        }

        assert!(matches!(
            test.store.load_record(),
            Err(StoreError::CorruptedMetadata { column: "updated_at", .. })
        ));
    }

    #[test]
    fn test_connection_error_classification() {
        let busy = StoreError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(is_connection_error(&busy));

        let constraint = StoreError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        ));
        assert!(!is_connection_error(&constraint));
        assert!(!is_connection_error(&StoreError::RecordNotFound));
    }

    fn busy_error() -> StoreError {
        StoreError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn test_connection_error_is_retried_once_after_reconnect() {
        let test = create_test_store();
        test.store.create_record(&seed()).unwrap();
        let attempts = AtomicUsize::new(0);
        let reconnects_before = metrics::DB_RECONNECTS_TOTAL.get();

        let count = test
            .store
            .with_connection("test_retry", |conn| {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(busy_error());
                }
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM breeds", [], |row| row.get(0))?;
                Ok(count)
            })
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(metrics::DB_RECONNECTS_TOTAL.get() >= reconnects_before + 1.0);
    }

    #[test]
    fn test_second_connection_failure_propagates() {
        let test = create_test_store();
        let attempts = AtomicUsize::new(0);
        let reconnects_before = metrics::DB_RECONNECTS_TOTAL.get();

        let result: StoreResult<()> = test.store.with_connection("test_retry", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(busy_error())
        });

        assert!(matches!(result, Err(StoreError::StorageUnavailable(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(metrics::DB_RECONNECTS_TOTAL.get() >= reconnects_before + 1.0);
    }

    #[test]
    fn test_non_connection_errors_are_not_retried() {
        let test = create_test_store();
        let attempts = AtomicUsize::new(0);

        let result: StoreResult<()> = test.store.with_connection("test_retry", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::RecordNotFound)
        });

        assert!(matches!(result, Err(StoreError::RecordNotFound)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
