//! `SQLite` implementation of [`EntityStore`].
//!
//! One table per [`Record::COLLECTION`], each row holding the JSON encoding of
//! a whole record under its key. Writes are upserts, so a put replaces the
//! previous value in a single statement and readers never see a partial row.

use std::collections::HashSet;
use std::marker::PhantomData;

use sqlx::SqlitePool;

use agenda_app::ports::EntityStore;
use agenda_domain::error::AgendaError;
use agenda_domain::event::Event;
use agenda_domain::record::Record;
use agenda_domain::room::Room;
use agenda_domain::schedule::ScheduleEntry;

use crate::error::StorageError;

/// SQL text for one collection. Table names come from compile-time
/// [`Record::COLLECTION`] constants, never from user input.
struct Statements {
    upsert: String,
    select_by_key: String,
    select_keys: String,
    select_all: String,
    delete_by_key: String,
}

impl Statements {
    fn for_collection(table: &str) -> Self {
        Self {
            upsert: format!(
                "INSERT INTO {table} (key, body) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET body = excluded.body"
            ),
            select_by_key: format!("SELECT body FROM {table} WHERE key = ?"),
            select_keys: format!("SELECT key FROM {table}"),
            select_all: format!("SELECT body FROM {table}"),
            delete_by_key: format!("DELETE FROM {table} WHERE key = ?"),
        }
    }
}

/// `SQLite`-backed store for records of type `T`.
pub struct SqliteStore<T> {
    pool: SqlitePool,
    statements: Statements,
    _record: PhantomData<fn() -> T>,
}

/// Store for [`Room`] records.
pub type SqliteRoomStore = SqliteStore<Room>;
/// Store for [`Event`] records.
pub type SqliteEventStore = SqliteStore<Event>;
/// Store for [`ScheduleEntry`] records.
pub type SqliteScheduleStore = SqliteStore<ScheduleEntry>;

impl<T: Record> SqliteStore<T> {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            statements: Statements::for_collection(T::COLLECTION),
            _record: PhantomData,
        }
    }
}

fn decode<T: Record>(body: &str) -> Result<T, StorageError> {
    Ok(serde_json::from_str(body)?)
}

impl<T: Record> EntityStore<T> for SqliteStore<T> {
    async fn put(&self, key: &str, record: T) -> Result<(), AgendaError> {
        let body = serde_json::to_string(&record).map_err(StorageError::from)?;

        sqlx::query(&self.statements.upsert)
            .bind(key)
            .bind(&body)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<T>, AgendaError> {
        let body: Option<String> = sqlx::query_scalar(&self.statements.select_by_key)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(body.as_deref().map(decode).transpose()?)
    }

    async fn delete(&self, key: &str) -> Result<(), AgendaError> {
        sqlx::query(&self.statements.delete_by_key)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn keys(&self) -> Result<HashSet<String>, AgendaError> {
        let keys: Vec<String> = sqlx::query_scalar(&self.statements.select_keys)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(keys.into_iter().collect())
    }

    async fn all(&self) -> Result<Vec<T>, AgendaError> {
        let bodies: Vec<String> = sqlx::query_scalar(&self.statements.select_all)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let records = bodies
            .iter()
            .map(|body| decode(body))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(records)
    }
}
