use rusqlite::{params, OptionalExtension};

use super::{KvBackend, KvWrite, Versioned};
use crate::db::DbPool;
use crate::store::{StoreError, StoreResult};

/// SQLite implementation. Safe to share one database file between processes.
pub struct SqliteBackend {
    pool: DbPool,
}

impl SqliteBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl KvBackend for SqliteBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Versioned>> {
        let conn = self.pool.get()?;

        let row = conn
            .query_row(
                "SELECT value, version FROM kv_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(value, version)| Versioned {
            value,
            version: version as u64,
        }))
    }

    fn commit(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let conn = self.pool.get()?;

        // IMMEDIATE takes the write lock up front so the version checks
        // below cannot race another writer
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: StoreResult<()> = (|| {
            for write in writes {
                let current: Option<i64> = conn
                    .query_row(
                        "SELECT version FROM kv_entries WHERE key = ?1",
                        params![write.key],
                        |row| row.get(0),
                    )
                    .optional()?;

                if !write.expect.holds(current.map(|v| v as u64)) {
                    return Err(StoreError::Conflict(format!(
                        "{} changed since it was read",
                        write.key
                    )));
                }

                match &write.value {
                    Some(value) => {
                        conn.execute(
                            "INSERT INTO kv_entries (key, value, version, updated_at)
                             VALUES (?1, ?2, 1, datetime('now'))
                             ON CONFLICT(key) DO UPDATE SET
                               value = excluded.value,
                               version = kv_entries.version + 1,
                               updated_at = excluded.updated_at",
                            params![write.key, value],
                        )?;
                    }
                    None => {
                        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![write.key])?;
                    }
                }
            }
            Ok(())
        })();

        // A failed COMMIT can leave the transaction open; the connection
        // must not go back to the pool like that
        let result = result.and_then(|()| Ok(conn.execute_batch("COMMIT")?));
        if result.is_err() {
            if let Err(e) = conn.execute_batch("ROLLBACK") {
                tracing::warn!("Rollback after failed commit also failed: {}", e);
            }
        }
        result
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
