//! Schema migrations.
//!
//! The applied schema version lives in SQLite's `user_version` header field.
//! Each pending script runs in its own transaction together with the version
//! bump, so a failed script leaves the previous version in place.

use super::Error;
use tokio_rusqlite::{Connection, rusqlite};

/// Schema scripts; script `i` upgrades the store to version `i + 1`.
const SCRIPTS: &[&str] = &[include_str!("../../migrations/001_partitions.sql")];

/// Schema version a fully migrated store reports.
pub const SCHEMA_VERSION: i64 = SCRIPTS.len() as i64;

fn schema_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Bring the store up to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] when the store was written by a newer
/// schema, or the underlying SQLite error when a script fails.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let found = schema_version(conn)?;
        if found > SCHEMA_VERSION {
            return Err(Error::MigrationFailed(format!(
                "store schema v{found} is newer than supported v{SCHEMA_VERSION}"
            )));
        }

        for (target, script) in (1i64..).zip(SCRIPTS).skip(found.max(0) as usize) {
            let tx = conn.transaction()?;
            tx.execute_batch(script)?;
            tx.pragma_update(None, "user_version", target)?;
            tx.commit()?;
            tracing::debug!(version = target, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
