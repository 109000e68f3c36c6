//! Partition and entry operations for the SQLite backend.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::SqliteStorage;
use super::storage::CacheStorage;
use crate::{Error, StoredResponse};

const ENSURE_PARTITION: &str = "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)";

const UPSERT_ENTRY: &str = "INSERT INTO entries (partition, key, status, headers_json, body, stored_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(partition, key) DO UPDATE SET
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// Column values for one entry row, encoded before entering the DB thread.
struct EncodedEntry {
    key: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EncodedEntry {
    fn encode(key: &str, response: &StoredResponse) -> Result<Self, Error> {
        Ok(Self {
            key: key.to_string(),
            status: response.status,
            headers_json: response.headers_json()?,
            body: response.body.to_vec(),
        })
    }
}

#[async_trait]
impl CacheStorage for SqliteStorage {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let name = partition.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(ENSURE_PARTITION, params![name, now])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, partition: &str, key: &str) -> Result<Option<StoredResponse>, Error> {
        let name = partition.to_string();
        let key = key.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, Vec<u8>)>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body FROM entries WHERE partition = ?1 AND key = ?2",
                    params![name, key],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(|(status, headers_json, body)| StoredResponse::from_parts(status, &headers_json, body))
            .transpose()
    }

    async fn put(&self, partition: &str, key: &str, response: &StoredResponse) -> Result<(), Error> {
        let name = partition.to_string();
        let entry = EncodedEntry::encode(key, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(ENSURE_PARTITION, params![&name, &now])?;
                conn.execute(
                    UPSERT_ENTRY,
                    params![&name, &entry.key, entry.status, &entry.headers_json, &entry.body, &now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Commits the whole batch in one transaction.
    async fn put_all(&self, partition: &str, entries: &[(String, StoredResponse)]) -> Result<(), Error> {
        let name = partition.to_string();
        let encoded = entries
            .iter()
            .map(|(key, response)| EncodedEntry::encode(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(ENSURE_PARTITION, params![&name, &now])?;
                {
                    let mut stmt = tx.prepare(UPSERT_ENTRY)?;
                    for entry in &encoded {
                        stmt.execute(params![&name, &entry.key, entry.status, &entry.headers_json, &entry.body, &now])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM entries WHERE partition = ?1 ORDER BY key")?;
                let keys = stmt
                    .query_map(params![name], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &'static str) -> StoredResponse {
        StoredResponse::new(200, vec![("content-type".into(), "text/css".into())], body)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        let response = make_response("body { margin: 0 }");

        db.open("static-v1").await.unwrap();
        db.put("static-v1", "k1", &response).await.unwrap();

        let retrieved = db.get("static-v1", "k1").await.unwrap().unwrap();
        assert_eq!(retrieved, response);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        assert!(db.get("static-v1", "nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        db.put("dynamic-v1", "k", &make_response("old")).await.unwrap();
        db.put("dynamic-v1", "k", &make_response("new")).await.unwrap();

        let got = db.get("dynamic-v1", "k").await.unwrap().unwrap();
        assert_eq!(got.body, "new");
        assert_eq!(db.keys("dynamic-v1").await.unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_open_idempotent_and_names_sorted() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        db.open("static-v1").await.unwrap();
        db.open("images-v1").await.unwrap();
        db.open("static-v1").await.unwrap();
        assert_eq!(db.names().await.unwrap(), vec!["images-v1".to_string(), "static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        db.put("static-v1", "k", &make_response("a")).await.unwrap();

        assert!(db.delete("static-v1").await.unwrap());
        assert!(!db.delete("static-v1").await.unwrap());

        let orphans: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_put_all_batch() {
        let db = SqliteStorage::open_in_memory().await.unwrap();
        let entries = vec![
            ("a".to_string(), make_response("a")),
            ("b".to_string(), make_response("b")),
        ];
        db.put_all("static-v1", &entries).await.unwrap();
        assert_eq!(db.keys("static-v1").await.unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
