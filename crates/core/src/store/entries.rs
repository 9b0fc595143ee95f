//! Region and entry operations for the SQLite backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::SqliteStore;
use super::{CacheStore, CachedResponse, Region};
use crate::Error;

#[async_trait]
impl CacheStore for SqliteStore {
    async fn open(&self, region: Region) -> Result<(), Error> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO regions (name, created_at) VALUES (?1, ?2)",
                    params![region.name(), now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn has_region(&self, region: Region) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM regions WHERE name = ?1)",
                    params![region.name()],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Entries go with the region row via `ON DELETE CASCADE`.
    async fn delete_region(&self, region: Region) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM regions WHERE name = ?1", params![region.name()])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, region: Region, key: &str) -> Result<Option<CachedResponse>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt =
                    conn.prepare("SELECT status, headers_json, body FROM entries WHERE region = ?1 AND key = ?2")?;

                let result = stmt.query_row(params![region.name(), key], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?))
                });

                let (status, headers_json, body) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let status = u16::try_from(status)
                    .map_err(|_| Error::Corrupt(format!("status {status} out of range for {key}")))?;
                let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;

                Ok(Some(CachedResponse { status, headers, body: Bytes::from(body) }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, region: Region, key: &str, response: &CachedResponse) -> Result<(), Error> {
        let key = key.to_string();
        let status = response.status;
        let headers_json = serde_json::to_string(&response.headers)?;
        let body = response.body.to_vec();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO regions (name, created_at) VALUES (?1, ?2)",
                    params![region.name(), &now],
                )?;
                conn.execute(
                    "INSERT INTO entries (region, key, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(region, key) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![region.name(), key, status, headers_json, body, &now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, region: Region, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE region = ?1 AND key = ?2", params![region.name(), key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, region: Region) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM entries WHERE region = ?1 ORDER BY key ASC")?;
                let keys = stmt
                    .query_map(params![region.name()], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
