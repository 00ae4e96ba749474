//! Cache entry operations.
//!
//! Entries are stored response snapshots addressed by `(cache name, key)`.
//! Writes are insert-or-overwrite; the owning generation is created on the
//! first write if it does not exist.

use super::connection::CacheDb;
use crate::{CacheRequest, Error};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An immutable copy of a network response.
///
/// The body is shared, so every consumer gets its own readable clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, status_text: String::new(), headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Identity of a stored entry, as listed by [`CacheDb::keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryKey {
    pub key: String,
    pub method: String,
    pub url: String,
    pub stored_at: String,
}

/// Owned row data moved into the connection thread.
struct EntryRow {
    key: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Bytes,
}

impl EntryRow {
    fn build(request: &CacheRequest, response: &ResponseSnapshot) -> Result<Self, Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!(
                "only GET requests can be cached, got {} {}",
                request.method, request.url
            )));
        }
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))?;

        Ok(Self {
            key: request.cache_key(),
            method: request.method.clone(),
            url: request.url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json,
            body: response.body.clone(),
        })
    }
}

fn insert_entry(conn: &rusqlite::Connection, cache_name: &str, row: &EntryRow, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
        params![cache_name, now],
    )?;
    conn.execute(
        "INSERT INTO entries (
            cache_name, key, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(cache_name, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            cache_name,
            &row.key,
            &row.method,
            &row.url,
            row.status,
            &row.status_text,
            &row.headers_json,
            row.body.as_ref(),
            now,
        ],
    )?;
    Ok(())
}

type RawSnapshot = (String, u16, String, String, Vec<u8>);

fn decode(raw: RawSnapshot) -> Result<ResponseSnapshot, Error> {
    let (url, status, status_text, headers_json, body) = raw;
    let headers = serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
    Ok(ResponseSnapshot { url, status, status_text, headers, body: Bytes::from(body) })
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSnapshot> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

impl CacheDb {
    /// Insert or overwrite one entry.
    ///
    /// Fails with `INVALID_INPUT` for non-GET requests.
    pub async fn put(&self, cache_name: &str, request: &CacheRequest, response: &ResponseSnapshot) -> Result<(), Error> {
        let row = EntryRow::build(request, response)?;
        let cache_name = cache_name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                insert_entry(conn, &cache_name, &row, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite many entries atomically.
    ///
    /// Either every entry is written (and the generation exists) or none is.
    pub async fn put_all(&self, cache_name: &str, entries: &[(CacheRequest, ResponseSnapshot)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| EntryRow::build(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let cache_name = cache_name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![cache_name, now],
                )?;
                for row in &rows {
                    insert_entry(&tx, &cache_name, row, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key in one cache.
    pub async fn match_in(&self, cache_name: &str, key: &str) -> Result<Option<ResponseSnapshot>, Error> {
        let cache_name = cache_name.to_string();
        let key = key.to_string();
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawSnapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, status_text, headers_json, body
                     FROM entries WHERE cache_name = ?1 AND key = ?2",
                )?;
                match stmt.query_row(params![cache_name, key], read_raw) {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(decode).transpose()
    }

    /// Look up a key across every cache, oldest generation first.
    pub async fn match_any(&self, key: &str) -> Result<Option<ResponseSnapshot>, Error> {
        let key = key.to_string();
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawSnapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.url, e.status, e.status_text, e.headers_json, e.body
                     FROM entries e JOIN generations g ON g.name = e.cache_name
                     WHERE e.key = ?1
                     ORDER BY g.rowid ASC
                     LIMIT 1",
                )?;
                match stmt.query_row(params![key], read_raw) {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(decode).transpose()
    }

    /// List the entries of one cache in insertion order.
    ///
    /// A cache that does not exist has no entries.
    pub async fn keys(&self, cache_name: &str) -> Result<Vec<EntryKey>, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntryKey>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, method, url, stored_at FROM entries WHERE cache_name = ?1 ORDER BY rowid ASC",
                )?;
                let keys = stmt
                    .query_map(params![cache_name], |row| {
                        Ok(EntryKey { key: row.get(0)?, method: row.get(1)?, url: row.get(2)?, stored_at: row.get(3)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry. Returns false if it was not present.
    pub async fn delete_entry(&self, cache_name: &str, key: &str) -> Result<bool, Error> {
        let cache_name = cache_name.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE cache_name = ?1 AND key = ?2",
                    params![cache_name, key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn entry_count(&self, cache_name: &str) -> Result<u64, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE cache_name = ?1", params![cache_name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
