//! SQLite credential store backend.
//!
//! One row per user. Key material in this table is either hashed (the
//! verifier) or sealed (the key envelope), so the database file needs no
//! additional encryption layer of its own.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use super::traits::CredentialStore;
use super::types::{CredentialRecord, NewCredentialRecord};
use crate::error::{HubError, Result};

/// SQLite-backed credential store.
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// Open (or create) a credential store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory credential store. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| HubError::Storage("SQLite connection poisoned".to_string()))
    }
}

/// Create the credentials table if it does not exist yet.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            username TEXT PRIMARY KEY,
            verifier TEXT NOT NULL,
            verifier_salt BLOB NOT NULL,
            key_envelope BLOB NOT NULL,
            consent_unlock INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HubError::Storage(format!("Invalid {} timestamp: {}", column, e)))
}

impl CredentialStore for SqliteCredentialStore {
    fn fetch(&self, username: &str) -> Result<Option<CredentialRecord>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT username, verifier, verifier_salt, key_envelope, consent_unlock, created_at, updated_at
            FROM credentials
            WHERE username = ?
            "#,
            [username],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        );

        match result {
            Ok((username, verifier, verifier_salt, key_envelope, consent_unlock, created_at, updated_at)) => {
                Ok(Some(CredentialRecord {
                    username,
                    verifier,
                    verifier_salt,
                    key_envelope,
                    consent_unlock,
                    created_at: parse_timestamp(&created_at, "created_at")?,
                    updated_at: parse_timestamp(&updated_at, "updated_at")?,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert(&self, record: &NewCredentialRecord) -> Result<()> {
        let mut conn = self.lock_conn()?;

        let tx = conn.transaction()?;

        let exists: Option<String> = tx
            .query_row(
                "SELECT username FROM credentials WHERE username = ?",
                [&record.username],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(HubError::DuplicateUsername);
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO credentials (username, verifier, verifier_salt, key_envelope, consent_unlock, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
            (
                &record.username,
                &record.verifier,
                &record.verifier_salt,
                &record.key_envelope,
                &now,
                &now,
            ),
        )?;

        tx.commit()?;

        Ok(())
    }

    fn replace_credentials(&self, record: &NewCredentialRecord) -> Result<()> {
        let mut conn = self.lock_conn()?;

        let tx = conn.transaction()?;

        let now = Utc::now().to_rfc3339();
        let affected = tx.execute(
            r#"
            UPDATE credentials
            SET verifier = ?, verifier_salt = ?, key_envelope = ?, updated_at = ?
            WHERE username = ?
            "#,
            (
                &record.verifier,
                &record.verifier_salt,
                &record.key_envelope,
                &now,
                &record.username,
            ),
        )?;
        if affected == 0 {
            return Err(HubError::UserNotFound);
        }

        tx.commit()?;

        Ok(())
    }

    fn set_consent_unlock(&self, username: &str, enabled: bool) -> Result<()> {
        let mut conn = self.lock_conn()?;

        let tx = conn.transaction()?;

        let now = Utc::now().to_rfc3339();
        let affected = tx.execute(
            "UPDATE credentials SET consent_unlock = ?, updated_at = ? WHERE username = ?",
            (enabled, &now, username),
        )?;
        if affected == 0 {
            return Err(HubError::UserNotFound);
        }

        tx.commit()?;

        Ok(())
    }
}
