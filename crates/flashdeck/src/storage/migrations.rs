//! Schema initialization for flashdeck.
//!
//! Creates the tables on first start and records the schema version in the
//! metadata table. Only the initial version exists; running this against an
//! existing database leaves its data untouched.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist and stamps the schema
/// version on a fresh database.
///
/// # Errors
///
/// Returns an error if schema creation fails or the database carries a
/// version this build does not understand.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match get_schema_version(conn)? {
        0 => {
            debug!("Stamping fresh database with schema version {CURRENT_VERSION}");
            set_schema_version(conn, CURRENT_VERSION)
        }
        CURRENT_VERSION => Ok(()),
        other => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {other} is not supported (expected {CURRENT_VERSION})"
            ),
        }),
    }
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        None => Ok(0),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
