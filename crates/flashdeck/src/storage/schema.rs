//! `SQLite` schema definitions for flashdeck.
//!
//! This module contains the SQL statements for creating the database schema.
//! Every statement is safe to run against an existing database.

/// SQL statement to create the flashcards table.
///
/// Column names are part of the persisted layout and stay camelCase.
pub const CREATE_FLASHCARDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flashcards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    deckId TEXT NOT NULL CHECK (length(deckId) > 0),
    question TEXT NOT NULL CHECK (length(question) > 0),
    answer TEXT NOT NULL CHECK (length(answer) > 0)
)
";

/// SQL statement to create an index on `deckId`.
pub const CREATE_DECK_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flashcards_deck ON flashcards(deckId)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_FLASHCARDS_TABLE,
    CREATE_DECK_INDEX,
    CREATE_METADATA_TABLE,
];
