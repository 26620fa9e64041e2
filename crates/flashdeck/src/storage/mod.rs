//! Storage layer for flashdeck.
//!
//! This module provides `SQLite`-based persistent storage for flashcards.
//! [`FlashcardStore`] is the only component that touches the database.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flashcard::{Flashcard, FlashcardUpdate, NewFlashcard};

const SELECT_FLASHCARD: &str = "SELECT id, deckId, question, answer FROM flashcards";

/// Repository for flashcard records.
///
/// Owns the database connection for the lifetime of the process. The
/// connection sits behind a mutex so a single store can be shared across
/// request handlers; each operation holds the lock for exactly one statement
/// or one transaction.
#[derive(Debug)]
pub struct FlashcardStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl FlashcardStore {
    /// Open or create a flashcard database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets readers proceed while a write is in flight
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a flashcard.
    ///
    /// Returns the stored record with its newly assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is empty, or an error if the
    /// database operation fails.
    pub fn add(&self, card: &NewFlashcard) -> Result<Flashcard> {
        card.validate()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO flashcards (deckId, question, answer) VALUES (?1, ?2, ?3)",
            params![card.deck_id, card.question, card.answer],
        )?;
        let id = conn.last_insert_rowid();

        debug!("Inserted flashcard with id {} in deck {}", id, card.deck_id);
        Ok(Flashcard {
            id,
            deck_id: card.deck_id.clone(),
            question: card.question.clone(),
            answer: card.answer.clone(),
        })
    }

    /// Get every stored flashcard in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_all(&self) -> Result<Vec<Flashcard>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_FLASHCARD} ORDER BY id ASC"))?;

        let cards = stmt
            .query_map([], Self::row_to_flashcard)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(cards)
    }

    /// Get a flashcard by its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no flashcard has this id, or an error if
    /// the database operation fails.
    pub fn get(&self, id: i64) -> Result<Flashcard> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)?.ok_or(Error::NotFound { id })
    }

    /// Replace the question and answer of an existing flashcard.
    ///
    /// The stored record is read and written back inside one transaction, so
    /// its id and deck are carried over from the database rather than from
    /// the caller. Returns the record as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is empty, [`Error::NotFound`]
    /// if no flashcard has this id, or an error if the database operation fails.
    pub fn update(&self, id: i64, update: &FlashcardUpdate) -> Result<Flashcard> {
        update.validate()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let existing = Self::fetch(&tx, id)?.ok_or(Error::NotFound { id })?;
        let card = existing.with_content(update);

        tx.execute(
            "UPDATE flashcards SET deckId = ?1, question = ?2, answer = ?3 WHERE id = ?4",
            params![card.deck_id, card.question, card.answer, card.id],
        )?;
        tx.commit()?;

        debug!("Updated flashcard {}", id);
        Ok(card)
    }

    /// Delete a flashcard by id.
    ///
    /// Returns `true` if a flashcard was deleted, `false` if none had this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()?
            .execute("DELETE FROM flashcards WHERE id = ?1", [id])?;

        debug!("Delete of flashcard {} removed {} row(s)", id, affected);
        Ok(affected > 0)
    }

    /// Remove every flashcard.
    ///
    /// Ids handed out before the clear are not reused. Returns the number of
    /// flashcards removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn()?.execute("DELETE FROM flashcards", [])?;

        info!("Cleared {} flashcards", affected);
        Ok(affected)
    }

    /// Count stored flashcards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_flashcards, deck_count): (i64, i64) = self.conn()?.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT deckId) FROM flashcards",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_flashcards,
            deck_count,
            db_size_bytes,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("flashcard store lock poisoned"))
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Flashcard>> {
        let card = conn
            .query_row(
                &format!("{SELECT_FLASHCARD} WHERE id = ?1"),
                [id],
                Self::row_to_flashcard,
            )
            .optional()?;
        Ok(card)
    }

    fn row_to_flashcard(row: &rusqlite::Row) -> rusqlite::Result<Flashcard> {
        Ok(Flashcard {
            id: row.get(0)?,
            deck_id: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of flashcards stored.
    pub total_flashcards: i64,
    /// Number of distinct decks in use.
    pub deck_count: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
