//! `flashdeck` - Flashcards over HTTP
//!
//! This library provides the flashcard model, the `SQLite`-backed
//! [`FlashcardStore`], and the axum router that exposes it as a REST API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flashcard;
pub mod logging;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use flashcard::{Flashcard, FlashcardUpdate, NewFlashcard};
pub use logging::init_logging;
pub use storage::{FlashcardStore, StorageStats};
