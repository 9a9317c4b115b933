//! Towpath Services Layer
//!
//! Platform pieces that outlive the map view: persisted settings and the
//! small local key-value store holding the session token and theme flag.

pub mod settings;
pub mod storage;

pub use settings::{ApiSettings, MapSettings, Settings};
pub use storage::LocalStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed file: {0}")]
    Malformed(#[from] serde_json::Error),
}
