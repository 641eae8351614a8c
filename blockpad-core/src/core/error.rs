//! Error types for the Blockpad core library.

use thiserror::Error;

/// All errors that can occur within the Blockpad core library.
#[derive(Debug, Error)]
pub enum BlockpadError {
    /// A SQLite operation on the backing store failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A page ID was passed that does not exist in the workspace.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A block ID was passed that does not exist in the edited page.
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// A reparent would make a page its own ancestor.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// A delete was refused, e.g. because it would leave the workspace empty.
    #[error("Invalid delete: {0}")]
    InvalidDelete(String),

    /// An import payload is missing required workspace fields.
    #[error("Invalid import: {0}")]
    InvalidImport(String),

    /// The opened store is not a valid Blockpad database.
    #[error("Invalid workspace: {0}")]
    InvalidWorkspace(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`BlockpadError`].
pub type Result<T> = std::result::Result<T, BlockpadError>;

impl BlockpadError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::PageNotFound(_) => "Page no longer exists".to_string(),
            Self::BlockNotFound(_) => "Block no longer exists".to_string(),
            Self::InvalidMove(msg) => msg.clone(),
            Self::InvalidDelete(msg) => msg.clone(),
            Self::InvalidImport(_) => "The imported file is not a Blockpad workspace".to_string(),
            Self::InvalidWorkspace(_) => "Could not open workspace storage".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }

    /// Returns `true` for the "stale id" family of errors.
    ///
    /// UI-driven callers treat these as silent no-ops.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound(_) | Self::BlockNotFound(_))
    }
}
