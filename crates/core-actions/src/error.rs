//! User-input failures raised by ex commands and search.
//!
//! None of these are fatal: the dispatcher turns each into a transient status message.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Not an editor command: {0}")]
    UnknownCommand(String),
    #[error("No file name")]
    NoFileName,
    #[error("Too many file names")]
    TooManyArguments,
    #[error("Unsaved changes (add ! to override)")]
    UnsavedChanges,
    #[error("No previous search pattern")]
    NoPreviousPattern,
    #[error("\"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
