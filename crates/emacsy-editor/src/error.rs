//! Editor errors.
//!
//! Configuration mistakes (a malformed place, an unknown option, a second
//! search while one is open) come back as [`Error`]. Area access failures
//! have their own [`AreaError`](crate::host::AreaError) because the search
//! scan expects them and skips the area instead of failing.

use thiserror::Error;

use crate::host::AreaError;

/// Failures raised by the editor core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `Place` was built from an initializer missing a required field.
    #[error("malformed place: missing field '{field}'")]
    MalformedPlace { field: &'static str },

    /// A `:set`-style directive named an option that doesn't exist.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// A directive supplied a value the option can't take.
    #[error("invalid value for {name}: '{value}'")]
    InvalidOptionValue { name: String, value: String },

    /// A search was requested while another one is open.
    #[error("an incremental search is already active")]
    SearchActive,

    /// A host area could not be read or written.
    #[error(transparent)]
    Area(#[from] AreaError),

    /// Keymap wiring failed.
    #[error(transparent)]
    Keymap(#[from] emacsy_keymap::Error),
}

/// Result alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;
