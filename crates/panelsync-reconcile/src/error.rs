//! Error types for dashboard reconciliation

use std::fmt::{self, Display, Formatter};

use panelsync_convert::{ConvertError, RegistryError};
use panelsync_value::ParseError;

use crate::pipeline::Stage;

/// Position of an entry in the stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryLocation {
    /// Index of the top-level item
    pub index: usize,

    /// Index of the panel inside a section
    pub child: Option<usize>,
}

impl EntryLocation {
    /// Top-level item
    #[inline]
    #[must_use]
    pub const fn item(index: usize) -> Self {
        Self { index, child: None }
    }

    /// Panel inside the section at `index`
    #[inline]
    #[must_use]
    pub const fn child(index: usize, child: usize) -> Self {
        Self {
            index,
            child: Some(child),
        }
    }
}

impl Display for EntryLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.child {
            Some(child) => write!(f, "{}.{child}", self.index),
            None => write!(f, "{}", self.index),
        }
    }
}

/// A failure local to one entry
///
/// Captured and reported next to the partial result; never aborts the call
/// unless fail-fast writing is enabled.
#[derive(Debug, thiserror::Error)]
#[error("panel {location} could not be reconciled: {error}")]
pub struct EntryError {
    /// Where the entry sits
    pub location: EntryLocation,

    /// What went wrong
    #[source]
    pub error: ConvertError,
}

impl EntryError {
    /// Create entry error
    #[inline]
    #[must_use]
    pub fn new(location: EntryLocation, error: ConvertError) -> Self {
        Self { location, error }
    }
}

/// Errors configuring the engine
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it is invalid
        message: String,
    },
}

impl ConfigError {
    /// Create invalid-value error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Fatal reconciliation errors
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The whole document is not valid JSON
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document is neither a panel list nor `{"panels": [...]}`
    #[error("invalid dashboard document: {0}")]
    InvalidDocument(String),

    /// The converter registry is broken
    #[error("registry defect: {0}")]
    Registry(#[from] RegistryError),

    /// First entry error while writing in fail-fast mode
    #[error(transparent)]
    Entry(Box<EntryError>),

    /// The desired configuration itself cannot be converted
    #[error("desired configuration cannot be converted: {0}")]
    Desired(#[source] ConvertError),

    /// Pipeline stages were run out of order
    #[error("illegal pipeline transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current stage
        from: Stage,
        /// Requested stage
        to: Stage,
    },
}

impl From<EntryError> for ReconcileError {
    fn from(err: EntryError) -> Self {
        Self::Entry(Box::new(err))
    }
}
