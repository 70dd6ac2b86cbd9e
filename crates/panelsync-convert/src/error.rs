//! Error types for panel conversion
//!
//! - [`ConvertError`]: one panel could not be converted (data error)
//! - [`RegistryError`]: the registry itself is broken (programming error)
//! - [`DispatchError`]: either of the two, returned by registry dispatch

use panelsync_classify::ClassificationError;
use panelsync_value::ParseError;

/// Errors converting a single panel
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Malformed JSON text
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No candidate shape matched a polymorphic sub-object
    #[error("at {path}: {source}")]
    Classification {
        /// Entry-local path of the sub-object
        path: String,
        /// Classifier failure
        #[source]
        source: ClassificationError,
    },

    /// An owned payload lacks required fields or has the wrong types
    #[error("conversion failed at {path}: {message}")]
    Conversion {
        /// Entry-local path of the offending field
        path: String,
        /// What was wrong
        message: String,
    },

    /// Mutually exclusive representations are populated together
    #[error("contradiction: {0}")]
    Contradiction(String),
}

impl ConvertError {
    /// Create classification error at path
    pub fn classification(path: impl Into<String>, source: ClassificationError) -> Self {
        Self::Classification {
            path: path.into(),
            source,
        }
    }

    /// Create conversion error at path
    pub fn conversion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create contradiction error
    pub fn contradiction(message: impl Into<String>) -> Self {
        Self::Contradiction(message.into())
    }

    /// Check if this is a contradiction
    #[inline]
    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction(_))
    }
}

/// Registry defects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Several converters claim the same payload
    #[error("converters {claimants:?} all claim {subject}")]
    AmbiguousOwnership {
        /// Panel type or config slot being claimed
        subject: String,
        /// Kinds of the claiming converters
        claimants: Vec<&'static str>,
    },

    /// No converter and no fallback for a payload
    #[error("no converter owns {0} and no fallback is registered")]
    Unowned(String),

    /// A converter kind is registered twice
    #[error("converter kind '{0}' is already registered")]
    DuplicateKind(&'static str),
}

/// Errors returned by registry dispatch
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Panel-local failure
    #[error(transparent)]
    Entry(#[from] ConvertError),

    /// Broken registry
    #[error("registry defect: {0}")]
    Registry(#[from] RegistryError),
}

impl DispatchError {
    /// Check if this is a registry defect
    #[inline]
    #[must_use]
    pub fn is_registry_defect(&self) -> bool {
        matches!(self, Self::Registry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_display() {
        let err = ConvertError::conversion("attributes.layers[1].y[0]", "expected object, found string");
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.layers[1].y[0]: expected object, found string"
        );
    }

    #[test]
    fn classification_error_carries_path() {
        let source = ClassificationError::new("xy layer", vec!["data", "reference lines"], "no match");
        let err = ConvertError::classification("attributes.layers[0]", source);
        assert!(err.to_string().starts_with("at attributes.layers[0]: cannot classify xy layer"));
    }

    #[test]
    fn dispatch_error_kinds() {
        let entry = DispatchError::from(ConvertError::contradiction("two slots"));
        let registry = DispatchError::from(RegistryError::DuplicateKind("pie"));
        assert!(!entry.is_registry_defect());
        assert!(registry.is_registry_defect());
        assert_eq!(
            registry.to_string(),
            "registry defect: converter kind 'pie' is already registered"
        );
    }
}
