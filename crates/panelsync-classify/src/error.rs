//! Classification error

/// No candidate shape could be chosen for a payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot classify {classifier} (candidates: {}): {reason}", .candidates.join(", "))]
pub struct ClassificationError {
    /// Classifier that failed
    pub classifier: &'static str,

    /// Every candidate that was attempted, in declared order
    pub candidates: Vec<&'static str>,

    /// Why no candidate was chosen
    pub reason: String,
}

impl ClassificationError {
    /// Create classification error
    #[inline]
    #[must_use]
    pub fn new(
        classifier: &'static str,
        candidates: Vec<&'static str>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            candidates,
            reason: reason.into(),
        }
    }
}
