use thiserror::Error;

/// Errors a lookup can end with.
///
/// Per-source failures never appear here; they are absorbed at the adapter
/// boundary and only show up as missing rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The request was malformed (e.g. blank product code).
    #[error("invalid query: {0}")]
    Validation(String),

    /// No source had a matching record.
    #[error("no stock found for '{code}'")]
    NotFound { code: String },
}

impl LookupError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LookupError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LookupError::NotFound {
            code: "X1".to_string(),
        };
        assert_eq!(err.to_string(), "no stock found for 'X1'");
        assert!(err.is_not_found());
        assert!(!err.is_validation());

        let err = LookupError::Validation("product code must not be empty".to_string());
        assert!(err.to_string().starts_with("invalid query"));
        assert!(err.is_validation());
    }
}
