//! Error types for chart loading and settings validation

use thiserror::Error;

/// Result type for app chart operations
pub type Result<T> = std::result::Result<T, AppChartError>;

/// Infrastructure errors: malformed resources, storage and configuration.
///
/// These never describe a bad override value. Those are reported as
/// [`ValidationError`]s and collected, not returned early.
#[derive(Error, Debug)]
pub enum AppChartError {
    #[error("Malformed app chart: {0}")]
    SchemaMalformed(String),

    #[error("Not Found: application chart '{0}' does not exist")]
    ChartNotKnown(String),

    #[error("Invalid resource {path}: {reason}")]
    InvalidResource { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Informational grouping of validation failures.
///
/// `BadSpec` points at the chart author, everything else at the user who
/// supplied the override. Both are reported the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    BadSpec,
    TypeMismatch,
    OutOfBounds,
    IllegalValue,
    UnknownSetting,
}

/// What went wrong with a single setting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("Bad spec: Unknown type {0:?}")]
    UnknownType(String),

    #[error("Bad spec: Bad minimum {0:?}")]
    BadMinimum(String),

    #[error("Bad spec: Bad maximum {0:?}")]
    BadMaximum(String),

    #[error("Out of bounds, {0:?} too small")]
    TooSmall(String),

    #[error("Out of bounds, {0:?} too large")]
    TooLarge(String),

    #[error("Illegal string {0:?}")]
    IllegalString(String),

    #[error("Expected integer, got {0:?}")]
    ExpectedInteger(String),

    #[error("Expected number, got {0:?}")]
    ExpectedNumber(String),

    #[error("Expected boolean, got {0:?}")]
    ExpectedBoolean(String),

    #[error("Unknown setting, not declared by the app chart")]
    UnknownSetting,
}

impl ValidationErrorKind {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::UnknownType(_) | Self::BadMinimum(_) | Self::BadMaximum(_) => {
                FailureCategory::BadSpec
            }
            Self::TooSmall(_) | Self::TooLarge(_) => FailureCategory::OutOfBounds,
            Self::IllegalString(_) => FailureCategory::IllegalValue,
            Self::ExpectedInteger(_) | Self::ExpectedNumber(_) | Self::ExpectedBoolean(_) => {
                FailureCategory::TypeMismatch
            }
            Self::UnknownSetting => FailureCategory::UnknownSetting,
        }
    }
}

/// A failed setting: its name plus the reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Setting {setting:?}: {kind}")]
pub struct ValidationError {
    pub setting: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(setting: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            setting: setting.into(),
            kind,
        }
    }

    pub fn category(&self) -> FailureCategory {
        self.kind.category()
    }

    /// True when the chart itself is at fault rather than the override
    pub fn is_bad_spec(&self) -> bool {
        self.category() == FailureCategory::BadSpec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefix() {
        let err = ValidationError::new("field", ValidationErrorKind::TooSmall("-2".into()));
        assert_eq!(err.to_string(), r#"Setting "field": Out of bounds, "-2" too small"#);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let err = ValidationError::new("field", ValidationErrorKind::IllegalString("a\"b".into()));
        assert_eq!(err.to_string(), r#"Setting "field": Illegal string "a\"b""#);
    }

    #[test]
    fn test_categories() {
        assert!(ValidationError::new("x", ValidationErrorKind::BadMaximum("q".into())).is_bad_spec());
        assert_eq!(
            ValidationErrorKind::ExpectedBoolean("x".into()).category(),
            FailureCategory::TypeMismatch
        );
        assert_eq!(ValidationErrorKind::UnknownSetting.category(), FailureCategory::UnknownSetting);
    }
}
