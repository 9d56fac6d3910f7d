use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HrmError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Date out of supported range: {message}")]
    DateOutOfRange { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{} validation error(s) in form", errors.len())]
    FormValidation { errors: BTreeMap<String, String> },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Backend returned {status}: {detail}")]
    BackendError { status: u16, detail: String },
}

pub type Result<T> = std::result::Result<T, HrmError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
    Access,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code; every failure is non-zero.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl HrmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HrmError::ApiError(_) | HrmError::BackendError { .. } => ErrorCategory::Network,
            HrmError::CsvError(_) | HrmError::IoError(_) | HrmError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            HrmError::ConfigError { .. }
            | HrmError::ConfigValidationError { .. }
            | HrmError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            HrmError::InvalidDate { .. }
            | HrmError::DateOutOfRange { .. }
            | HrmError::ValidationError { .. }
            | HrmError::FormValidation { .. }
            | HrmError::NotFound { .. }
            | HrmError::Conflict { .. } => ErrorCategory::Input,
            HrmError::Forbidden { .. } | HrmError::Unauthorized { .. } => ErrorCategory::Access,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Access | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HrmError::ApiError(_) => "Check that the backend is reachable and the base URL is correct",
            HrmError::BackendError { .. } => "Inspect the backend response detail and retry",
            HrmError::CsvError(_) | HrmError::IoError(_) => {
                "Check that the data directory exists and is writable"
            }
            HrmError::SerializationError(_) => "The stored data may be corrupt; remove it and retry",
            HrmError::ConfigError { .. }
            | HrmError::ConfigValidationError { .. }
            | HrmError::InvalidConfigValueError { .. } => "Fix the configuration file and run again",
            HrmError::InvalidDate { .. } => "Enter the date as YYYY-MM-DD",
            HrmError::DateOutOfRange { .. } => "Use a BS year between 2000 and 2090",
            HrmError::ValidationError { .. } | HrmError::FormValidation { .. } => {
                "Fix the highlighted fields and submit again"
            }
            HrmError::NotFound { .. } => "Refresh the data and pick an existing record",
            HrmError::Conflict { .. } => "Choose a different value; this one is already taken",
            HrmError::Forbidden { .. } => "Ask an HR user or the superadmin to perform this action",
            HrmError::Unauthorized { .. } => "Log in again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HrmError::FormValidation { errors } => {
                let count = errors.len();
                format!(
                    "Form validation failed. {} error{} found. Please review and correct.",
                    count,
                    if count > 1 { "s" } else { "" }
                )
            }
            HrmError::ApiError(_) => "Could not reach the HR backend".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_by_category() {
        let input = HrmError::Conflict {
            message: "Email already registered".to_string(),
        };
        assert_eq!(input.category(), ErrorCategory::Input);
        assert_eq!(input.severity(), ErrorSeverity::Medium);

        let access = HrmError::Forbidden {
            message: "only superadmin can delete roles".to_string(),
        };
        assert_eq!(access.severity(), ErrorSeverity::High);

        let storage = HrmError::IoError(std::io::Error::other("disk full"));
        assert_eq!(storage.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_input_errors_exit_non_zero() {
        let bad_date = HrmError::InvalidDate {
            value: "2081-13-40".to_string(),
            reason: "month must be 1-12".to_string(),
        };
        let invalid_form = HrmError::FormValidation {
            errors: BTreeMap::new(),
        };
        let missing = HrmError::NotFound {
            entity: "User".to_string(),
            id: "unknown".to_string(),
        };
        for err in [bad_date, invalid_form, missing] {
            assert_eq!(err.category(), ErrorCategory::Input);
            assert_eq!(err.severity().exit_code(), 2);
        }

        let access = HrmError::Unauthorized {
            message: "Not signed in".to_string(),
        };
        assert_eq!(access.severity().exit_code(), 1);
        let storage = HrmError::IoError(std::io::Error::other("disk full"));
        assert_eq!(storage.severity().exit_code(), 3);
    }

    #[test]
    fn test_form_validation_message() {
        let mut errors = BTreeMap::new();
        errors.insert("identification.panNo".to_string(), "PAN number is required".to_string());
        let err = HrmError::FormValidation { errors };
        assert_eq!(err.to_string(), "1 validation error(s) in form");
        assert_eq!(
            err.user_friendly_message(),
            "Form validation failed. 1 error found. Please review and correct."
        );
    }
}
