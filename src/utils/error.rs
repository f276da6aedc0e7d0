use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{message}")]
    MissingParameter { message: String },

    #[error("{message}")]
    InvalidParameter { message: String },

    #[error("All API endpoints failed. Last error: {last_error}")]
    UpstreamExhausted { last_error: String },

    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ClientInput,
    Upstream,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProxyError {
    pub fn missing_parameter(message: impl Into<String>) -> Self {
        Self::MissingParameter {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// HTTP status the relay answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::ClientInput => 400,
            _ => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingParameter { .. } | Self::InvalidParameter { .. } => {
                ErrorCategory::ClientInput
            }
            Self::UpstreamExhausted { .. } | Self::HttpError(_) => ErrorCategory::Upstream,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::ClientInput => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "Provide the required search parameter",
            Self::InvalidParameter { .. } => "Check the query parameters of the request",
            Self::UpstreamExhausted { .. } | Self::HttpError(_) => {
                "Check upstream availability with /api/ping and /api/test"
            }
            Self::MissingConfigError { .. } => "Set the missing value in the config file or environment",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => "Fix the configuration file and restart",
            Self::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::ClientInput => self.to_string(),
            ErrorCategory::Upstream => format!("Trademark registry unavailable: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let err = ProxyError::missing_parameter("Search parameter is required");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Search parameter is required");
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_exhaustion_maps_to_500() {
        let err = ProxyError::UpstreamExhausted {
            last_error: "timeout".to_string(),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "All API endpoints failed. Last error: timeout");
        assert_eq!(err.category(), ErrorCategory::Upstream);
    }
}
