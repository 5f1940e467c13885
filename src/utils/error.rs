use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid {entity} payload: {reason}")]
    PayloadError { entity: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

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
    Network,
    Api,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StorefrontError {
    pub fn payload(entity: &str, reason: impl Into<String>) -> Self {
        Self::PayloadError {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::UrlError(_) => ErrorCategory::Network,
            Self::ApiError { .. } => ErrorCategory::Api,
            Self::PayloadError { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError { status, .. } if *status < 500 => ErrorSeverity::Low,
            Self::HttpError(_) | Self::ApiError { .. } => ErrorSeverity::Medium,
            Self::PayloadError { .. } | Self::SerializationError(_) => ErrorSeverity::High,
            Self::UrlError(_) | Self::IoError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Message suitable for a toast or terminal line. API errors surface the
    /// server-provided text verbatim.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError { message, .. } => message.clone(),
            Self::HttpError(e) if e.is_timeout() => "The shop did not answer in time.".to_string(),
            Self::HttpError(_) => "Could not reach the shop.".to_string(),
            Self::PayloadError { entity, .. } => {
                format!("The shop sent an unexpected {} response.", entity)
            }
            Self::SerializationError(_) => "The shop sent malformed data.".to_string(),
            Self::IoError(e) => format!("Local file access failed: {}", e),
            Self::UrlError(e) => format!("Invalid address: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the api.base_url setting and your network connection",
            ErrorCategory::Api => "Retry the action; if it keeps failing refresh the cart",
            ErrorCategory::Data => "Check that the API version matches this client",
            ErrorCategory::Storage => "Check the settings file path and its permissions",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
