use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Recommendation service error: {message}")]
    RecommendationService { message: String },

    #[error("Routing service error: {message}")]
    RoutingService { message: String },

    #[error("ATM '{atm_id}' is not present in the catalog")]
    JoinMismatch { atm_id: String },

    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    RemoteService,
    Catalog,
    Location,
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

impl FinderError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn recommendation(message: impl Into<String>) -> Self {
        Self::RecommendationService {
            message: message.into(),
        }
    }

    pub fn routing(message: impl Into<String>) -> Self {
        Self::RoutingService {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::RecommendationService { .. } | Self::RoutingService { .. } | Self::Http(_) => {
                ErrorCategory::RemoteService
            }
            Self::JoinMismatch { .. } | Self::Csv(_) => ErrorCategory::Catalog,
            Self::LocationUnavailable { .. } => ErrorCategory::Location,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    /// 服務錯誤會降級處理，不會中斷整個流程
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::JoinMismatch { .. } => ErrorSeverity::Low,
            Self::RecommendationService { .. }
            | Self::RoutingService { .. }
            | Self::Http(_)
            | Self::LocationUnavailable { .. } => ErrorSeverity::Medium,
            Self::InvalidInput { .. }
            | Self::Csv(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Serialization(_) => ErrorSeverity::Critical,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => {
                "Check the catalog contents, the shortlist size and the supplied coordinates"
            }
            Self::RecommendationService { .. } => {
                "Verify the recommendation endpoint is reachable or raise recommendation.timeout_seconds"
            }
            Self::RoutingService { .. } => {
                "Verify the routing endpoint and access token, or disable routing"
            }
            Self::JoinMismatch { .. } => "The catalog may be out of date with the scoring service",
            Self::LocationUnavailable { .. } => {
                "Pass --lat/--lon or configure a default [location]"
            }
            Self::Http(_) => "Check network connectivity and retry",
            Self::Csv(_) => "Make sure the catalog CSV has the header atmId,name,address,latitude,longitude",
            Self::Io(_) => "Check that the file exists and is readable",
            Self::Serialization(_) => "The data could not be encoded or decoded as JSON",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The request could not be processed: {}", self),
            ErrorCategory::RemoteService => format!("A remote service is unavailable: {}", self),
            ErrorCategory::Catalog => format!("The ATM catalog could not be used: {}", self),
            ErrorCategory::Location => format!("Your location could not be determined: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("Unexpected system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
