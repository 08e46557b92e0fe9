//! Error types for stmtkit

use thiserror::Error;

/// Result type alias for statement building
pub type StatementResult<T> = Result<T, StatementError>;

/// Broad classification of a [`StatementError`].
///
/// Every error is raised before any SQL text is produced, so callers can
/// branch on the kind without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A scalar argument is null, blank, or out of its valid range.
    InvalidArgument,
    /// A mandatory list (fields, ordering) is empty.
    MissingInput,
    /// The dialect does not support the requested capability.
    Unsupported,
    /// Key or qualifier metadata does not line up with the requested fields.
    SchemaMismatch,
    /// A predicate leaf carries a value of the wrong shape.
    InvalidPredicate,
    /// A configuration document could not be loaded.
    Configuration,
}

/// Error types for statement building
#[derive(Debug, Error)]
pub enum StatementError {
    /// Null, empty or malformed argument
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        argument: &'static str,
        message: String,
    },

    /// Numeric argument outside its accepted range
    #[error("Argument '{argument}' is out of range: {message}")]
    OutOfRange {
        argument: &'static str,
        message: String,
    },

    /// Required list is empty
    #[error("Empty: {0}")]
    Empty(String),

    /// No usable fields remain for the statement
    #[error("Missing fields: {0}")]
    MissingFields(String),

    /// Capability not supported by the dialect
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Primary key could not be found or used
    #[error("Primary field not found: {0}")]
    PrimaryFieldNotFound(String),

    /// Qualifiers do not match the requested fields
    #[error("Invalid qualifiers: {0}")]
    InvalidQualifiers(String),

    /// Predicate value has the wrong shape for its operation
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    /// Batch would bind more parameters than the dialect allows
    #[error("Parameter limit exceeded: {count} parameters requested, the maximum is {max}")]
    ParameterLimitExceeded { count: usize, max: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StatementError {
    /// Create an invalid argument error
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Create an out-of-range error
    pub fn out_of_range(argument: &'static str, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            argument,
            message: message.into(),
        }
    }

    /// Create an empty-list error
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty(message.into())
    }

    /// Create a missing fields error
    pub fn missing_fields(message: impl Into<String>) -> Self {
        Self::MissingFields(message.into())
    }

    /// Create a not supported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create an invalid predicate error
    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Self::InvalidPredicate(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. }
            | Self::OutOfRange { .. }
            | Self::ParameterLimitExceeded { .. } => ErrorKind::InvalidArgument,
            Self::Empty(_) | Self::MissingFields(_) => ErrorKind::MissingInput,
            Self::NotSupported(_) => ErrorKind::Unsupported,
            Self::PrimaryFieldNotFound(_) | Self::InvalidQualifiers(_) => {
                ErrorKind::SchemaMismatch
            }
            Self::InvalidPredicate(_) => ErrorKind::InvalidPredicate,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Check if this is an out-of-range error
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Check if this is an empty-list error
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Check if this is a not supported error
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

impl From<toml::de::Error> for StatementError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for StatementError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
