use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Failure categories rendered in the `error` field of API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Requested entity is absent
    #[serde(rename = "NOT_FOUND")]
    NotFound,

    /// Input failed semantic or schema validation
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,

    /// Path exists but does not accept the request method
    #[serde(rename = "METHOD_NOT_ALLOWED")]
    MethodNotAllowed,

    /// Mutation violates a uniqueness or state precondition
    #[serde(rename = "CONFLICT")]
    Conflict,

    /// Agent execution failed
    #[serde(rename = "AGENT_ERROR")]
    Agent,

    /// Missing or invalid runtime configuration
    #[serde(rename = "CONFIGURATION_ERROR")]
    Configuration,

    /// A dependency outside the process failed or returned garbage
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalService,

    /// Anything that does not fit the categories above
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        Self::NotFound,
        Self::Validation,
        Self::MethodNotAllowed,
        Self::Conflict,
        Self::Agent,
        Self::Configuration,
        Self::ExternalService,
        Self::Internal,
    ];

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 422,
            Self::MethodNotAllowed => 405,
            Self::Conflict => 409,
            Self::Agent => 500,
            Self::Configuration => 500,
            Self::ExternalService => 502,
            Self::Internal => 500,
        }
    }

    /// Machine-readable tag, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Conflict => "CONFLICT",
            Self::Agent => "AGENT_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::ExternalService => "EXTERNAL_SERVICE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Message used when the raise site does not supply one
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Validation => "Validation failed",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Conflict => "Resource conflict",
            Self::Agent => "Agent execution failed",
            Self::Configuration => "Configuration error",
            Self::ExternalService => "External service error",
            Self::Internal => "Internal server error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
