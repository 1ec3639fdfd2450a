use serde_json::{Map, Value};
use std::error::Error as StdError;
use thiserror::Error;

use super::codes::ErrorKind;

/// Structured diagnostic payload attached to an error
pub type Details = Map<String, Value>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Uniform view over anything the boundary can render.
///
/// The boundary only ever talks to this trait, so it never needs to know
/// which category it is looking at.
pub trait ApplicationError: StdError + Send + Sync {
    fn message(&self) -> &str;
    fn status_code(&self) -> u16;
    fn error_type(&self) -> &str;
    fn details(&self) -> &Details;
}

/// Application-level failure.
///
/// `status_code` and `error_type` are derived from [`ErrorKind`]; only the
/// message and details vary between raise sites.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Details,
    /// Server-side cause, logged but never rendered
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    /// Error of the given category with its default message and no details
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            details: Details::new(),
            source: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace the details mapping
    pub fn with_details<I, K, V>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.details = details
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add one entry to the existing details, keeping the category
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn error_type(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Wrap an unclassified failure as `INTERNAL_ERROR`.
    ///
    /// The cause is retained for logging; the rendered message stays generic.
    pub fn internal_from(err: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Internal).with_source(err)
    }

    /// Find an `AppError` in a dynamic error or its source chain
    pub fn find_in<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a AppError> {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(app) = e.downcast_ref::<AppError>() {
                return Some(app);
            }
            current = e.source();
        }
        None
    }
}

/// Helpers for the named categories
impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound).with_message(message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation).with_message(message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict).with_message(message)
    }

    pub fn agent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Agent).with_message(message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(message)
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService).with_message(message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).with_message(message)
    }
}

impl ApplicationError for AppError {
    fn message(&self) -> &str {
        AppError::message(self)
    }

    fn status_code(&self) -> u16 {
        AppError::status_code(self)
    }

    fn error_type(&self) -> &str {
        AppError::error_type(self)
    }

    fn details(&self) -> &Details {
        AppError::details(self)
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Keep the category of an AppError that was wrapped with context.
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => Self::internal_from(other),
        }
    }
}
