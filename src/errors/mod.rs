//! Error taxonomy and its JSON rendering

pub mod app_error;
pub mod codes;
pub mod response;

pub use app_error::{AppError, ApplicationError, Details};
pub use codes::ErrorKind;
pub use response::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;
