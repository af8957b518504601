mod environment;
mod error;

pub use environment::{ConfigError, Environment};
pub use error::{ApiErrorResponse, AppError, UPLOAD_URL_FAILED};
