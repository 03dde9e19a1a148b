//! Response types for HTTP handlers.

mod error_response;
mod objects;

pub use error_response::ErrorResponse;
pub use objects::{Object, Objects};
