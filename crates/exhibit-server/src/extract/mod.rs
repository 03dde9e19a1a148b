//! Request extractors whose rejections render as JSON [`Error`] bodies.
//!
//! - [`Path`] - path parameters
//! - [`Multipart`] - `multipart/form-data` bodies
//! - [`Json`] - JSON response bodies
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_multipart;
mod enhanced_path;

pub use self::enhanced_json::Json;
pub use self::enhanced_multipart::Multipart;
pub use self::enhanced_path::Path;
