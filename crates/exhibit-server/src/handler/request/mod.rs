//! Request types for HTTP handlers.

mod objects;

pub use objects::CreateObjectForm;
