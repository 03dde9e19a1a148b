//! Database models mapped onto the tables in [`schema`](crate::schema).

mod object;

pub use object::{NewObject, Object};
