//! Repository traits implemented for [`PgConnection`](crate::PgConnection).

mod object;

pub use object::ObjectRepository;
