//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use exhibit_server::handler::routes;
//! use exhibit_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//! let router = routes(state);
//! # let _ = router;
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod channel;
mod error;
mod objects;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorResponse, Object, Objects};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route, bound to the given state.
///
/// Unknown paths answer with a JSON `404`.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(objects::routes(&state))
        .merge(channel::routes())
        .fallback(handler)
        .with_state(state)
}
