//! Realtime fan-out of object lifecycle events.
//!
//! Every websocket connection registers with the [`ObjectBroadcaster`] and
//! gets a private bounded FIFO queue. Connections that send `join:objects` become
//! members of the `objects` channel; [`ObjectBroadcaster::publish`] delivers
//! each [`ChannelEvent`] to all current members.

mod broadcaster;
mod message;

pub use broadcaster::{DEFAULT_QUEUE_CAPACITY, DeliveryError, ObjectBroadcaster};
pub use message::{ChannelCommand, ChannelEvent, ObjectCreatedPayload};

/// Tracing target for fan-out operations.
pub(crate) const TRACING_TARGET: &str = "exhibit_server::service::fanout";

/// Name of the only channel clients can join.
pub const OBJECTS_CHANNEL: &str = "objects";
