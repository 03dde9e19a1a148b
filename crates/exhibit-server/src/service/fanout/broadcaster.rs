use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

use super::{ChannelEvent, OBJECTS_CHANNEL, TRACING_TARGET};

/// Number of undelivered events a single connection may hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// An event could not be queued for one connection.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The client stopped reading and its queue is full. The event is dropped.
    #[error("queue full, {event} dropped for connection {connection_id}")]
    QueueFull {
        connection_id: Uuid,
        event: &'static str,
    },
    /// The connection's receiver is gone.
    #[error("failed to deliver {event} to closed connection {connection_id}")]
    Closed {
        connection_id: Uuid,
        event: &'static str,
    },
}

impl DeliveryError {
    fn new<T>(connection_id: Uuid, event: &'static str, error: &TrySendError<T>) -> Self {
        match error {
            TrySendError::Full(_) => Self::QueueFull {
                connection_id,
                event,
            },
            TrySendError::Closed(_) => Self::Closed {
                connection_id,
                event,
            },
        }
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    connections: HashMap<Uuid, Sender<ChannelEvent>>,
    members: HashSet<Uuid>,
}

/// Owned, clone-able handle to the connection registry and the `objects`
/// membership set.
///
/// Membership changes take the write lock. [`publish`](Self::publish) holds
/// the read lock for the whole dispatch, so the member snapshot it delivers
/// to cannot change midway.
#[derive(Debug, Clone)]
pub struct ObjectBroadcaster {
    state: Arc<RwLock<ChannelState>>,
    queue_capacity: usize,
}

impl Default for ObjectBroadcaster {
    fn default() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl ObjectBroadcaster {
    /// Creates a broadcaster with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a broadcaster whose per-connection queues hold at most
    /// `capacity` events. A capacity of zero is raised to one.
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::default(),
            queue_capacity: capacity.max(1),
        }
    }

    /// Registers a connection and returns the receiving end of its queue.
    ///
    /// The connection starts outside the `objects` channel.
    pub async fn connect(&self, connection_id: Uuid) -> Receiver<ChannelEvent> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let mut state = self.state.write().await;
        if state.connections.insert(connection_id, tx).is_some() {
            tracing::warn!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                "connection id registered twice, previous queue replaced"
            );
        }

        rx
    }

    /// Adds the connection to the `objects` channel.
    ///
    /// Returns `true` if membership changed.
    pub async fn subscribe(&self, connection_id: Uuid) -> bool {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&connection_id) {
            tracing::warn!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                "subscribe from unknown connection ignored"
            );
            return false;
        }

        let joined = state.members.insert(connection_id);
        if joined {
            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                channel = OBJECTS_CHANNEL,
                members = state.members.len(),
                "connection joined channel"
            );
        }

        joined
    }

    /// Removes the connection from the `objects` channel.
    ///
    /// Returns `true` if membership changed.
    pub async fn unsubscribe(&self, connection_id: Uuid) -> bool {
        let mut state = self.state.write().await;
        let left = state.members.remove(&connection_id);
        if left {
            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                channel = OBJECTS_CHANNEL,
                members = state.members.len(),
                "connection left channel"
            );
        }

        left
    }

    /// Forgets the connection entirely.
    pub async fn on_disconnect(&self, connection_id: Uuid) {
        let mut state = self.state.write().await;
        let was_member = state.members.remove(&connection_id);
        let was_connected = state.connections.remove(&connection_id).is_some();

        tracing::debug!(
            target: TRACING_TARGET,
            connection_id = %connection_id,
            was_member,
            was_connected,
            "connection removed"
        );
    }

    /// Queues `event` for every current member of the `objects` channel.
    ///
    /// Never blocks on a slow client and never fails. A member whose queue
    /// is full or closed is logged and skipped.
    pub async fn publish(&self, event: ChannelEvent) {
        let state = self.state.read().await;
        let mut delivered = 0usize;

        for connection_id in &state.members {
            let Some(tx) = state.connections.get(connection_id) else {
                continue;
            };

            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    let error = DeliveryError::new(*connection_id, event.name(), &e);
                    tracing::warn!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        error = %error,
                        "event delivery failed"
                    );
                }
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            event = event.name(),
            members = state.members.len(),
            delivered,
            "event published"
        );
    }

    /// Returns the number of connections in the `objects` channel.
    pub async fn member_count(&self) -> usize {
        self.state.read().await.members.len()
    }

    /// Returns the number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted() -> (Uuid, ChannelEvent) {
        let id = Uuid::new_v4();
        (id, ChannelEvent::ObjectDeleted(id))
    }

    #[tokio::test]
    async fn only_members_receive_events() {
        let broadcaster = ObjectBroadcaster::new();
        let (member, outsider) = (Uuid::new_v4(), Uuid::new_v4());
        let mut member_rx = broadcaster.connect(member).await;
        let mut outsider_rx = broadcaster.connect(outsider).await;

        assert!(broadcaster.subscribe(member).await);

        let (_, event) = deleted();
        broadcaster.publish(event.clone()).await;

        assert_eq!(member_rx.try_recv().ok(), Some(event));
        assert!(member_rx.try_recv().is_err());
        assert!(outsider_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn late_member_misses_earlier_events() {
        let broadcaster = ObjectBroadcaster::new();
        let early = Uuid::new_v4();
        let mut early_rx = broadcaster.connect(early).await;
        broadcaster.subscribe(early).await;

        let (_, before) = deleted();
        broadcaster.publish(before.clone()).await;

        let late = Uuid::new_v4();
        let mut late_rx = broadcaster.connect(late).await;
        assert!(broadcaster.subscribe(late).await);
        assert!(late_rx.try_recv().is_err());

        let (_, after) = deleted();
        broadcaster.publish(after.clone()).await;

        assert_eq!(early_rx.try_recv().ok(), Some(before));
        assert_eq!(early_rx.try_recv().ok(), Some(after.clone()));
        assert!(early_rx.try_recv().is_err());
        assert_eq!(late_rx.try_recv().ok(), Some(after));
        assert!(late_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_drops_events_for_that_member_only() {
        let broadcaster = ObjectBroadcaster::with_queue_capacity(2);
        let (stalled, reader) = (Uuid::new_v4(), Uuid::new_v4());
        let mut stalled_rx = broadcaster.connect(stalled).await;
        let mut reader_rx = broadcaster.connect(reader).await;
        broadcaster.subscribe(stalled).await;
        broadcaster.subscribe(reader).await;

        let events: Vec<_> = (0..3).map(|_| deleted().1).collect();
        for event in &events {
            broadcaster.publish(event.clone()).await;
            assert_eq!(reader_rx.try_recv().ok(), Some(event.clone()));
        }

        assert_eq!(stalled_rx.try_recv().ok(), Some(events[0].clone()));
        assert_eq!(stalled_rx.try_recv().ok(), Some(events[1].clone()));
        assert!(stalled_rx.try_recv().is_err());

        let (_, next) = deleted();
        broadcaster.publish(next.clone()).await;
        assert_eq!(stalled_rx.try_recv().ok(), Some(next));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let broadcaster = ObjectBroadcaster::with_queue_capacity(0);
        assert_eq!(broadcaster.queue_capacity, 1);
    }

    #[tokio::test]
    async fn subscribe_and_unsubscribe_are_idempotent() {
        let broadcaster = ObjectBroadcaster::new();
        let id = Uuid::new_v4();
        let _rx = broadcaster.connect(id).await;

        assert!(broadcaster.subscribe(id).await);
        assert!(!broadcaster.subscribe(id).await);
        assert_eq!(broadcaster.member_count().await, 1);

        assert!(broadcaster.unsubscribe(id).await);
        assert!(!broadcaster.unsubscribe(id).await);
        assert_eq!(broadcaster.member_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_connection_cannot_subscribe() {
        let broadcaster = ObjectBroadcaster::new();
        assert!(!broadcaster.subscribe(Uuid::new_v4()).await);
        assert_eq!(broadcaster.member_count().await, 0);
    }

    #[tokio::test]
    async fn left_connection_stops_receiving() {
        let broadcaster = ObjectBroadcaster::new();
        let id = Uuid::new_v4();
        let mut rx = broadcaster.connect(id).await;
        broadcaster.subscribe(id).await;
        broadcaster.unsubscribe(id).await;

        broadcaster.publish(deleted().1).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let broadcaster = ObjectBroadcaster::new();
        let id = Uuid::new_v4();
        let mut rx = broadcaster.connect(id).await;
        broadcaster.subscribe(id).await;

        let events: Vec<_> = (0..5).map(|_| deleted().1).collect();
        for event in &events {
            broadcaster.publish(event.clone()).await;
        }

        for expected in events {
            assert_eq!(rx.recv().await, Some(expected));
        }
    }

    #[tokio::test]
    async fn disconnect_removes_membership_and_connection() {
        let broadcaster = ObjectBroadcaster::new();
        let (member, never_joined) = (Uuid::new_v4(), Uuid::new_v4());
        let _member_rx = broadcaster.connect(member).await;
        let _other_rx = broadcaster.connect(never_joined).await;
        broadcaster.subscribe(member).await;

        broadcaster.on_disconnect(member).await;
        broadcaster.on_disconnect(never_joined).await;
        broadcaster.on_disconnect(Uuid::new_v4()).await;

        assert_eq!(broadcaster.member_count().await, 0);
        assert_eq!(broadcaster.connection_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_affect_others() {
        let broadcaster = ObjectBroadcaster::new();
        let (gone, alive) = (Uuid::new_v4(), Uuid::new_v4());
        let gone_rx = broadcaster.connect(gone).await;
        let mut alive_rx = broadcaster.connect(alive).await;
        broadcaster.subscribe(gone).await;
        broadcaster.subscribe(alive).await;
        drop(gone_rx);

        let (_, event) = deleted();
        broadcaster.publish(event.clone()).await;

        assert_eq!(alive_rx.try_recv().ok(), Some(event));
    }

    #[tokio::test]
    async fn publish_with_no_members_is_a_no_op() {
        let broadcaster = ObjectBroadcaster::new();
        broadcaster.publish(deleted().1).await;
        assert_eq!(broadcaster.connection_count().await, 0);
    }
}
