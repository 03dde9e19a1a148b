//! Websocket endpoint for the `objects` channel.
//!
//! Each connection runs two tasks: one forwards queued [`ChannelEvent`]s to
//! the client, the other reads client commands. Whichever finishes first
//! aborts the other, and the connection is then dropped from the broadcaster.

use std::ops::ControlFlow;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::handler::{ErrorKind, Result};
use crate::service::{AllowedOrigins, ChannelCommand, ObjectBroadcaster, ServiceState};

/// Tracing target for websocket connections.
const TRACING_TARGET: &str = "exhibit_server::handler::channel";

/// Client messages above this size are ignored.
const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Handles one inbound frame.
///
/// Returns `ControlFlow::Break` when the client closed the connection.
async fn process_message(
    connection_id: Uuid,
    broadcaster: &ObjectBroadcaster,
    msg: Message,
) -> ControlFlow<(), ()> {
    match msg {
        Message::Text(text) => {
            let text = text.as_str();
            if text.len() > MAX_MESSAGE_SIZE {
                tracing::warn!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    message_size = text.len(),
                    max_size = MAX_MESSAGE_SIZE,
                    "message exceeds maximum size"
                );
                return ControlFlow::Continue(());
            }

            match ChannelCommand::parse(text) {
                Some(ChannelCommand::JoinObjects) => {
                    let joined = broadcaster.subscribe(connection_id).await;
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        joined,
                        "join requested"
                    );
                }
                Some(ChannelCommand::LeaveObjects) => {
                    let left = broadcaster.unsubscribe(connection_id).await;
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        left,
                        "leave requested"
                    );
                }
                None => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        message_length = text.len(),
                        "unknown command ignored"
                    );
                }
            }

            ControlFlow::Continue(())
        }
        Message::Binary(data) => {
            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                data_length = data.len(),
                "binary message ignored"
            );
            ControlFlow::Continue(())
        }
        Message::Close(close_frame) => {
            if let Some(cf) = close_frame {
                tracing::info!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    close_code = cf.code,
                    close_reason = %cf.reason,
                    "client sent close message"
                );
            } else {
                tracing::info!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    "client sent close message without frame"
                );
            }
            ControlFlow::Break(())
        }
        // Protocol-level ping/pong is answered by axum.
        Message::Ping(payload) => {
            tracing::trace!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                payload_len = payload.len(),
                "received protocol ping"
            );
            ControlFlow::Continue(())
        }
        Message::Pong(payload) => {
            tracing::trace!(
                target: TRACING_TARGET,
                connection_id = %connection_id,
                payload_len = payload.len(),
                "received protocol pong"
            );
            ControlFlow::Continue(())
        }
    }
}

/// Drives a single upgraded connection until either side goes away.
async fn handle_channel_socket(socket: WebSocket, broadcaster: ObjectBroadcaster) {
    let connection_id = Uuid::new_v4();
    let mut events = broadcaster.connect(connection_id).await;
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(
        target: TRACING_TARGET,
        connection_id = %connection_id,
        "websocket connection opened"
    );

    let mut send_task = tokio::spawn(async move {
        let mut msg_count: usize = 0;
        while let Some(event) = events.recv().await {
            let text = match event.to_text() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        event = event.name(),
                        error = %e,
                        "failed to serialize event"
                    );
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(Utf8Bytes::from(text))).await {
                tracing::debug!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    error = %e,
                    "failed to send event, closing connection"
                );
                break;
            }
            msg_count += 1;
        }
        msg_count
    });

    let recv_broadcaster = broadcaster.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut msg_count: usize = 0;
        while let Some(result) = receiver.next().await {
            let msg = match result {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        error = %e,
                        "websocket receive error"
                    );
                    break;
                }
            };

            msg_count += 1;
            if process_message(connection_id, &recv_broadcaster, msg)
                .await
                .is_break()
            {
                break;
            }
        }
        msg_count
    });

    tokio::select! {
        recv_result = (&mut recv_task) => {
            match recv_result {
                Ok(msg_count) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        messages_received = msg_count,
                        "receive task completed"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        error = %e,
                        "receive task panicked"
                    );
                }
            }
            send_task.abort();
        },
        send_result = (&mut send_task) => {
            match send_result {
                Ok(msg_count) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        messages_sent = msg_count,
                        "send task completed"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        target: TRACING_TARGET,
                        connection_id = %connection_id,
                        error = %e,
                        "send task panicked"
                    );
                }
            }
            recv_task.abort();
        }
    }

    broadcaster.on_disconnect(connection_id).await;

    tracing::info!(
        target: TRACING_TARGET,
        connection_id = %connection_id,
        "websocket connection closed"
    );
}

/// Upgrades the request to a websocket.
///
/// Browsers always send an `Origin` header; when one is present it must be in
/// the allowed list. Requests without one are accepted.
#[tracing::instrument(skip_all)]
async fn channel_handler(
    State(broadcaster): State<ObjectBroadcaster>,
    State(origins): State<AllowedOrigins>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    if let Some(origin) = headers.get(ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !origins.allows(origin) {
            tracing::warn!(
                target: TRACING_TARGET,
                origin = %origin,
                "websocket origin rejected"
            );
            return Err(ErrorKind::Forbidden
                .with_message("Origin not allowed")
                .with_context(origin.to_owned()));
        }
    }

    Ok(ws.on_upgrade(move |socket| handle_channel_socket(socket, broadcaster)))
}

/// Returns a [`Router`] with the websocket route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/ws", get(channel_handler))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::Value;

    use crate::handler::routes;
    use crate::handler::test::create_test_state;
    use crate::service::{AllowedOrigins, ObjectBroadcaster};

    async fn wait_for_members(broadcaster: &ObjectBroadcaster, expected: usize) {
        for _ in 0..200 {
            if broadcaster.member_count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("channel never reached {expected} members");
    }

    #[tokio::test]
    async fn joined_client_receives_object_events() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let broadcaster = state.broadcaster.clone();
        let server = TestServer::builder()
            .http_transport()
            .build(routes(state))?;

        let mut socket = server.get_websocket("/ws").await.into_websocket().await;
        socket.send_text("join:objects").await;
        wait_for_members(&broadcaster, 1).await;

        let form = MultipartForm::new()
            .add_text("title", "Lamp")
            .add_text("description", "Brass")
            .add_part(
                "image",
                Part::bytes(vec![1u8; 16])
                    .file_name("lamp.gif")
                    .mime_type("image/gif"),
            );
        let created: Value = server.post("/objects").multipart(form).await.json();
        let id = created["id"].as_str().unwrap().to_owned();

        let event: Value = socket.receive_json().await;
        assert_eq!(event["event"], "object:created");
        assert_eq!(event["data"]["id"], id.as_str());
        assert_eq!(event["data"]["title"], "Lamp");

        server
            .delete(&format!("/objects/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let event: Value = socket.receive_json().await;
        assert_eq!(event["event"], "object:deleted");
        assert_eq!(event["data"], id.as_str());
        Ok(())
    }

    #[tokio::test]
    async fn json_join_command_is_accepted() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let broadcaster = state.broadcaster.clone();
        let server = TestServer::builder()
            .http_transport()
            .build(routes(state))?;

        let mut socket = server.get_websocket("/ws").await.into_websocket().await;
        socket.send_text(r#"{"event":"join:objects"}"#).await;
        wait_for_members(&broadcaster, 1).await;

        socket.send_text("leave:objects").await;
        wait_for_members(&broadcaster, 0).await;
        Ok(())
    }

    #[tokio::test]
    async fn disallowed_origin_is_forbidden() -> anyhow::Result<()> {
        let state = create_test_state()?
            .with_allowed_origins(AllowedOrigins::new(["http://localhost:3000"]));
        let server = TestServer::builder()
            .http_transport()
            .build(routes(state))?;

        server
            .get_websocket("/ws")
            .add_header("Origin", "http://evil.example")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        Ok(())
    }
}
