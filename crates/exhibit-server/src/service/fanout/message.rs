use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::service::ObjectRecord;

/// Inbound control message from a websocket client.
///
/// Accepted either as JSON (`{"event":"join:objects"}`) or as the bare text
/// `join:objects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ChannelCommand {
    /// Start receiving object events.
    #[strum(serialize = "join:objects")]
    JoinObjects,
    /// Stop receiving object events.
    #[strum(serialize = "leave:objects")]
    LeaveObjects,
}

#[derive(Deserialize)]
struct CommandEnvelope<'a> {
    #[serde(borrow)]
    event: &'a str,
}

impl ChannelCommand {
    /// Parses a text frame into a command.
    ///
    /// Returns `None` for anything that is not a known command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let event = match serde_json::from_str::<CommandEnvelope<'_>>(text) {
            Ok(envelope) => envelope.event,
            Err(_) => text,
        };

        event.parse().ok()
    }
}

/// Payload of an `object:created` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCreatedPayload {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub created_at: Timestamp,
}

impl From<&ObjectRecord> for ObjectCreatedPayload {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            image_url: record.image_url.clone(),
            created_at: record.created_at,
        }
    }
}

/// Outbound event pushed to members of the `objects` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChannelEvent {
    /// A new object was stored.
    #[serde(rename = "object:created")]
    ObjectCreated(ObjectCreatedPayload),
    /// An object was deleted; carries its id.
    #[serde(rename = "object:deleted")]
    ObjectDeleted(Uuid),
}

impl ChannelEvent {
    /// Returns the wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ObjectCreated(_) => "object:created",
            Self::ObjectDeleted(_) => "object:deleted",
        }
    }

    /// Serializes the event to JSON text.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_json_and_bare_commands() {
        assert_eq!(
            ChannelCommand::parse(r#"{"event":"join:objects"}"#),
            Some(ChannelCommand::JoinObjects)
        );
        assert_eq!(
            ChannelCommand::parse(r#"{"event":"leave:objects","data":null}"#),
            Some(ChannelCommand::LeaveObjects)
        );
        assert_eq!(
            ChannelCommand::parse("join:objects"),
            Some(ChannelCommand::JoinObjects)
        );
        assert_eq!(
            ChannelCommand::parse("leave:objects"),
            Some(ChannelCommand::LeaveObjects)
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(ChannelCommand::parse("join:users"), None);
        assert_eq!(ChannelCommand::parse(r#"{"event":"object:created"}"#), None);
        assert_eq!(ChannelCommand::parse(r#"{"type":"join:objects"}"#), None);
        assert_eq!(ChannelCommand::parse(""), None);
    }

    #[test]
    fn command_display_matches_wire_name() {
        assert_eq!(ChannelCommand::JoinObjects.to_string(), "join:objects");
        assert_eq!(ChannelCommand::LeaveObjects.to_string(), "leave:objects");
    }

    #[test]
    fn created_event_wire_format() -> anyhow::Result<()> {
        let id = Uuid::new_v4();
        let created_at: Timestamp = "2025-01-02T03:04:05Z".parse()?;
        let event = ChannelEvent::ObjectCreated(ObjectCreatedPayload {
            id,
            title: "Vase".into(),
            description: "Blue glaze".into(),
            image_url: "https://bucket.s3.us-east-1.amazonaws.com/objects/1.png".into(),
            created_at,
        });

        let value: serde_json::Value = serde_json::from_str(&event.to_text()?)?;
        assert_eq!(
            value,
            json!({
                "event": "object:created",
                "data": {
                    "id": id.to_string(),
                    "title": "Vase",
                    "description": "Blue glaze",
                    "imageUrl": "https://bucket.s3.us-east-1.amazonaws.com/objects/1.png",
                    "createdAt": "2025-01-02T03:04:05Z",
                }
            })
        );
        Ok(())
    }

    #[test]
    fn deleted_event_wire_format() -> anyhow::Result<()> {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(ChannelEvent::ObjectDeleted(id))?;
        assert_eq!(value, json!({ "event": "object:deleted", "data": id.to_string() }));
        assert_eq!(ChannelEvent::ObjectDeleted(id).name(), "object:deleted");
        Ok(())
    }
}
