//! Reduction of a delivery payload to the single message the relay answers.
//!
//! Only `entry[0].changes[0].value.messages[0]` is inspected. Further
//! entries, changes or messages in the same delivery are dropped.

use super::schemas::{Status, WebhookPayload};
use serde::Deserialize;

/// What a delivery asks the relay to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Nothing to answer: status callbacks, other events, malformed payloads
    NoMessage,
    /// A text message from `sender`
    Text { sender: String, body: String },
    /// Any other message type from `sender`
    Other { sender: String, kind: String },
}

impl InboundEvent {
    /// Parses an arbitrary JSON body. Never fails: anything that does not
    /// lead to a usable first message is [`InboundEvent::NoMessage`].
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        parse_delivery(payload)
            .map(|payload| Self::from_webhook(&payload))
            .unwrap_or(Self::NoMessage)
    }

    /// Picks the first message of the first change of the first entry
    pub fn from_webhook(payload: &WebhookPayload) -> Self {
        let Some(message) = payload
            .entry
            .first()
            .and_then(|entry| entry.changes.first())
            .and_then(|change| change.value.as_ref())
            .and_then(|value| value.messages.first())
        else {
            return Self::NoMessage;
        };

        let Some(sender) = message.from.clone().filter(|from| !from.is_empty()) else {
            return Self::NoMessage;
        };

        match message.msg_type.as_deref() {
            Some("text") => match message.text.as_ref().and_then(|text| text.body.clone()) {
                Some(body) => Self::Text { sender, body },
                None => Self::NoMessage,
            },
            other => Self::Other {
                sender,
                kind: other.unwrap_or("unknown").to_string(),
            },
        }
    }

    /// Sender to reply to, when there is one
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::NoMessage => None,
            Self::Text { sender, .. } | Self::Other { sender, .. } => Some(sender),
        }
    }
}

/// Reads a JSON body as a delivery, borrowing it. `None` when it does not
/// match the delivery schema at all.
pub fn parse_delivery(payload: &serde_json::Value) -> Option<WebhookPayload> {
    match WebhookPayload::deserialize(payload) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!("Payload does not match the delivery schema: {e}");
            None
        }
    }
}

/// Status updates for previously sent messages, across the whole delivery
pub fn status_updates(payload: &WebhookPayload) -> Vec<&Status> {
    payload
        .entry
        .iter()
        .flat_map(|entry| &entry.changes)
        .filter_map(|change| change.value.as_ref())
        .flat_map(|value| &value.statuses)
        .collect::<Vec<_>>()
}
