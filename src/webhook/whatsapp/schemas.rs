//! # WhatsApp Webhook Schemas
//!
//! This module contains the data structures for WhatsApp Business API webhooks.
//! Every level is lenient: missing arrays default to empty and unknown fields
//! are ignored, so status callbacks and other non-message events deserialize
//! into the same shape as message deliveries.

use serde::{Deserialize, Serialize};

/// Root webhook payload from WhatsApp
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    /// The object type, typically "whatsapp_business_account"
    #[serde(default)]
    pub object: Option<String>,
    /// Array of entry objects containing the actual data
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// Entry object containing changes and metadata
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Entry {
    /// Business Account ID
    #[serde(default)]
    pub id: Option<String>,
    /// Array of changes that occurred
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// Change object containing the actual webhook data
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Change {
    /// The field that changed (e.g., "messages")
    #[serde(default)]
    pub field: Option<String>,
    /// The value containing the actual data
    #[serde(default)]
    pub value: Option<ChangeValue>,
}

/// Value object containing messages and statuses
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChangeValue {
    /// Messaging product (e.g., "whatsapp")
    #[serde(default)]
    pub messaging_product: Option<String>,
    /// Array of messages received
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Array of statuses (for sent messages)
    #[serde(default)]
    pub statuses: Vec<Status>,
}

/// Message object
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    #[serde(default)]
    pub from: Option<String>,
    /// Message ID
    #[serde(default)]
    pub id: Option<String>,
    /// Timestamp of the message
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Message type (text, image, video, document, etc.)
    #[serde(default, rename = "type")]
    pub msg_type: Option<String>,
    /// Text message content (if type is "text")
    #[serde(default)]
    pub text: Option<TextMessage>,
}

/// Text message content
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TextMessage {
    /// The text body of the message
    #[serde(default)]
    pub body: Option<String>,
}

/// Status update for sent messages
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Status {
    /// Message ID
    #[serde(default)]
    pub id: Option<String>,
    /// Status (sent, delivered, read, failed)
    #[serde(default)]
    pub status: Option<String>,
    /// Timestamp
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Recipient ID
    #[serde(default)]
    pub recipient_id: Option<String>,
}
