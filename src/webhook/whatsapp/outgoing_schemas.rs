//! # WhatsApp Outgoing Message Schemas
//!
//! This module contains data structures for sending messages to WhatsApp Business API.
//! These schemas define the JSON payload structure for the supported message types.

use crate::consts;
use serde::{Deserialize, Serialize};

/// A message the relay can send, independent of the recipient
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Pre-registered template
    Template { name: String, language: String },
    /// Free-form text
    Text { body: String },
}

impl OutboundMessage {
    /// Template message; missing or empty values fall back to `hello_world` / `en_US`
    pub fn template(name: Option<&str>, language: Option<&str>) -> Self {
        Self::Template {
            name: non_empty_or(name, consts::DEFAULT_TEMPLATE_NAME),
            language: non_empty_or(language, consts::DEFAULT_TEMPLATE_LANGUAGE),
        }
    }

    /// Text message; a missing or empty body falls back to a greeting
    pub fn text(body: Option<&str>) -> Self {
        Self::Text {
            body: non_empty_or(body, consts::DEFAULT_TEXT_BODY),
        }
    }

    /// Type discriminator used by the Cloud API
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Template { .. } => "template",
            Self::Text { .. } => "text",
        }
    }
}

fn non_empty_or(value: Option<&str>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Text message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Message type
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Text content
    pub text: OutgoingTextContent,
}

impl OutgoingTextMessage {
    /// Creates a new text message
    pub fn new(to: String, body: String) -> Self {
        Self {
            messaging_product: consts::WHATSAPP_MESSAGING_PRODUCT.to_string(),
            to,
            msg_type: "text".to_string(),
            text: OutgoingTextContent { body },
        }
    }
}

/// Text content for outgoing messages
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextContent {
    /// Message body text
    pub body: String,
}

/// Template message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTemplateMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Message type, "template"
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Template reference
    pub template: TemplateContent,
}

impl OutgoingTemplateMessage {
    /// Creates a new template message
    pub fn new(to: String, name: String, language_code: String) -> Self {
        Self {
            messaging_product: consts::WHATSAPP_MESSAGING_PRODUCT.to_string(),
            to,
            msg_type: "template".to_string(),
            template: TemplateContent {
                name,
                language: TemplateLanguage {
                    code: language_code,
                },
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateContent {
    /// Registered template name
    pub name: String,
    pub language: TemplateLanguage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateLanguage {
    /// Language code, e.g. "en_US"
    pub code: String,
}

/// Response from WhatsApp API when sending a message
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WhatsAppMessageResponse {
    /// Messaging product
    #[serde(default)]
    pub messaging_product: String,
    /// Array of contacts (recipients)
    #[serde(default)]
    pub contacts: Vec<WhatsAppContact>,
    /// Array of messages sent
    #[serde(default)]
    pub messages: Vec<WhatsAppMessageStatus>,
}

/// Contact information in response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppContact {
    /// WhatsApp ID of the contact
    pub wa_id: String,
    /// Input phone number
    #[serde(default)]
    pub input: String,
}

/// Message status in response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppMessageStatus {
    /// Message ID
    pub id: String,
}
