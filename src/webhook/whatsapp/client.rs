//! # WhatsApp API Client
//!
//! This module provides a client for sending messages to WhatsApp Business API.
//! Failures are returned to the caller; deciding whether to try again with
//! another body is the handler's job.

use super::outgoing_schemas::{
    OutboundMessage, OutgoingTemplateMessage, OutgoingTextMessage, WhatsAppMessageResponse,
};
use crate::{config::AppConfig, services::MessagingService};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// WhatsApp API client for sending messages
pub struct WhatsAppClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// WhatsApp Business API endpoint for sending messages
    endpoint: String,
    /// Authentication token
    auth_token: String,
}

impl WhatsAppClient {
    /// Creates a new WhatsApp client. The http client carries the timeout.
    pub fn new(client: reqwest::Client, app_config: &AppConfig) -> Self {
        Self {
            client,
            endpoint: app_config.whatsapp_send_msg_endpoint(),
            auth_token: app_config.whatsapp_access_token.clone(),
        }
    }

    /// Internal method to send any message type to WhatsApp API
    async fn post_message<T: serde::Serialize + Sync>(
        &self,
        message: &T,
    ) -> Result<WhatsAppMessageResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .json(message)
            .send()
            .await
            .context("Failed to send request to WhatsApp API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("WhatsApp API returned error status {}: {}", status, body);
        }

        let whatsapp_response: WhatsAppMessageResponse = response
            .json()
            .await
            .context("Failed to parse WhatsApp API response")?;

        Ok(whatsapp_response)
    }
}

#[async_trait]
impl MessagingService for WhatsAppClient {
    /// Sends a template or text message to `recipient`
    async fn send_message(
        &self,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<WhatsAppMessageResponse> {
        let response = match message {
            OutboundMessage::Template { name, language } => {
                let envelope =
                    OutgoingTemplateMessage::new(recipient.to_string(), name.clone(), language.clone());
                self.post_message(&envelope).await?
            }
            OutboundMessage::Text { body } => {
                let envelope = OutgoingTextMessage::new(recipient.to_string(), body.clone());
                self.post_message(&envelope).await?
            }
        };

        tracing::debug!(
            "WhatsApp {} message sent to {}: {:?}",
            message.kind(),
            recipient,
            response.messages
        );

        Ok(response)
    }
}
