//! Outbound collaborators of the webhook handler.
//!
//! Both are traits so the orchestrator can run against mocks in tests.

use crate::{
    errors::CompletionError,
    webhook::whatsapp::outgoing_schemas::{OutboundMessage, WhatsAppMessageResponse},
};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService {
    /// Answers a question using the policy document as system instruction.
    async fn get_policy_response(&self, question: &str) -> Result<String, CompletionError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingService {
    async fn send_message(
        &self,
        recipient: &str,
        message: &OutboundMessage,
    ) -> anyhow::Result<WhatsAppMessageResponse>;
}

pub type ImplCompletionService = Box<dyn CompletionService>;
pub type ImplMessagingService = Box<dyn MessagingService>;
