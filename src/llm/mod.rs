//! Policy question answering through a chat-completion model.
//!
//! - [`schemas`] - wire format of the completion endpoint
//! - [`openai`] - http client implementing [`CompletionService`](crate::services::CompletionService)

pub mod openai;
pub mod schemas;

use crate::consts;
use schemas::{ChatCompletionRequest, ChatMessage};

/// Builds the completion request for one user question.
///
/// The system instruction is always the policy document and the generation
/// parameters are fixed; only the model and the question vary.
pub fn compose_policy_request(model: &str, question: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::System {
                content: consts::POLICY_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage::User {
                content: question.to_string(),
            },
        ],
        temperature: consts::COMPLETION_TEMPERATURE,
        max_tokens: consts::COMPLETION_MAX_TOKENS,
    }
}
