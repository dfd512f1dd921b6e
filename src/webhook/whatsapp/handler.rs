//! # WhatsApp Webhook Handler
//!
//! Turns one delivery into at most one answer. The first message of the
//! delivery is answered through the completion service; anything else is
//! logged and acknowledged. Nothing here reports failure to the caller: the
//! provider only ever sees a 200.

use super::{
    event::{InboundEvent, parse_delivery, status_updates},
    outgoing_schemas::OutboundMessage,
    schemas::WebhookPayload,
};
use crate::{
    consts, metric,
    services::{CompletionService, MessagingService},
};

/// What happened to a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Nothing to answer
    Ignored,
    /// The intended reply was delivered
    Replied,
    /// The intended reply failed and the apology was delivered instead
    RepliedWithFallback,
    /// No reply reached the user
    Dropped,
}

impl RelayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::Ignored => "ignored",
            RelayOutcome::Replied => "replied",
            RelayOutcome::RepliedWithFallback => "replied_with_fallback",
            RelayOutcome::Dropped => "dropped",
        }
    }
}

/// Asks the completion service and substitutes the apology on any failure.
pub async fn policy_answer(
    completion: &dyn CompletionService,
    sender: &str,
    question: &str,
) -> String {
    match completion.get_policy_response(question).await {
        Ok(answer) => {
            metric::incr_completion_statds("ok");
            answer
        }
        Err(e) => {
            metric::incr_completion_statds("failed");
            logfire::error!(
                "Error getting LLM response for {sender}: {error}",
                sender = sender.to_string(),
                error = e.to_string()
            );
            consts::APOLOGY_REPLY.to_string()
        }
    }
}

/// Answers a text message, falling back to the apology once if the answer
/// cannot be delivered.
async fn reply_to_question(
    sender: &str,
    question: &str,
    completion: &dyn CompletionService,
    messaging: &dyn MessagingService,
) -> RelayOutcome {
    logfire::info!(
        "User question from {sender}: {question}",
        sender = sender.to_string(),
        question = question.to_string()
    );

    let answer = policy_answer(completion, sender, question).await;

    let e = match messaging
        .send_message(sender, &OutboundMessage::text(Some(answer.as_str())))
        .await
    {
        Ok(_) => return RelayOutcome::Replied,
        Err(e) => e,
    };

    logfire::error!(
        "Failed to send reply to {sender}, sending fallback: {error}",
        sender = sender.to_string(),
        error = format!("{e:#}")
    );

    match messaging
        .send_message(sender, &OutboundMessage::text(Some(consts::APOLOGY_REPLY)))
        .await
    {
        Ok(_) => RelayOutcome::RepliedWithFallback,
        Err(e) => {
            logfire::error!(
                "Reply dropped for {sender}: fallback send failed: {error}",
                sender = sender.to_string(),
                error = format!("{e:#}")
            );
            RelayOutcome::Dropped
        }
    }
}

/// Tells the sender only text is supported. Not retried.
async fn reply_unsupported(sender: &str, kind: &str, messaging: &dyn MessagingService) -> RelayOutcome {
    logfire::info!(
        "Unsupported message type {kind} from {sender}",
        kind = kind.to_string(),
        sender = sender.to_string()
    );

    match messaging
        .send_message(sender, &OutboundMessage::text(Some(consts::TEXT_ONLY_REPLY)))
        .await
    {
        Ok(_) => RelayOutcome::Replied,
        Err(e) => {
            logfire::error!(
                "Reply dropped for {sender}: text-only notice failed: {error}",
                sender = sender.to_string(),
                error = format!("{e:#}")
            );
            RelayOutcome::Dropped
        }
    }
}

/// Logs delivery status callbacks; they never trigger outbound calls.
fn log_status_updates(webhook: &WebhookPayload) {
    for status in status_updates(webhook) {
        tracing::debug!(
            "Message {} to {} is {}",
            status.id.as_deref().unwrap_or("?"),
            status.recipient_id.as_deref().unwrap_or("?"),
            status.status.as_deref().unwrap_or("?")
        );
    }
}

/// Main webhook processor
///
/// # Arguments
///
/// * `payload` - The parsed JSON body of the delivery
/// * `completion` - Completion service answering policy questions
/// * `messaging` - WhatsApp client sending the replies
///
/// # Returns
///
/// The [`RelayOutcome`], for logging and metrics only
pub async fn process_webhook(
    payload: &serde_json::Value,
    completion: &dyn CompletionService,
    messaging: &dyn MessagingService,
) -> RelayOutcome {
    let Some(webhook) = parse_delivery(payload) else {
        metric::incr_relay_outcome_statds(RelayOutcome::Ignored.as_str());
        return RelayOutcome::Ignored;
    };

    let outcome = match InboundEvent::from_webhook(&webhook) {
        InboundEvent::NoMessage => {
            log_status_updates(&webhook);
            RelayOutcome::Ignored
        }
        InboundEvent::Text { sender, body } => {
            reply_to_question(&sender, &body, completion, messaging).await
        }
        InboundEvent::Other { sender, kind } => reply_unsupported(&sender, &kind, messaging).await,
    };

    metric::incr_relay_outcome_statds(outcome.as_str());
    outcome
}
