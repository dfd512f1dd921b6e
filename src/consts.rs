/// System instruction sent with every completion request.
pub const POLICY_SYSTEM_PROMPT: &str = include_str!("../prompts/travel_policy.md");

pub const COMPLETION_TEMPERATURE: f64 = 0.3;
pub const COMPLETION_MAX_TOKENS: u32 = 500;

pub const WHATSAPP_MESSAGING_PRODUCT: &str = "whatsapp";
pub const DEFAULT_TEMPLATE_NAME: &str = "hello_world";
pub const DEFAULT_TEMPLATE_LANGUAGE: &str = "en_US";
pub const DEFAULT_TEXT_BODY: &str = "Hello from WhatsApp Bot!";

/// Sent when the completion fails or the answer could not be delivered.
pub const APOLOGY_REPLY: &str =
    "Sorry, I encountered an error while processing your question. Please try again later.";
/// Sent for anything that is not a text message.
pub const TEXT_ONLY_REPLY: &str =
    "I can only respond to text messages. Please send your policy question as text.";

pub const HANDSHAKE_MODE_SUBSCRIBE: &str = "subscribe";
/// Largest delivery body read by the receiver, in bytes.
pub const WEBHOOK_PAYLOAD_LIMIT: usize = 8 * 1024 * 1024;
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const WEBHOOK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
