//! Application configuration management with security considerations.
//!
//! All values are read once from the environment at startup and stay
//! immutable for the lifetime of the process. The resulting [`AppConfig`] is
//! passed by reference to whatever needs it; there is no global instance.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use envconfig::Envconfig;
use std::time::Duration;

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(from = "APP_ENV", default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "PORT", default = "3000")]
    pub web_server_port: u16,

    /// Seconds an idle client connection is kept open (NON-SENSITIVE)
    #[envconfig(from = "KEEP_ALIVE_SECS", default = "120")]
    pub keep_alive_secs: u16,

    /// 🔒 SENSITIVE: token expected in `hub.verify_token` during the handshake
    #[envconfig(from = "VERIFY_TOKEN")]
    pub verify_token: String,

    /// 🔒 SENSITIVE: app secret used to check `X-Hub-Signature-256`.
    /// Signature verification is skipped when unset.
    #[envconfig(from = "WHATSAPP_APP_SECRET")]
    pub whatsapp_app_secret: Option<String>,

    /// 🔒 SENSITIVE: WhatsApp Cloud API bearer token
    #[envconfig(from = "ACCESS_TOKEN")]
    pub whatsapp_access_token: String,

    /// WhatsApp Business phone number ID (SEMI-SENSITIVE)
    /// Security: Restrict access, don't log in production
    #[envconfig(from = "PHONE_NUMBER_ID")]
    pub whatsapp_phone_number_id: String,

    /// Graph API base url, version included (NON-SENSITIVE)
    #[envconfig(from = "GRAPH_API_BASE_URL", default = "https://graph.facebook.com/v22.0")]
    pub graph_api_base_url: String,

    /// 🔒 SENSITIVE: completion service API key
    #[envconfig(from = "OPENAI_API_KEY")]
    pub openai_api_key: String,

    /// Completion service base url (NON-SENSITIVE)
    #[envconfig(from = "OPENAI_BASE_URL", default = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Model used to answer policy questions (NON-SENSITIVE)
    #[envconfig(from = "OPENAI_MODEL", default = "gpt-3.5-turbo")]
    pub openai_model: String,

    /// Timeout applied to every outbound http call, in seconds
    #[envconfig(from = "HTTP_TIMEOUT_SECS", default = "20")]
    pub http_timeout_secs: u64,

    /// 🔒 SENSITIVE: Logfire write token. Telemetry stays local when unset.
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,

    /// Path to SSL private key file (SENSITIVE PATH), `tls` feature only
    #[envconfig(from = "PRIVATE_KEY_PATH", default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE), `tls` feature only
    #[envconfig(from = "CERTIFICATE_PATH", default = "server.crt")]
    pub certificate_path: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Constructs the WhatsApp Business API endpoint for sending messages
    pub fn whatsapp_send_msg_endpoint(&self) -> String {
        format!(
            "{base}/{id}/messages",
            base = self.graph_api_base_url.trim_end_matches('/'),
            id = self.whatsapp_phone_number_id
        )
    }

    /// Constructs the chat-completion endpoint
    pub fn openai_chat_endpoint(&self) -> String {
        format!(
            "{base}/chat/completions",
            base = self.openai_base_url.trim_end_matches('/')
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
