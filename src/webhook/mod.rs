//! Webhook handlers for the WhatsApp Business API
//!
//! ## Modules
//!
//! - [`routes`] - route configuration for the http server
//! - [`whatsapp`] - handshake, delivery handling and the outbound client

pub mod routes;
pub mod whatsapp;

use crate::{config::AppConfig, services};

/// State shared by the webhook endpoints of one server worker
pub struct AppState {
    pub app_config: AppConfig,
    pub completion_service: services::ImplCompletionService,
    pub messaging_service: services::ImplMessagingService,
}
