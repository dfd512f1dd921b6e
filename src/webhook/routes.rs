use crate::consts;
use ntex::web;

/// Configures the WhatsApp webhook routes.
///
/// These routes are public endpoints that don't require authentication;
/// the handshake token and the optional payload signature are checked by
/// the handlers themselves.
///
/// # Routes
/// - `GET /` - WhatsApp webhook verification
/// - `POST /` - WhatsApp webhook receiver
///
/// Raises the body limit so that large deliveries are still acknowledged.
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.state(web::types::PayloadConfig::new(consts::WEBHOOK_PAYLOAD_LIMIT));
    cfg.service((super::whatsapp::verify, super::whatsapp::receive));
}
