//! Security utilities for WhatsApp webhook verification
//!
//! Two independent checks:
//!
//! - the subscription handshake (`GET`), where Meta proves it knows the
//!   configured verify token and we echo its challenge back;
//! - the payload signature (`POST`), carried in `X-Hub-Signature-256` as
//!   `sha256=<hex hmac>` of the raw body keyed with the app secret.
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - Both comparisons are constant-time

use crate::{consts, errors::WebhookError};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Query parameters for webhook verification.
///
/// All optional: a missing parameter is a failed handshake, not a bad request.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// The verification token from WhatsApp
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Reads the handshake parameters from a raw query string.
    ///
    /// A query that cannot be read (e.g. a repeated `hub.*` key) gives empty
    /// parameters, which then fail the handshake.
    pub fn from_query_string(query: &str) -> Self {
        match ntex::web::types::Query::<Self>::from_query(query) {
            Ok(query) => query.into_inner(),
            Err(e) => {
                tracing::debug!("Unreadable handshake query: {e}");
                Self::default()
            }
        }
    }
}

/// Checks a subscription handshake.
///
/// # Returns
///
/// * `Ok(challenge)` if mode is "subscribe" and the token matches; an absent
///   challenge is returned as an empty string
/// * `Err(WebhookError::Forbidden)` otherwise
pub fn verify_handshake(query: &VerifyQuery, expected_token: &str) -> Result<String, WebhookError> {
    if query.mode.as_deref() != Some(consts::HANDSHAKE_MODE_SUBSCRIBE) {
        return Err(WebhookError::Forbidden);
    }

    let token = query.verify_token.as_deref().unwrap_or_default();
    let token_matches: bool = token.as_bytes().ct_eq(expected_token.as_bytes()).into();
    if !token_matches {
        return Err(WebhookError::Forbidden);
    }

    Ok(query.challenge.clone().unwrap_or_default())
}

/// Verifies the X-Hub-Signature-256 header against the request payload
///
/// # Arguments
///
/// * `signature_header` - The value of the X-Hub-Signature-256 header (e.g., "sha256=abc123...")
/// * `payload` - The raw request body bytes
/// * `app_secret` - Your WhatsApp/Facebook app secret
///
/// # Returns
///
/// * `true` if the signature is valid
/// * `false` if the signature is invalid or the header format is incorrect
pub fn verify_signature(signature_header: &str, payload: &[u8], app_secret: &str) -> bool {
    let Some(signature_hex) = signature_header.strip_prefix("sha256=") else {
        logfire::warn!("Invalid signature header format: expected 'sha256=' prefix");
        return false;
    };

    let expected_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    mac.update(payload);
    let computed_signature = mac.finalize().into_bytes();

    let is_valid: bool = computed_signature.ct_eq(&expected_signature[..]).into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}
