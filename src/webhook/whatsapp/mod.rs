//! WhatsApp webhook integration module
//!
//! ## Submodules
//!
//! - [`routes`] - HTTP endpoint handlers for WhatsApp webhooks
//! - [`security`] - Handshake and payload signature checks
//! - [`event`] - Reduction of a delivery to the message to answer
//! - [`handler`] - Orchestration of completion and reply
//! - [`client`] - WhatsApp API client for sending messages
//! - [`schemas`] / [`outgoing_schemas`] - Incoming and outgoing payloads

pub mod client;
pub mod event;
pub mod handler;
pub mod outgoing_schemas;
pub mod routes;
pub mod schemas;
pub mod security;

// Re-export commonly used items for convenience
pub use routes::{receive, verify};
