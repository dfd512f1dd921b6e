//! # Policy Relay
//!
//! WhatsApp webhook that forwards travel-policy questions to a chat-completion
//! model and sends the answer back to the asker.

pub mod config;
pub mod consts;
pub mod errors;
pub mod llm;
pub mod metric;
pub mod services;
pub mod webhook;

use envconfig::Envconfig;
use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    let app_config = config::AppConfig::init_from_env()?;

    // Initialize logging and metrics
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    // One pooled client shared by both outbound services
    let http_client = reqwest::Client::builder()
        .timeout(app_config.http_timeout())
        .build()?;

    logfire::info!(
        "Starting policy relay on {host}:{port} with model {model}",
        host = app_config.web_server_host.clone(),
        port = app_config.web_server_port as i64,
        model = app_config.openai_model.clone()
    );

    configure_and_run_server(app_config, http_client).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Creates application state for one server worker
fn create_app_state(
    app_config: &config::AppConfig,
    http_client: &reqwest::Client,
) -> webhook::AppState {
    webhook::AppState {
        app_config: app_config.clone(),
        completion_service: Box::new(llm::openai::OpenAiClient::new(
            http_client.clone(),
            app_config,
        )),
        messaging_service: Box::new(webhook::whatsapp::client::WhatsAppClient::new(
            http_client.clone(),
            app_config,
        )),
    }
}

/// Configures SSL acceptor for production environments
#[cfg(feature = "tls")]
fn setup_ssl_acceptor(
    app_config: &config::AppConfig,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Configures and starts the web server, with TLS in production when built with `tls`
async fn configure_and_run_server(
    app_config: config::AppConfig,
    http_client: reqwest::Client,
) -> anyhow::Result<()> {
    let server_addr = (
        app_config.web_server_host.clone(),
        app_config.web_server_port,
    );
    let keep_alive = ntex::http::KeepAlive::Timeout(ntex::time::Seconds(
        app_config.keep_alive_secs,
    ));

    let state_config = app_config.clone();
    let server = web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .state(create_app_state(&state_config, &http_client))
            .configure(webhook::routes::whatsapp)
    })
    .keep_alive(keep_alive);

    #[cfg(feature = "tls")]
    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor(&app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    #[cfg(not(feature = "tls"))]
    let bound_server = server.bind(server_addr)?;

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
