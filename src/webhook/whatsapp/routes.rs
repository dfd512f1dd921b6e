//! WhatsApp webhook endpoint handlers
//!
//! Implements both the verification endpoint (GET) and the webhook receiver (POST).
//!
//! The receiver always answers 200 with an empty body: WhatsApp retries any
//! delivery that is not acknowledged promptly, so downstream failures are
//! logged and never reported back.

use super::{handler, security};
use crate::{consts, metric, webhook::AppState};
use ntex::{util::Bytes, web};
use tracing::Instrument;

/// Webhook verification endpoint (GET)
///
/// # Returns
/// - 200 with challenge string if verification succeeds
/// - 403 with an empty body otherwise, including unreadable query strings
#[web::get("/")]
pub async fn verify(
    req: web::HttpRequest,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let query = security::VerifyQuery::from_query_string(req.query_string());

    match security::verify_handshake(&query, &app_state.app_config.verify_token) {
        Ok(challenge) => {
            metric::incr_handshake_statds("verified");
            logfire::info!("WEBHOOK VERIFIED");

            Ok(web::HttpResponse::Ok()
                .content_type("text/plain")
                .body(challenge))
        }
        Err(e) => {
            metric::incr_handshake_statds("rejected");
            logfire::warn!(
                "Webhook verification rejected: mode={mode}",
                mode = query.mode.clone().unwrap_or_default()
            );

            Err(e.into())
        }
    }
}

/// Webhook receiver endpoint (POST)
///
/// Works on the raw body so the signature can be checked before parsing.
/// Signature failures and unparsable bodies are logged and acknowledged
/// without any outbound call.
#[web::post("/")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> web::HttpResponse {
    let received_at = chrono::Utc::now()
        .format(consts::WEBHOOK_TIMESTAMP_FORMAT)
        .to_string();

    if let Some(app_secret) = &app_state.app_config.whatsapp_app_secret {
        let signature = req
            .headers()
            .get(consts::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());

        let is_valid = signature
            .is_some_and(|signature| security::verify_signature(signature, &body, app_secret));

        if !is_valid {
            logfire::warn!(
                "Webhook received {received_at} with missing or invalid signature, ignoring",
                received_at = received_at.clone()
            );
            return acknowledge();
        }
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            logfire::warn!(
                "Webhook received {received_at} with unparsable body: {error}",
                received_at = received_at.clone(),
                error = e.to_string()
            );
            return acknowledge();
        }
    };

    logfire::info!(
        "Webhook received {received_at}\n{payload}",
        received_at = received_at.clone(),
        payload = serde_json::to_string_pretty(&payload).unwrap_or_default()
    );

    let outcome = handler::process_webhook(
        &payload,
        app_state.completion_service.as_ref(),
        app_state.messaging_service.as_ref(),
    )
    .instrument(logfire::span!("whatsapp_webhook"))
    .await;

    logfire::info!(
        "Webhook received {received_at} processed: {outcome}",
        received_at = received_at,
        outcome = outcome.as_str().to_string()
    );

    acknowledge()
}

fn acknowledge() -> web::HttpResponse {
    web::HttpResponse::Ok().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::tests::test_config,
        services::{MockCompletionService, MockMessagingService},
        webhook::{routes, whatsapp::outgoing_schemas::WhatsAppMessageResponse},
    };
    use hmac::{Hmac, Mac};
    use ntex::{
        http::StatusCode,
        web::{App, test},
    };
    use sha2::Sha256;

    const TEXT_DELIVERY: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
            "messaging_product": "whatsapp",
            "messages": [{"from": "33612345678", "id": "wamid.1", "type": "text", "text": {"body": "Can I rent a car?"}}]
        }}]}]
    }"#;

    fn app_state(
        completion: MockCompletionService,
        messaging: MockMessagingService,
        app_secret: Option<&str>,
    ) -> AppState {
        let mut app_config = test_config();
        app_config.whatsapp_app_secret = app_secret.map(str::to_string);

        AppState {
            app_config,
            completion_service: Box::new(completion),
            messaging_service: Box::new(messaging),
        }
    }

    /// Mocks that fail the test if anything is called
    fn idle_mocks() -> (MockCompletionService, MockMessagingService) {
        let mut completion = MockCompletionService::new();
        let mut messaging = MockMessagingService::new();
        completion.expect_get_policy_response().times(0);
        messaging.expect_send_message().times(0);
        (completion, messaging)
    }

    /// Mocks expecting exactly one answered question
    fn answering_mocks() -> (MockCompletionService, MockMessagingService) {
        let mut completion = MockCompletionService::new();
        let mut messaging = MockMessagingService::new();
        completion
            .expect_get_policy_response()
            .times(1)
            .returning(|_| Ok("Only if public transport is not viable.".to_string()));
        messaging
            .expect_send_message()
            .times(1)
            .returning(|_, _| Ok(WhatsAppMessageResponse::default()));
        (completion, messaging)
    }

    fn sign(payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[ntex::test]
    async fn test_verify_returns_challenge() {
        let (completion, messaging) = idle_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token=verify-me")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, Bytes::from_static(b"1158201444"));
    }

    #[ntex::test]
    async fn test_verify_rejects_wrong_token() {
        let (completion, messaging) = idle_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        for uri in [
            "/?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token=nope",
            "/?hub.mode=unsubscribe&hub.challenge=1158201444&hub.verify_token=nope",
            "/?hub.mode=subscribe&hub.challenge=1158201444",
            "/?hub.mode=subscribe&hub.mode=x&hub.verify_token=nope&hub.challenge=1",
            "/?hub.mode=subscribe&hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1",
            "/",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "uri: {uri}");
            assert!(test::read_body(resp).await.is_empty());
        }
    }

    #[ntex::test]
    async fn test_receive_text_delivery() {
        let (completion, messaging) = answering_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .header("content-type", "application/json")
            .set_payload(TEXT_DELIVERY)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(test::read_body(resp).await.is_empty());
    }

    #[ntex::test]
    async fn test_receive_acknowledges_when_reply_fails() {
        let mut completion = MockCompletionService::new();
        let mut messaging = MockMessagingService::new();
        completion
            .expect_get_policy_response()
            .times(1)
            .returning(|_| Ok("answer".to_string()));
        messaging
            .expect_send_message()
            .times(2)
            .returning(|_, _| Err(anyhow::anyhow!("WhatsApp API returned error status 401")));

        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .set_payload(TEXT_DELIVERY)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_acknowledges_irrelevant_or_broken_bodies() {
        let (completion, messaging) = idle_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        for body in [
            r#"{"object": "whatsapp_business_account", "entry": []}"#,
            r#"{"entry": [{"changes": [{"value": {"statuses": [{"id": "wamid.1", "status": "sent"}]}}]}]}"#,
            "not json at all",
            "",
        ] {
            let req = test::TestRequest::post()
                .uri("/")
                .set_payload(body)
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::OK, "body: {body}");
            assert!(test::read_body(resp).await.is_empty());
        }
    }

    #[ntex::test]
    async fn test_receive_acknowledges_large_bodies() {
        let (completion, messaging) = idle_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, None))
                .configure(routes::whatsapp),
        )
        .await;

        let body = format!(r#"{{"entry": [], "pad": "{}"}}"#, "x".repeat(300 * 1024));
        let req = test::TestRequest::post()
            .uri("/")
            .header("content-type", "application/json")
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(test::read_body(resp).await.is_empty());
    }

    #[ntex::test]
    async fn test_receive_with_valid_signature_is_processed() {
        let (completion, messaging) = answering_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, Some("app-secret")))
                .configure(routes::whatsapp),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .header(consts::SIGNATURE_HEADER, sign(TEXT_DELIVERY.as_bytes(), "app-secret"))
            .set_payload(TEXT_DELIVERY)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_with_bad_signature_is_ignored() {
        let (completion, messaging) = idle_mocks();
        let app = test::init_service(
            App::new()
                .state(app_state(completion, messaging, Some("app-secret")))
                .configure(routes::whatsapp),
        )
        .await;

        let forged = sign(TEXT_DELIVERY.as_bytes(), "someone-else");
        for signature in [Some(forged.as_str()), None] {
            let mut req = test::TestRequest::post().uri("/").set_payload(TEXT_DELIVERY);
            if let Some(signature) = signature {
                req = req.header(consts::SIGNATURE_HEADER, signature);
            }
            let resp = test::call_service(&app, req.to_request()).await;

            assert_eq!(resp.status(), StatusCode::OK);
            assert!(test::read_body(resp).await.is_empty());
        }
    }
}
