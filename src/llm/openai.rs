//! # Chat Completion Client
//!
//! Sends policy questions to an OpenAI-compatible `/chat/completions`
//! endpoint. Every failure is returned as a [`CompletionError`]; choosing
//! what the user sees instead is left to the caller.

use super::{compose_policy_request, schemas::ChatCompletionResponse};
use crate::{config::AppConfig, errors::CompletionError, services::CompletionService};
use async_trait::async_trait;

/// Completion client bound to one model and API key
pub struct OpenAiClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// Chat-completion endpoint
    endpoint: String,
    /// Bearer API key
    api_key: String,
    /// Model identifier sent with every request
    model: String,
}

impl OpenAiClient {
    /// Creates a completion client. The http client carries the timeout.
    pub fn new(client: reqwest::Client, app_config: &AppConfig) -> Self {
        Self {
            client,
            endpoint: app_config.openai_chat_endpoint(),
            api_key: app_config.openai_api_key.clone(),
            model: app_config.openai_model.clone(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn get_policy_response(&self, question: &str) -> Result<String, CompletionError> {
        tracing::debug!("Getting LLM response for: {question}");

        let request = compose_policy_request(&self.model, question);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            return Err(CompletionError::Status { status, body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(CompletionError::MalformedResponse)?;

        let answer = completion.into_answer().ok_or(CompletionError::EmptyAnswer)?;
        tracing::debug!("LLM response: {answer}");

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use ntex::{
        http::StatusCode,
        web::{self, App, test},
    };
    use serde_json::json;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    type Recorded = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    const COMPLETIONS_PATH: &str = "/v1/chat/completions";

    /// Completion endpoint answering every call with the same status and body
    fn canned_server(status: StatusCode, body: &'static str) -> test::TestServer {
        test::server(move || {
            App::new().service(web::resource(COMPLETIONS_PATH).to(move || async move {
                web::HttpResponse::build(status)
                    .content_type("application/json")
                    .body(body)
            }))
        })
    }

    async fn record_completion(
        req: web::HttpRequest,
        body: web::types::Json<serde_json::Value>,
        recorded: web::types::State<Recorded>,
    ) -> web::HttpResponse {
        let auth = req
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        recorded.lock().unwrap().push((auth, body.into_inner()));

        web::HttpResponse::Ok().json(&json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Economy class only."}, "finish_reason": "stop"}]
        }))
    }

    fn client_for(srv: &test::TestServer, http_client: reqwest::Client) -> OpenAiClient {
        let mut app_config = test_config();
        app_config.openai_base_url = format!("http://{}/v1", srv.addr());
        OpenAiClient::new(http_client, &app_config)
    }

    #[ntex::test]
    async fn test_answer_is_returned() {
        let recorded = Recorded::default();
        let state = recorded.clone();
        let srv = test::server(move || {
            App::new()
                .state(state.clone())
                .service(web::resource(COMPLETIONS_PATH).to(record_completion))
        });
        let client = client_for(&srv, reqwest::Client::new());

        let answer = client.get_policy_response("Can I fly business?").await.unwrap();

        assert_eq!(answer, "Economy class only.");
        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        let (auth, body) = &recorded[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(
            body["messages"][1],
            json!({"role": "user", "content": "Can I fly business?"})
        );
    }

    #[ntex::test]
    async fn test_error_status_is_reported_with_body() {
        let srv = canned_server(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        let client = client_for(&srv, reqwest::Client::new());

        let result = client.get_policy_response("Is a taxi reimbursed?").await;

        match result {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[ntex::test]
    async fn test_unparsable_response_is_malformed() {
        let srv = canned_server(StatusCode::OK, "<html>not json</html>");
        let client = client_for(&srv, reqwest::Client::new());

        let result = client.get_policy_response("Is a taxi reimbursed?").await;

        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[ntex::test]
    async fn test_response_without_choices_is_empty() {
        for body in [
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": "  "}}]}"#,
            "{}",
        ] {
            let srv = canned_server(StatusCode::OK, body);
            let client = client_for(&srv, reqwest::Client::new());

            let result = client.get_policy_response("Is a taxi reimbursed?").await;

            assert!(
                matches!(result, Err(CompletionError::EmptyAnswer)),
                "body: {body}"
            );
        }
    }

    #[ntex::test]
    async fn test_slow_service_times_out() {
        let srv = test::server(|| {
            App::new().service(web::resource(COMPLETIONS_PATH).to(|| async {
                ntex::time::sleep(ntex::time::Millis(2_000)).await;
                web::HttpResponse::Ok()
                    .content_type("application/json")
                    .body(r#"{"choices": [{"message": {"content": "late"}}]}"#)
            }))
        });
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let client = client_for(&srv, http_client);

        let result = client.get_policy_response("Is a taxi reimbursed?").await;

        assert!(matches!(result, Err(CompletionError::Transport(ref e)) if e.is_timeout()));
    }

    #[ntex::test]
    async fn test_unreachable_service_is_a_transport_error() {
        let mut app_config = test_config();
        // nothing listens on the discard port
        app_config.openai_base_url = "http://127.0.0.1:9/v1".to_string();
        let client = OpenAiClient::new(reqwest::Client::new(), &app_config);

        let result = client.get_policy_response("Is a taxi reimbursed?").await;

        assert!(matches!(result, Err(CompletionError::Transport(_))));
    }

    #[test]
    fn test_new_reads_config() {
        let app_config = test_config();
        let client = OpenAiClient::new(reqwest::Client::new(), &app_config);

        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.model, "gpt-3.5-turbo");
    }
}
