use derive_more::{Display, Error};
use ntex::{http, web};

/// Errors surfaced to the webhook caller.
///
/// Deliveries are always acknowledged, so the only thing that ever reaches
/// the provider as a non-200 is a failed handshake.
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    Forbidden,
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        web::HttpResponse::build(self.status_code()).finish()
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::Forbidden => http::StatusCode::FORBIDDEN,
        }
    }
}

/// Failures of a single completion call.
#[derive(Debug, Display, Error)]
pub enum CompletionError {
    #[display("completion request failed: {_0}")]
    Transport(reqwest::Error),
    #[display("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[display("completion response could not be parsed: {_0}")]
    MalformedResponse(reqwest::Error),
    #[display("completion response had no answer")]
    EmptyAnswer,
}
