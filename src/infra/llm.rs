use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::prompt::END_OF_TURN;
use crate::error::{InferenceError, excerpt};
use crate::services::LanguageModelService;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_NEW_TOKENS: u32 = 60;
const TEMPERATURE: f64 = 0.1;
const BODY_EXCERPT_CHARS: usize = 200;

/// Text generation through the Hugging Face inference API.
pub struct HuggingFaceClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl HuggingFaceClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
            model,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> Result<&str, InferenceError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(InferenceError::Unconfigured)
    }

    fn model_endpoint(base_url: &str, model: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            model.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl LanguageModelService for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let api_key = self.api_key()?;
        let request_body = GenerationRequest::new(prompt);

        let response = self
            .http
            .post(Self::model_endpoint(&self.base_url, &self.model))
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(InferenceError::Http {
                status: status.as_u16(),
                body: excerpt(&body, BODY_EXCERPT_CHARS),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        Ok(GenerationResponse::generated_text(&body))
    }
}

fn request_error(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else {
        InferenceError::Transport(err.to_string())
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

impl<'a> GenerationRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: TEMPERATURE,
                return_full_text: false,
                stop: [END_OF_TURN, "\n\n"],
            },
        }
    }
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f64,
    return_full_text: bool,
    stop: [&'static str; 2],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

#[derive(Deserialize)]
struct Generation {
    generated_text: Option<String>,
}

impl GenerationResponse {
    /// Any shape other than a generation list or object yields an empty string.
    fn generated_text(body: &str) -> String {
        let generation = match serde_json::from_str::<GenerationResponse>(body) {
            Ok(GenerationResponse::Batch(generations)) => generations.into_iter().next(),
            Ok(GenerationResponse::Single(generation)) => Some(generation),
            Err(err) => {
                debug!(error = %err, "unrecognized generation response shape");
                None
            }
        };
        generation
            .and_then(|generation| generation.generated_text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const MODEL: &str = "mistralai/test-model";
    const MODEL_PATH: &str = "/mistralai/test-model";

    fn client(server: &MockServer, api_key: Option<&str>) -> HuggingFaceClient {
        HuggingFaceClient::new(
            server.uri(),
            api_key.map(str::to_string),
            MODEL.to_string(),
        )
    }

    #[tokio::test]
    async fn posts_prompt_with_generation_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("Authorization", "Bearer hf_test"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "inputs": "classify me",
                "parameters": {
                    "max_new_tokens": 60,
                    "temperature": 0.1,
                    "return_full_text": false,
                    "stop": ["</s>", "\n\n"]
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"generated_text": " {\"category\": \"billing\"}"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, Some("hf_test"))
            .generate("classify me")
            .await
            .unwrap();
        assert_eq!(text, " {\"category\": \"billing\"}");
    }

    #[tokio::test]
    async fn accepts_single_object_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "ok"})))
            .mount(&server)
            .await;

        let text = client(&server, Some("hf_test")).generate("p").await.unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn unrecognized_shape_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("just a string")))
            .mount(&server)
            .await;

        let text = client(&server, Some("hf_test")).generate("p").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn empty_list_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let text = client(&server, Some("hf_test")).generate("p").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None).generate("p").await.unwrap_err();
        assert!(matches!(err, InferenceError::Unconfigured));

        let err = client(&server, Some("  ")).generate("p").await.unwrap_err();
        assert!(matches!(err, InferenceError::Unconfigured));
    }

    #[tokio::test]
    async fn non_success_status_carries_truncated_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(500)))
            .mount(&server)
            .await;

        let err = client(&server, Some("hf_test")).generate("p").await.unwrap_err();
        match err {
            InferenceError::Http { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body.len(), 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"generated_text": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client(&server, Some("hf_test"))
            .with_timeout(Duration::from_millis(50))
            .generate("p")
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Timeout));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let client = HuggingFaceClient::new(
            "http://127.0.0.1:1".to_string(),
            Some("hf_test".to_string()),
            MODEL.to_string(),
        );
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)));
    }

    #[test]
    fn joins_endpoint_without_double_slashes() {
        assert_eq!(
            HuggingFaceClient::model_endpoint("https://host/models/", "/org/model"),
            "https://host/models/org/model"
        );
    }
}
