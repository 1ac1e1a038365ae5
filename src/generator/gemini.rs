//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{GenerationError, ReplyGenerator, finish};
use crate::config::GeneratorConfig;

/// Calls one fixed Gemini model with the whole prompt as a single user turn.
///
/// One attempt per prompt; the client-level timeout bounds the call.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Creates the adapter from generator configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Config`] if no API key is configured or
    /// the HTTP client cannot be built.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenerationError::Config("missing Gemini API key".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ReplyGenerator for GeminiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::InvalidResponse(e.to_string())
            }
        })?;

        // Only the first candidate is used.
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        finish(&text)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::GeneratorBackend;

    fn config(base_url: String, timeout: Duration) -> GeneratorConfig {
        GeneratorConfig {
            backend: GeneratorBackend::Gemini,
            api_key: Some(SecretString::new("test-key".into())),
            model: "gemini-test".to_string(),
            base_url,
            timeout,
        }
    }

    fn generator(server: &MockServer) -> GeminiGenerator {
        let Ok(generator) = GeminiGenerator::new(&config(server.uri(), Duration::from_secs(5)))
        else {
            panic!("client should build");
        };
        generator
    }

    fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [ { "parts": [ { "text": "Platform: Twitter\nPost: hi\nReply:" } ] } ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                "\n  Hey there! 👋  \n",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = generator(&server)
            .generate("Platform: Twitter\nPost: hi\nReply:")
            .await;
        assert_eq!(result, Ok("Hey there! 👋".to_string()));
    }

    #[tokio::test]
    async fn joins_multiple_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [ { "text": "Great " }, { "text": "news!" } ] } }
                ]
            })))
            .mount(&server)
            .await;

        let result = generator(&server).generate("prompt").await;
        assert_eq!(result, Ok("Great news!".to_string()));
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let result = generator(&server).generate("prompt").await;
        assert_eq!(
            result,
            Err(GenerationError::Api {
                status: 403,
                body: "API key invalid".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn blocked_prompt_without_candidates_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let result = generator(&server).generate("prompt").await;
        assert_eq!(result, Err(GenerationError::Empty));
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = generator(&server).generate("prompt").await;
        assert!(matches!(result, Err(GenerationError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let Ok(generator) =
            GeminiGenerator::new(&config(server.uri(), Duration::from_millis(200)))
        else {
            panic!("client should build");
        };
        let result = generator.generate("prompt").await;
        assert_eq!(result, Err(GenerationError::Timeout));
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let Ok(generator) = GeminiGenerator::new(&config(
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(2),
        )) else {
            panic!("client should build");
        };
        let result = generator.generate("prompt").await;
        assert!(matches!(result, Err(GenerationError::Transport(_))));
    }

    #[test]
    fn missing_key_is_config_error() {
        let mut cfg = config("http://localhost".to_string(), Duration::from_secs(1));
        cfg.api_key = None;
        assert!(matches!(
            GeminiGenerator::new(&cfg),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let Ok(generator) = GeminiGenerator::new(&config(
            "https://example.test/".to_string(),
            Duration::from_secs(1),
        )) else {
            panic!("client should build");
        };
        assert_eq!(
            generator.endpoint(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
    }
}
