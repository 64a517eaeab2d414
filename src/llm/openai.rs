// OpenAI adapter implementation
// Covers the two provider roles the service needs: text embeddings
// (/v1/embeddings) and related-keyword generation (/v1/chat/completions
// with a JSON-object response format).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OpenAIConfig;
use crate::llm::provider::{CompletionProvider, EmbeddingProvider};
use crate::types::{AppError, AppResult};

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates related space exploration keywords.";
const COMPLETION_TEMPERATURE: f32 = 0.7;
const COMPLETION_MAX_TOKENS: u32 = 150;

pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
    chat_model: String,
}

// Request types for the OpenAI API

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

// Response types for the OpenAI API

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiAdapter {
    pub fn new(config: &OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
        }
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(AppError::Provider(format!(
                "{what} failed ({status}): {}",
                parsed.error.message
            )));
        }
        Err(AppError::Provider(format!("{what} failed ({status}): {body}")))
    }

    /// The prompt asks for `{"keywords": [...]}`. Anything else yields an
    /// empty list rather than an error.
    fn parse_keywords(content: &str) -> Vec<String> {
        serde_json::from_str::<serde_json::Value>(content)
            .ok()
            .and_then(|value| value.get("keywords").cloned())
            .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiAdapter {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("embedding request failed: {e}")))?;
        let response = Self::check_status(response, "embedding request").await?;

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse embedding response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| AppError::Provider("embedding response contained no data".to_string()))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiAdapter {
    async fn related_keywords(&self, keyword: &str, count: usize) -> AppResult<Vec<String>> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Generate {count} related keywords for space exploration topic: \
                         \"{keyword}\". Return only the keywords as a JSON array."
                    ),
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
            max_tokens: COMPLETION_MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("completion request failed: {e}")))?;
        let response = Self::check_status(response, "completion request").await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("failed to parse completion response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider("completion returned no choices".to_string()))?;

        Ok(Self::parse_keywords(&choice.message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(base_url: String) -> OpenAiAdapter {
        OpenAiAdapter::new(&OpenAIConfig {
            api_key: "test-key".to_string(),
            base_url,
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
        })
    }

    #[test]
    fn parse_keywords_reads_keywords_field() {
        let keywords =
            OpenAiAdapter::parse_keywords(r#"{"keywords":["Mars rover","Perseverance"]}"#);
        assert_eq!(keywords, vec!["Mars rover", "Perseverance"]);
    }

    #[test]
    fn parse_keywords_defaults_to_empty() {
        assert!(OpenAiAdapter::parse_keywords("not json").is_empty());
        assert!(OpenAiAdapter::parse_keywords(r#"{"terms":["x"]}"#).is_empty());
        assert!(OpenAiAdapter::parse_keywords(r#"{"keywords":"Mars"}"#).is_empty());
    }

    #[tokio::test]
    async fn embed_returns_first_vector() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
            .create_async()
            .await;

        let embedding = adapter(server.url()).embed("Mars").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn embed_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid api key"}}"#)
            .create_async()
            .await;

        let error = adapter(server.url()).embed("Mars").await.unwrap_err();
        assert!(matches!(error, AppError::Provider(_)));
        assert!(error.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn related_keywords_parses_completion_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"content":"{\"keywords\":[\"Mars Orbiter\",\"Rover Landing\",\"Olympus Mons\"]}"}}]}"#,
            )
            .create_async()
            .await;

        let keywords = adapter(server.url())
            .related_keywords("Mars", 3)
            .await
            .unwrap();
        assert_eq!(keywords, vec!["Mars Orbiter", "Rover Landing", "Olympus Mons"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn related_keywords_with_unparseable_content_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"no json here"}}]}"#)
            .create_async()
            .await;

        let keywords = adapter(server.url())
            .related_keywords("Mars", 3)
            .await
            .unwrap();
        assert!(keywords.is_empty());
    }
}
