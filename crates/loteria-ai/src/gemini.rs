//! HTTP client for Google Gemini's `generateContent` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::request::ModelRequest;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("model returned no candidates")]
    NoCandidates,
}

/// Connection settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Raw reply text plus whatever usage accounting the model reported.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub usage: Option<UsageMetadata>,
}

/// A vision model that answers a prompt about a set of images.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, GeminiError>;
}

// ── Wire types ──

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

/// Token accounting reported alongside a reply.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or `None` when the model produced none.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.as_ref()?.first()?;
        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        if let Some(reason) = &candidate.finish_reason
            && reason != "STOP"
        {
            warn!(finish_reason = %reason, "candidate did not finish normally");
        }
        Some(text)
    }
}

fn request_body(request: &ModelRequest) -> GenerateContentRequest<'_> {
    let mut parts = Vec::with_capacity(request.parts.len() + 1);
    parts.push(Part::Text {
        text: &request.prompt,
    });
    parts.extend(request.parts.iter().map(|p| Part::InlineData {
        inline_data: InlineData {
            mime_type: &p.mime_type,
            data: &p.data,
        },
    }));
    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
    }
}

/// Gemini REST client. One request per cycle, no retries.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(mut config: GeminiConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, GeminiError> {
        let url = self.endpoint();

        info!(model = %self.config.model, images = request.parts.len(), "sending request to Gemini");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(request))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateContentResponse = resp.json().await?;
        let text = response.text().ok_or(GeminiError::NoCandidates)?;
        if let Some(usage) = &response.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                reply_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini reply received"
            );
        }

        Ok(ModelReply {
            text,
            usage: response.usage_metadata,
        })
    }
}
