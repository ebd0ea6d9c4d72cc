//! Gemini APIによるキャプション生成
//!
//! `POST {base_url}/models/{model}:generateContent`に画像（inlineData）と
//! プロンプトを1回だけ送る。再試行はしない。

use super::caption_or_fallback;
use crate::codec::EncodedPayload;
use crate::core::{AnnotationClient, AnnotationError, CaptionError, CaptionResult};
use crate::services::config::GeminiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Gemini APIクライアント
#[derive(Debug, Clone)]
pub struct GeminiAnnotationClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiAnnotationClient {
    /// 設定を検証してクライアントを作成
    pub fn new(config: GeminiConfig) -> CaptionResult<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            CaptionError::configuration(format!("HTTPクライアントの作成に失敗しました: {e}"))
        })?;

        Ok(Self { config, client })
    }

    /// 環境変数の設定から作成
    pub fn from_env() -> CaptionResult<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, payload: &EncodedPayload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: payload.mime_type().to_string(),
                            data: payload.base64_data().to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: self.config.prompt.clone(),
                    },
                ],
            }],
        }
    }

    /// レスポンス本文からキャプションを取り出す
    fn extract_caption(&self, response: GenerateContentResponse) -> String {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            warn!(block_reason = reason, "prompt blocked, using fallback caption");
        }

        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        caption_or_fallback(&text, &self.config.fallback_caption)
    }
}

#[async_trait]
impl AnnotationClient for GeminiAnnotationClient {
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError> {
        let url = self.endpoint();
        debug!(model = %self.config.model, mime = payload.mime_type(), "requesting caption");

        // APIキーはログに残らないようヘッダで渡す
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.build_request(payload))
            .send()
            .await
            .map_err(AnnotationError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AnnotationError::transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|error| error.error.message)
                .unwrap_or(body);
            return Err(AnnotationError::http_status(status.as_u16(), message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| AnnotationError::malformed_response(e.to_string()))?;

        Ok(self.extract_caption(parsed))
    }

    fn client_name(&self) -> &'static str {
        "gemini"
    }
}

// =============================================================================
// Gemini API Types
// =============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content<RequestPart>>,
}

#[derive(Serialize, Deserialize)]
struct Content<P> {
    parts: Vec<P>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
