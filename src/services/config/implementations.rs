// 設定管理の具象実装

use crate::core::{BatchConfig, CaptionError, CaptionResult};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// 失敗したUnitに表示する固定メッセージ
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to generate caption";

/// 本文が空の成功レスポンスに対するフォールバックキャプション
pub const DEFAULT_FALLBACK_CAPTION: &str = "Cool photo! 📸";

pub const DEFAULT_CAPTION_PROMPT: &str = "Write a short, fun, and engaging social media caption for this photo. Include 2-3 relevant emojis. Keep it under 2 sentences.";

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultBatchConfig {
    failure_message: String,
    max_id_attempts: usize,
    enable_progress: bool,
}

impl DefaultBatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn with_max_id_attempts(mut self, attempts: usize) -> Self {
        self.max_id_attempts = attempts;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }
}

impl Default for DefaultBatchConfig {
    fn default() -> Self {
        Self {
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            max_id_attempts: 3,
            enable_progress: true,
        }
    }
}

impl BatchConfig for DefaultBatchConfig {
    fn failure_message(&self) -> String {
        self.failure_message.clone()
    }

    fn max_id_attempts(&self) -> usize {
        self.max_id_attempts
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}

/// Gemini APIクライアントの設定
///
/// `Debug`出力ではAPIキーを伏せる。
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// 通信タイムアウト（`None`で無効）
    pub timeout: Option<Duration>,
    pub prompt: String,
    pub fallback_caption: String,
}

impl GeminiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            timeout: Some(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS)),
            prompt: DEFAULT_CAPTION_PROMPT.to_string(),
            fallback_caption: DEFAULT_FALLBACK_CAPTION.to_string(),
        }
    }

    /// 環境変数から読み込む
    ///
    /// APIキーは`GEMINI_API_KEY`、なければ`API_KEY`。
    /// `SNAP_CAPTION_TIMEOUT_SECS=0`でタイムアウトを無効化する。
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .unwrap_or_default();

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("SNAP_CAPTION_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("SNAP_CAPTION_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("SNAP_CAPTION_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = (secs > 0).then(|| Duration::from_secs(secs)),
                Err(e) => warn!(
                    value = %raw,
                    error = %e,
                    "SNAP_CAPTION_TIMEOUT_SECS is not a number of seconds, keeping default timeout"
                ),
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_fallback_caption(mut self, caption: impl Into<String>) -> Self {
        self.fallback_caption = caption.into();
        self
    }

    /// 設定の妥当性をチェック
    pub fn validate(&self) -> CaptionResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(CaptionError::configuration(
                "APIキーが設定されていません (GEMINI_API_KEY)",
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CaptionError::configuration(format!(
                "base_urlはhttp(s)で始まる必要があります: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CaptionError::configuration("モデル名が空です"));
        }
        if self.fallback_caption.trim().is_empty() {
            return Err(CaptionError::configuration("フォールバックキャプションが空です"));
        }
        Ok(())
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("GeminiConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("prompt", &self.prompt)
            .field("fallback_caption", &self.fallback_caption)
            .finish()
    }
}
