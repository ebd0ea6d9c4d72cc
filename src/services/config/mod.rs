// 設定管理
// バッチ処理の設定とGeminiクライアントの設定

pub mod implementations;

pub use implementations::{
    DefaultBatchConfig, GeminiConfig, DEFAULT_CAPTION_PROMPT, DEFAULT_FAILURE_MESSAGE,
    DEFAULT_FALLBACK_CAPTION,
};
