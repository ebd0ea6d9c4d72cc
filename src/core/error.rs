// キャプション生成パイプライン専用のエラー型定義

use thiserror::Error;

/// ペイロードの読み込み・エンコード・デコードのエラー
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("ペイロード読み込みエラー: {path} - {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("不正なデータURL: {reason}")]
    MalformedDataUrl { reason: String },

    #[error("Base64デコードエラー: {source}")]
    InvalidBase64 {
        #[from]
        source: base64::DecodeError,
    },
}

impl CodecError {
    /// 読み込みエラーの作成
    pub fn unreadable(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// データURL形式エラーの作成
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDataUrl {
            reason: reason.into(),
        }
    }
}

/// 外部キャプションサービス呼び出しのエラー
///
/// Unit単位で捕捉され、バッチの呼び出し元には伝播しない。
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("通信エラー: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("APIエラー (status={status}): {message}")]
    HttpStatus { status: u16, message: String },

    #[error("不正なレスポンス: {message}")]
    MalformedResponse { message: String },

    #[error("タスク異常終了: {message}")]
    TaskAborted { message: String },
}

impl AnnotationError {
    pub fn transport(source: reqwest::Error) -> Self {
        Self::Transport { source }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn task_aborted(message: impl Into<String>) -> Self {
        Self::TaskAborted {
            message: message.into(),
        }
    }

    /// ログ出力用のエラー分類
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::TaskAborted { .. } => "task",
        }
    }
}

/// クレート全体のエラー型
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("コーデックエラー: {0}")]
    Codec(#[from] CodecError),

    #[error("キャプション生成エラー: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("識別子の生成に失敗しました ({attempts}回衝突)")]
    IdentityExhausted { attempts: usize },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptionError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 入力単位のエラーかどうか（同じバッチの他の入力には影響しない）
    pub fn is_input_scoped(&self) -> bool {
        matches!(self, Self::Codec(_) | Self::IdentityExhausted { .. })
    }
}

/// クレート共通のResult型
pub type CaptionResult<T> = Result<T, CaptionError>;
