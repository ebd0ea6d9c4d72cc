// 入力ペイロードの読み込み

use super::{encode, EncodedPayload};
use crate::core::error::CodecError;
use std::path::{Path, PathBuf};

/// 生ペイロードの取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// メモリ上のバイト列
    Bytes(Vec<u8>),
    /// ファイルパス（読み込みは非同期で行う）
    File(PathBuf),
}

/// バッチに投入される1件分の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub source: PayloadSource,
    pub mime_type: String,
    /// 表示用ラベル（ファイル名など）
    pub name: Option<String>,
}

impl RawInput {
    /// メモリ上のバイト列から入力を作成
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            source: PayloadSource::Bytes(bytes.into()),
            mime_type: mime_type.into(),
            name: None,
        }
    }

    /// ファイルパスから入力を作成（ファイル名をラベルとして保持）
    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string());

        Self {
            source: PayloadSource::File(path),
            mime_type: mime_type.into(),
            name,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// メモリ上の入力なら読み込みを待たずにエンコードする
    pub fn encode_in_memory(&self) -> Option<EncodedPayload> {
        match &self.source {
            PayloadSource::Bytes(bytes) => Some(encode(bytes, &self.mime_type)),
            PayloadSource::File(_) => None,
        }
    }
}

/// 入力を読み込んでエンコードする
///
/// ファイル読み込みに失敗した場合のみ`CodecError::Unreadable`を返す。
pub async fn read_input(input: &RawInput) -> Result<EncodedPayload, CodecError> {
    match &input.source {
        PayloadSource::Bytes(bytes) => Ok(encode(bytes, &input.mime_type)),
        PayloadSource::File(path) => {
            let bytes = read_file(path).await?;
            Ok(encode(&bytes, &input.mime_type))
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, CodecError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| CodecError::unreadable(path.display().to_string(), e))
}
