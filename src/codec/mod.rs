//! ペイロードコーデック
//!
//! 生バイト列とMIMEタグを、プレビューにもそのまま使える自己完結型の
//! データURL (`data:<mime>;base64,<data>`) 表現へ可逆変換する。
//! 画素の中身は一切解釈しない。

use crate::core::error::CodecError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::sync::Arc;

pub mod reader;

pub use reader::{read_input, PayloadSource, RawInput};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// エンコード済みペイロード
///
/// 生成後は不変。Base64データは`Arc<str>`で共有するため、
/// スナップショットやタスクへの受け渡しでの複製は安価。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    mime_type: String,
    data: Arc<str>,
}

impl EncodedPayload {
    /// MIMEタグを取得
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64データ部分（データURLのヘッダを含まない）を取得
    pub fn base64_data(&self) -> &str {
        &self.data
    }

    /// エンコード後のデータ長（バイト）
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }

    /// デコード後の元データ長を推定（パディングを考慮）
    pub fn decoded_len_estimate(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        ((self.data.len() / 4) * 3).saturating_sub(padding.min(2))
    }

    /// データURL文字列として描画
    pub fn to_data_url(&self) -> String {
        format!(
            "{DATA_URL_PREFIX}{}{BASE64_MARKER},{}",
            self.mime_type, self.data
        )
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DATA_URL_PREFIX}{}{BASE64_MARKER},<{} bytes>",
            self.mime_type,
            self.data.len()
        )
    }
}

/// 生バイト列をエンコード（全域・決定的）
pub fn encode(raw: &[u8], mime_type: &str) -> EncodedPayload {
    EncodedPayload {
        mime_type: mime_type.to_string(),
        data: Arc::from(STANDARD.encode(raw)),
    }
}

/// エンコード済みペイロードを生バイト列とMIMEタグへ戻す
pub fn decode(payload: &EncodedPayload) -> Result<(Vec<u8>, String), CodecError> {
    let raw = STANDARD.decode(payload.data.as_bytes())?;
    Ok((raw, payload.mime_type.clone()))
}

/// データURL文字列を解析
///
/// Base64データにはカンマが含まれないため、最後のカンマでヘッダと
/// データを分割する。これによりMIMEタグ側の任意の文字列が往復できる。
pub fn parse_data_url(input: &str) -> Result<EncodedPayload, CodecError> {
    let rest = input
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| CodecError::malformed("`data:`で始まっていません"))?;

    let (header, data) = rest
        .rsplit_once(',')
        .ok_or_else(|| CodecError::malformed("ヘッダとデータを区切るカンマがありません"))?;

    let mime_type = header
        .strip_suffix(BASE64_MARKER)
        .ok_or_else(|| CodecError::malformed("base64エンコーディング以外には対応していません"))?;

    // 形式だけ検証し、保持するのは元の文字列
    STANDARD.decode(data.as_bytes())?;

    Ok(EncodedPayload {
        mime_type: mime_type.to_string(),
        data: Arc::from(data),
    })
}
