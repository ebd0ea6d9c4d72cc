// キャプション生成アダプタ
// 外部の生成AIサービスを`AnnotationClient`として提供

pub mod gemini;

pub use gemini::GeminiAnnotationClient;

/// 生成テキストが空ならフォールバックに置き換える
pub fn caption_or_fallback(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
