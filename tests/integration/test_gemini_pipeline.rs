// Geminiアダプタを含めた通しのテスト（HTTPはmockitoで代替）
use crate::fixtures::*;
use mockito::{Matcher, Server};
use serde_json::json;
use snap_caption::core::Phase;
use snap_caption::engine::create_quiet_orchestrator;
use snap_caption::services::{GeminiAnnotationClient, GeminiConfig};
use snap_caption::RawInput;

const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn gemini_client(server: &Server) -> GeminiAnnotationClient {
    GeminiAnnotationClient::new(GeminiConfig::new("integration-key").with_base_url(server.url()))
        .unwrap()
}

/// 空の本文が返った場合はフォールバックのキャプションでreadyになる
#[tokio::test]
async fn empty_success_body_becomes_fallback_caption() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", MODEL_PATH)
        .match_header("x-goog-api-key", "integration-key")
        .with_status(200)
        .with_body(json!({ "candidates": [] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let engine = create_quiet_orchestrator(gemini_client(&server));
    let summary = engine
        .submit_batch(vec![RawInput::from_bytes(MINIMAL_PNG_DATA, "image/png")])
        .await;

    mock.assert_async().await;
    assert_eq!(summary.captioned, 1);
    let unit = &engine.snapshot()[0];
    assert_eq!(unit.phase(), Phase::Ready);
    assert_eq!(unit.annotation(), Some("Cool photo! 📸"));
}

/// HTTPエラーはそのUnitだけを失敗させる
#[tokio::test]
async fn http_errors_fail_only_their_unit() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("POST", MODEL_PATH)
        .match_body(Matcher::Regex("\"mimeType\":\"image/png\"".to_string()))
        .with_status(200)
        .with_body(
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Pixel perfect ✨🖼️" }] } }] })
                .to_string(),
        )
        .create_async()
        .await;
    let failing = server
        .mock("POST", MODEL_PATH)
        .match_body(Matcher::Regex("\"mimeType\":\"image/jpeg\"".to_string()))
        .with_status(503)
        .with_body(json!({ "error": { "message": "overloaded" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let engine = create_quiet_orchestrator(gemini_client(&server));
    let summary = engine
        .submit_batch(vec![
            RawInput::from_bytes(MINIMAL_PNG_DATA, "image/png"),
            RawInput::from_bytes(b"jpeg-bytes".to_vec(), "image/jpeg"),
        ])
        .await;

    ok.assert_async().await;
    failing.assert_async().await;
    assert_eq!(summary.captioned, 1);
    assert_eq!(summary.failed, 1);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot[0].mime_type(), "image/jpeg");
    assert_eq!(snapshot[0].failure_reason(), Some("Failed to generate caption"));
    assert_eq!(snapshot[1].annotation(), Some("Pixel perfect ✨🖼️"));
}
