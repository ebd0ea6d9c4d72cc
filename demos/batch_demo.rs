// バッチ処理のデモ
// 外部サービスの代わりに遅延付きのクライアントを使い、
// 処理中の削除と変更通知の様子を表示する
//
// 実行: cargo run --example batch_demo

use anyhow::Result;
use async_trait::async_trait;
use snap_caption::codec::{decode, EncodedPayload, RawInput};
use snap_caption::core::{AnnotationClient, AnnotationError};
use snap_caption::engine::BatchOrchestrator;
use snap_caption::logging::init_tracing;
use snap_caption::services::annotation::caption_or_fallback;
use snap_caption::services::config::DEFAULT_FALLBACK_CAPTION;
use snap_caption::services::{ConsoleBatchReporter, DefaultBatchConfig, SequentialIdGenerator};
use std::sync::Arc;
use std::time::Duration;

/// 写真名に応じて遅延・失敗するデモ用クライアント
struct DemoClient;

#[async_trait]
impl AnnotationClient for DemoClient {
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError> {
        let name = decode(payload)
            .map(|(bytes, _)| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();

        let delay = 100 * (name.len() as u64 % 5 + 1);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        match name.as_str() {
            "blurry" => Err(AnnotationError::http_status(500, "model unavailable")),
            "empty" => Ok(caption_or_fallback("", DEFAULT_FALLBACK_CAPTION)),
            _ => Ok(format!("Living my best {name} life ✨📸")),
        }
    }

    fn client_name(&self) -> &'static str {
        "demo"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(1);

    println!("🚀 snap_caption - バッチ処理デモ");

    let engine = Arc::new(BatchOrchestrator::new(
        DemoClient,
        SequentialIdGenerator::with_prefix("photo"),
        DefaultBatchConfig::default(),
        ConsoleBatchReporter::new(),
    ));

    // 変更通知を購読して段階ごとの件数を表示
    let mut changes = engine.store().subscribe();
    let watcher = tokio::spawn({
        let store = engine.store().clone();
        async move {
            while changes.changed().await.is_ok() {
                let counts = store.phase_counts();
                println!(
                    "👀 pending={} ready={} failed={}",
                    counts.pending, counts.ready, counts.failed
                );
            }
        }
    });

    let inputs: Vec<RawInput> = ["beach", "sunset", "blurry", "coffee", "empty"]
        .into_iter()
        .map(|name| RawInput::from_bytes(name.as_bytes().to_vec(), "image/jpeg").with_name(name))
        .collect();

    let batch = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.submit_batch(inputs).await }
    });

    // 処理中に1件削除する
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Some(unit) = engine
        .snapshot()
        .into_iter()
        .find(|u| u.source_name() == Some("coffee"))
    {
        println!("🗑️  deleting {} while it is {}", unit.id(), unit.phase());
        engine.delete(unit.id());
    }

    let summary = batch.await?;
    watcher.abort();

    println!("\n📋 最終結果（最新が先頭）:");
    for unit in engine.snapshot() {
        let label = unit.source_name().unwrap_or_default();
        match (unit.annotation(), unit.failure_reason()) {
            (Some(caption), _) => println!("   ✅ {label}: {caption}"),
            (_, Some(reason)) => println!("   ❌ {label}: {reason}"),
            _ => println!("   ⏳ {label}"),
        }
    }
    println!(
        "📊 captioned={} failed={} discarded={} ({} ms)",
        summary.captioned, summary.failed, summary.discarded, summary.total_processing_time_ms
    );

    Ok(())
}
