// 代表的な利用シナリオ
use crate::fixtures::*;
use snap_caption::core::Phase;
use snap_caption::engine::BatchOrchestrator;
use snap_caption::services::{DefaultBatchConfig, NoOpBatchReporter, SequentialIdGenerator};
use std::sync::Arc;
use std::time::Duration;

fn orchestrator<A: snap_caption::AnnotationClient + 'static>(
    client: A,
) -> BatchOrchestrator<A, SequentialIdGenerator, DefaultBatchConfig, NoOpBatchReporter> {
    BatchOrchestrator::new(
        client,
        SequentialIdGenerator::new(),
        DefaultBatchConfig::default(),
        NoOpBatchReporter::new(),
    )
}

/// シナリオA: 2件とも成功し、後から投入したものが先頭
#[tokio::test]
async fn scenario_two_successes() {
    let engine = orchestrator(ScriptedClient::new());

    let summary = engine.submit_batch(labelled_inputs(&["a", "b"])).await;

    assert_eq!(summary.captioned, 2);
    let snapshot = engine.snapshot();
    assert_eq!(labels(&snapshot), vec!["b", "a"]);
    assert_eq!(snapshot[0].annotation(), Some("T-b"));
    assert_eq!(snapshot[1].annotation(), Some("T-a"));
    assert!(snapshot.iter().all(|u| u.phase() == Phase::Ready));
}

/// シナリオB: 1件だけ失敗し、固定メッセージが設定される
#[tokio::test]
async fn scenario_one_failure() {
    let engine = orchestrator(ScriptedClient::new().failing("x", 500));

    let summary = engine.submit_batch(labelled_inputs(&["x", "y"])).await;

    assert_eq!(summary.captioned, 1);
    assert_eq!(summary.failed, 1);

    let snapshot = engine.snapshot();
    let x = snapshot.iter().find(|u| label_of(u) == "x").unwrap();
    assert_eq!(x.phase(), Phase::Failed);
    assert_eq!(x.failure_reason(), Some("Failed to generate caption"));
    assert_eq!(x.annotation(), None);

    let y = snapshot.iter().find(|u| label_of(u) == "y").unwrap();
    assert_eq!(y.phase(), Phase::Ready);
    assert_eq!(y.failure_reason(), None);
}

/// シナリオC: 照合前に2件目を削除すると、残りは2件
#[tokio::test]
async fn scenario_delete_before_resolution() {
    let (client, mut gates) = GatedClient::new(&["p", "q", "r"]);
    let engine = Arc::new(orchestrator(client));

    let handle = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.submit_batch(labelled_inputs(&["p", "q", "r"])).await }
    });
    wait_for_len(engine.store(), 3).await;

    let q = engine
        .snapshot()
        .into_iter()
        .find(|u| label_of(u) == "q")
        .unwrap();
    assert!(engine.delete(q.id()));

    gates.succeed("p");
    gates.succeed("q");
    gates.succeed("r");
    let summary = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.captioned, 2);
    assert_eq!(summary.discarded, 1);
    let snapshot = engine.snapshot();
    assert_eq!(labels(&snapshot), vec!["r", "p"]);
    assert!(snapshot.iter().all(|u| u.phase() == Phase::Ready));
    assert!(engine.store().get(q.id()).is_none());
    // 削除済みでも外部呼び出しは取り消されない
    assert_eq!(engine.client().log.count("q"), 1);
}

/// シナリオD: 空のバッチは即座に完了
#[tokio::test]
async fn scenario_empty_batch() {
    let engine = orchestrator(ScriptedClient::new());

    let summary = tokio::time::timeout(Duration::from_secs(1), engine.submit_batch(Vec::new()))
        .await
        .unwrap();

    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.settled(), 0);
    assert!(engine.snapshot().is_empty());
    assert!(engine.client().log.calls().is_empty());
    assert!(!engine.is_processing());
}

/// 削除後に同じ内容を再投入しても新しいUnitになる
#[tokio::test]
async fn resubmitting_after_delete_creates_new_unit() {
    let engine = orchestrator(ScriptedClient::new());

    let first = engine.submit_batch(labelled_inputs(&["a"])).await;
    engine.delete(&first.accepted[0]);
    let second = engine.submit_batch(labelled_inputs(&["a"])).await;

    assert_ne!(first.accepted[0], second.accepted[0]);
    assert_eq!(engine.snapshot().len(), 1);
    assert_eq!(engine.snapshot()[0].id(), &second.accepted[0]);
}

/// 読み込めないファイルは拒否され、他の入力には影響しない
#[tokio::test]
async fn unreadable_file_is_rejected_in_isolation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = temp_dir.path().join("photo.png");
    std::fs::write(&photo, MINIMAL_PNG_DATA).unwrap();

    let engine = orchestrator(ScriptedClient::new());
    let inputs = vec![
        snap_caption::RawInput::from_path(temp_dir.path().join("missing.png"), "image/png"),
        snap_caption::RawInput::from_path(&photo, "image/png"),
    ];

    let summary = engine.submit_batch(inputs).await;

    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].index, 0);
    assert_eq!(summary.captioned, 1);

    let unit = &engine.snapshot()[0];
    assert_eq!(unit.source_name(), Some("photo.png"));
    let (bytes, mime) = snap_caption::codec::decode(unit.payload()).unwrap();
    assert_eq!(bytes, MINIMAL_PNG_DATA);
    assert_eq!(mime, "image/png");
}
