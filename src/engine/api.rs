// 高レベル公開API
// BatchOrchestratorを簡単に組み立てるための便利な関数

use super::BatchOrchestrator;
use crate::{
    core::AnnotationClient,
    services::{ConsoleBatchReporter, DefaultBatchConfig, NoOpBatchReporter, UuidIdGenerator},
};

/// デフォルト構成のオーケストレータを作成
///
/// UUID v4の識別子、デフォルト設定、コンソールへの進捗報告を使う
pub fn create_default_orchestrator<A>(
    client: A,
) -> BatchOrchestrator<A, UuidIdGenerator, DefaultBatchConfig, ConsoleBatchReporter>
where
    A: AnnotationClient + 'static,
{
    BatchOrchestrator::new(
        client,
        UuidIdGenerator::new(),
        DefaultBatchConfig::default(),
        ConsoleBatchReporter::new(),
    )
}

/// 静音版のオーケストレータを作成（テスト・バックグラウンド処理用）
pub fn create_quiet_orchestrator<A>(
    client: A,
) -> BatchOrchestrator<A, UuidIdGenerator, DefaultBatchConfig, NoOpBatchReporter>
where
    A: AnnotationClient + 'static,
{
    BatchOrchestrator::new(
        client,
        UuidIdGenerator::new(),
        DefaultBatchConfig::default(),
        NoOpBatchReporter::new(),
    )
}
