// エンジン層 - 並行処理とオーケストレーション
// サービス層とストアを組み合わせてバッチ処理を提供

pub mod api;
pub mod batch_orchestrator;

// 公開API - 主要エンジンクラス
pub use api::{create_default_orchestrator, create_quiet_orchestrator};
pub use batch_orchestrator::BatchOrchestrator;
