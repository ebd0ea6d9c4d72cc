// サービス層 - 機能別のビジネスロジック
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod annotation;
pub mod config;
pub mod identity;
pub mod monitoring;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use annotation::GeminiAnnotationClient;
pub use config::{DefaultBatchConfig, GeminiConfig};
pub use identity::{SequentialIdGenerator, UuidIdGenerator};
pub use monitoring::{ConsoleBatchReporter, NoOpBatchReporter};
