// 進捗監視の具象実装

use crate::core::{BatchReporter, BatchSummary, UnitId};
use async_trait::async_trait;

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleBatchReporter {
    quiet: bool,
}

impl ConsoleBatchReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[async_trait]
impl BatchReporter for ConsoleBatchReporter {
    async fn report_started(&self, total_inputs: usize) {
        if !self.quiet {
            eprintln!("🚀 Captioning {total_inputs} photos...");
        }
    }

    async fn report_rejected(&self, index: usize, error: &str) {
        if !self.quiet {
            eprintln!("⚠️  Skipped input #{index}: {error}");
        }
    }

    async fn report_progress(&self, settled: usize, total: usize) {
        if !self.quiet && total > 0 {
            let percentage = (settled as f64 / total as f64) * 100.0;
            eprintln!("📊 Progress: {settled}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_unit_failed(&self, id: &UnitId, error: &str) {
        if !self.quiet {
            eprintln!("❌ Caption failed for {id}: {error}");
        }
    }

    async fn report_completed(&self, summary: &BatchSummary) {
        if !self.quiet {
            eprintln!(
                "✅ Completed! Captioned: {}, Failed: {}, Rejected: {}",
                summary.captioned,
                summary.failed,
                summary.rejected.len()
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・バックグラウンド用）
#[derive(Debug, Default, Clone)]
pub struct NoOpBatchReporter;

impl NoOpBatchReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BatchReporter for NoOpBatchReporter {
    async fn report_started(&self, _total_inputs: usize) {}

    async fn report_rejected(&self, _index: usize, _error: &str) {}

    async fn report_progress(&self, _settled: usize, _total: usize) {}

    async fn report_unit_failed(&self, _id: &UnitId, _error: &str) {}

    async fn report_completed(&self, _summary: &BatchSummary) {}
}
