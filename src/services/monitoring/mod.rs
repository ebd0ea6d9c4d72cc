// 進捗監視機能
// バッチの開始、入力拒否、進捗、Unit失敗、完了を報告

pub mod implementations;

// 公開API
pub use implementations::{ConsoleBatchReporter, NoOpBatchReporter};
