//! snap_caption
//!
//! 写真のバッチを受け付け、1枚ごとに外部の生成AIサービスからSNS向け
//! キャプションを非同期に取得するライブラリ。
//!
//! - `codec`: バイト列とdata URL形式の相互変換、入力の読み込み
//! - `core`: トレイト、型、エラー定義
//! - `store`: Unitの共有コレクション
//! - `services`: 識別子生成、Geminiアダプタ、設定、進捗報告
//! - `engine`: バッチのオーケストレーション
//! - `cli`: コマンドライン表示層

pub mod cli;
pub mod codec;
pub mod core;
pub mod engine;
pub mod file_scanner;
pub mod logging;
pub mod services;
pub mod store;

pub use crate::codec::{EncodedPayload, RawInput};
pub use crate::core::{
    AnnotationClient, BatchSummary, CaptionError, CaptionResult, Phase, Unit, UnitId,
};
pub use crate::engine::BatchOrchestrator;
pub use crate::store::CollectionStore;
