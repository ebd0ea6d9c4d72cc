// テストユーティリティとモック実装
// 統合テスト用のテストダブルとテストデータ
#![allow(dead_code)]

pub mod mocks;
pub mod test_data;

// 公開API
pub use mocks::*;
pub use test_data::*;
