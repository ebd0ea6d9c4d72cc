// 統合テスト
// バッチ投入から照合までをテストダブルで通しで検証する

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod test_gemini_pipeline;
mod test_scenarios;
