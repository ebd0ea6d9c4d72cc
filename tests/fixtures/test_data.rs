// テストデータ

use snap_caption::codec::RawInput;
use snap_caption::core::Unit;

// テスト用の有効な1x1 PNGファイル
pub const MINIMAL_PNG_DATA: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
    0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// 中身がラベルそのものの入力（テストダブルがラベルで応答を選ぶ）
pub fn labelled_input(label: &str) -> RawInput {
    RawInput::from_bytes(label.as_bytes().to_vec(), "image/png").with_name(label)
}

pub fn labelled_inputs(labels: &[&str]) -> Vec<RawInput> {
    labels.iter().map(|label| labelled_input(label)).collect()
}

/// Unitのペイロードからラベルを取り出す
pub fn label_of(unit: &Unit) -> String {
    let (bytes, _) = snap_caption::codec::decode(unit.payload()).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// スナップショットのラベル列（最新が先頭）
pub fn labels(units: &[Unit]) -> Vec<String> {
    units.iter().map(label_of).collect()
}

/// ストアのUnit数が`len`になるまで待つ
pub async fn wait_for_len(store: &snap_caption::CollectionStore, len: usize) {
    let mut changes = store.subscribe();
    let wait = async {
        while store.len() != len {
            changes.changed().await.unwrap();
        }
    };
    tokio::time::timeout(std::time::Duration::from_secs(5), wait)
        .await
        .expect("store did not reach the expected size");
}
