// キャプション生成パイプラインのトレイト定義
// 全ての抽象化インターフェースを定義

use super::error::AnnotationError;
use super::types::{BatchSummary, UnitId};
use crate::codec::EncodedPayload;
use async_trait::async_trait;
use mockall::automock;

/// 外部キャプションサービスのアダプタ
///
/// 1回の呼び出しにつき外部への往復は1回のみで、内部で再試行はしない。
/// 失敗は黙ってプレースホルダを返さず、必ず`AnnotationError`で返す。
#[automock]
#[async_trait]
pub trait AnnotationClient: Send + Sync {
    /// エンコード済みペイロードのキャプションを生成
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError>;

    /// ログ用のクライアント名
    fn client_name(&self) -> &'static str {
        "annotation"
    }
}

// AnnotationClient for Box<dyn AnnotationClient>
#[async_trait]
impl AnnotationClient for Box<dyn AnnotationClient> {
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError> {
        self.as_ref().annotate(payload).await
    }

    fn client_name(&self) -> &'static str {
        self.as_ref().client_name()
    }
}

/// Unit識別子の生成器
#[automock]
pub trait IdGenerator: Send + Sync {
    /// 新しい識別子を生成
    fn next_id(&self) -> UnitId;
}

/// バッチ処理の設定を抽象化するトレイト
#[automock]
pub trait BatchConfig: Send + Sync {
    /// 失敗したUnitに表示する固定メッセージ
    fn failure_message(&self) -> String;

    /// 識別子衝突時の再生成回数の上限
    fn max_id_attempts(&self) -> usize;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

// BatchConfig for Box<dyn BatchConfig>
impl BatchConfig for Box<dyn BatchConfig> {
    fn failure_message(&self) -> String {
        self.as_ref().failure_message()
    }

    fn max_id_attempts(&self) -> usize {
        self.as_ref().max_id_attempts()
    }

    fn enable_progress_reporting(&self) -> bool {
        self.as_ref().enable_progress_reporting()
    }
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait BatchReporter: Send + Sync {
    /// バッチ開始時の報告
    async fn report_started(&self, total_inputs: usize);

    /// Unitを作成できなかった入力の報告
    async fn report_rejected(&self, index: usize, error: &str);

    /// 進捗更新の報告
    async fn report_progress(&self, settled: usize, total: usize);

    /// Unitが失敗した際の報告
    async fn report_unit_failed(&self, id: &UnitId, error: &str);

    /// バッチ完了時の報告
    async fn report_completed(&self, summary: &BatchSummary);
}
