// BatchOrchestrator - バッチ投入、楽観的挿入、Unitごとの並行呼び出し、識別子による照合
// 全ての依存関係はコンストラクタで注入される

use crate::{
    codec::{read_input, EncodedPayload, RawInput},
    core::{
        AnnotationClient, AnnotationError, BatchConfig, BatchReporter, BatchSummary, CaptionError,
        CaptionResult, CodecError, IdGenerator, Phase, ReconcileStatus, RejectedInput, Unit, UnitId,
        UnitOutcome,
    },
    store::CollectionStore,
};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// 1つのUnitのタスクが照合を終えた結果
#[derive(Debug)]
struct Settlement {
    phase: Phase,
    status: ReconcileStatus,
    error: Option<String>,
}

/// 完了待ちの入力
enum Waiting {
    /// ファイルの読み込み待ち
    Read(usize, RawInput),
    /// 起動済みタスクの照合待ち
    Settle(UnitId, JoinHandle<Settlement>),
}

enum Step {
    Read(usize, RawInput, Result<EncodedPayload, CodecError>),
    Settled(UnitId, Result<Settlement, JoinError>),
}

async fn advance(waiting: Waiting) -> Step {
    match waiting {
        Waiting::Read(index, input) => {
            let result = read_input(&input).await;
            Step::Read(index, input, result)
        }
        Waiting::Settle(id, handle) => Step::Settled(id, handle.await),
    }
}

/// 実行中バッチ数のカウンタ（ドロップで減算）
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// バッチ処理のオーケストレータ
///
/// 入力ごとに読み込み、`pending`としてストア先頭へ挿入してから、
/// Unitごとに独立したtokioタスクで外部呼び出しを行う。結果は識別子で
/// ストアに照合するため、完了順や途中の削除に影響されない。
pub struct BatchOrchestrator<A, G, C, R> {
    client: Arc<A>,
    ids: G,
    config: C,
    reporter: R,
    store: CollectionStore,
    in_flight: Arc<AtomicUsize>,
}

impl<A, G, C, R> BatchOrchestrator<A, G, C, R>
where
    A: AnnotationClient + 'static,
    G: IdGenerator,
    C: BatchConfig,
    R: BatchReporter,
{
    /// 新しいストアを持つオーケストレータを作成
    pub fn new(client: A, ids: G, config: C, reporter: R) -> Self {
        Self::with_store(client, ids, config, reporter, CollectionStore::new())
    }

    /// 既存のストアを共有するオーケストレータを作成
    pub fn with_store(client: A, ids: G, config: C, reporter: R, store: CollectionStore) -> Self {
        Self {
            client: Arc::new(client),
            ids,
            config,
            reporter,
            store,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// バッチを投入し、全Unitが終端状態になる（または削除される）まで待つ
    ///
    /// メモリ上の入力は投入順にその場で挿入・起動する。ファイル入力は
    /// 自分の読み込みが終わった時点で挿入・起動され、他の入力を待たない。
    /// 入力ごとの失敗はサマリーに記録され、このメソッド自体は失敗しない。
    pub async fn submit_batch(&self, inputs: Vec<RawInput>) -> BatchSummary {
        let start_time = Instant::now();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let mut summary = BatchSummary {
            submitted: inputs.len(),
            ..BatchSummary::default()
        };
        info!(inputs = inputs.len(), "batch submitted");
        self.reporter.report_started(inputs.len()).await;

        let mut steps = FuturesUnordered::new();
        for (index, input) in inputs.into_iter().enumerate() {
            let waiting = match input.encode_in_memory() {
                Some(payload) => self.accept(&mut summary, index, input.name, payload).await,
                None => Some(Waiting::Read(index, input)),
            };
            steps.extend(waiting.map(advance));
        }

        let mut settled = 0;
        while let Some(step) = steps.next().await {
            match step {
                Step::Read(index, input, Ok(payload)) => {
                    let waiting = self.accept(&mut summary, index, input.name, payload).await;
                    steps.extend(waiting.map(advance));
                }
                Step::Read(index, input, Err(error)) => {
                    self.reject(&mut summary, index, input.name, error.into()).await;
                }
                Step::Settled(id, joined) => {
                    let settlement = joined.unwrap_or_else(|e| self.settle_aborted(&id, e));
                    self.tally(&mut summary, &id, settlement).await;

                    settled += 1;
                    if self.config.enable_progress_reporting() {
                        // 読み込み中の入力があれば総数は後から減りうる
                        let total = summary.submitted - summary.rejected.len();
                        self.reporter.report_progress(settled, total).await;
                    }
                }
            }
        }

        summary.total_processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            captioned = summary.captioned,
            failed = summary.failed,
            discarded = summary.discarded,
            rejected = summary.rejected.len(),
            elapsed_ms = summary.total_processing_time_ms,
            "batch completed"
        );
        self.reporter.report_completed(&summary).await;
        summary
    }

    /// 読み込み済みの入力をUnitとして挿入し、呼び出しを起動
    async fn accept(
        &self,
        summary: &mut BatchSummary,
        index: usize,
        name: Option<String>,
        payload: EncodedPayload,
    ) -> Option<Waiting> {
        match self.admit(&payload, name.clone()) {
            Ok(id) => {
                summary.accepted.push(id.clone());
                let handle = self.dispatch(id.clone(), payload);
                Some(Waiting::Settle(id, handle))
            }
            Err(error) => {
                self.reject(summary, index, name, error).await;
                None
            }
        }
    }

    async fn reject(
        &self,
        summary: &mut BatchSummary,
        index: usize,
        name: Option<String>,
        error: CaptionError,
    ) {
        warn!(index, error = %error, "input rejected");
        self.reporter.report_rejected(index, &error.to_string()).await;
        summary.rejected.push(RejectedInput { index, name, error });
    }

    /// 識別子を割り当て、`pending`のUnitをストア先頭に挿入
    /// Unitの外部呼び出しを独立したタスクとして起動
    fn dispatch(
        &self,
        id: UnitId,
        payload: EncodedPayload,
    ) -> JoinHandle<Settlement> {
        let client = Arc::clone(&self.client);
        let store = self.store.clone();
        let failure_message = self.config.failure_message();

        tokio::spawn(async move {
            let (outcome, error) = match client.annotate(&payload).await {
                Ok(caption) => (UnitOutcome::Captioned(caption), None),
                Err(error) => {
                    warn!(unit = %id, category = error.category(), error = %error, "annotation failed");
                    (UnitOutcome::Failed(failure_message), Some(error.to_string()))
                }
            };
            let phase = outcome.phase();
            let status = store.reconcile(&id, outcome);
            Settlement {
                phase,
                status,
                error,
            }
        })
    }

    /// 異常終了したタスクのUnitを失敗として照合
    fn settle_aborted(&self, id: &UnitId, join_error: JoinError) -> Settlement {
        let error = AnnotationError::task_aborted(join_error.to_string());
        warn!(unit = %id, category = error.category(), error = %error, "annotation task aborted");

        let status = self
            .store
            .reconcile(id, UnitOutcome::Failed(self.config.failure_message()));
        Settlement {
            phase: Phase::Failed,
            status,
            error: Some(error.to_string()),
        }
    }

    async fn tally(&self, summary: &mut BatchSummary, id: &UnitId, settlement: Settlement) {
        let phase = match settlement.status {
            ReconcileStatus::Applied => settlement.phase,
            ReconcileStatus::Missing => {
                debug!(unit = %id, "unit deleted before its result arrived");
                summary.discarded += 1;
                return;
            }
            // 既に照合済みならストア上の段階を数える
            ReconcileStatus::AlreadySettled => match self.store.get(id) {
                Some(unit) => unit.phase(),
                None => {
                    summary.discarded += 1;
                    return;
                }
            },
        };

        match phase {
            Phase::Ready => summary.captioned += 1,
            Phase::Failed => {
                summary.failed += 1;
                let error = settlement
                    .error
                    .unwrap_or_else(|| self.config.failure_message());
                self.reporter.report_unit_failed(id, &error).await;
            }
            Phase::Pending => {}
        }
    }

    /// Unitを削除（どの段階でも可能、存在しない識別子は何もしない）
    pub fn delete(&self, id: &UnitId) -> bool {
        let removed = self.store.remove_by_id(id);
        if removed {
            debug!(unit = %id, "unit deleted");
        }
        removed
    }

    /// 投入済みバッチのいずれかが実行中かどうか
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// 共有ストアへの参照
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// 現時点のスナップショット（最新が先頭）
    pub fn snapshot(&self) -> Vec<Unit> {
        self.store.snapshot()
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn client(&self) -> &A {
        &self.client
    }
}
