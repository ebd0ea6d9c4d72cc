//! コレクションストア
//!
//! Unitの順序付きコレクションを唯一所有する共有ストア。
//! 全ての操作は1つのミューテックスの臨界区間で完結し、`.await`を
//! またいでロックを保持することはない。読み出し側にはスナップショット
//! （所有権付きのコピー）のみを渡す。

use crate::core::{Phase, PhaseCounts, ReconcileStatus, Unit, UnitId, UnitOutcome};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    /// 先頭が最新
    units: VecDeque<Unit>,
    /// これまでに受け入れた全ての識別子（削除済みを含む）
    ///
    /// 再利用を拒否するため削除しても縮まない。メモリ使用量はストアの
    /// 生存期間中に受け入れたUnitの総数に比例する。
    known_ids: HashSet<UnitId>,
    version: u64,
}

impl StoreState {
    fn position(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id() == id)
    }
}

/// 共有コレクションストア
///
/// `Clone`は同じ状態への新しいハンドルを作る。
#[derive(Debug, Clone)]
pub struct CollectionStore {
    state: Arc<Mutex<StoreState>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            changes: Arc::new(changes),
        }
    }

    // 各操作は状態を常に整合した形で残すため、ポイズンは無視して継続する
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self, state: &mut StoreState) {
        state.version += 1;
        self.changes.send_replace(state.version);
    }

    /// Unitを先頭に挿入
    ///
    /// 過去に一度でも受け入れた識別子の場合は何もせず`false`を返す。
    pub fn insert_front(&self, unit: Unit) -> bool {
        let mut state = self.lock();
        if !state.known_ids.insert(unit.id().clone()) {
            debug!(unit = %unit.id(), "duplicate id rejected");
            return false;
        }
        state.units.push_front(unit);
        self.bump(&mut state);
        true
    }

    /// 結果を識別子で照合し、Unitに遷移を適用
    ///
    /// 対象が存在しない場合は何もしない（削除済みUnitを復活させない）。
    pub fn reconcile(&self, id: &UnitId, outcome: UnitOutcome) -> ReconcileStatus {
        let mut state = self.lock();
        let Some(index) = state.position(id) else {
            debug!(unit = %id, "reconcile skipped: unit no longer present");
            return ReconcileStatus::Missing;
        };

        let status = state.units[index].settle(outcome);
        if status == ReconcileStatus::Applied {
            self.bump(&mut state);
        }
        status
    }

    /// 識別子でUnitを削除
    ///
    /// 存在しない識別子でも成功扱い。実際に削除した場合のみ`true`。
    pub fn remove_by_id(&self, id: &UnitId) -> bool {
        let mut state = self.lock();
        match state.position(id) {
            Some(index) => {
                state.units.remove(index);
                self.bump(&mut state);
                true
            }
            None => false,
        }
    }

    /// 現時点の順序付きスナップショット（最新が先頭）
    pub fn snapshot(&self) -> Vec<Unit> {
        self.lock().units.iter().cloned().collect()
    }

    pub fn get(&self, id: &UnitId) -> Option<Unit> {
        let state = self.lock();
        state.position(id).map(|index| state.units[index].clone())
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.lock().position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().units.is_empty()
    }

    /// 段階ごとのUnit数を集計
    pub fn phase_counts(&self) -> PhaseCounts {
        self.lock()
            .units
            .iter()
            .fold(PhaseCounts::default(), |mut counts, unit| {
                match unit.phase() {
                    Phase::Pending => counts.pending += 1,
                    Phase::Ready => counts.ready += 1,
                    Phase::Failed => counts.failed += 1,
                }
                counts
            })
    }

    /// 現在のバージョン（実際に状態が変わるたびに増加）
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// 変更通知を購読
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
