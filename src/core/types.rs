// キャプション生成に関連するデータ型定義

use super::error::CaptionError;
use crate::codec::EncodedPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unitの識別子
///
/// 内容とは無関係に生成される不透明なキー。Unitの生存期間中、
/// 全ての変更はこの識別子のみで対象を特定する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<uuid::Uuid> for UnitId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value.to_string())
    }
}

/// Unitのライフサイクル段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pending,
    Ready,
    Failed,
}

impl Phase {
    /// 終端状態かどうか
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// キャプション呼び出しの結果（照合時にUnitへ適用される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Captioned(String),
    Failed(String),
}

impl UnitOutcome {
    /// この結果を適用した後の段階
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Captioned(_) => Phase::Ready,
            Self::Failed(_) => Phase::Failed,
        }
    }
}

/// 照合（reconcile）の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// 遷移を適用した
    Applied,
    /// 対象Unitが存在しない（削除済み）。何もしない
    Missing,
    /// 既に終端状態。何もしない
    AlreadySettled,
}

/// 1件の投入ファイルに対応する作業単位
///
/// 生成後の変更は`settle`による1回の遷移のみで、それも
/// コレクションストア経由でしか行われない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    payload: EncodedPayload,
    annotation: Option<String>,
    phase: Phase,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    source_name: Option<String>,
}

impl Unit {
    /// `pending`状態のUnitを作成
    pub fn pending(id: UnitId, payload: EncodedPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            payload,
            annotation: None,
            phase: Phase::Pending,
            failure_reason: None,
            created_at,
            source_name: None,
        }
    }

    pub fn with_source_name(mut self, name: Option<String>) -> Self {
        self.source_name = name;
        self
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn payload(&self) -> &EncodedPayload {
        &self.payload
    }

    pub fn mime_type(&self) -> &str {
        self.payload.mime_type()
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// 終端状態への遷移を適用
    ///
    /// `pending`以外からの遷移は拒否し、Unitは変更しない。
    pub(crate) fn settle(&mut self, outcome: UnitOutcome) -> ReconcileStatus {
        if self.phase.is_terminal() {
            return ReconcileStatus::AlreadySettled;
        }

        match outcome {
            UnitOutcome::Captioned(text) => {
                self.annotation = Some(text);
                self.phase = Phase::Ready;
            }
            UnitOutcome::Failed(reason) => {
                self.failure_reason = Some(reason);
                self.phase = Phase::Failed;
            }
        }
        ReconcileStatus::Applied
    }
}

/// 段階ごとのUnit数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
}

impl PhaseCounts {
    pub fn total(&self) -> usize {
        self.pending + self.ready + self.failed
    }
}

/// Unitを作成できなかった入力
#[derive(Debug)]
pub struct RejectedInput {
    /// バッチ内での入力位置
    pub index: usize,
    pub name: Option<String>,
    pub error: CaptionError,
}

/// バッチ全体のサマリー
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub submitted: usize,
    /// 挿入順の識別子
    pub accepted: Vec<UnitId>,
    pub rejected: Vec<RejectedInput>,
    pub captioned: usize,
    pub failed: usize,
    /// 照合前に削除されたUnit数
    pub discarded: usize,
    pub total_processing_time_ms: u64,
}

impl BatchSummary {
    /// 照合まで完了したUnit数
    pub fn settled(&self) -> usize {
        self.captioned + self.failed + self.discarded
    }

    pub fn is_empty(&self) -> bool {
        self.submitted == 0
    }
}
