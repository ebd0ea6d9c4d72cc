// 識別子生成の具象実装

use crate::core::{IdGenerator, UnitId};
use std::sync::atomic::{AtomicU64, Ordering};

/// ランダムなUUID v4による識別子生成（デフォルト）
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> UnitId {
        UnitId::from(uuid::Uuid::new_v4())
    }
}

/// プロセス内で単調増加するカウンタによる識別子生成
///
/// 出力が決定的なため、テストやデモで使う。
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::with_prefix("unit")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> UnitId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        UnitId::new(format!("{}-{n}", self.prefix))
    }
}
