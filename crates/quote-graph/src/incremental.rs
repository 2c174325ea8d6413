//! 增量重算引擎

use quote_core::{FieldValue, QuoteError, Result};
use std::collections::{BTreeMap, BTreeSet};

use crate::dirty_tracking::{DirtyTracker, FieldState};
use crate::inputs::ComputeInputs;
use crate::notify::{PassNotification, PassReport, StageFailure, SubscriptionId, Subscribers};
use crate::registry::DependencyRegistry;
use crate::sequence::{FetchOutcome, FetchTicket, RequestSequencer};
use crate::snapshot::SourceSnapshot;

/// 衍生欄位的計算函數
pub type ComputeFn = Box<dyn Fn(&ComputeInputs<'_>) -> Result<FieldValue>>;

/// 欄位種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 來源欄位（使用者輸入或型錄回填）
    Source,
    /// 衍生欄位（只能由計算產生）
    Derived,
}

struct FieldSlot {
    kind: FieldKind,
    value: Option<FieldValue>,
    compute: Option<ComputeFn>,
}

impl FieldSlot {
    fn source(value: Option<FieldValue>) -> Self {
        Self {
            kind: FieldKind::Source,
            value,
            compute: None,
        }
    }
}

/// 單一欄位的重算結果
enum Evaluation {
    Computed(FieldValue),
    Failed(QuoteError),
    Unavailable,
}

/// 增量重算引擎
///
/// 擁有整個表單期間的欄位值與相依圖。所有寫入都經過 `set_value`，
/// 每次寫入只重算受影響的下游欄位，依拓撲順序各算一次，結束後發出一則通知。
pub struct RecalcEngine {
    registry: DependencyRegistry,
    slots: Vec<FieldSlot>,
    tracker: DirtyTracker,
    sequencer: RequestSequencer,
    subscribers: Subscribers,
    last_failures: Vec<StageFailure>,
}

impl RecalcEngine {
    /// 創建空的引擎
    pub fn new() -> Self {
        Self {
            registry: DependencyRegistry::new(),
            slots: Vec::new(),
            tracker: DirtyTracker::new(),
            sequencer: RequestSequencer::new(),
            subscribers: Subscribers::default(),
            last_failures: Vec::new(),
        }
    }

    fn ensure_field(&mut self, id: &str) -> usize {
        let (idx, created) = self.registry.ensure(id);
        if created {
            self.slots.push(FieldSlot::source(None));
        }
        idx
    }

    fn lookup(&self, id: &str) -> Result<usize> {
        self.registry
            .lookup(id)
            .ok_or_else(|| QuoteError::UnknownField(id.to_string()))
    }

    /// 宣告來源欄位與初始值（已存在的來源欄位只更新值，不觸發重算）
    pub fn declare_source(&mut self, id: &str, initial: Option<FieldValue>) -> Result<()> {
        let idx = self.ensure_field(id);
        let slot = &mut self.slots[idx];
        if slot.kind == FieldKind::Derived {
            return Err(QuoteError::NotASourceField(id.to_string()));
        }
        slot.value = initial;
        Ok(())
    }

    /// 登錄衍生欄位
    ///
    /// 已登錄的衍生欄位會被重新接線。新邊形成循環時回傳 `CyclicDependency`，
    /// 原本的接線保持不變。登錄成功後立即從該欄位開始重算一輪。
    pub fn register<F>(&mut self, id: &str, depends_on: &[&str], compute: F) -> Result<PassReport>
    where
        F: Fn(&ComputeInputs<'_>) -> Result<FieldValue> + 'static,
    {
        let idx = self.ensure_field(id);
        let deps: Vec<usize> = depends_on.iter().map(|d| self.ensure_field(d)).collect();

        self.registry.set_dependencies(idx, deps)?;

        let slot = &mut self.slots[idx];
        slot.kind = FieldKind::Derived;
        slot.compute = Some(Box::new(compute));

        tracing::debug!("登錄衍生欄位 {}，相依 {:?}", id, depends_on);

        let mut affected = self.registry.downstream(idx);
        affected.insert(idx);
        self.run_pass(affected, Vec::new())
    }

    /// 寫入來源欄位並重算下游
    pub fn set_value(&mut self, id: &str, value: FieldValue) -> Result<PassReport> {
        self.write_source(id, Some(value))
    }

    /// 清空來源欄位（下游欄位變為不可用）
    pub fn clear_value(&mut self, id: &str) -> Result<PassReport> {
        self.write_source(id, None)
    }

    fn write_source(&mut self, id: &str, value: Option<FieldValue>) -> Result<PassReport> {
        let idx = self.ensure_field(id);
        let slot = &mut self.slots[idx];
        if slot.kind == FieldKind::Derived {
            return Err(QuoteError::NotASourceField(id.to_string()));
        }

        let mut changed = Vec::new();
        if slot.value != value {
            slot.value = value;
            changed.push(id.to_string());
        }

        let affected = self.registry.downstream(idx);
        self.run_pass(affected, changed)
    }

    /// 讀取欄位值；不可用或不存在時回傳 `None`
    pub fn get_value(&self, id: &str) -> Option<&FieldValue> {
        self.registry
            .lookup(id)
            .and_then(|idx| self.slots[idx].value.as_ref())
    }

    /// 欄位是否存在
    pub fn contains(&self, id: &str) -> bool {
        self.registry.lookup(id).is_some()
    }

    /// 欄位種類
    pub fn kind(&self, id: &str) -> Option<FieldKind> {
        self.registry.lookup(id).map(|idx| self.slots[idx].kind)
    }

    /// 欄位重算狀態
    pub fn state(&self, id: &str) -> Option<FieldState> {
        self.registry.lookup(id).map(|idx| self.tracker.state(idx))
    }

    /// 直接相依的欄位
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<String>> {
        let idx = self.lookup(id)?;
        Ok(self
            .registry
            .dependencies(idx)
            .iter()
            .map(|&d| self.registry.id(d).to_string())
            .collect())
    }

    /// 直接依賴此欄位的欄位
    pub fn dependents_of(&self, id: &str) -> Result<Vec<String>> {
        let idx = self.lookup(id)?;
        Ok(self
            .registry
            .dependents(idx)
            .map(|d| self.registry.id(d).to_string())
            .collect())
    }

    /// 所有欄位ID（依登錄順序）
    pub fn field_ids(&self) -> Vec<String> {
        (0..self.registry.len())
            .map(|idx| self.registry.id(idx).to_string())
            .collect()
    }

    /// 最近一輪的計算失敗
    pub fn last_failures(&self) -> &[StageFailure] {
        &self.last_failures
    }

    /// 訂閱重算完成通知
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PassNotification) + 'static,
    {
        self.subscribers.add(Box::new(listener))
    }

    /// 取消訂閱
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// 重算所有衍生欄位
    pub fn recompute_all(&mut self) -> Result<PassReport> {
        let affected = self.derived_fields();
        self.run_pass(affected, Vec::new())
    }

    fn derived_fields(&self) -> BTreeSet<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.kind == FieldKind::Derived)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// 為來源欄位發出查詢請求憑證
    pub fn begin_fetch(&mut self, id: &str) -> Result<FetchTicket> {
        let idx = self.ensure_field(id);
        if self.slots[idx].kind == FieldKind::Derived {
            return Err(QuoteError::NotASourceField(id.to_string()));
        }
        Ok(self.sequencer.issue(id))
    }

    /// 套用查詢回應；同一欄位已有較新的請求時丟棄
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, value: FieldValue) -> Result<FetchOutcome> {
        if !self.sequencer.is_current(ticket) {
            let latest = self.sequencer.latest(&ticket.field);
            tracing::warn!(
                "丟棄過期的查詢回應: {} 序號 {}（最新 {}）",
                ticket.field,
                ticket.seq,
                latest
            );
            return Ok(FetchOutcome::Superseded { latest });
        }

        self.set_value(&ticket.field, value).map(FetchOutcome::Applied)
    }

    /// 擷取所有來源欄位值
    pub fn snapshot_sources(&self) -> SourceSnapshot {
        let values: BTreeMap<String, Option<FieldValue>> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.kind == FieldKind::Source)
            .map(|(idx, slot)| (self.registry.id(idx).to_string(), slot.value.clone()))
            .collect();
        SourceSnapshot::new(values)
    }

    /// 從快照還原來源欄位，只重算一輪並發出一則通知
    pub fn restore(&mut self, snapshot: &SourceSnapshot) -> Result<PassReport> {
        if let Some(id) = snapshot
            .values
            .keys()
            .find(|id| self.kind(id) == Some(FieldKind::Derived))
        {
            return Err(QuoteError::NotASourceField(id.clone()));
        }

        let mut changed = Vec::new();
        for (id, value) in &snapshot.values {
            let idx = self.ensure_field(id);
            let slot = &mut self.slots[idx];
            if slot.value != *value {
                slot.value = value.clone();
                changed.push(id.clone());
            }
        }

        tracing::info!("還原快照 {}，{} 個來源欄位變動", snapshot.id, changed.len());
        let affected = self.derived_fields();
        self.run_pass(affected, changed)
    }

    /// 執行一輪重算
    ///
    /// `affected` 內的欄位先全部標為 Dirty，再依 Kahn 拓撲順序逐一重算，
    /// 每個欄位在本輪只經過一次 Dirty → Recomputing → Clean。
    fn run_pass(&mut self, affected: BTreeSet<usize>, mut changed: Vec<String>) -> Result<PassReport> {
        for &idx in &affected {
            self.tracker.mark_dirty(idx);
        }
        tracing::debug!("髒欄位 {} 個", affected.len());

        let order = self.registry.topological_order(&affected)?;
        let mut failures = Vec::new();
        let mut recomputed = 0;

        for idx in order {
            if !self.tracker.begin(idx) {
                continue;
            }

            let evaluation = self.evaluate(idx);
            let new_value = match evaluation {
                Evaluation::Computed(value) => Some(value),
                Evaluation::Unavailable => None,
                Evaluation::Failed(err) => {
                    let failure = StageFailure::new(self.registry.id(idx), &err);
                    tracing::warn!("{}", failure.to_error());
                    failures.push(failure);
                    None
                }
            };

            let slot = &mut self.slots[idx];
            if slot.value != new_value {
                slot.value = new_value;
                changed.push(self.registry.id(idx).to_string());
            }
            self.tracker.finish(idx);
            recomputed += 1;
        }

        tracing::info!(
            "重算完成: {} 個欄位，{} 個變動，{} 個失敗",
            recomputed,
            changed.len(),
            failures.len()
        );

        self.last_failures = failures.clone();
        self.subscribers.notify(&PassNotification {
            changed_field_ids: changed.clone(),
        });

        Ok(PassReport {
            changed,
            failures,
            recomputed,
        })
    }

    /// 計算單一衍生欄位；任一輸入不可用時不呼叫計算函數
    fn evaluate(&self, idx: usize) -> Evaluation {
        let deps = self.registry.dependencies(idx);
        let mut values = Vec::with_capacity(deps.len());
        for &d in deps {
            match &self.slots[d].value {
                Some(value) => values.push((self.registry.id(d), value)),
                None => {
                    tracing::debug!(
                        "欄位 {} 的輸入 {} 不可用",
                        self.registry.id(idx),
                        self.registry.id(d)
                    );
                    return Evaluation::Unavailable;
                }
            }
        }

        let inputs = ComputeInputs::new(self.registry.id(idx), values);
        match &self.slots[idx].compute {
            Some(compute) => match compute(&inputs) {
                Ok(value) => Evaluation::Computed(value),
                Err(err) => Evaluation::Failed(err),
            },
            None => Evaluation::Unavailable,
        }
    }
}

impl Default for RecalcEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecalcEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecalcEngine")
            .field("fields", &self.registry.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn num(n: i64) -> FieldValue {
        FieldValue::from(n)
    }

    /// a, b 為來源；sum = a + b；double = sum × 2
    fn sample_engine() -> RecalcEngine {
        let mut engine = RecalcEngine::new();
        engine.declare_source("a", Some(num(1))).unwrap();
        engine.declare_source("b", Some(num(2))).unwrap();
        engine
            .register("sum", &["a", "b"], |inputs| {
                Ok(FieldValue::Number(inputs.number("a")? + inputs.number("b")?))
            })
            .unwrap();
        engine
            .register("double", &["sum"], |inputs| {
                Ok(FieldValue::Number(inputs.number("sum")? * Decimal::from(2)))
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_register_computes_immediately() {
        let engine = sample_engine();
        assert_eq!(engine.get_value("sum"), Some(&num(3)));
        assert_eq!(engine.get_value("double"), Some(&num(6)));
        assert_eq!(engine.kind("sum"), Some(FieldKind::Derived));
        assert_eq!(engine.state("double"), Some(FieldState::Clean));
    }

    #[test]
    fn test_set_value_propagates() {
        let mut engine = sample_engine();
        let report = engine.set_value("a", num(10)).unwrap();

        assert_eq!(engine.get_value("double"), Some(&num(24)));
        assert_eq!(report.changed, vec!["a", "sum", "double"]);
        assert_eq!(report.recomputed, 2);
    }

    #[test]
    fn test_set_derived_field_rejected() {
        let mut engine = sample_engine();
        assert_eq!(
            engine.set_value("sum", num(99)),
            Err(QuoteError::NotASourceField("sum".to_string()))
        );
    }

    #[test]
    fn test_cycle_registration_rejected() {
        let mut engine = sample_engine();
        let result = engine.register("a", &["double"], |_| Ok(FieldValue::from(0)));
        assert!(matches!(result, Err(QuoteError::CyclicDependency { .. })));

        // 失敗後原本的圖仍可正常運作
        engine.set_value("b", num(5)).unwrap();
        assert_eq!(engine.get_value("double"), Some(&num(12)));
    }

    #[test]
    fn test_diamond_computes_each_field_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = RecalcEngine::new();
        engine.declare_source("root", Some(num(1))).unwrap();

        for (id, deps) in [
            ("left", vec!["root"]),
            ("right", vec!["root"]),
            ("join", vec!["left", "right"]),
        ] {
            let log = Rc::clone(&calls);
            let name = id.to_string();
            engine
                .register(id, &deps, move |inputs| {
                    log.borrow_mut().push(name.clone());
                    inputs.sum_numbers().map(FieldValue::Number)
                })
                .unwrap();
        }

        calls.borrow_mut().clear();
        engine.set_value("root", num(5)).unwrap();

        assert_eq!(*calls.borrow(), vec!["left", "right", "join"]);
        assert_eq!(engine.get_value("join"), Some(&num(10)));
    }

    #[test]
    fn test_failure_cascades_and_is_recorded() {
        let mut engine = sample_engine();
        engine
            .register("ratio", &["a", "b"], |inputs| {
                let b = inputs.number("b")?;
                if b.is_zero() {
                    return Err(QuoteError::InsufficientLayoutData {
                        layout_count: 0,
                        multiplier: 1,
                    });
                }
                Ok(FieldValue::Number(inputs.number("a")? / b))
            })
            .unwrap();
        engine
            .register("ratio_plus_sum", &["ratio", "sum"], |inputs| {
                inputs.sum_numbers().map(FieldValue::Number)
            })
            .unwrap();
        assert!(engine.get_value("ratio_plus_sum").is_some());

        let report = engine.set_value("b", num(0)).unwrap();

        // 失敗欄位與其下游都不可用，其他欄位仍正常重算
        assert_eq!(engine.get_value("ratio"), None);
        assert_eq!(engine.get_value("ratio_plus_sum"), None);
        assert_eq!(engine.get_value("sum"), Some(&num(1)));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].field, "ratio");
        assert_eq!(engine.last_failures(), report.failures.as_slice());
        assert!(matches!(
            report.failures[0].to_error(),
            QuoteError::StageComputeFailure { ref field, .. } if field == "ratio"
        ));
        assert!(report.changed("ratio_plus_sum"));

        // 修正輸入後恢復
        let report = engine.set_value("b", num(4)).unwrap();
        assert!(!report.has_failures());
        assert!(engine.get_value("ratio_plus_sum").is_some());
    }

    #[test]
    fn test_overflow_recorded_without_aborting_pass() {
        let mut engine = RecalcEngine::new();
        engine.set_value("a", num(1)).unwrap();
        engine.set_value("b", num(2)).unwrap();
        engine
            .register("sum", &["a", "b"], |inputs| {
                inputs.sum_numbers().map(FieldValue::Number)
            })
            .unwrap();
        engine
            .register("label", &["b"], |inputs| {
                Ok(FieldValue::Text(inputs.number("b")?.to_string()))
            })
            .unwrap();

        let report = engine
            .set_value("a", FieldValue::Number(Decimal::MAX))
            .unwrap();

        assert_eq!(engine.get_value("sum"), None);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].field, "sum");
        for id in engine.field_ids() {
            assert_eq!(engine.state(&id), Some(FieldState::Clean));
        }

        engine.set_value("b", num(3)).unwrap();
        assert_eq!(engine.get_value("label"), Some(&FieldValue::from("3")));
    }

    #[test]
    fn test_unset_source_makes_dependents_unavailable() {
        let mut engine = sample_engine();
        engine.clear_value("a").unwrap();
        assert_eq!(engine.get_value("sum"), None);
        assert_eq!(engine.get_value("double"), None);
        assert!(engine.last_failures().is_empty());
    }

    #[test]
    fn test_one_notification_per_set_value() {
        let mut engine = sample_engine();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let id = engine.subscribe(move |note| sink.borrow_mut().push(note.clone()));

        engine.set_value("a", num(2)).unwrap();
        engine.set_value("a", num(2)).unwrap();

        {
            let notes = received.borrow();
            assert_eq!(notes.len(), 2);
            assert_eq!(notes[0].changed_field_ids, vec!["a", "sum", "double"]);
            // 值沒變時仍會通知，但沒有變動欄位
            assert!(notes[1].changed_field_ids.is_empty());
        }

        assert!(engine.unsubscribe(id));
        engine.set_value("a", num(3)).unwrap();
        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn test_rewire_changes_dependency_set() {
        let mut engine = sample_engine();
        engine.declare_source("c", Some(num(100))).unwrap();

        engine
            .register("sum", &["a", "c"], |inputs| inputs.sum_numbers().map(FieldValue::Number))
            .unwrap();

        assert_eq!(engine.get_value("sum"), Some(&num(101)));
        assert_eq!(engine.get_value("double"), Some(&num(202)));
        assert!(engine.dependents_of("b").unwrap().is_empty());
        assert_eq!(engine.dependencies_of("sum").unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_stale_fetch_discarded() {
        let mut engine = sample_engine();
        let slow = engine.begin_fetch("a").unwrap();
        let fast = engine.begin_fetch("a").unwrap();

        let outcome = engine.complete_fetch(&fast, num(7)).unwrap();
        assert!(matches!(outcome, FetchOutcome::Applied(_)));

        let outcome = engine.complete_fetch(&slow, num(1000)).unwrap();
        assert_eq!(outcome, FetchOutcome::Superseded { latest: 2 });
        assert_eq!(engine.get_value("a"), Some(&num(7)));
        assert_eq!(engine.get_value("sum"), Some(&num(9)));
    }

    #[test]
    fn test_fetch_for_derived_field_rejected() {
        let mut engine = sample_engine();
        assert!(engine.begin_fetch("sum").is_err());
    }

    #[test]
    fn test_snapshot_restore_single_notification() {
        let mut engine = sample_engine();
        engine.set_value("a", num(40)).unwrap();
        let snapshot = engine.snapshot_sources();
        assert_eq!(snapshot.values.len(), 2);

        let mut restored = sample_engine();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        restored.subscribe(move |_| *counter.borrow_mut() += 1);

        let report = restored.restore(&snapshot).unwrap();
        assert_eq!(*count.borrow(), 1);
        assert!(report.changed("a"));
        assert_eq!(restored.get_value("double"), Some(&num(84)));

        // 重複還原是安全的
        let report = restored.restore(&snapshot).unwrap();
        assert!(report.changed.is_empty());
    }

    #[test]
    fn test_restore_rejects_derived_values() {
        let mut engine = sample_engine();
        let mut values = BTreeMap::new();
        values.insert("sum".to_string(), Some(num(1)));
        let snapshot = SourceSnapshot::new(values);

        assert!(matches!(
            engine.restore(&snapshot),
            Err(QuoteError::NotASourceField(_))
        ));
        assert_eq!(engine.get_value("sum"), Some(&num(3)));
    }

    #[test]
    fn test_snapshot_serializes() {
        let engine = sample_engine();
        let snapshot = engine.snapshot_sources();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SourceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
