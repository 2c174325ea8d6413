//! 報價表單（單一表單期間的入口）

use quote_core::{Catalog, CostStage, FieldValue, LayoutResult, QuoteConfig, Result};
use quote_graph::{
    FetchOutcome, FetchTicket, PassNotification, PassReport, RecalcEngine, SourceSnapshot,
    SubscriptionId,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::fields;
use crate::pipeline::CostPipeline;
use crate::{QuoteBreakdown, QuoteWarning, StageLine};

/// 報價表單快照（來源欄位 + 啟用的階段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub sources: SourceSnapshot,
    pub enabled_stages: Vec<CostStage>,
}

/// 報價表單
///
/// 擁有重算引擎；所有輸入（使用者輸入或型錄回填）都經由 `set_value`。
#[derive(Debug)]
pub struct QuoteForm {
    engine: RecalcEngine,
    config: QuoteConfig,
    enabled: BTreeSet<CostStage>,
}

impl QuoteForm {
    /// 創建新的報價表單
    pub fn new(config: QuoteConfig) -> Result<Self> {
        config.validate()?;

        let mut engine = RecalcEngine::new();
        CostPipeline::install(&mut engine, &config)?;
        let enabled = config.enabled_stages.iter().copied().collect();

        Ok(Self {
            engine,
            config,
            enabled,
        })
    }

    /// 配置引用
    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// 重算引擎引用
    pub fn engine(&self) -> &RecalcEngine {
        &self.engine
    }

    /// 寫入來源欄位
    pub fn set_value(&mut self, id: &str, value: FieldValue) -> Result<PassReport> {
        self.engine.set_value(id, value)
    }

    /// 寫入數值
    pub fn set_number(&mut self, id: &str, value: impl Into<Decimal>) -> Result<PassReport> {
        self.set_value(id, FieldValue::Number(value.into()))
    }

    /// 寫入字串
    pub fn set_text(&mut self, id: &str, value: &str) -> Result<PassReport> {
        self.set_value(id, FieldValue::from(value))
    }

    /// 清空來源欄位
    pub fn clear_value(&mut self, id: &str) -> Result<PassReport> {
        self.engine.clear_value(id)
    }

    /// 讀取欄位值
    pub fn get_value(&self, id: &str) -> Option<&FieldValue> {
        self.engine.get_value(id)
    }

    /// 讀取數值欄位
    pub fn number(&self, id: &str) -> Option<Decimal> {
        self.get_value(id).and_then(|v| v.as_number())
    }

    /// 顯示用字串（不可用時為空白）
    pub fn display(&self, id: &str) -> String {
        FieldValue::display(self.get_value(id))
    }

    /// 啟用或停用成本階段
    ///
    /// 停用的階段直接從總計的相依集合移除，總計立即重算。
    pub fn set_stage_enabled(&mut self, stage: CostStage, enabled: bool) -> Result<PassReport> {
        if enabled {
            self.enabled.insert(stage);
        } else {
            self.enabled.remove(&stage);
        }
        tracing::info!("階段 {} {}", stage, if enabled { "啟用" } else { "停用" });

        let stages: Vec<CostStage> = self.enabled.iter().copied().collect();
        CostPipeline::wire_grand_total(&mut self.engine, &stages)
    }

    /// 啟用中的階段
    pub fn enabled_stages(&self) -> Vec<CostStage> {
        self.enabled.iter().copied().collect()
    }

    /// 階段是否啟用
    pub fn is_stage_enabled(&self, stage: CostStage) -> bool {
        self.enabled.contains(&stage)
    }

    /// 訂閱重算完成通知
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PassNotification) + 'static,
    {
        self.engine.subscribe(listener)
    }

    /// 取消訂閱
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.engine.unsubscribe(id)
    }

    /// 發出非同步查詢的請求憑證
    pub fn begin_fetch(&mut self, id: &str) -> Result<FetchTicket> {
        self.engine.begin_fetch(id)
    }

    /// 套用非同步查詢的回應
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, value: FieldValue) -> Result<FetchOutcome> {
        self.engine.complete_fetch(ticket, value)
    }

    /// 從型錄查詢尺寸並寫入寬高欄位
    ///
    /// 寬、高各經一次 `set_value`，因此會跑兩輪重算並發出兩次通知。
    /// 第一輪看到的是新寬度配舊高度；回傳的報告合併兩輪的變動欄位，
    /// 失敗清單以第二輪為準。
    pub fn apply_catalog_dimensions(
        &mut self,
        catalog: &dyn Catalog,
        key: &str,
        width_field: &str,
        height_field: &str,
    ) -> Result<PassReport> {
        let rect = catalog.fetch_dimensions(key)?;
        let mut report = self.set_number(width_field, rect.width)?;
        let second = self.set_number(height_field, rect.height)?;

        report.changed.extend(second.changed);
        report.failures = second.failures;
        report.recomputed += second.recomputed;
        Ok(report)
    }

    /// 從型錄查詢單價並寫入欄位
    pub fn apply_catalog_price(&mut self, catalog: &dyn Catalog, key: &str, field: &str) -> Result<PassReport> {
        let price = catalog.fetch_unit_price(key)?;
        self.set_number(field, price)
    }

    /// 目前的拼版結果
    pub fn layout(&self) -> Option<LayoutResult> {
        let count = self.number(fields::LAYOUT_COUNT)?.to_u32()?;
        let rotated = self.get_value(fields::LAYOUT_ROTATED)?.as_flag()?;
        let label = self.get_value(fields::LAYOUT_SHEET_LABEL)?.as_text()?;
        Some(LayoutResult::new(count, rotated, label))
    }

    /// 報價明細
    pub fn breakdown(&self) -> QuoteBreakdown {
        let stages: Vec<StageLine> = CostStage::ALL
            .iter()
            .map(|&stage| StageLine {
                stage,
                enabled: self.is_stage_enabled(stage),
                total: self.number(stage.total_field()),
            })
            .collect();

        let mut breakdown = QuoteBreakdown::empty();
        breakdown.grand_total = self.number(fields::GRAND_TOTAL);
        breakdown.layout = self.layout();
        breakdown.required_sheets = self.number(fields::STOCK_REQUIRED_SHEETS);

        for failure in self.engine.last_failures() {
            breakdown.add_warning(QuoteWarning::error(
                failure.field.clone(),
                failure.to_error().to_string(),
            ));
        }

        if let Some(layout) = &breakdown.layout {
            if !layout.fits() {
                breakdown.add_warning(QuoteWarning::warning(
                    fields::LAYOUT_COUNT.to_string(),
                    "設計稿大於可用版面".to_string(),
                ));
            }
        }

        for line in stages.iter().filter(|l| l.enabled && l.total.is_none()) {
            breakdown.add_warning(QuoteWarning::info(
                line.stage.total_field().to_string(),
                "輸入尚未完整".to_string(),
            ));
        }

        breakdown.stages = stages;
        breakdown
    }

    /// 擷取表單快照
    pub fn snapshot(&self) -> QuoteSnapshot {
        QuoteSnapshot {
            sources: self.engine.snapshot_sources(),
            enabled_stages: self.enabled_stages(),
        }
    }

    /// 從快照還原表單
    pub fn restore(&mut self, snapshot: &QuoteSnapshot) -> Result<PassReport> {
        self.enabled = snapshot.enabled_stages.iter().copied().collect();
        let stages = self.enabled_stages();
        CostPipeline::wire_grand_total(&mut self.engine, &stages)?;
        self.engine.restore(&snapshot.sources)
    }
}
