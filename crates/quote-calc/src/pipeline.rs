//! 成本彙總管線
//!
//! 把各階段成本登錄為重算引擎的衍生欄位：
//! 版面尺寸 → 拼版 → 用紙張數 → 各階段小計 → 總計。

use quote_core::{
    CostStage, FieldValue, LayoutResult, QuoteConfig, QuoteError, Rectangle, Result, StageCost,
};
use quote_graph::{ComputeInputs, PassReport, RecalcEngine};
use quote_optimizer::{LayoutOptimizer, SheetClassifier};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::rc::Rc;

use crate::fields::*;
use crate::runs::RunCalculator;
use crate::sheets::SheetRequirementCalculator;

/// 成本彙總管線
pub struct CostPipeline;

impl CostPipeline {
    /// 宣告來源欄位並登錄所有衍生欄位
    pub fn install(engine: &mut RecalcEngine, config: &QuoteConfig) -> Result<()> {
        Self::declare_sources(engine)?;
        Self::install_layout(engine, config)?;
        Self::install_stock(engine)?;
        Self::install_plate(engine)?;
        Self::install_press(engine, config)?;
        Self::install_finishing(engine)?;
        Self::wire_grand_total(engine, &config.enabled_stages)?;

        tracing::info!("成本管線登錄完成，共 {} 個欄位", engine.field_ids().len());
        Ok(())
    }

    fn declare_sources(engine: &mut RecalcEngine) -> Result<()> {
        let zero = || Some(FieldValue::Number(Decimal::ZERO));
        let empty = || Some(FieldValue::Text(String::new()));

        for id in SOURCE_FIELDS {
            let initial = match id {
                JOB_COLORS_FRONT => Some(FieldValue::from(4)),
                JOB_COLORS_BACK | STOCK_TRANSPORT | PRESS_SETUP | PLATE_SURCHARGE
                | FINISHING_UNIT_PRICE | FINISHING_SURCHARGE => zero(),
                STOCK_CLASS | PRESS_CLASS => empty(),
                _ => None,
            };
            engine.declare_source(id, initial)?;
        }
        Ok(())
    }

    fn install_layout(engine: &mut RecalcEngine, config: &QuoteConfig) -> Result<()> {
        let classifier = SheetClassifier::new(config.classification.clone());
        let optimizer = LayoutOptimizer::new(classifier.clone());

        let area_inputs = [
            STOCK_WIDTH,
            STOCK_HEIGHT,
            STOCK_CLASS,
            PRESS_WIDTH,
            PRESS_HEIGHT,
            PRESS_CLASS,
        ];

        // 寬、高兩欄共用同一次可用版面計算
        let area = Rc::new(UsableArea {
            classifier,
            memo: Memo::new(),
        });
        let a = Rc::clone(&area);
        engine.register(LAYOUT_USABLE_WIDTH, &area_inputs, move |inputs| {
            a.resolve(inputs).map(|r| FieldValue::Number(r.width))
        })?;
        let a = area;
        engine.register(LAYOUT_USABLE_HEIGHT, &area_inputs, move |inputs| {
            a.resolve(inputs).map(|r| FieldValue::Number(r.height))
        })?;

        let layout_inputs = [
            LAYOUT_USABLE_WIDTH,
            LAYOUT_USABLE_HEIGHT,
            DESIGN_WIDTH,
            DESIGN_HEIGHT,
        ];

        // 數量、方向、紙張標籤三欄共用同一次拼版
        let montage = Rc::new(Montage {
            optimizer,
            memo: Memo::new(),
        });
        let m = Rc::clone(&montage);
        engine.register(LAYOUT_COUNT, &layout_inputs, move |inputs| {
            m.resolve(inputs).map(|l| FieldValue::Number(Decimal::from(l.count)))
        })?;
        let m = Rc::clone(&montage);
        engine.register(LAYOUT_ROTATED, &layout_inputs, move |inputs| {
            m.resolve(inputs).map(|l| FieldValue::Flag(l.orientation_rotated))
        })?;
        let m = montage;
        engine.register(LAYOUT_SHEET_LABEL, &layout_inputs, move |inputs| {
            m.resolve(inputs).map(|l| FieldValue::Text(l.sheet_label))
        })?;

        engine.register(LAYOUT_SUMMARY, &[LAYOUT_COUNT, LAYOUT_SHEET_LABEL], |inputs| {
            Ok(FieldValue::Text(format!(
                "{} / {}",
                whole(inputs, LAYOUT_COUNT)?,
                inputs.text(LAYOUT_SHEET_LABEL)?
            )))
        })?;

        Ok(())
    }

    fn install_stock(engine: &mut RecalcEngine) -> Result<()> {
        engine.register(STOCK_SHEET_MULTIPLIER, &[LAYOUT_SHEET_LABEL], |inputs| {
            let multiplier =
                SheetRequirementCalculator::sheet_multiplier(inputs.text(LAYOUT_SHEET_LABEL)?);
            Ok(FieldValue::Number(Decimal::from(multiplier)))
        })?;

        engine.register(
            STOCK_REQUIRED_SHEETS,
            &[JOB_COPIES, LAYOUT_COUNT, STOCK_SHEET_MULTIPLIER],
            |inputs| {
                let sheets = SheetRequirementCalculator::required_sheets(
                    whole(inputs, JOB_COPIES)?,
                    whole(inputs, LAYOUT_COUNT)?,
                    whole(inputs, STOCK_SHEET_MULTIPLIER)?,
                )?;
                Ok(FieldValue::Number(Decimal::from(sheets)))
            },
        )?;

        engine.register(
            STOCK_TOTAL,
            &[STOCK_UNIT_PRICE, STOCK_REQUIRED_SHEETS, STOCK_TRANSPORT],
            |inputs| stage_total(inputs, STOCK_UNIT_PRICE, STOCK_REQUIRED_SHEETS, STOCK_TRANSPORT),
        )?;

        Ok(())
    }

    fn install_plate(engine: &mut RecalcEngine) -> Result<()> {
        engine.register(PLATE_COUNT, &[JOB_COLORS_FRONT, JOB_COLORS_BACK], |inputs| {
            let plates = whole(inputs, JOB_COLORS_FRONT)?
                .checked_add(whole(inputs, JOB_COLORS_BACK)?)
                .ok_or_else(|| overflow(inputs))?;
            Ok(FieldValue::Number(Decimal::from(plates)))
        })?;

        engine.register(
            PLATE_TOTAL,
            &[PLATE_UNIT_PRICE, PLATE_COUNT, PLATE_SURCHARGE],
            |inputs| stage_total(inputs, PLATE_UNIT_PRICE, PLATE_COUNT, PLATE_SURCHARGE),
        )?;

        Ok(())
    }

    fn install_press(engine: &mut RecalcEngine, config: &QuoteConfig) -> Result<()> {
        engine.register(PRESS_IMPRESSIONS, &[JOB_COPIES, LAYOUT_COUNT], |inputs| {
            let impressions = SheetRequirementCalculator::impressions(
                whole(inputs, JOB_COPIES)?,
                whole(inputs, LAYOUT_COUNT)?,
            )?;
            Ok(FieldValue::Number(Decimal::from(impressions)))
        })?;

        // 趟數以份數分段，與拼版數無關
        let policy = config.run_policy;
        engine.register(PRESS_RUN_UNITS, &[JOB_COPIES], move |inputs| {
            let copies = whole(inputs, JOB_COPIES)?.max(0) as u64;
            let runs = RunCalculator::run_units(copies, &policy);
            Ok(FieldValue::Number(Decimal::from(runs)))
        })?;

        engine.register(PRESS_QUANTITY, &[PRESS_RUN_UNITS, PLATE_COUNT], |inputs| {
            inputs
                .number(PRESS_RUN_UNITS)?
                .checked_mul(inputs.number(PLATE_COUNT)?)
                .map(FieldValue::Number)
                .ok_or_else(|| overflow(inputs))
        })?;

        engine.register(
            PRESS_TOTAL,
            &[PRESS_UNIT_PRICE, PRESS_QUANTITY, PRESS_SETUP],
            |inputs| stage_total(inputs, PRESS_UNIT_PRICE, PRESS_QUANTITY, PRESS_SETUP),
        )?;

        Ok(())
    }

    fn install_finishing(engine: &mut RecalcEngine) -> Result<()> {
        engine.register(
            FINISHING_TOTAL,
            &[FINISHING_UNIT_PRICE, JOB_COPIES, FINISHING_SURCHARGE],
            |inputs| stage_total(inputs, FINISHING_UNIT_PRICE, JOB_COPIES, FINISHING_SURCHARGE),
        )?;
        Ok(())
    }

    /// 重新接線總計欄位：相依集合恰好是啟用中的階段小計
    pub fn wire_grand_total(engine: &mut RecalcEngine, enabled: &[CostStage]) -> Result<PassReport> {
        let mut stages = enabled.to_vec();
        stages.sort();
        stages.dedup();

        let totals: Vec<&str> = stages.iter().map(|s| s.total_field()).collect();
        engine.register(GRAND_TOTAL, &totals, |inputs| {
            inputs.sum_numbers().map(FieldValue::Number)
        })
    }
}

/// 取得整數輸入
fn whole(inputs: &ComputeInputs<'_>, id: &str) -> Result<i64> {
    let value = inputs.number(id)?;
    if !value.fract().is_zero() {
        return Err(QuoteError::TypeMismatch {
            field: id.to_string(),
            expected: "whole number".to_string(),
        });
    }
    value.to_i64().ok_or_else(|| QuoteError::TypeMismatch {
        field: id.to_string(),
        expected: "whole number".to_string(),
    })
}

fn rect(inputs: &ComputeInputs<'_>, width: &str, height: &str) -> Result<Rectangle> {
    Rectangle::new(inputs.number(width)?, inputs.number(height)?)
}

fn overflow(inputs: &ComputeInputs<'_>) -> QuoteError {
    QuoteError::StageComputeFailure {
        field: inputs.field().to_string(),
        message: "數值超出範圍".to_string(),
    }
}

/// 只記住最近一組輸入的計算結果
///
/// 同一輪內多個欄位讀相同輸入時，只算一次。
struct Memo<K, V> {
    last: RefCell<Option<(K, V)>>,
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    fn new() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }

    fn get_or_try(&self, key: K, compute: impl FnOnce(&K) -> Result<V>) -> Result<V> {
        if let Some((k, v)) = self.last.borrow().as_ref() {
            if *k == key {
                return Ok(v.clone());
            }
        }
        let value = compute(&key)?;
        *self.last.borrow_mut() = Some((key, value.clone()));
        Ok(value)
    }
}

type AreaKey = (Rectangle, Rectangle, String, String);

struct UsableArea {
    classifier: SheetClassifier,
    memo: Memo<AreaKey, Rectangle>,
}

impl UsableArea {
    fn resolve(&self, inputs: &ComputeInputs<'_>) -> Result<Rectangle> {
        let key = (
            rect(inputs, STOCK_WIDTH, STOCK_HEIGHT)?,
            rect(inputs, PRESS_WIDTH, PRESS_HEIGHT)?,
            inputs.text(STOCK_CLASS)?.to_string(),
            inputs.text(PRESS_CLASS)?.to_string(),
        );
        self.memo.get_or_try(key, |(stock, press, stock_class, press_class)| {
            self.classifier
                .resolve_usable_area(stock, press, stock_class, press_class)
        })
    }
}

struct Montage {
    optimizer: LayoutOptimizer,
    memo: Memo<(Rectangle, Rectangle), LayoutResult>,
}

impl Montage {
    fn resolve(&self, inputs: &ComputeInputs<'_>) -> Result<LayoutResult> {
        let key = (
            rect(inputs, LAYOUT_USABLE_WIDTH, LAYOUT_USABLE_HEIGHT)?,
            rect(inputs, DESIGN_WIDTH, DESIGN_HEIGHT)?,
        );
        self.memo
            .get_or_try(key, |(usable, design)| self.optimizer.compute_layout(usable, design))
    }
}

fn stage_total(
    inputs: &ComputeInputs<'_>,
    unit_price: &str,
    quantity: &str,
    surcharge: &str,
) -> Result<FieldValue> {
    let cost = StageCost::new(inputs.number(unit_price)?, inputs.number(quantity)?)
        .with_surcharge(inputs.number(surcharge)?);
    cost.total()
        .map(FieldValue::Number)
        .ok_or_else(|| QuoteError::StageComputeFailure {
            field: inputs.field().to_string(),
            message: "金額超出數值範圍".to_string(),
        })
}
