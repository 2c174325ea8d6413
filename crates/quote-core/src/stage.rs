//! 成本階段模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 報價的成本階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStage {
    /// 紙張
    Stock,
    /// 印版
    Plate,
    /// 印刷（上機）
    Press,
    /// 後加工
    Finishing,
}

impl CostStage {
    /// 所有階段（固定順序）
    pub const ALL: [CostStage; 4] = [
        CostStage::Stock,
        CostStage::Plate,
        CostStage::Press,
        CostStage::Finishing,
    ];

    /// 欄位前綴
    pub fn key(&self) -> &'static str {
        match self {
            CostStage::Stock => "stock",
            CostStage::Plate => "plate",
            CostStage::Press => "press",
            CostStage::Finishing => "finishing",
        }
    }

    /// 階段小計的欄位ID
    pub fn total_field(&self) -> &'static str {
        match self {
            CostStage::Stock => "stock.total",
            CostStage::Plate => "plate.total",
            CostStage::Press => "press.total",
            CostStage::Finishing => "finishing.total",
        }
    }
}

impl fmt::Display for CostStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 單一階段的成本輸入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCost {
    /// 單價
    pub unit_price: Decimal,
    /// 數量
    pub quantity: Decimal,
    /// 附加費（運費、開機費）
    pub surcharge: Decimal,
}

impl StageCost {
    pub fn new(unit_price: Decimal, quantity: Decimal) -> Self {
        Self {
            unit_price,
            quantity,
            surcharge: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置附加費
    pub fn with_surcharge(mut self, surcharge: Decimal) -> Self {
        self.surcharge = surcharge;
        self
    }

    /// 小計 = 單價 × 數量 + 附加費；超出數值範圍時回傳 `None`
    pub fn total(&self) -> Option<Decimal> {
        self.unit_price
            .checked_mul(self.quantity)?
            .checked_add(self.surcharge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_total() {
        let cost = StageCost::new(Decimal::new(125, 1), Decimal::from(625))
            .with_surcharge(Decimal::from(300));

        // 12.5 × 625 + 300
        assert_eq!(cost.total(), Some(Decimal::new(81125, 1)));
    }

    #[test]
    fn test_stage_total_overflow() {
        let cost = StageCost::new(Decimal::MAX, Decimal::TWO);
        assert_eq!(cost.total(), None);

        let cost = StageCost::new(Decimal::ONE, Decimal::MAX).with_surcharge(Decimal::ONE);
        assert_eq!(cost.total(), None);
    }

    #[test]
    fn test_total_fields_are_distinct() {
        for stage in CostStage::ALL {
            assert!(stage.total_field().starts_with(stage.key()));
        }
    }
}
