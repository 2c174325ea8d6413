//! 外部型錄服務介面

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::geometry::Rectangle;
use crate::{QuoteError, Result};

/// 型錄服務：依鍵值查詢尺寸與單價
///
/// 傳輸方式由實作者決定；查詢結果經由 `set_value` 回寫表單。
pub trait Catalog {
    /// 查詢尺寸（紙張、印刷機、成品規格）
    fn fetch_dimensions(&self, key: &str) -> Result<Rectangle>;

    /// 查詢單價
    fn fetch_unit_price(&self, key: &str) -> Result<Decimal>;
}

/// 記憶體內的靜態型錄
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    dimensions: HashMap<String, Rectangle>,
    prices: HashMap<String, Decimal>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加尺寸
    pub fn with_dimensions(mut self, key: impl Into<String>, rect: Rectangle) -> Self {
        self.dimensions.insert(key.into(), rect);
        self
    }

    /// 建構器模式：添加單價
    pub fn with_price(mut self, key: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(key.into(), price);
        self
    }
}

impl Catalog for StaticCatalog {
    fn fetch_dimensions(&self, key: &str) -> Result<Rectangle> {
        self.dimensions
            .get(key)
            .copied()
            .ok_or_else(|| QuoteError::Catalog(format!("找不到尺寸: {}", key)))
    }

    fn fetch_unit_price(&self, key: &str) -> Result<Decimal> {
        self.prices
            .get(key)
            .copied()
            .ok_or_else(|| QuoteError::Catalog(format!("找不到單價: {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_lookup() {
        let catalog = StaticCatalog::new()
            .with_dimensions("A4", Rectangle::new(Decimal::from(21), Decimal::new(297, 1)).unwrap())
            .with_price("coated-135", Decimal::new(185, 1));

        assert_eq!(catalog.fetch_dimensions("A4").unwrap().width, Decimal::from(21));
        assert_eq!(catalog.fetch_unit_price("coated-135").unwrap(), Decimal::new(185, 1));
        assert!(matches!(catalog.fetch_dimensions("A3"), Err(QuoteError::Catalog(_))));
    }
}
