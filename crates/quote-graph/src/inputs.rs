//! 衍生欄位的計算輸入

use quote_core::{FieldValue, QuoteError, Result};
use rust_decimal::Decimal;

/// 傳給計算函數的輸入值
///
/// 只包含該欄位登錄的相依欄位，且全部可用。
#[derive(Debug)]
pub struct ComputeInputs<'a> {
    field: &'a str,
    values: Vec<(&'a str, &'a FieldValue)>,
}

impl<'a> ComputeInputs<'a> {
    pub fn new(field: &'a str, values: Vec<(&'a str, &'a FieldValue)>) -> Self {
        Self { field, values }
    }

    /// 正在計算的欄位ID
    pub fn field(&self) -> &str {
        self.field
    }

    /// 取得輸入值；未登錄為相依的欄位回傳 `UnknownField`
    pub fn get(&self, id: &str) -> Result<&'a FieldValue> {
        self.values
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, value)| *value)
            .ok_or_else(|| QuoteError::UnknownField(id.to_string()))
    }

    /// 取得數值輸入
    pub fn number(&self, id: &str) -> Result<Decimal> {
        self.get(id)?.as_number().ok_or_else(|| QuoteError::TypeMismatch {
            field: id.to_string(),
            expected: "number".to_string(),
        })
    }

    /// 取得字串輸入
    pub fn text(&self, id: &str) -> Result<&'a str> {
        self.get(id)?.as_text().ok_or_else(|| QuoteError::TypeMismatch {
            field: id.to_string(),
            expected: "text".to_string(),
        })
    }

    /// 取得旗標輸入
    pub fn flag(&self, id: &str) -> Result<bool> {
        self.get(id)?.as_flag().ok_or_else(|| QuoteError::TypeMismatch {
            field: id.to_string(),
            expected: "flag".to_string(),
        })
    }

    /// 依登錄順序迭代所有輸入
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a FieldValue)> + '_ {
        self.values.iter().copied()
    }

    /// 所有輸入的數值總和（任一輸入非數值或總和溢位時回傳錯誤）
    pub fn sum_numbers(&self) -> Result<Decimal> {
        self.values.iter().try_fold(Decimal::ZERO, |acc, (id, value)| {
            let n = value.as_number().ok_or_else(|| QuoteError::TypeMismatch {
                field: id.to_string(),
                expected: "number".to_string(),
            })?;
            acc.checked_add(n).ok_or_else(|| QuoteError::StageComputeFailure {
                field: self.field.to_string(),
                message: format!("加總 {} 時數值溢位", id),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
