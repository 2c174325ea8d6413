//! 用紙張數計算

use quote_core::{QuoteError, Result, SheetKind};
use serde::{Deserialize, Serialize};

/// 拼版摘要解析結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub count: u32,
    pub sheet_label: String,
}

impl Default for LayoutSummary {
    fn default() -> Self {
        Self {
            count: 1,
            sheet_label: SheetKind::Full.keyword().to_string(),
        }
    }
}

/// 用紙張數計算器
pub struct SheetRequirementCalculator;

impl SheetRequirementCalculator {
    /// 需採購的全開紙張數 = ceil(總份數 / (拼版數 × 紙張倍數))
    ///
    /// 拼版數或倍數 <= 0 時回傳 `InsufficientLayoutData`；總份數 <= 0 時為 0 張。
    pub fn required_sheets(total_copies: i64, layout_count: i64, sheet_multiplier: i64) -> Result<i64> {
        if layout_count <= 0 || sheet_multiplier <= 0 {
            return Err(QuoteError::InsufficientLayoutData {
                layout_count,
                multiplier: sheet_multiplier,
            });
        }
        if total_copies <= 0 {
            return Ok(0);
        }

        let per_sheet = layout_count.saturating_mul(sheet_multiplier);
        Ok(ceil_div(total_copies, per_sheet))
    }

    /// 上機印張數（印刷機版面張數）= ceil(總份數 / 拼版數)
    pub fn impressions(total_copies: i64, layout_count: i64) -> Result<i64> {
        Self::required_sheets(total_copies, layout_count, 1)
    }

    /// 依紙張標籤取得倍數（全開=1、對開=2、四開=4、八開=8，未知=1）
    pub fn sheet_multiplier(label: &str) -> u32 {
        SheetKind::from_label(label)
            .map(|kind| kind.multiplier())
            .unwrap_or(1)
    }

    /// 解析 `"<count> / <label>"` 格式的拼版摘要
    ///
    /// 摘要僅供參考，解析失敗時回傳預設值（1 / full）而不是錯誤。
    pub fn parse_layout_summary(summary: &str) -> LayoutSummary {
        match Self::try_parse_layout_summary(summary) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!("拼版摘要解析失敗，使用預設值: {}", err);
                LayoutSummary::default()
            }
        }
    }

    fn try_parse_layout_summary(summary: &str) -> Result<LayoutSummary> {
        let (count_part, label_part) = summary
            .split_once('/')
            .ok_or_else(|| QuoteError::ParseFailure(format!("缺少分隔符號: {:?}", summary)))?;

        let count: u32 = count_part
            .trim()
            .parse()
            .map_err(|_| QuoteError::ParseFailure(format!("無效的拼版數: {:?}", count_part)))?;
        if count == 0 {
            return Err(QuoteError::ParseFailure("拼版數必須為正整數".to_string()));
        }

        let label = label_part.trim();
        if label.is_empty() {
            return Err(QuoteError::ParseFailure(format!("缺少紙張標籤: {:?}", summary)));
        }

        Ok(LayoutSummary {
            count,
            sheet_label: label.to_string(),
        })
    }

    /// 從拼版摘要計算需採購的紙張數
    pub fn required_sheets_from_summary(total_copies: i64, summary: &str) -> Result<i64> {
        let parsed = Self::parse_layout_summary(summary);
        Self::required_sheets(
            total_copies,
            i64::from(parsed.count),
            i64::from(Self::sheet_multiplier(&parsed.sheet_label)),
        )
    }
}

/// 正整數的向上取整除法
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator == 0 {
        quotient
    } else {
        quotient + 1
    }
}
