//! 紙張類別判定

use quote_core::{Rectangle, Result, SheetClassificationTable};

/// 紙張類別判定器
///
/// 所有領域特例（覆寫表）都在這裡處理；拼版計算本身只做幾何運算。
#[derive(Debug, Clone, Default)]
pub struct SheetClassifier {
    table: SheetClassificationTable,
}

impl SheetClassifier {
    /// 創建判定器
    pub fn new(table: SheetClassificationTable) -> Self {
        Self { table }
    }

    /// 類別表引用
    pub fn table(&self) -> &SheetClassificationTable {
        &self.table
    }

    /// 依面積判定類別標籤
    ///
    /// 門檻由小到大比對，第一個 `max_area >= 面積` 的門檻勝出；
    /// 全部不符（或面積超出數值範圍）時回傳帶實際尺寸的 `oversized: WxH`。
    pub fn classify(&self, rect: &Rectangle) -> String {
        rect.area()
            .and_then(|area| {
                self.table
                    .thresholds()
                    .iter()
                    .find(|threshold| threshold.max_area >= area)
            })
            .map(|threshold| threshold.label.clone())
            .unwrap_or_else(|| format!("oversized: {}", rect))
    }

    /// 計算實際可用的版面
    ///
    /// 先查覆寫表的（紙張類別, 印刷機類別）完全符合項；沒有覆寫時取
    /// `container` 與 `constraint` 的最小寬高（方向先對齊 `container`）。
    pub fn resolve_usable_area(
        &self,
        container: &Rectangle,
        constraint: &Rectangle,
        container_class: &str,
        piece_class: &str,
    ) -> Result<Rectangle> {
        container.validate()?;
        constraint.validate()?;

        if let Some(rule) = self.table.find_override(container_class, piece_class) {
            tracing::debug!(
                "覆寫可用版面: {} + {} → {}",
                container_class,
                piece_class,
                rule.usable
            );
            return Ok(rule.usable);
        }

        Ok(container.intersect(constraint))
    }
}
