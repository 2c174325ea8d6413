//! 紙張類別表

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geometry::Rectangle;

/// 紙張類別（相對於整張全開紙的比例）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    /// 全開
    Full,
    /// 對開
    Half,
    /// 四開
    Quarter,
    /// 八開
    Eighth,
}

impl SheetKind {
    /// 依判斷優先順序排列；較長的關鍵字先比對
    const ALL: [SheetKind; 4] = [
        SheetKind::Quarter,
        SheetKind::Eighth,
        SheetKind::Half,
        SheetKind::Full,
    ];

    /// 標籤關鍵字
    pub fn keyword(&self) -> &'static str {
        match self {
            SheetKind::Full => "full",
            SheetKind::Half => "half",
            SheetKind::Quarter => "quarter",
            SheetKind::Eighth => "eighth",
        }
    }

    /// 一張全開紙可裁成幾張此類別的紙
    pub fn multiplier(&self) -> u32 {
        match self {
            SheetKind::Full => 1,
            SheetKind::Half => 2,
            SheetKind::Quarter => 4,
            SheetKind::Eighth => 8,
        }
    }

    /// 從自由文字標籤辨識類別（不分大小寫，包含關鍵字即可）
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| lower.contains(kind.keyword()))
    }
}

/// 面積門檻
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetThreshold {
    /// 面積上限（含）
    pub max_area: Decimal,
    /// 類別標籤
    pub label: String,
}

impl SheetThreshold {
    pub fn new(max_area: Decimal, label: impl Into<String>) -> Self {
        Self {
            max_area,
            label: label.into(),
        }
    }
}

/// 特例覆寫：特定的（紙張類別, 印刷機類別）組合使用固定的可用面積
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOverride {
    pub container_class: String,
    pub piece_class: String,
    pub usable: Rectangle,
}

impl AreaOverride {
    pub fn new(
        container_class: impl Into<String>,
        piece_class: impl Into<String>,
        usable: Rectangle,
    ) -> Self {
        Self {
            container_class: container_class.into(),
            piece_class: piece_class.into(),
            usable,
        }
    }

    /// 是否完全符合給定的類別組合
    pub fn matches(&self, container_class: &str, piece_class: &str) -> bool {
        self.container_class == container_class && self.piece_class == piece_class
    }
}

/// 紙張類別表
///
/// 門檻依 `max_area` 由小到大比對，第一個符合者勝出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetClassificationTable {
    thresholds: Vec<SheetThreshold>,

    #[serde(default)]
    overrides: Vec<AreaOverride>,
}

impl SheetClassificationTable {
    /// 創建類別表（門檻會被排序）
    pub fn new(thresholds: Vec<SheetThreshold>) -> Self {
        let mut table = Self {
            thresholds,
            overrides: Vec::new(),
        };
        table.normalize();
        table
    }

    /// 建構器模式：添加覆寫規則
    pub fn with_override(mut self, rule: AreaOverride) -> Self {
        self.overrides.push(rule);
        self
    }

    /// 建構器模式：添加門檻
    pub fn with_threshold(mut self, threshold: SheetThreshold) -> Self {
        self.thresholds.push(threshold);
        self.normalize();
        self
    }

    /// 依面積排序門檻（反序列化後必須呼叫）
    pub fn normalize(&mut self) {
        self.thresholds.sort_by(|a, b| a.max_area.cmp(&b.max_area));
    }

    /// 已排序的門檻
    pub fn thresholds(&self) -> &[SheetThreshold] {
        &self.thresholds
    }

    /// 覆寫規則
    pub fn overrides(&self) -> &[AreaOverride] {
        &self.overrides
    }

    /// 查找完全符合的覆寫規則
    pub fn find_override(&self, container_class: &str, piece_class: &str) -> Option<&AreaOverride> {
        self.overrides
            .iter()
            .find(|rule| rule.matches(container_class, piece_class))
    }
}

impl Default for SheetClassificationTable {
    /// 公制全開 70x100 系列（cm²）
    fn default() -> Self {
        Self::new(vec![
            SheetThreshold::new(Decimal::from(875), SheetKind::Eighth.keyword()),
            SheetThreshold::new(Decimal::from(1750), SheetKind::Quarter.keyword()),
            SheetThreshold::new(Decimal::from(3500), SheetKind::Half.keyword()),
            SheetThreshold::new(Decimal::from(7000), SheetKind::Full.keyword()),
        ])
    }
}
