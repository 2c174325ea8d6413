//! 矩形幾何模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{QuoteError, Result};

/// 矩形（紙張、印刷機版面、設計稿）
///
/// 寬高使用同一單位。比較尺寸時不區分方向，只看兩條邊長。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: Decimal,
    pub height: Decimal,
}

impl Rectangle {
    /// 創建矩形，非正數尺寸回傳 `InvalidGeometry`
    pub fn new(width: Decimal, height: Decimal) -> Result<Self> {
        let rect = Self { width, height };
        rect.validate()?;
        Ok(rect)
    }

    /// 以整數尺寸創建矩形
    pub fn from_dims(width: i64, height: i64) -> Result<Self> {
        Self::new(Decimal::from(width), Decimal::from(height))
    }

    /// 檢查尺寸是否為正數
    pub fn validate(&self) -> Result<()> {
        if self.width <= Decimal::ZERO || self.height <= Decimal::ZERO {
            return Err(QuoteError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// 面積；超出數值範圍時回傳 `None`
    pub fn area(&self) -> Option<Decimal> {
        self.width.checked_mul(self.height)
    }

    /// 短邊
    pub fn short_side(&self) -> Decimal {
        self.width.min(self.height)
    }

    /// 長邊
    pub fn long_side(&self) -> Decimal {
        self.width.max(self.height)
    }

    /// 旋轉 90 度（交換寬高）
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// 是否為直向（高 >= 寬）
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }

    /// 轉成與 `other` 相同的方向
    pub fn aligned_to(&self, other: &Rectangle) -> Self {
        if self.is_portrait() == other.is_portrait() {
            *self
        } else {
            self.rotated()
        }
    }

    /// 兩個矩形（方向對齊後）的交集：取兩者的最小寬與最小高
    pub fn intersect(&self, other: &Rectangle) -> Self {
        let other = other.aligned_to(self);
        Self {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width.normalize(), self.height.normalize())
    }
}
