//! 拼版（montage）計算

use quote_core::{LayoutResult, Rectangle, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::classifier::SheetClassifier;

/// 拼版計算器
///
/// 只做幾何運算：比較正向與旋轉兩種排法，取數量較多者。
/// 可用版面的覆寫判定必須先由 [`SheetClassifier::resolve_usable_area`] 完成。
#[derive(Debug, Clone, Default)]
pub struct LayoutOptimizer {
    classifier: SheetClassifier,
}

impl LayoutOptimizer {
    /// 創建拼版計算器
    pub fn new(classifier: SheetClassifier) -> Self {
        Self { classifier }
    }

    /// 類別判定器引用
    pub fn classifier(&self) -> &SheetClassifier {
        &self.classifier
    }

    /// 計算單張版面可拼的設計稿數量
    ///
    /// 兩種排法數量相同時採用正向（先計算、也符合操作習慣）。
    /// 放不下時回傳 count = 0，由呼叫端決定是否視為錯誤。
    pub fn compute_layout(&self, container: &Rectangle, piece: &Rectangle) -> Result<LayoutResult> {
        container.validate()?;
        piece.validate()?;

        let count_normal = fit_along(container.width, piece.width)
            .saturating_mul(fit_along(container.height, piece.height));
        let count_rotated = fit_along(container.width, piece.height)
            .saturating_mul(fit_along(container.height, piece.width));

        let rotated = count_rotated > count_normal;
        let count = count_normal.max(count_rotated);
        let count = u32::try_from(count).unwrap_or(u32::MAX);

        tracing::debug!(
            "拼版 {} 於 {}: 正向 {}，旋轉 {} → {}",
            piece,
            container,
            count_normal,
            count_rotated,
            count
        );

        Ok(LayoutResult::new(
            count,
            rotated,
            self.classifier.classify(container),
        ))
    }
}

/// 單邊可排幾個（向下取整）
fn fit_along(length: Decimal, piece: Decimal) -> u64 {
    length
        .checked_div(piece)
        .map(|ratio| ratio.floor())
        .and_then(|n| n.to_u64())
        .unwrap_or(u64::MAX)
}

/// 使用預設類別表計算拼版
pub fn compute_layout(container: &Rectangle, piece: &Rectangle) -> Result<LayoutResult> {
    LayoutOptimizer::default().compute_layout(container, piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quote_core::QuoteError;
    use rstest::rstest;

    fn rect(w: i64, h: i64) -> Rectangle {
        Rectangle::from_dims(w, h).unwrap()
    }

    #[test]
    fn test_normal_orientation_wins() {
        // 正向 2*2 = 4，旋轉 1*3 = 3
        let result = compute_layout(&rect(70, 100), &rect(33, 44)).unwrap();
        assert_eq!(result.count, 4);
        assert!(!result.orientation_rotated);
        assert_eq!(result.sheet_label, "full");
    }

    #[test]
    fn test_fits_only_rotated() {
        let result = compute_layout(&rect(35, 50), &rect(50, 35)).unwrap();
        assert_eq!(result.count, 1);
        assert!(result.orientation_rotated);
    }

    #[test]
    fn test_tie_prefers_normal() {
        // 正方形設計稿兩種排法數量必然相同
        let result = compute_layout(&rect(50, 70), &rect(20, 20)).unwrap();
        assert_eq!(result.count, 6);
        assert!(!result.orientation_rotated);
    }

    #[test]
    fn test_piece_larger_than_sheet_is_zero_not_error() {
        let result = compute_layout(&rect(35, 50), &rect(60, 80)).unwrap();
        assert_eq!(result.count, 0);
        assert!(!result.fits());
    }

    #[rstest]
    #[case(0, 10)]
    #[case(10, 0)]
    #[case(-5, 10)]
    fn test_rejects_invalid_piece(#[case] w: i64, #[case] h: i64) {
        let piece = Rectangle {
            width: Decimal::from(w),
            height: Decimal::from(h),
        };
        assert!(matches!(
            compute_layout(&rect(70, 100), &piece),
            Err(QuoteError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_fractional_dimensions() {
        // 21 x 29.7 在 50 x 70：正向 2*2 = 4，旋轉 1*3 = 3
        let a4 = Rectangle::new(Decimal::from(21), Decimal::new(297, 1)).unwrap();
        let result = compute_layout(&rect(50, 70), &a4).unwrap();
        assert_eq!(result.count, 4);
    }

    proptest! {
        #[test]
        fn prop_fitting_piece_counts_at_least_one(
            cw in 1i64..200, ch in 1i64..200, pw_frac in 1i64..=100, ph_frac in 1i64..=100
        ) {
            let container = rect(cw, ch);
            let piece = Rectangle::new(
                Decimal::from(cw) * Decimal::from(pw_frac) / Decimal::from(100),
                Decimal::from(ch) * Decimal::from(ph_frac) / Decimal::from(100),
            ).unwrap();
            let result = compute_layout(&container, &piece).unwrap();
            prop_assert!(result.count >= 1);
        }

        #[test]
        fn prop_layout_is_deterministic(
            cw in 1i64..200, ch in 1i64..200, pw in 1i64..200, ph in 1i64..200
        ) {
            let first = compute_layout(&rect(cw, ch), &rect(pw, ph)).unwrap();
            let second = compute_layout(&rect(cw, ch), &rect(pw, ph)).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_count_is_max_of_both_trials(
            cw in 1i64..200, ch in 1i64..200, pw in 1i64..200, ph in 1i64..200
        ) {
            let normal = ((cw / pw) * (ch / ph)) as u32;
            let rotated = ((cw / ph) * (ch / pw)) as u32;
            let result = compute_layout(&rect(cw, ch), &rect(pw, ph)).unwrap();
            prop_assert_eq!(result.count, normal.max(rotated));
            prop_assert_eq!(result.orientation_rotated, rotated > normal);
        }
    }
}
