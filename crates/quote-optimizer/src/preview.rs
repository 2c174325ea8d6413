//! 印刷機候選預覽

use quote_core::{LayoutResult, Rectangle, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::montage::LayoutOptimizer;

/// 單一候選版面的拼版結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressCandidate {
    /// 候選鍵值（印刷機或紙張型號）
    pub key: String,
    /// 候選版面
    pub container: Rectangle,
    /// 拼版結果
    pub layout: LayoutResult,
}

/// 批次預覽：一次評估型錄中所有候選版面
pub struct PressPreview;

impl PressPreview {
    /// 依拼版數量由多到少排序候選；數量相同時保留輸入順序
    ///
    /// 各候選互不相依，以 rayon 並行計算。不會寫入任何表單欄位。
    pub fn rank(
        optimizer: &LayoutOptimizer,
        candidates: &[(String, Rectangle)],
        piece: &Rectangle,
    ) -> Result<Vec<PressCandidate>> {
        let mut ranked = candidates
            .par_iter()
            .map(|(key, container)| {
                optimizer
                    .compute_layout(container, piece)
                    .map(|layout| PressCandidate {
                        key: key.clone(),
                        container: *container,
                        layout,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        ranked.sort_by(|a, b| b.layout.count.cmp(&a.layout.count));

        tracing::debug!("預覽 {} 個候選版面", ranked.len());
        Ok(ranked)
    }

    /// 拼版數量最多的候選（放不下的候選不列入）
    pub fn best(
        optimizer: &LayoutOptimizer,
        candidates: &[(String, Rectangle)],
        piece: &Rectangle,
    ) -> Result<Option<PressCandidate>> {
        Ok(Self::rank(optimizer, candidates, piece)?
            .into_iter()
            .find(|candidate| candidate.layout.fits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: i64, h: i64) -> Rectangle {
        Rectangle::from_dims(w, h).unwrap()
    }

    fn presses() -> Vec<(String, Rectangle)> {
        vec![
            ("gto46".to_string(), rect(32, 46)),
            ("gto52".to_string(), rect(36, 52)),
            ("sm74".to_string(), rect(52, 74)),
            ("speedmaster".to_string(), rect(70, 100)),
        ]
    }

    #[test]
    fn test_rank_orders_by_count() {
        let ranked = PressPreview::rank(&LayoutOptimizer::default(), &presses(), &rect(21, 30)).unwrap();

        let keys: Vec<_> = ranked.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["speedmaster", "sm74", "gto46", "gto52"]);
        assert_eq!(ranked[0].layout.count, 9);
    }

    #[test]
    fn test_best_skips_non_fitting() {
        let best = PressPreview::best(&LayoutOptimizer::default(), &presses(), &rect(60, 80)).unwrap();
        assert_eq!(best.map(|c| c.key), Some("speedmaster".to_string()));

        let none = PressPreview::best(&LayoutOptimizer::default(), &presses(), &rect(120, 150)).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_rank_propagates_invalid_geometry() {
        let candidates = vec![(
            "broken".to_string(),
            Rectangle {
                width: rust_decimal::Decimal::ZERO,
                height: rust_decimal::Decimal::from(10),
            },
        )];
        assert!(PressPreview::rank(&LayoutOptimizer::default(), &candidates, &rect(10, 10)).is_err());
    }
}
