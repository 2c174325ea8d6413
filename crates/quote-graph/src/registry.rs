//! 相依關係登錄表

use quote_core::{QuoteError, Result};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, VecDeque};

/// 欄位相依圖（有向無環）
///
/// 欄位以首次出現的順序編號；拓撲排序時同一層以編號小者優先，
/// 讓重算順序固定。
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    index: HashMap<String, usize>,
    ids: Vec<String>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<BTreeSet<usize>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得欄位編號，不存在時新增
    pub fn ensure(&mut self, id: &str) -> (usize, bool) {
        if let Some(&idx) = self.index.get(id) {
            return (idx, false);
        }
        let idx = self.ids.len();
        self.index.insert(id.to_string(), idx);
        self.ids.push(id.to_string());
        self.dependencies.push(Vec::new());
        self.dependents.push(BTreeSet::new());
        (idx, true)
    }

    /// 查詢欄位編號
    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// 欄位ID
    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    /// 欄位總數
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 直接相依（輸入）
    pub fn dependencies(&self, idx: usize) -> &[usize] {
        &self.dependencies[idx]
    }

    /// 直接被依賴（輸出）
    pub fn dependents(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.dependents[idx].iter().copied()
    }

    /// 替換欄位的相依集合
    ///
    /// 新邊若會形成循環則回傳 `CyclicDependency`，原有的邊保持不變。
    pub fn set_dependencies(&mut self, idx: usize, deps: Vec<usize>) -> Result<()> {
        let previous = std::mem::take(&mut self.dependencies[idx]);
        for &d in &previous {
            self.dependents[d].remove(&idx);
        }

        if let Some(&bad) = deps.iter().find(|&&d| d == idx || self.reaches(idx, d)) {
            for &d in &previous {
                self.dependents[d].insert(idx);
            }
            self.dependencies[idx] = previous;
            return Err(QuoteError::CyclicDependency {
                field: self.ids[idx].clone(),
                via: self.ids[bad].clone(),
            });
        }

        let mut unique = Vec::with_capacity(deps.len());
        for d in deps {
            if !unique.contains(&d) {
                unique.push(d);
                self.dependents[d].insert(idx);
            }
        }
        self.dependencies[idx] = unique;
        Ok(())
    }

    /// `from` 是否能沿著被依賴方向走到 `to`
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut visited = vec![false; self.ids.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited[current] {
                continue;
            }
            visited[current] = true;
            stack.extend(self.dependents[current].iter().copied());
        }

        false
    }

    /// 所有下游欄位（不含起點本身）
    pub fn downstream(&self, start: usize) -> BTreeSet<usize> {
        let mut affected = BTreeSet::new();
        let mut queue: VecDeque<usize> = self.dependents[start].iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if affected.insert(current) {
                queue.extend(self.dependents[current].iter().copied());
            }
        }

        affected
    }

    /// 對子集合做拓撲排序（Kahn 演算法）
    ///
    /// 只計算子集合內部的邊；同時可處理的欄位以編號小者優先。
    pub fn topological_order(&self, subset: &BTreeSet<usize>) -> Result<Vec<usize>> {
        let mut in_degree: HashMap<usize, usize> = subset
            .iter()
            .map(|&idx| {
                let count = self.dependencies[idx]
                    .iter()
                    .filter(|d| subset.contains(d))
                    .count();
                (idx, count)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(&idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(subset.len());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for dependent in self.dependents(idx) {
                if let Some(deg) = in_degree.get_mut(&dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if order.len() != subset.len() {
            let stuck = subset
                .iter()
                .find(|idx| !order.contains(idx))
                .map(|&idx| self.ids[idx].clone())
                .unwrap_or_default();
            return Err(QuoteError::CyclicDependency {
                field: stuck.clone(),
                via: stuck,
            });
        }

        Ok(order)
    }
}
