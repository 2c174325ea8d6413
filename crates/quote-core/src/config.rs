//! 報價配置模型

use serde::{Deserialize, Serialize};

use crate::sheet::{AreaOverride, SheetClassificationTable};
use crate::stage::CostStage;
use crate::{QuoteError, Result};

/// 印刷趟數規則
///
/// 每趟涵蓋 `run_size` 張；超過一趟後，餘數小於 `tolerance` 併入前一趟。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPolicy {
    /// 每趟張數
    pub run_size: u32,

    /// 容許餘數
    pub tolerance: u32,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            run_size: 1000,
            tolerance: 150,
        }
    }
}

/// 報價配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// 紙張類別表
    pub classification: SheetClassificationTable,

    /// 印刷趟數規則
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// 初始啟用的成本階段
    #[serde(default = "default_enabled_stages")]
    pub enabled_stages: Vec<CostStage>,
}

fn default_enabled_stages() -> Vec<CostStage> {
    CostStage::ALL.to_vec()
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            classification: SheetClassificationTable::default(),
            run_policy: RunPolicy::default(),
            enabled_stages: default_enabled_stages(),
        }
    }
}

impl QuoteConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置紙張類別表
    pub fn with_classification(mut self, table: SheetClassificationTable) -> Self {
        self.classification = table;
        self
    }

    /// 建構器模式：添加面積覆寫規則
    pub fn with_override(mut self, rule: AreaOverride) -> Self {
        self.classification = self.classification.with_override(rule);
        self
    }

    /// 建構器模式：設置印刷趟數規則
    pub fn with_run_policy(mut self, policy: RunPolicy) -> Self {
        self.run_policy = policy;
        self
    }

    /// 建構器模式：設置初始啟用的階段
    pub fn with_enabled_stages(mut self, stages: Vec<CostStage>) -> Self {
        self.enabled_stages = stages;
        self
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> Result<()> {
        if self.classification.thresholds().is_empty() {
            return Err(QuoteError::Config("紙張類別表至少需要一個門檻".to_string()));
        }
        if self.run_policy.run_size == 0 {
            return Err(QuoteError::Config("每趟張數必須大於 0".to_string()));
        }
        if self.run_policy.tolerance >= self.run_policy.run_size {
            return Err(QuoteError::Config("容許餘數必須小於每趟張數".to_string()));
        }
        for rule in self.classification.overrides() {
            rule.usable.validate()?;
        }
        Ok(())
    }

    /// 從 JSON 載入配置
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: QuoteConfig =
            serde_json::from_str(json).map_err(|e| QuoteError::Config(e.to_string()))?;
        config.classification.normalize();
        config.validate()?;
        Ok(config)
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| QuoteError::Config(e.to_string()))
    }
}
