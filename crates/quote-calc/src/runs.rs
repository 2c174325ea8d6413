//! 印刷趟數計算

use quote_core::RunPolicy;

/// 印刷趟數計算器
pub struct RunCalculator;

impl RunCalculator {
    /// 將張數換算成印刷趟數
    ///
    /// 一趟以內算一趟；超過後以整趟計，餘數未達容許值併入前一趟，
    /// 達到容許值則多算一趟。
    pub fn run_units(quantity: u64, policy: &RunPolicy) -> u64 {
        let run_size = u64::from(policy.run_size.max(1));
        if quantity == 0 {
            return 0;
        }
        if quantity <= run_size {
            return 1;
        }

        let full_runs = quantity / run_size;
        let remainder = quantity % run_size;
        if remainder >= u64::from(policy.tolerance) {
            full_runs + 1
        } else {
            full_runs
        }
    }
}
