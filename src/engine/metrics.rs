// ==========================================
// 经销数据看板 - 派生指标
// ==========================================
// 职责: DOS / 扫码率 / 同比 / 达成率 等比率计算
// 红线: 分母为 0 时结果为 None（未定义），不得当作 0 或无穷大；
//       汇总时未定义值被排除，而不是被强制转换后计入
// ==========================================

use crate::config::DashboardConfig;
use crate::domain::types::StockStatus;
use serde::{Deserialize, Serialize};

/// 安全除法（分母 > 0 才有定义）
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 && numerator.is_finite() {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// 同比 = (本期 - 去年同期) / 去年同期
pub fn yoy(current: f64, last_year: f64) -> Option<f64> {
    safe_div(current - last_year, last_year)
}

/// 达成率 = 实际 / 任务
pub fn attainment(actual: f64, target: f64) -> Option<f64> {
    safe_div(actual, target)
}

/// 扫码折箱（扫码按听计）
pub fn scan_boxes(scan_events: usize, units_per_box: f64) -> f64 {
    scan_events as f64 / units_per_box
}

/// 扫码率 = 扫码箱数 / 出库箱数
pub fn scan_rate(scan_events: usize, outbound_boxes: f64, units_per_box: f64) -> Option<f64> {
    safe_div(scan_boxes(scan_events, units_per_box), outbound_boxes)
}

/// 考核期月均出库
///
/// # 参数
/// - monthly: 考核期内各月出库（缺月不出现在切片中）
/// - window_months: 考核期月数，缺月按 0 计入分母
pub fn window_average(monthly: &[f64], window_months: u32) -> f64 {
    if window_months == 0 {
        return 0.0;
    }
    monthly.iter().sum::<f64>() / window_months as f64
}

/// 未定义值不计入的求和
pub fn sum_defined<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

// ==========================================
// 库存可销月数 (DOS)
// ==========================================

/// DOS 评估结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosAssessment {
    pub stock_boxes: f64,
    pub average_outbound: f64,

    /// None = 未定义（考核期无出库）
    pub dos: Option<f64>,

    pub status: StockStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DosEvaluator {
    high_threshold: f64,
    low_threshold: f64,
}

impl DosEvaluator {
    pub fn new(high_threshold: f64, low_threshold: f64) -> Self {
        Self {
            high_threshold,
            low_threshold,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.dos_high_threshold, config.dos_low_threshold)
    }

    /// 评估 DOS 与库存状态
    ///
    /// # 规则
    /// 1. 月均出库 > 0 → DOS = 库存 / 月均；> 高阈值 → 库存过高，< 低阈值 → 库存不足，否则正常
    /// 2. 月均出库 = 0 且库存 > 0 → DOS 未定义，状态"无出库"（优先于阈值判定）
    /// 3. 月均出库 = 0 且库存 <= 0 → DOS 未定义，状态"无库存"
    pub fn assess(&self, stock_boxes: f64, average_outbound: f64) -> DosAssessment {
        let dos = safe_div(stock_boxes, average_outbound);
        let status = match dos {
            Some(d) if d > self.high_threshold => StockStatus::TooHigh,
            Some(d) if d < self.low_threshold => StockStatus::TooLow,
            Some(_) => StockStatus::Normal,
            None if stock_boxes > 0.0 => StockStatus::NoOutbound,
            None => StockStatus::NoStock,
        };
        DosAssessment {
            stock_boxes,
            average_outbound,
            dos,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dos_example_scenario() {
        // 库存 120 箱，季度出库 30/40/20 → 月均 30 → DOS 4.0 → 库存过高
        let avg = window_average(&[30.0, 40.0, 20.0], 3);
        assert_eq!(avg, 30.0);

        let a = DosEvaluator::new(2.0, 0.5).assess(120.0, avg);
        assert_eq!(a.dos, Some(4.0));
        assert_eq!(a.status, StockStatus::TooHigh);
    }

    #[test]
    fn test_dos_without_outbound_is_undefined() {
        let a = DosEvaluator::new(2.0, 0.5).assess(100.0, 0.0);
        assert_eq!(a.dos, None);
        assert_eq!(a.status, StockStatus::NoOutbound);

        let empty = DosEvaluator::new(2.0, 0.5).assess(0.0, 0.0);
        assert_eq!(empty.status, StockStatus::NoStock);
    }

    #[test]
    fn test_dos_thresholds() {
        let e = DosEvaluator::new(2.0, 0.5);
        assert_eq!(e.assess(20.0, 10.0).status, StockStatus::Normal);
        assert_eq!(e.assess(2.0, 10.0).status, StockStatus::TooLow);
        assert_eq!(e.assess(5.0, 10.0).status, StockStatus::Normal);
    }

    #[test]
    fn test_missing_months_count_in_window() {
        assert_eq!(window_average(&[90.0], 3), 30.0);
        assert_eq!(window_average(&[], 3), 0.0);
    }

    #[test]
    fn test_scan_unit_conversion() {
        assert_eq!(scan_boxes(60, 6.0), 10.0);
        assert_eq!(scan_rate(60, 20.0, 6.0), Some(0.5));
        assert_eq!(scan_rate(60, 0.0, 6.0), None);
    }

    #[test]
    fn test_yoy_and_attainment() {
        assert_eq!(yoy(120.0, 100.0), Some(0.2));
        assert_eq!(yoy(120.0, 0.0), None);
        assert_eq!(attainment(50.0, 200.0), Some(0.25));
        assert_eq!(attainment(50.0, 0.0), None);
    }

    #[test]
    fn test_undefined_values_excluded_from_sum() {
        assert_eq!(sum_defined([Some(1.0), None, Some(2.5)]), 3.5);
    }
}
