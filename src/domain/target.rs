// ==========================================
// 经销数据看板 - 任务指标
// ==========================================

use crate::domain::fact::Dimensional;
use crate::domain::period::MonthKey;
use crate::domain::types::Dimension;
use serde::{Deserialize, Serialize};

/// 任务记录（省区 × 品类 × 月份 → 任务量）
///
/// 任务表的月份可能不带年份（"3月"），此时对任意年份的同月生效。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub province: String,
    pub category: Option<String>,
    pub month: MonthKey,
    pub quota: f64,
    pub row_number: usize,
}

impl TargetRecord {
    pub fn applies_to(&self, year: i32, month: u32) -> bool {
        self.month.month == month && self.month.year.map_or(true, |y| y == year)
    }
}

impl Dimensional for TargetRecord {
    /// 任务按省区/品类下达，不细分到经销商、门店
    fn has_dimension(&self, dimension: Dimension) -> bool {
        !matches!(dimension, Dimension::Distributor | Dimension::Store | Dimension::Subcategory)
    }

    fn province(&self) -> Option<&str> {
        Some(&self.province)
    }

    fn distributor(&self) -> Option<&str> {
        None
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
