// ==========================================
// 经销数据看板 - 业绩台账
// ==========================================

use crate::domain::fact::{Dated, Dimensional};
use crate::domain::types::Dimension;
use serde::{Deserialize, Serialize};

/// 业绩记录（年 × 月 × 省区 × 经销商 × 仓库 × 品类层级）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub year: i32,
    pub month: u32,
    pub province: String,
    pub distributor: String,
    pub warehouse: Option<String>,

    /// 大类
    pub top_category: Option<String>,

    /// 中类
    pub mid_category: Option<String>,

    /// 归类
    pub group: Option<String>,

    pub amount: f64,
    pub boxes: f64,
    pub row_number: usize,
}

impl Dimensional for PerformanceRecord {
    fn has_dimension(&self, dimension: Dimension) -> bool {
        dimension != Dimension::Store
    }

    fn province(&self) -> Option<&str> {
        Some(&self.province)
    }

    fn distributor(&self) -> Option<&str> {
        Some(&self.distributor)
    }

    fn category(&self) -> Option<&str> {
        self.top_category.as_deref()
    }

    fn subcategory(&self) -> Option<&str> {
        self.mid_category.as_deref()
    }
}

impl Dated for PerformanceRecord {
    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> u32 {
        self.month
    }
}
