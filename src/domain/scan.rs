// ==========================================
// 经销数据看板 - 扫码溯源事件
// ==========================================

use crate::domain::fact::{Dated, Dimensional};
use serde::{Deserialize, Serialize};

/// 扫码事件（一行 = 一次溯源码扫描 = 一听）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
    pub store: Option<String>,
    pub distributor: String,
    pub province: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub row_number: usize,
}

impl Dimensional for ScanEvent {
    fn province(&self) -> Option<&str> {
        Some(&self.province)
    }

    fn distributor(&self) -> Option<&str> {
        Some(&self.distributor)
    }

    fn store(&self) -> Option<&str> {
        self.store.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }
}

impl Dated for ScanEvent {
    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> u32 {
        self.month
    }

    fn day(&self) -> Option<u32> {
        self.day
    }
}
