// ==========================================
// 经销数据看板 - 出库流水
// ==========================================

use crate::domain::fact::{Dated, Dimensional};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 出库事件（一行 = 一次出库）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundTransaction {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
    pub province: String,
    pub distributor: String,
    pub store: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub boxes: f64,
    pub row_number: usize,
}

impl OutboundTransaction {
    /// 日期不完整或非法时返回 None
    pub fn date(&self) -> Option<NaiveDate> {
        self.day
            .and_then(|d| NaiveDate::from_ymd_opt(self.year, self.month, d))
    }
}

impl Dimensional for OutboundTransaction {
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

impl Dated for OutboundTransaction {
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
