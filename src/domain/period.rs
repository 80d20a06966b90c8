// ==========================================
// 经销数据看板 - 期间类型
// ==========================================
// 职责: 年月键（跨表期间对齐）与月份标签键（门店出货列轴）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 年月键
///
/// 字段顺序即排序顺序（先年后月），可直接用于按时间排序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// 月份不在 1..=12 时返回 None
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 向前/向后平移若干个月（负数表示向前）
    pub fn shift(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// 去年同月
    pub fn same_month_last_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    /// 以本月为结尾的连续 n 个月（按时间升序）
    pub fn trailing_window(&self, n: u32) -> Vec<YearMonth> {
        (0..n as i32).rev().map(|k| self.shift(-k)).collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// 月份标签键
///
/// 门店出货表的月份列可能只写 "1月"（无年份），也可能写 "2025年1月"。
/// 无年份的键排在有年份的键之前。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: Option<i32>,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: Option<i32>, month: u32) -> Self {
        Self { year, month }
    }

    /// 缺年份时用给定年份补齐
    pub fn to_year_month(&self, default_year: i32) -> YearMonth {
        YearMonth {
            year: self.year.unwrap_or(default_year),
            month: self.month,
        }
    }
}

impl From<YearMonth> for MonthKey {
    fn from(ym: YearMonth) -> Self {
        MonthKey {
            year: Some(ym.year),
            month: ym.month,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{}年{}月", y, self.month),
            None => write!(f, "{}月", self.month),
        }
    }
}
