// ==========================================
// 经销数据看板 - 分组聚合
// ==========================================
// 职责: 按维度 × 时间窗口 × 筛选 分组求和/计数，及去年同期对比
// 红线: 合计行永远由当前可见行重新求和，不缓存、不取源表总数
// 规则: 经销商维度按关联键分组（名称写法差异合并），显示首个写法
//       维度值缺失的记录归入 "未分配" 组
// ==========================================

use crate::domain::fact::{Dated, Dimensional};
use crate::domain::types::Dimension;
use crate::engine::filters::FilterState;
use crate::engine::metrics::yoy;
use crate::engine::window::TimeWindow;
use crate::importer::data_cleaner::distributor_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 维度值缺失时的分组名
pub const UNASSIGNED_KEY: &str = "未分配";

/// 合计行的分组名
pub const TOTAL_KEY: &str = "合计";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: String,
    pub value: f64,
    /// 参与求和的记录数
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTable {
    pub dimension: Dimension,
    pub rows: Vec<GroupRow>,
    pub total: GroupRow,
}

impl GroupedTable {
    /// 由分组行构造（按值降序、名称升序排列），合计随之计算
    pub fn from_rows(dimension: Dimension, mut rows: Vec<GroupRow>) -> Self {
        rows.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        let total = total_of(&rows);
        Self {
            dimension,
            rows,
            total,
        }
    }

    pub fn get(&self, key: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// 隐藏不满足条件的行并重算合计
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&GroupRow) -> bool,
    {
        self.rows.retain(keep);
        self.total = total_of(&self.rows);
    }

    /// 只保留前 n 行并重算合计
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
        self.total = total_of(&self.rows);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn total_of(rows: &[GroupRow]) -> GroupRow {
    GroupRow {
        key: TOTAL_KEY.to_string(),
        value: rows.iter().map(|r| r.value).sum(),
        count: rows.iter().map(|r| r.count).sum(),
    }
}

/// 分组键与显示名（经销商维度用关联键，显示名取首个写法）
pub(crate) fn group_key<T: Dimensional + ?Sized>(fact: &T, dimension: Dimension) -> (String, String) {
    match fact.dimension_value(dimension) {
        Some(v) if dimension == Dimension::Distributor => (distributor_key(v), v.to_string()),
        Some(v) => (v.to_string(), v.to_string()),
        None => (UNASSIGNED_KEY.to_string(), UNASSIGNED_KEY.to_string()),
    }
}

/// 按维度分组求和
///
/// # 参数
/// - window: None 表示不限时间
/// - value: 每条记录的取值（如出库箱数、金额）
pub fn group_sum<T, F>(
    facts: &[T],
    dimension: Dimension,
    window: Option<&TimeWindow>,
    filter: &FilterState,
    value: F,
) -> GroupedTable
where
    T: Dimensional + Dated,
    F: Fn(&T) -> f64,
{
    let mut groups: BTreeMap<String, GroupRow> = BTreeMap::new();
    for fact in facts
        .iter()
        .filter(|f| filter.matches(*f) && window.map_or(true, |w| w.contains(*f)))
    {
        let (key, label) = group_key(fact, dimension);
        let row = groups.entry(key).or_insert_with(|| GroupRow {
            key: label,
            value: 0.0,
            count: 0,
        });
        row.value += value(fact);
        row.count += 1;
    }
    GroupedTable::from_rows(dimension, groups.into_values().collect())
}

/// 窗口内合计
pub fn sum_in_window<T, F>(facts: &[T], window: &TimeWindow, filter: &FilterState, value: F) -> f64
where
    T: Dimensional + Dated,
    F: Fn(&T) -> f64,
{
    facts
        .iter()
        .filter(|f| filter.matches(*f) && window.contains(*f))
        .map(value)
        .sum()
}

/// 窗口内记录数
pub fn count_in_window<T>(facts: &[T], window: &TimeWindow, filter: &FilterState) -> usize
where
    T: Dimensional + Dated,
{
    facts
        .iter()
        .filter(|f| filter.matches(*f) && window.contains(*f))
        .count()
}

// ==========================================
// 同期对比
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub key: String,
    pub current: f64,
    pub last_year: f64,
    /// None = 去年同期为 0（未定义）
    pub yoy: Option<f64>,
}

impl ComparisonRow {
    fn new(key: String, current: f64, last_year: f64) -> Self {
        Self {
            key,
            current,
            last_year,
            yoy: yoy(current, last_year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub dimension: Dimension,
    pub window: TimeWindow,
    pub rows: Vec<ComparisonRow>,
    pub total: ComparisonRow,
}

impl ComparisonTable {
    pub fn get(&self, key: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// 隐藏行并重算合计（合计同比由合计值计算，不是各行同比之和）
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&ComparisonRow) -> bool,
    {
        self.rows.retain(keep);
        self.total = comparison_total(&self.rows);
    }
}

fn comparison_total(rows: &[ComparisonRow]) -> ComparisonRow {
    ComparisonRow::new(
        TOTAL_KEY.to_string(),
        rows.iter().map(|r| r.current).sum(),
        rows.iter().map(|r| r.last_year).sum(),
    )
}

/// 本期 vs 去年同期（去年同期 = 窗口整体减一个日历年）
pub fn compare_with_last_year<T, F>(
    facts: &[T],
    dimension: Dimension,
    window: &TimeWindow,
    filter: &FilterState,
    value: F,
) -> ComparisonTable
where
    T: Dimensional + Dated,
    F: Fn(&T) -> f64,
{
    let last_window = window.same_period_last_year();

    // key → (显示名, 本期, 去年)
    let mut groups: BTreeMap<String, (String, f64, f64)> = BTreeMap::new();
    for fact in facts.iter().filter(|f| filter.matches(*f)) {
        let in_current = window.contains(fact);
        let in_last = last_window.contains(fact);
        if !in_current && !in_last {
            continue;
        }
        let (key, label) = group_key(fact, dimension);
        let slot = groups.entry(key).or_insert((label, 0.0, 0.0));
        if in_current {
            slot.1 += value(fact);
        }
        if in_last {
            slot.2 += value(fact);
        }
    }

    let mut rows: Vec<ComparisonRow> = groups
        .into_values()
        .map(|(label, current, last)| ComparisonRow::new(label, current, last))
        .collect();
    rows.sort_by(|a, b| {
        b.current
            .partial_cmp(&a.current)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    let total = comparison_total(&rows);

    ComparisonTable {
        dimension,
        window: *window,
        rows,
        total,
    }
}
