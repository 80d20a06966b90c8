// ==========================================
// 经销数据看板 - 门店月度出货
// ==========================================
// 职责: StoreShipmentRecord + 门店分级规则
// 红线: 总出货/有效月数/月均/等级均由当前月份集合实时计算，不单独存储
// ==========================================

use crate::domain::fact::Dimensional;
use crate::domain::period::MonthKey;
use crate::domain::types::{Dimension, StoreTier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 门店分级阈值（按月均出货，含下界）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            a: 4.0,
            b: 2.0,
            c: 1.0,
        }
    }
}

impl TierThresholds {
    /// 月均 → 等级
    ///
    /// # 规则
    /// - avg >= a → A
    /// - b <= avg < a → B
    /// - c <= avg < b → C
    /// - 其他（含 NaN）→ D
    pub fn classify(&self, avg: f64) -> StoreTier {
        if avg >= self.a {
            StoreTier::A
        } else if avg >= self.b {
            StoreTier::B
        } else if avg >= self.c {
            StoreTier::C
        } else {
            StoreTier::D
        }
    }
}

/// 门店出货记录（一行 = 省区 + 经销商 + 门店）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreShipmentRecord {
    pub province: String,
    pub distributor: String,
    pub store: String,

    /// 月份 → 出货数量（BTreeMap 保证按时间排序）
    pub monthly: BTreeMap<MonthKey, f64>,
}

impl StoreShipmentRecord {
    pub fn new(province: String, distributor: String, store: String) -> Self {
        Self {
            province,
            distributor,
            store,
            monthly: BTreeMap::new(),
        }
    }

    /// 累加某月出货
    pub fn add_quantity(&mut self, month: MonthKey, quantity: f64) {
        *self.monthly.entry(month).or_insert(0.0) += quantity;
    }

    pub fn total(&self) -> f64 {
        self.monthly.values().sum()
    }

    /// 出货量 > 0 的月数
    pub fn active_months(&self) -> usize {
        self.monthly.values().filter(|q| **q > 0.0).count()
    }

    /// 月均出货 = 总出货 / 有效月数（无有效月份时为 0）
    pub fn average(&self) -> f64 {
        let active = self.active_months();
        if active > 0 {
            self.total() / active as f64
        } else {
            0.0
        }
    }

    pub fn tier(&self, thresholds: &TierThresholds) -> StoreTier {
        thresholds.classify(self.average())
    }

    /// 仅保留指定月份（用于月份筛选后重算等级）
    pub fn restricted_to(&self, months: &BTreeSet<MonthKey>) -> Self {
        Self {
            province: self.province.clone(),
            distributor: self.distributor.clone(),
            store: self.store.clone(),
            monthly: self
                .monthly
                .iter()
                .filter(|(k, _)| months.contains(k))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }
}

impl Dimensional for StoreShipmentRecord {
    /// 门店出货表不含品类
    fn has_dimension(&self, dimension: Dimension) -> bool {
        !matches!(dimension, Dimension::Category | Dimension::Subcategory)
    }

    fn province(&self) -> Option<&str> {
        Some(&self.province)
    }

    fn distributor(&self) -> Option<&str> {
        Some(&self.distributor)
    }

    fn store(&self) -> Option<&str> {
        Some(&self.store)
    }

    fn category(&self) -> Option<&str> {
        None
    }
}
