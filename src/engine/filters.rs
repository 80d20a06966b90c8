// ==========================================
// 经销数据看板 - 级联筛选
// ==========================================
// 职责: 省区 → 经销商 → 门店 / 品类 的可选项与选择状态
// 红线: 下级可选项只来自上级选择范围内的数据；选择不在可选项内 → 拒绝
//       上级变更后失效的下级选择被剪除，不保留"悬空"选择
// 规则: 空集合 = 不限；记录不带某维度时该维度不参与过滤
// ==========================================

use crate::domain::dataset::NormalizedDataset;
use crate::domain::fact::Dimensional;
use crate::domain::types::Dimension;
use crate::engine::error::{EngineError, EngineResult};
use crate::importer::data_cleaner::distributor_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 一条维度组合（来自任一事实表的一行）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CatalogEntry {
    province: Option<String>,
    distributor: Option<String>,
    store: Option<String>,
    category: Option<String>,
}

// ==========================================
// FilterCatalog - 可选项目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    entries: BTreeSet<CatalogEntry>,
}

impl FilterCatalog {
    /// 从规范化数据集收集所有维度组合
    pub fn from_dataset(dataset: &NormalizedDataset) -> Self {
        let mut catalog = Self::default();
        if let Some(rows) = &dataset.shipments {
            catalog.absorb(rows);
        }
        if let Some(rows) = &dataset.stock {
            catalog.absorb(rows);
        }
        if let Some(rows) = &dataset.outbound {
            catalog.absorb(rows);
        }
        if let Some(rows) = &dataset.performance {
            catalog.absorb(rows);
        }
        if let Some(rows) = &dataset.targets {
            catalog.absorb(rows);
        }
        if let Some(rows) = &dataset.scans {
            catalog.absorb(rows);
        }
        catalog
    }

    pub fn absorb<T: Dimensional>(&mut self, facts: &[T]) {
        for fact in facts {
            self.entries.insert(CatalogEntry {
                province: fact.province().map(str::to_string),
                distributor: fact.distributor().map(str::to_string),
                store: fact.store().map(str::to_string),
                category: fact.category().map(str::to_string),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn province_options(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.province.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 所选省区内的经销商（按关联键去重，保留首个写法）
    pub fn distributor_options(&self, state: &FilterState) -> Vec<String> {
        let mut by_key: BTreeMap<String, String> = BTreeMap::new();
        for entry in self.entries.iter().filter(|e| state.province_allows(e)) {
            if let Some(name) = &entry.distributor {
                by_key
                    .entry(distributor_key(name))
                    .or_insert_with(|| name.clone());
            }
        }
        let mut names: Vec<String> = by_key.into_values().collect();
        names.sort();
        names
    }

    /// 所选省区、经销商内的门店
    pub fn store_options(&self, state: &FilterState) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| state.province_allows(e) && state.distributor_allows(e))
            .filter_map(|e| e.store.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 所选省区、经销商内的品类
    pub fn category_options(&self, state: &FilterState) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| state.province_allows(e) && state.distributor_allows(e))
            .filter_map(|e| e.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// ==========================================
// FilterState - 当前选择
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub provinces: BTreeSet<String>,
    pub distributors: BTreeSet<String>,
    pub stores: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !(self.provinces.is_empty()
            && self.distributors.is_empty()
            && self.stores.is_empty()
            && self.categories.is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 选择省区，并剪除失效的下级选择
    pub fn select_provinces(
        &mut self,
        catalog: &FilterCatalog,
        provinces: Vec<String>,
    ) -> EngineResult<()> {
        let options = catalog.province_options();
        ensure_selectable("省区", &provinces, |p| options.contains(p))?;
        self.provinces = provinces.into_iter().collect();
        self.prune(catalog);
        Ok(())
    }

    /// 选择经销商（按关联键校验，名称写法差异视为同一经销商）
    pub fn select_distributors(
        &mut self,
        catalog: &FilterCatalog,
        distributors: Vec<String>,
    ) -> EngineResult<()> {
        let keys: BTreeSet<String> = catalog
            .distributor_options(self)
            .iter()
            .map(|d| distributor_key(d))
            .collect();
        ensure_selectable("经销商", &distributors, |d| keys.contains(&distributor_key(d)))?;
        self.distributors = distributors.into_iter().collect();
        self.prune(catalog);
        Ok(())
    }

    pub fn select_stores(&mut self, catalog: &FilterCatalog, stores: Vec<String>) -> EngineResult<()> {
        let options = catalog.store_options(self);
        ensure_selectable("门店", &stores, |s| options.contains(s))?;
        self.stores = stores.into_iter().collect();
        Ok(())
    }

    pub fn select_categories(
        &mut self,
        catalog: &FilterCatalog,
        categories: Vec<String>,
    ) -> EngineResult<()> {
        let options = catalog.category_options(self);
        ensure_selectable("品类", &categories, |c| options.contains(c))?;
        self.categories = categories.into_iter().collect();
        Ok(())
    }

    /// 记录是否通过当前筛选
    pub fn matches<T: Dimensional + ?Sized>(&self, fact: &T) -> bool {
        self.dimension_matches(fact, Dimension::Province, &self.provinces)
            && self.distributor_matches(fact)
            && self.dimension_matches(fact, Dimension::Store, &self.stores)
            && self.dimension_matches(fact, Dimension::Category, &self.categories)
    }

    pub fn apply<'a, T: Dimensional>(&self, facts: &'a [T]) -> Vec<&'a T> {
        facts.iter().filter(|f| self.matches(*f)).collect()
    }

    // ==========================================
    // 内部
    // ==========================================

    fn dimension_matches<T: Dimensional + ?Sized>(
        &self,
        fact: &T,
        dimension: Dimension,
        selected: &BTreeSet<String>,
    ) -> bool {
        if selected.is_empty() || !fact.has_dimension(dimension) {
            return true;
        }
        fact.dimension_value(dimension)
            .map_or(false, |v| selected.contains(v))
    }

    fn distributor_matches<T: Dimensional + ?Sized>(&self, fact: &T) -> bool {
        if self.distributors.is_empty() || !fact.has_dimension(Dimension::Distributor) {
            return true;
        }
        match fact.distributor() {
            Some(name) => self.contains_distributor(name),
            None => false,
        }
    }

    fn contains_distributor(&self, name: &str) -> bool {
        let key = distributor_key(name);
        self.distributors.iter().any(|d| distributor_key(d) == key)
    }

    fn province_allows(&self, entry: &CatalogEntry) -> bool {
        self.provinces.is_empty()
            || entry
                .province
                .as_ref()
                .map_or(false, |p| self.provinces.contains(p))
    }

    /// 不带经销商维度的记录（任务表）不受经销商选择约束
    fn distributor_allows(&self, entry: &CatalogEntry) -> bool {
        self.distributors.is_empty()
            || entry
                .distributor
                .as_deref()
                .map_or(true, |d| self.contains_distributor(d))
    }

    fn prune(&mut self, catalog: &FilterCatalog) {
        let distributor_keys: BTreeSet<String> = catalog
            .distributor_options(self)
            .iter()
            .map(|d| distributor_key(d))
            .collect();
        self.distributors
            .retain(|d| distributor_keys.contains(&distributor_key(d)));

        let stores: BTreeSet<String> = catalog.store_options(self).into_iter().collect();
        self.stores.retain(|s| stores.contains(s));

        let categories: BTreeSet<String> = catalog.category_options(self).into_iter().collect();
        self.categories.retain(|c| categories.contains(c));
    }
}

fn ensure_selectable<F>(field: &str, values: &[String], allowed: F) -> EngineResult<()>
where
    F: Fn(&String) -> bool,
{
    match values.iter().find(|v| !allowed(v)) {
        Some(bad) => Err(EngineError::InvalidSelection {
            field: field.to_string(),
            value: bad.clone(),
        }),
        None => Ok(()),
    }
}
