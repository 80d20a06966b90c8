// ==========================================
// 经销数据看板 - 会话上下文
// ==========================================
// 职责: 持有配置、内容哈希缓存、当前数据集与筛选状态
// 流程: load(字节) → 命中缓存则复用，否则导入 + 规范化 → 重建筛选目录
// 红线: 单线程同步使用，不加锁；加载失败只体现在数据集诊断日志中，会话继续可用
//       筛选变更只重跑计算层，不重新导入
// ==========================================

use crate::cache::{content_hash, ContentCache};
use crate::config::{ConfigManager, DashboardConfig};
use crate::domain::dataset::NormalizedDataset;
use crate::domain::period::{MonthKey, YearMonth};
use crate::domain::types::Dimension;
use crate::engine::aggregation::ComparisonTable;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::filters::{FilterCatalog, FilterState};
use crate::engine::reports::{
    latest_outbound_month, AttainmentReport, DosReport, KpiSummary, PerformanceComparison,
    ReportService, ScanRateReport, StoreTierReport,
};
use crate::engine::window::TimeWindow;
use crate::export;
use crate::importer::dataset_importer::DatasetImporter;
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// 一次加载的结果摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub content_hash: String,
    pub cache_hit: bool,
    pub summary: String,
    pub has_errors: bool,
}

pub struct DashboardSession {
    importer: DatasetImporter,
    cache: ContentCache<NormalizedDataset>,
    current: Option<String>,
    catalog: FilterCatalog,
    filter: FilterState,
}

impl DashboardSession {
    /// # 错误
    /// 配置参数组合非法时返回 ConfigValueError
    pub fn new(config: DashboardConfig) -> ImportResult<Self> {
        config.validate()?;
        let cache = ContentCache::new(config.cache_capacity);
        Ok(Self {
            importer: DatasetImporter::new(config),
            cache,
            current: None,
            catalog: FilterCatalog::default(),
            filter: FilterState::default(),
        })
    }

    pub fn from_config_manager(manager: &ConfigManager) -> ImportResult<Self> {
        Self::new(manager.dashboard_config()?)
    }

    pub fn config(&self) -> &DashboardConfig {
        self.importer.config()
    }

    // ==========================================
    // 加载
    // ==========================================

    /// 加载上传文件
    ///
    /// # 规则
    /// - 相同字节内容直接复用缓存的数据集（与文件名无关）
    /// - 切换到新数据集时清空筛选状态
    pub fn load(&mut self, bytes: &[u8], filename: &str) -> LoadOutcome {
        let importer = &self.importer;
        let (dataset, cache_hit) = self
            .cache
            .get_or_insert_with(bytes, || importer.import(bytes, filename));

        let outcome = LoadOutcome {
            content_hash: content_hash(bytes),
            cache_hit,
            summary: dataset.summary(),
            has_errors: dataset.log.has_errors(),
        };
        self.catalog = FilterCatalog::from_dataset(dataset);

        if self.current.as_deref() != Some(outcome.content_hash.as_str()) {
            self.filter.clear();
        }
        self.current = Some(outcome.content_hash.clone());

        info!(
            filename,
            cache_hit,
            cached = self.cache.len(),
            summary = %outcome.summary,
            "数据文件已加载"
        );
        outcome
    }

    pub fn dataset(&self) -> Option<&NormalizedDataset> {
        self.current.as_deref().and_then(|k| self.cache.peek(k))
    }

    fn loaded(&self) -> EngineResult<&NormalizedDataset> {
        self.dataset().ok_or(EngineError::NotLoaded)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    // ==========================================
    // 筛选
    // ==========================================

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn select_provinces(&mut self, provinces: Vec<String>) -> EngineResult<()> {
        self.filter.select_provinces(&self.catalog, provinces)
    }

    pub fn select_distributors(&mut self, distributors: Vec<String>) -> EngineResult<()> {
        self.filter.select_distributors(&self.catalog, distributors)
    }

    pub fn select_stores(&mut self, stores: Vec<String>) -> EngineResult<()> {
        self.filter.select_stores(&self.catalog, stores)
    }

    pub fn select_categories(&mut self, categories: Vec<String>) -> EngineResult<()> {
        self.filter.select_categories(&self.catalog, categories)
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    // ==========================================
    // 报表
    // ==========================================

    fn reports(&self) -> ReportService<'_> {
        ReportService::new(self.importer.config())
    }

    pub fn store_tiers(&self, months: Option<&BTreeSet<MonthKey>>) -> EngineResult<StoreTierReport> {
        self.reports().store_tiers(self.loaded()?, &self.filter, months)
    }

    pub fn outbound_comparison(
        &self,
        dimension: Dimension,
        window: &TimeWindow,
    ) -> EngineResult<ComparisonTable> {
        self.reports()
            .outbound_comparison(self.loaded()?, dimension, window, &self.filter)
    }

    pub fn performance_comparison(
        &self,
        dimension: Dimension,
        window: &TimeWindow,
    ) -> EngineResult<PerformanceComparison> {
        self.reports()
            .performance_comparison(self.loaded()?, dimension, window, &self.filter)
    }

    pub fn quota_attainment(
        &self,
        dimension: Dimension,
        window: &TimeWindow,
    ) -> EngineResult<AttainmentReport> {
        self.reports()
            .quota_attainment(self.loaded()?, dimension, window, &self.filter)
    }

    pub fn scan_rate_report(
        &self,
        dimension: Dimension,
        window: &TimeWindow,
    ) -> EngineResult<ScanRateReport> {
        self.reports()
            .scan_rate_report(self.loaded()?, dimension, window, &self.filter)
    }

    /// as_of 缺省时取出库表最近月份
    pub fn stock_dos(&self, as_of: Option<YearMonth>) -> EngineResult<DosReport> {
        let dataset = self.loaded()?;
        let as_of = match as_of.or_else(|| latest_outbound_month(dataset)) {
            Some(ym) => ym,
            None => {
                return Err(EngineError::InvalidParameter(
                    "无出库数据，需指定考核期截止月份".to_string(),
                ))
            }
        };
        self.reports().stock_dos(dataset, as_of, &self.filter)
    }

    pub fn kpi_summary(&self, window: &TimeWindow) -> EngineResult<KpiSummary> {
        Ok(self.reports().kpi_summary(self.loaded()?, window, &self.filter))
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出当前数据集（未加载时为 None）
    pub fn export_current(&self) -> Option<ImportResult<Vec<u8>>> {
        self.dataset().map(export::export_dataset)
    }
}
