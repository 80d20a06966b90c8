// ==========================================
// 经销数据看板 - 报表计算
// ==========================================
// 职责: 门店分级 / 出库同比 / 业绩同比 / 任务达成 / 扫码率 / 库存 DOS / KPI 卡片
// 输入: NormalizedDataset + FilterState + TimeWindow
// 输出: 可直接渲染的报表行 + 由可见行重算的合计
// 红线: 依赖的表缺失 → EngineError::NoData，由视图显示"无数据"；
//       未定义比率保持 None，合计不把 None 当 0 计入
// ==========================================

use crate::config::DashboardConfig;
use crate::domain::dataset::NormalizedDataset;
use crate::domain::period::{MonthKey, YearMonth};
use crate::domain::shipment::StoreShipmentRecord;
use crate::domain::types::{Dimension, SheetKind, StockStatus, StoreTier};
use crate::engine::aggregation::{
    compare_with_last_year, count_in_window, group_key, sum_in_window, ComparisonTable,
    TOTAL_KEY,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::filters::FilterState;
use crate::engine::metrics::{
    attainment, scan_boxes, scan_rate, window_average, yoy, DosEvaluator,
};
use crate::engine::window::TimeWindow;
use crate::importer::data_cleaner::distributor_key;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

fn require<'d, T>(table: &'d Option<Vec<T>>, kind: SheetKind) -> EngineResult<&'d [T]> {
    table.as_deref().ok_or(EngineError::NoData(kind))
}


// ==========================================
// 报表类型
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreTierRow {
    pub province: String,
    pub distributor: String,
    pub store: String,
    pub total: f64,
    pub active_months: usize,
    pub average: f64,
    pub tier: StoreTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCountRow {
    pub province: String,
    pub counts: BTreeMap<StoreTier, usize>,
    pub stores: usize,
}

impl TierCountRow {
    fn empty(province: String) -> Self {
        Self {
            province,
            counts: StoreTier::ALL.iter().map(|t| (*t, 0)).collect(),
            stores: 0,
        }
    }

    fn add(&mut self, tier: StoreTier, n: usize) {
        *self.counts.entry(tier).or_insert(0) += n;
        self.stores += n;
    }

    pub fn count(&self, tier: StoreTier) -> usize {
        self.counts.get(&tier).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreTierReport {
    pub stores: Vec<StoreTierRow>,
    pub by_province: Vec<TierCountRow>,
    pub total: TierCountRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceComparison {
    pub amount: ComparisonTable,
    pub boxes: ComparisonTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttainmentRow {
    pub key: String,
    pub target: f64,
    pub actual: f64,
    pub attainment: Option<f64>,
}

impl AttainmentRow {
    fn new(key: String, target: f64, actual: f64) -> Self {
        Self {
            key,
            target,
            actual,
            attainment: attainment(actual, target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttainmentReport {
    pub dimension: Dimension,
    pub window: TimeWindow,
    pub rows: Vec<AttainmentRow>,
    pub total: AttainmentRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRateRow {
    pub key: String,
    pub scan_events: usize,
    pub scan_boxes: f64,
    pub outbound_boxes: f64,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRateReport {
    pub dimension: Dimension,
    pub window: TimeWindow,
    pub rows: Vec<ScanRateRow>,
    pub total: ScanRateRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosRow {
    pub distributor: String,
    pub province: Option<String>,
    pub stock_boxes: f64,
    pub average_outbound: f64,
    pub dos: Option<f64>,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosReport {
    /// 考核期（出库月均的取数窗口）
    pub window: TimeWindow,
    pub rows: Vec<DosRow>,
    pub total_stock_boxes: f64,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub outbound_boxes: Option<f64>,
    pub outbound_last_year: Option<f64>,
    pub outbound_yoy: Option<f64>,
    pub performance_amount: Option<f64>,
    pub scan_rate: Option<f64>,
    pub attainment: Option<f64>,
    pub active_stores: Option<usize>,
}

// ==========================================
// ReportService - 报表计算服务
// ==========================================
pub struct ReportService<'a> {
    config: &'a DashboardConfig,
}

impl<'a> ReportService<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    /// 门店分级汇总
    ///
    /// # 参数
    /// - months: 只按这些月份重算均值与等级；None = 全部月份
    ///
    /// # 规则
    /// 等级是当前月份集合的纯函数，不缓存
    pub fn store_tiers(
        &self,
        dataset: &NormalizedDataset,
        filter: &FilterState,
        months: Option<&BTreeSet<MonthKey>>,
    ) -> EngineResult<StoreTierReport> {
        let shipments = require(&dataset.shipments, SheetKind::Shipments)?;
        let thresholds = &self.config.tier_thresholds;

        let mut stores = Vec::new();
        for record in shipments.iter().filter(|r| filter.matches(*r)) {
            let scoped: Cow<'_, StoreShipmentRecord> = match months {
                Some(set) => Cow::Owned(record.restricted_to(set)),
                None => Cow::Borrowed(record),
            };
            stores.push(StoreTierRow {
                province: scoped.province.clone(),
                distributor: scoped.distributor.clone(),
                store: scoped.store.clone(),
                total: scoped.total(),
                active_months: scoped.active_months(),
                average: scoped.average(),
                tier: scoped.tier(thresholds),
            });
        }
        stores.sort_by(|a, b| {
            a.tier
                .cmp(&b.tier)
                .then_with(|| b.average.partial_cmp(&a.average).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.store.cmp(&b.store))
        });

        let mut provinces: BTreeMap<String, TierCountRow> = BTreeMap::new();
        for row in &stores {
            provinces
                .entry(row.province.clone())
                .or_insert_with(|| TierCountRow::empty(row.province.clone()))
                .add(row.tier, 1);
        }
        let by_province: Vec<TierCountRow> = provinces.into_values().collect();

        let mut total = TierCountRow::empty(TOTAL_KEY.to_string());
        for row in &by_province {
            for tier in StoreTier::ALL {
                total.add(tier, row.count(tier));
            }
        }

        Ok(StoreTierReport {
            stores,
            by_province,
            total,
        })
    }

    /// 出库同比
    pub fn outbound_comparison(
        &self,
        dataset: &NormalizedDataset,
        dimension: Dimension,
        window: &TimeWindow,
        filter: &FilterState,
    ) -> EngineResult<ComparisonTable> {
        let outbound = require(&dataset.outbound, SheetKind::Outbound)?;
        Ok(compare_with_last_year(outbound, dimension, window, filter, |t| t.boxes))
    }

    /// 业绩同比（金额与箱数）
    pub fn performance_comparison(
        &self,
        dataset: &NormalizedDataset,
        dimension: Dimension,
        window: &TimeWindow,
        filter: &FilterState,
    ) -> EngineResult<PerformanceComparison> {
        if dimension == Dimension::Store {
            return Err(EngineError::InvalidParameter("业绩台账不含门店维度".to_string()));
        }
        let performance = require(&dataset.performance, SheetKind::Performance)?;
        Ok(PerformanceComparison {
            amount: compare_with_last_year(performance, dimension, window, filter, |r| r.amount),
            boxes: compare_with_last_year(performance, dimension, window, filter, |r| r.boxes),
        })
    }

    /// 任务达成（实际 = 业绩箱数）
    ///
    /// # 规则
    /// - 仅支持省区 / 大类维度（任务表只有这两个维度）
    /// - 选中经销商或门店时无可比任务，返回 InvalidParameter
    /// - 未写年份的任务对每一年适用；窗口跨越同名月份时按月累计
    pub fn quota_attainment(
        &self,
        dataset: &NormalizedDataset,
        dimension: Dimension,
        window: &TimeWindow,
        filter: &FilterState,
    ) -> EngineResult<AttainmentReport> {
        if !matches!(dimension, Dimension::Province | Dimension::Category) {
            return Err(EngineError::InvalidParameter(format!(
                "任务达成只支持省区或大类维度，收到 {}",
                dimension
            )));
        }
        if !filter.distributors.is_empty() || !filter.stores.is_empty() {
            return Err(EngineError::InvalidParameter(
                "任务按省区/品类下达，选中经销商或门店时无法计算达成率".to_string(),
            ));
        }
        let targets = require(&dataset.targets, SheetKind::Targets)?;
        let performance = require(&dataset.performance, SheetKind::Performance)?;
        let months = window.months();

        // key → (显示名, 任务, 实际)
        let mut groups: BTreeMap<String, (String, f64, f64)> = BTreeMap::new();
        for target in targets.iter().filter(|t| filter.matches(*t)) {
            let periods = months
                .iter()
                .filter(|ym| target.applies_to(ym.year, ym.month))
                .count();
            if periods == 0 {
                continue;
            }
            let (key, label) = group_key(target, dimension);
            groups.entry(key).or_insert((label, 0.0, 0.0)).1 += target.quota * periods as f64;
        }
        for record in performance
            .iter()
            .filter(|r| filter.matches(*r) && window.contains(*r))
        {
            let (key, label) = group_key(record, dimension);
            groups.entry(key).or_insert((label, 0.0, 0.0)).2 += record.boxes;
        }

        let rows: Vec<AttainmentRow> = groups
            .into_values()
            .map(|(label, target, actual)| AttainmentRow::new(label, target, actual))
            .collect();
        let total = AttainmentRow::new(
            TOTAL_KEY.to_string(),
            rows.iter().map(|r| r.target).sum(),
            rows.iter().map(|r| r.actual).sum(),
        );

        Ok(AttainmentReport {
            dimension,
            window: *window,
            rows,
            total,
        })
    }

    /// 扫码率 = 扫码折箱 / 出库箱数
    pub fn scan_rate_report(
        &self,
        dataset: &NormalizedDataset,
        dimension: Dimension,
        window: &TimeWindow,
        filter: &FilterState,
    ) -> EngineResult<ScanRateReport> {
        let scans = require(&dataset.scans, SheetKind::Scans)?;
        let outbound = require(&dataset.outbound, SheetKind::Outbound)?;
        let upb = self.config.units_per_box;

        // key → (显示名, 扫码次数, 出库箱数)；经销商按关联键合并写法差异
        let mut groups: BTreeMap<String, (String, usize, f64)> = BTreeMap::new();
        for scan in scans.iter().filter(|s| filter.matches(*s) && window.contains(*s)) {
            let (key, label) = group_key(scan, dimension);
            groups.entry(key).or_insert((label, 0, 0.0)).1 += 1;
        }
        for tx in outbound.iter().filter(|t| filter.matches(*t) && window.contains(*t)) {
            let (key, label) = group_key(tx, dimension);
            groups.entry(key).or_insert((label, 0, 0.0)).2 += tx.boxes;
        }

        let row = |key: String, events: usize, boxes: f64| ScanRateRow {
            key,
            scan_events: events,
            scan_boxes: scan_boxes(events, upb),
            outbound_boxes: boxes,
            rate: scan_rate(events, boxes, upb),
        };

        let rows: Vec<ScanRateRow> = groups
            .into_values()
            .map(|(label, events, boxes)| row(label, events, boxes))
            .collect();
        let total = row(
            TOTAL_KEY.to_string(),
            rows.iter().map(|r| r.scan_events).sum(),
            rows.iter().map(|r| r.outbound_boxes).sum(),
        );

        Ok(ScanRateReport {
            dimension,
            window: *window,
            rows,
            total,
        })
    }

    /// 经销商库存 DOS
    ///
    /// # 参数
    /// - as_of: 考核期最后一个月；考核期 = 以其结尾的 dos_window_months 个月
    ///
    /// # 规则
    /// - 库存与出库按经销商关联键汇总
    /// - 月均 = 考核期出库 / 考核期月数（缺月按 0）
    /// - 排序: DOS 降序，未定义 DOS 排最后
    pub fn stock_dos(
        &self,
        dataset: &NormalizedDataset,
        as_of: YearMonth,
        filter: &FilterState,
    ) -> EngineResult<DosReport> {
        let stock = require(&dataset.stock, SheetKind::Stock)?;
        let outbound = dataset.outbound.as_deref().unwrap_or(&[]);
        let window = TimeWindow::trailing_months(as_of, self.config.dos_window_months)?;
        let evaluator = DosEvaluator::from_config(self.config);

        struct Slot {
            name: String,
            province: Option<String>,
            stock: f64,
            monthly: BTreeMap<YearMonth, f64>,
        }

        let mut slots: BTreeMap<String, Slot> = BTreeMap::new();
        let mut slot = |name: &str, province: Option<&str>| -> String {
            let key = distributor_key(name);
            let entry = slots.entry(key.clone()).or_insert_with(|| Slot {
                name: name.to_string(),
                province: None,
                stock: 0.0,
                monthly: BTreeMap::new(),
            });
            if entry.province.is_none() {
                entry.province = province.map(str::to_string);
            }
            key
        };

        let mut stock_by_key: Vec<(String, f64)> = Vec::new();
        for record in stock.iter().filter(|r| filter.matches(*r)) {
            let key = slot(&record.distributor, record.province.as_deref());
            stock_by_key.push((key, record.stock_boxes));
        }
        let mut outbound_by_key: Vec<(String, YearMonth, f64)> = Vec::new();
        for tx in outbound
            .iter()
            .filter(|t| filter.matches(*t) && window.contains(*t))
        {
            let key = slot(&tx.distributor, Some(tx.province.as_str()));
            outbound_by_key.push((key, YearMonth { year: tx.year, month: tx.month }, tx.boxes));
        }
        for (key, boxes) in stock_by_key {
            if let Some(s) = slots.get_mut(&key) {
                s.stock += boxes;
            }
        }
        for (key, ym, boxes) in outbound_by_key {
            if let Some(s) = slots.get_mut(&key) {
                *s.monthly.entry(ym).or_insert(0.0) += boxes;
            }
        }

        let mut rows: Vec<DosRow> = slots
            .into_values()
            .map(|s| {
                let monthly: Vec<f64> = s.monthly.values().copied().collect();
                let avg = window_average(&monthly, self.config.dos_window_months);
                let assessment = evaluator.assess(s.stock, avg);
                DosRow {
                    distributor: s.name,
                    province: s.province,
                    stock_boxes: assessment.stock_boxes,
                    average_outbound: assessment.average_outbound,
                    dos: assessment.dos,
                    status: assessment.status,
                }
            })
            .collect();

        rows.sort_by(|a, b| match (a.dos, b.dos) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.distributor.cmp(&b.distributor)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b
                .stock_boxes
                .partial_cmp(&a.stock_boxes)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.distributor.cmp(&b.distributor)),
        });

        let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in &rows {
            *status_counts.entry(row.status.to_string()).or_insert(0) += 1;
        }

        debug!(window = %window, distributors = rows.len(), "DOS 报表计算完成");

        Ok(DosReport {
            window,
            total_stock_boxes: rows.iter().map(|r| r.stock_boxes).sum(),
            rows,
            status_counts,
        })
    }

    /// KPI 卡片（缺表的指标为 None，不报错）
    pub fn kpi_summary(
        &self,
        dataset: &NormalizedDataset,
        window: &TimeWindow,
        filter: &FilterState,
    ) -> KpiSummary {
        let mut kpi = KpiSummary::default();

        if let Some(outbound) = dataset.outbound.as_deref() {
            let current = sum_in_window(outbound, window, filter, |t| t.boxes);
            let last = sum_in_window(outbound, &window.same_period_last_year(), filter, |t| t.boxes);
            kpi.outbound_boxes = Some(current);
            kpi.outbound_last_year = Some(last);
            kpi.outbound_yoy = yoy(current, last);

            if let Some(scans) = dataset.scans.as_deref() {
                let events = count_in_window(scans, window, filter);
                kpi.scan_rate = scan_rate(events, current, self.config.units_per_box);
            }
        }

        if let Some(performance) = dataset.performance.as_deref() {
            kpi.performance_amount = Some(sum_in_window(performance, window, filter, |r| r.amount));
        }

        if let Ok(report) = self.quota_attainment(dataset, Dimension::Province, window, filter) {
            kpi.attainment = report.total.attainment;
        }

        if let Some(shipments) = dataset.shipments.as_deref() {
            let months: BTreeSet<YearMonth> = window.months().into_iter().collect();
            let active = shipments
                .iter()
                .filter(|r| filter.matches(*r))
                .filter(|r| {
                    r.monthly.iter().any(|(k, q)| {
                        *q > 0.0
                            && match k.year {
                                Some(y) => months.contains(&YearMonth { year: y, month: k.month }),
                                None => months.iter().any(|ym| ym.month == k.month),
                            }
                    })
                })
                .count();
            kpi.active_stores = Some(active);
        }

        kpi
    }
}

/// 出库表中最近的年月（DOS 考核期默认以此结尾）
pub fn latest_outbound_month(dataset: &NormalizedDataset) -> Option<YearMonth> {
    dataset
        .outbound
        .as_deref()?
        .iter()
        .map(|t| YearMonth {
            year: t.year,
            month: t.month,
        })
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outbound::OutboundTransaction;
    use crate::domain::performance::PerformanceRecord;
    use crate::domain::scan::ScanEvent;
    use crate::domain::stock::StockRecord;
    use crate::domain::target::TargetRecord;

    fn tx(year: i32, month: u32, province: &str, distributor: &str, boxes: f64) -> OutboundTransaction {
        OutboundTransaction {
            year,
            month,
            day: Some(1),
            province: province.into(),
            distributor: distributor.into(),
            store: None,
            category: Some("奶粉".into()),
            subcategory: None,
            boxes,
            row_number: 1,
        }
    }

    fn stock(distributor: &str, boxes: f64) -> StockRecord {
        StockRecord {
            distributor_code: None,
            distributor_full_name: None,
            product_code: None,
            product_name: "金装".into(),
            stock_units: boxes * 6.0,
            stock_boxes: boxes,
            province: Some("广东".into()),
            distributor: distributor.into(),
            category: Some("奶粉".into()),
            subcategory: None,
            weight_spec: "800".into(),
            size_spec: None,
            specific_class: "其他".into(),
            row_number: 1,
        }
    }

    fn perf(year: i32, month: u32, province: &str, boxes: f64, amount: f64) -> PerformanceRecord {
        PerformanceRecord {
            year,
            month,
            province: province.into(),
            distributor: "ABC".into(),
            warehouse: None,
            top_category: Some("奶粉".into()),
            mid_category: None,
            group: None,
            amount,
            boxes,
            row_number: 1,
        }
    }

    fn scan(year: i32, month: u32, province: &str) -> ScanEvent {
        ScanEvent {
            year,
            month,
            day: Some(3),
            store: Some("门店1".into()),
            distributor: "ABC".into(),
            province: province.into(),
            category: Some("奶粉".into()),
            subcategory: None,
            longitude: None,
            latitude: None,
            row_number: 1,
        }
    }

    fn shipment(province: &str, store: &str, months: &[(u32, f64)]) -> StoreShipmentRecord {
        let mut r = StoreShipmentRecord::new(province.into(), "ABC".into(), store.into());
        for (m, q) in months {
            r.add_quantity(MonthKey::new(Some(2025), *m), *q);
        }
        r
    }

    #[test]
    fn test_dos_example_scenario() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.stock = Some(vec![stock("ABC", 120.0), stock("NOOUT", 50.0)]);
        ds.outbound = Some(vec![
            tx(2024, 10, "广东", "ABC", 30.0),
            tx(2024, 11, "广东", "ABC", 40.0),
            tx(2024, 12, "广东", "ABC", 20.0),
            tx(2024, 12, "广东", "LOW", 30.0),
        ]);

        let as_of = latest_outbound_month(&ds).unwrap();
        assert_eq!(as_of, YearMonth { year: 2024, month: 12 });

        let report = ReportService::new(&config)
            .stock_dos(&ds, as_of, &FilterState::new())
            .unwrap();

        let abc = report.rows.iter().find(|r| r.distributor == "ABC").unwrap();
        assert_eq!(abc.average_outbound, 30.0);
        assert_eq!(abc.dos, Some(4.0));
        assert_eq!(abc.status, StockStatus::TooHigh);

        let noout = report.rows.iter().find(|r| r.distributor == "NOOUT").unwrap();
        assert_eq!(noout.dos, None);
        assert_eq!(noout.status, StockStatus::NoOutbound);

        let low = report.rows.iter().find(|r| r.distributor == "LOW").unwrap();
        assert_eq!(low.dos, Some(0.0));
        assert_eq!(low.status, StockStatus::TooLow);

        // 未定义 DOS 排最后
        assert_eq!(report.rows.last().map(|r| r.distributor.as_str()), Some("NOOUT"));
        assert_eq!(report.total_stock_boxes, 170.0);
    }

    #[test]
    fn test_missing_sheet_reports_no_data() {
        let config = DashboardConfig::default();
        let ds = NormalizedDataset::new("t.xlsx");
        let service = ReportService::new(&config);
        let window = TimeWindow::month(2025, 1).unwrap();

        let err = service
            .outbound_comparison(&ds, Dimension::Province, &window, &FilterState::new())
            .unwrap_err();
        assert_eq!(err, EngineError::NoData(SheetKind::Outbound));

        let kpi = service.kpi_summary(&ds, &window, &FilterState::new());
        assert_eq!(kpi, KpiSummary::default());
    }

    #[test]
    fn test_store_tiers_follow_month_selection() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.shipments = Some(vec![
            shipment("广东", "门店1", &[(1, 8.0), (2, 0.0), (3, 1.0)]),
            shipment("广东", "门店2", &[(1, 1.5)]),
            shipment("广西", "门店3", &[(1, 0.0)]),
        ]);
        let service = ReportService::new(&config);

        let all = service.store_tiers(&ds, &FilterState::new(), None).unwrap();
        let s1 = all.stores.iter().find(|r| r.store == "门店1").unwrap();
        assert_eq!(s1.active_months, 2);
        assert_eq!(s1.average, 4.5);
        assert_eq!(s1.tier, StoreTier::A);
        assert_eq!(all.total.stores, 3);
        assert_eq!(all.total.count(StoreTier::D), 1);
        let gd = all.by_province.iter().find(|r| r.province == "广东").unwrap();
        assert_eq!(gd.count(StoreTier::A), 1);
        assert_eq!(gd.count(StoreTier::C), 1);

        let march: BTreeSet<MonthKey> = [MonthKey::new(Some(2025), 3)].into_iter().collect();
        let only_march = service.store_tiers(&ds, &FilterState::new(), Some(&march)).unwrap();
        let s1 = only_march.stores.iter().find(|r| r.store == "门店1").unwrap();
        assert_eq!(s1.tier, StoreTier::C);
    }

    #[test]
    fn test_quota_attainment_by_province() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.targets = Some(vec![
            TargetRecord {
                province: "广东".into(),
                category: Some("奶粉".into()),
                month: MonthKey::new(None, 1),
                quota: 200.0,
                row_number: 1,
            },
            TargetRecord {
                province: "广西".into(),
                category: Some("奶粉".into()),
                month: MonthKey::new(Some(2025), 1),
                quota: 0.0,
                row_number: 2,
            },
        ]);
        ds.performance = Some(vec![
            perf(2025, 1, "广东", 50.0, 1000.0),
            perf(2025, 1, "广西", 10.0, 100.0),
            perf(2025, 2, "广东", 99.0, 1000.0),
        ]);

        let window = TimeWindow::month(2025, 1).unwrap();
        let report = ReportService::new(&config)
            .quota_attainment(&ds, Dimension::Province, &window, &FilterState::new())
            .unwrap();

        let gd = report.rows.iter().find(|r| r.key == "广东").unwrap();
        assert_eq!(gd.attainment, Some(0.25));
        let gx = report.rows.iter().find(|r| r.key == "广西").unwrap();
        assert_eq!(gx.attainment, None);
        assert_eq!(report.total.target, 200.0);
        assert_eq!(report.total.actual, 60.0);

        assert!(ReportService::new(&config)
            .quota_attainment(&ds, Dimension::Store, &window, &FilterState::new())
            .is_err());
    }

    #[test]
    fn test_quota_attainment_rejects_distributor_scope() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.targets = Some(vec![TargetRecord {
            province: "广东".into(),
            category: Some("奶粉".into()),
            month: MonthKey::new(Some(2025), 1),
            quota: 100.0,
            row_number: 1,
        }]);
        ds.performance = Some(vec![
            perf(2025, 1, "广东", 50.0, 500.0),
            PerformanceRecord {
                distributor: "XYZ".into(),
                ..perf(2025, 1, "广东", 50.0, 500.0)
            },
        ]);
        let window = TimeWindow::month(2025, 1).unwrap();
        let service = ReportService::new(&config);

        let mut filter = FilterState::new();
        filter.distributors.insert("ABC".into());
        assert!(matches!(
            service.quota_attainment(&ds, Dimension::Province, &window, &filter),
            Err(EngineError::InvalidParameter(_))
        ));
        assert_eq!(service.kpi_summary(&ds, &window, &filter).attainment, None);

        let mut filter = FilterState::new();
        filter.stores.insert("门店1".into());
        assert!(service
            .quota_attainment(&ds, Dimension::Province, &window, &filter)
            .is_err());

        // 只按省区筛选时仍可比
        let mut filter = FilterState::new();
        filter.provinces.insert("广东".into());
        let report = service
            .quota_attainment(&ds, Dimension::Province, &window, &filter)
            .unwrap();
        assert_eq!(report.total.actual, 100.0);
        assert_eq!(report.total.attainment, Some(1.0));
    }

    #[test]
    fn test_scan_rate_report_converts_units() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.scans = Some((0..60).map(|_| scan(2025, 1, "广东")).collect());
        ds.outbound = Some(vec![tx(2025, 1, "广东", "ABC", 20.0), tx(2025, 1, "广西", "XYZ", 5.0)]);

        let window = TimeWindow::month(2025, 1).unwrap();
        let report = ReportService::new(&config)
            .scan_rate_report(&ds, Dimension::Province, &window, &FilterState::new())
            .unwrap();

        let gd = report.rows.iter().find(|r| r.key == "广东").unwrap();
        assert_eq!(gd.scan_boxes, 10.0);
        assert_eq!(gd.rate, Some(0.5));
        let gx = report.rows.iter().find(|r| r.key == "广西").unwrap();
        assert_eq!(gx.rate, Some(0.0));
        assert_eq!(report.total.scan_events, 60);
        assert_eq!(report.total.outbound_boxes, 25.0);
        assert_eq!(report.total.rate, Some(0.4));
    }

    #[test]
    fn test_scan_rate_joins_distributor_name_variants() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.scans = Some(
            (0..60)
                .map(|_| ScanEvent {
                    distributor: "广州华南商贸".into(),
                    ..scan(2025, 1, "广东")
                })
                .collect(),
        );
        ds.outbound = Some(vec![tx(2025, 1, "广东", "广州华南商贸有限公司", 20.0)]);

        let window = TimeWindow::month(2025, 1).unwrap();
        let report = ReportService::new(&config)
            .scan_rate_report(&ds, Dimension::Distributor, &window, &FilterState::new())
            .unwrap();

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.key, "广州华南商贸");
        assert_eq!(row.scan_boxes, 10.0);
        assert_eq!(row.outbound_boxes, 20.0);
        assert_eq!(row.rate, Some(0.5));
    }

    #[test]
    fn test_performance_comparison_and_kpis() {
        let config = DashboardConfig::default();
        let mut ds = NormalizedDataset::new("t.xlsx");
        ds.performance = Some(vec![perf(2025, 1, "广东", 50.0, 1200.0), perf(2024, 1, "广东", 40.0, 1000.0)]);
        ds.outbound = Some(vec![tx(2025, 1, "广东", "ABC", 30.0), tx(2024, 1, "广东", "ABC", 20.0)]);

        let window = TimeWindow::month(2025, 1).unwrap();
        let service = ReportService::new(&config);
        let cmp = service
            .performance_comparison(&ds, Dimension::Province, &window, &FilterState::new())
            .unwrap();
        assert!((cmp.amount.total.yoy.unwrap() - 0.2).abs() < 1e-9);
        assert!((cmp.boxes.total.yoy.unwrap() - 0.25).abs() < 1e-9);

        let kpi = service.kpi_summary(&ds, &window, &FilterState::new());
        assert_eq!(kpi.outbound_boxes, Some(30.0));
        assert!((kpi.outbound_yoy.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(kpi.performance_amount, Some(1200.0));
        assert_eq!(kpi.scan_rate, None);
        assert_eq!(kpi.attainment, None);
    }
}
