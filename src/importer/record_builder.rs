// ==========================================
// 经销数据看板 - 业务记录构建
// ==========================================
// 职责: 列名解析后的 RawTable → 领域记录
// 流程: 列名解析 → 必需列检查 → 逐行清洗/类型转换 → 派生 → DQ
// 红线: 结构不符返回 None（该视图无数据），不中断其他表
// ==========================================

use crate::config::DashboardConfig;
use crate::domain::columns as col;
use crate::domain::outbound::OutboundTransaction;
use crate::domain::performance::PerformanceRecord;
use crate::domain::period::MonthKey;
use crate::domain::scan::ScanEvent;
use crate::domain::shipment::StoreShipmentRecord;
use crate::domain::stock::StockRecord;
use crate::domain::table::{CellValue, RawTable};
use crate::domain::target::TargetRecord;
use crate::domain::types::SheetKind;
use crate::importer::column_resolver::{specs, ColumnResolver, FieldSpec};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::derivation::{ProductFacts, SpecificClassifier};
use crate::importer::diagnostics::DiagnosticLog;
use crate::importer::dq_validator::{DqValidator, DqViolation};
use crate::importer::long_format::LongFormatPivot;
use chrono::Datelike;
use std::collections::HashMap;

/// 单表逐条写入日志的负数量提示上限（其余汇总为一条）
const MAX_ROW_WARNINGS: usize = 20;

pub struct RecordBuilder<'a> {
    config: &'a DashboardConfig,
    cleaner: DataCleaner,
    dq: DqValidator,
    classifier: SpecificClassifier,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self {
            config,
            cleaner: DataCleaner::new(config.coordinate_ranges),
            dq: DqValidator::new(&config.allowed_weight_specs),
            classifier: SpecificClassifier::from_config(config),
        }
    }

    // ==========================================
    // 通用辅助
    // ==========================================

    fn resolve(&self, table: &mut RawTable, fields: &[FieldSpec], kind: SheetKind, log: &mut DiagnosticLog) {
        ColumnResolver.resolve(table, fields, kind.label(), log);
    }

    /// 必需列检查；缺失时记 Error 并返回 false
    fn require(&self, table: &RawTable, labels: &[&str], kind: SheetKind, log: &mut DiagnosticLog) -> bool {
        let missing: Vec<&str> = labels
            .iter()
            .copied()
            .filter(|l| table.column_index(l).is_none())
            .collect();
        if missing.is_empty() {
            return true;
        }
        log.error(
            Some(kind.label()),
            format!("缺少必需列 {:?}，该视图无数据", missing),
        );
        false
    }

    fn text(&self, table: &RawTable, row: usize, label: &str) -> Option<String> {
        self.cleaner.text(table.value(row, label))
    }

    fn number(&self, table: &RawTable, row: usize, label: &str) -> f64 {
        self.cleaner.number(table.value(row, label)).unwrap_or(0.0)
    }

    fn category(&self, table: &RawTable, row: usize, label: &str) -> Option<String> {
        self.text(table, row, label)
            .map(|c| self.config.canonical_category(&c).to_string())
    }

    /// 年/月/日抽取
    ///
    /// # 规则
    /// 1. 年、月分别从年份列、月份列抽取（月份列自带年份时可补年份）
    /// 2. 抽取失败时，尝试把年份/月份/日列当完整日期解析
    fn time_fields(&self, table: &RawTable, row: usize) -> Option<(i32, u32, Option<u32>)> {
        let year_cell = table.value(row, col::YEAR);
        let month_cell = table.value(row, col::MONTH);
        let day_cell = table.value(row, col::DAY);

        let month_key = self.cleaner.parse_month_key(month_cell);
        let year = self
            .cleaner
            .parse_year(year_cell)
            .or_else(|| month_key.and_then(|k| k.year));
        if let (Some(year), Some(key)) = (year, month_key) {
            return Some((year, key.month, self.cleaner.parse_day(day_cell)));
        }

        [year_cell, month_cell, day_cell]
            .into_iter()
            .find_map(|c| self.cleaner.parse_date(c))
            .map(|d| (d.year(), d.month(), Some(d.day())))
    }

    fn record_violations(&self, violations: Vec<DqViolation>, kind: SheetKind, log: &mut DiagnosticLog) {
        let total = violations.len();
        for v in violations.iter().take(MAX_ROW_WARNINGS) {
            v.record(log);
        }
        if total > MAX_ROW_WARNINGS {
            log.warn(
                Some(kind.label()),
                format!("另有 {} 条同类提示未逐条列出", total - MAX_ROW_WARNINGS),
            );
        }
    }

    fn record_dropped(&self, kind: SheetKind, dropped: usize, reason: &str, log: &mut DiagnosticLog) {
        if let Some(v) = self.dq.dropped_rows(kind, dropped, reason) {
            v.record(log);
        }
    }

    // ==========================================
    // 表1 门店出货
    // ==========================================

    /// 门店出货（宽表/长表自动识别）
    ///
    /// # 规则
    /// - 月份列 = 表头为月份样式的列（"1月" / "2025年1月" / "2025-01"）
    /// - 同一 (省区, 经销商, 门店) 多行合并
    /// - 缺门店列时以经销商名称占位并记录
    pub fn shipments(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<StoreShipmentRecord>> {
        let kind = SheetKind::Shipments;
        self.resolve(&mut table, specs::SHIPMENT_KEYS, kind, log);
        if !self.require(&table, &[col::DISTRIBUTOR], kind, log) {
            return None;
        }

        let pivot = LongFormatPivot::new(self.config.long_format_sample_size, DataCleaner::new(self.config.coordinate_ranges));
        let table = match pivot.detect_time_column(&table) {
            Some(time_col) => {
                log.info(Some(kind.label()), format!("识别为长表，时间列 '{}'", table.headers[time_col]));
                pivot.pivot(&mut table, time_col, kind.label(), log)
            }
            None => table,
        };

        let month_columns: Vec<(usize, MonthKey)> = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let header = CellValue::text(h.as_str());
                if self.cleaner.looks_like_month(&header) {
                    self.cleaner.parse_month_key(&header).map(|k| (i, k))
                } else {
                    None
                }
            })
            .collect();
        if month_columns.is_empty() {
            log.error(Some(kind.label()), "未找到任何月份列，该视图无数据");
            return None;
        }

        let has_store = table.column_index(col::STORE).is_some();
        if !has_store {
            log.warn(Some(kind.label()), "缺少门店列，以经销商名称作为门店占位");
        }

        let mut records: Vec<StoreShipmentRecord> = Vec::new();
        let mut index: HashMap<(String, String, String), usize> = HashMap::new();
        let mut dropped = 0usize;
        let mut violations = Vec::new();

        for row in 0..table.len() {
            let distributor = match self.text(&table, row, col::DISTRIBUTOR) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let province = self.text(&table, row, col::PROVINCE).unwrap_or_default();
            let store = self
                .text(&table, row, col::STORE)
                .unwrap_or_else(|| distributor.clone());

            let key = (province.clone(), distributor.clone(), store.clone());
            let slot = *index.entry(key).or_insert_with(|| {
                records.push(StoreShipmentRecord::new(province, distributor, store));
                records.len() - 1
            });

            for (c, month) in &month_columns {
                let qty = self.cleaner.number(table.cell(row, *c)).unwrap_or(0.0);
                if let Some(v) = self.dq.validate_non_negative(kind, row + 1, &table.headers[*c], qty) {
                    violations.push(v);
                }
                records[slot].add_quantity(*month, qty);
            }
        }

        self.record_dropped(kind, dropped, "缺经销商名称", log);
        self.record_violations(violations, kind, log);
        Some(records)
    }

    // ==========================================
    // 表2 库存
    // ==========================================

    /// 库存（12 列固定顺序）
    ///
    /// # 规则
    /// - 列数 < 12 → 无数据
    /// - 重量规格不在允许集合 → 载入时剔除；某经销商被全部剔除时告警
    /// - 具体分类按 子品牌 → 段位 → 其他 派生
    pub fn stock(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<StockRecord>> {
        let kind = SheetKind::Stock;
        if let Some(v) = self.dq.validate_stock_width(&table) {
            v.record(log);
            return None;
        }
        self.resolve(&mut table, specs::STOCK, kind, log);

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;
        let mut violations = Vec::new();

        for row in 0..table.len() {
            let distributor = match self.text(&table, row, col::DISTRIBUTOR) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let product_name = self.text(&table, row, col::PRODUCT_NAME).unwrap_or_default();
            let category = self.category(&table, row, col::CATEGORY);
            let specific_class = self.classifier.classify(&ProductFacts {
                product_name: &product_name,
                category: category.as_deref(),
            });
            let stock_boxes = self.number(&table, row, col::STOCK_BOXES);
            if let Some(v) = self.dq.validate_non_negative(kind, row + 1, col::STOCK_BOXES, stock_boxes) {
                violations.push(v);
            }

            records.push(StockRecord {
                distributor_code: self.text(&table, row, col::DISTRIBUTOR_CODE),
                distributor_full_name: self.text(&table, row, col::DISTRIBUTOR_FULL_NAME),
                product_code: self.text(&table, row, col::PRODUCT_CODE),
                product_name,
                stock_units: self.number(&table, row, col::STOCK_UNITS),
                stock_boxes,
                province: self.text(&table, row, col::PROVINCE),
                distributor,
                category,
                subcategory: self.text(&table, row, col::SUBCATEGORY),
                weight_spec: self
                    .cleaner
                    .normalize_weight_spec(table.value(row, col::WEIGHT_SPEC))
                    .unwrap_or_default(),
                size_spec: self.text(&table, row, col::SIZE_SPEC),
                specific_class,
                row_number: row + 1,
            });
        }

        let before = records.len();
        let (kept, spec_violations) = self.dq.filter_weight_specs(records);
        for v in &spec_violations {
            v.record(log);
        }
        if kept.len() < before {
            log.info(
                Some(kind.label()),
                format!("重量规格过滤剔除 {} 行，保留 {} 行", before - kept.len(), kept.len()),
            );
        }

        self.record_dropped(kind, dropped, "缺经销商简称", log);
        self.record_violations(violations, kind, log);
        Some(kept)
    }

    // ==========================================
    // 表3 出库流水
    // ==========================================
    pub fn outbound(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<OutboundTransaction>> {
        let kind = SheetKind::Outbound;
        self.resolve(&mut table, specs::OUTBOUND, kind, log);
        if !self.require(&table, &[col::YEAR, col::MONTH, col::DISTRIBUTOR, col::BOXES], kind, log) {
            return None;
        }

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;
        let mut violations = Vec::new();

        for row in 0..table.len() {
            let (year, month, day) = match self.time_fields(&table, row) {
                Some(t) => t,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let distributor = match self.text(&table, row, col::DISTRIBUTOR) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let boxes = self.number(&table, row, col::BOXES);
            if let Some(v) = self.dq.validate_non_negative(kind, row + 1, col::BOXES, boxes) {
                violations.push(v);
            }

            records.push(OutboundTransaction {
                year,
                month,
                day,
                province: self.text(&table, row, col::PROVINCE).unwrap_or_default(),
                distributor,
                store: self.text(&table, row, col::STORE),
                category: self.category(&table, row, col::CATEGORY),
                subcategory: self.text(&table, row, col::SUBCATEGORY),
                boxes,
                row_number: row + 1,
            });
        }

        self.record_dropped(kind, dropped, "年份/月份无法解析或缺经销商", log);
        self.record_violations(violations, kind, log);
        Some(records)
    }

    // ==========================================
    // 表4 业绩台账
    // ==========================================
    pub fn performance(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<PerformanceRecord>> {
        let kind = SheetKind::Performance;
        self.resolve(&mut table, specs::PERFORMANCE, kind, log);
        if !self.require(&table, &[col::YEAR, col::MONTH, col::PROVINCE, col::DISTRIBUTOR], kind, log) {
            return None;
        }

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;

        for row in 0..table.len() {
            let (year, month, _) = match self.time_fields(&table, row) {
                Some(t) => t,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let distributor = match self.text(&table, row, col::DISTRIBUTOR) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            records.push(PerformanceRecord {
                year,
                month,
                province: self.text(&table, row, col::PROVINCE).unwrap_or_default(),
                distributor,
                warehouse: self.text(&table, row, col::WAREHOUSE),
                top_category: self.category(&table, row, col::CATEGORY),
                mid_category: self.text(&table, row, col::MID_CATEGORY),
                group: self.text(&table, row, col::GROUP),
                amount: self.number(&table, row, col::AMOUNT),
                boxes: self.number(&table, row, col::BOXES),
                row_number: row + 1,
            });
        }

        self.record_dropped(kind, dropped, "年份/月份无法解析或缺经销商", log);
        Some(records)
    }

    // ==========================================
    // 表5 任务
    // ==========================================
    pub fn targets(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<TargetRecord>> {
        let kind = SheetKind::Targets;
        self.resolve(&mut table, specs::TARGETS, kind, log);
        if !self.require(&table, &[col::PROVINCE, col::MONTH, col::QUOTA], kind, log) {
            return None;
        }

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;

        for row in 0..table.len() {
            let province = self.text(&table, row, col::PROVINCE);
            let month = self.cleaner.parse_month_key(table.value(row, col::MONTH));
            let (province, month) = match (province, month) {
                (Some(p), Some(m)) => (p, m),
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            records.push(TargetRecord {
                province,
                category: self.category(&table, row, col::CATEGORY),
                month,
                quota: self.number(&table, row, col::QUOTA),
                row_number: row + 1,
            });
        }

        self.record_dropped(kind, dropped, "缺省区或月份无法解析", log);
        Some(records)
    }

    // ==========================================
    // 表6 扫码溯源
    // ==========================================
    pub fn scans(&self, mut table: RawTable, log: &mut DiagnosticLog) -> Option<Vec<ScanEvent>> {
        let kind = SheetKind::Scans;
        self.resolve(&mut table, specs::SCANS, kind, log);
        if !self.require(&table, &[col::DISTRIBUTOR, col::YEAR, col::MONTH], kind, log) {
            return None;
        }

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;
        let mut unplaced = 0usize;

        for row in 0..table.len() {
            let (year, month, day) = match self.time_fields(&table, row) {
                Some(t) => t,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let distributor = match self.text(&table, row, col::DISTRIBUTOR) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let (longitude, latitude) = match self.text(&table, row, col::COORDINATES) {
                Some(raw) => self.cleaner.parse_coordinates(&raw),
                None => (None, None),
            };
            if longitude.is_none() {
                unplaced += 1;
            }

            records.push(ScanEvent {
                year,
                month,
                day,
                store: self.text(&table, row, col::STORE),
                distributor,
                province: self.text(&table, row, col::PROVINCE).unwrap_or_default(),
                category: self.category(&table, row, col::CATEGORY),
                subcategory: self.text(&table, row, col::SUBCATEGORY),
                longitude,
                latitude,
                row_number: row + 1,
            });
        }

        if unplaced > 0 {
            log.info(Some(kind.label()), format!("{} 条扫码记录经纬度缺失或无法识别", unplaced));
        }
        self.record_dropped(kind, dropped, "年份/月份无法解析或缺经销商", log);
        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut t = RawTable::new(name, headers.iter().map(|s| s.to_string()).collect());
        for r in rows {
            t.push_row(r);
        }
        t
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn s(v: &str) -> CellValue {
        CellValue::text(v)
    }

    #[test]
    fn test_wide_shipments_merge_and_placeholder() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table(
            "门店出货",
            &["省区", "客户简称", "2025年1月", "2025年2月", "总出货"],
            vec![
                vec![s("广东"), s("ABC"), n(3.0), n(1.0), n(4.0)],
                vec![s("广东"), s("ABC"), n(1.0), n(0.0), n(1.0)],
            ],
        );

        let records = builder.shipments(t, &mut log).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store, "ABC");
        assert_eq!(records[0].total(), 5.0);
        assert_eq!(records[0].active_months(), 2);
        assert!(log.contains("占位"));
    }

    #[test]
    fn test_long_shipments_are_pivoted() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table(
            "门店出货",
            &["省区", "经销商名称", "门店名称", "月份", "数量"],
            vec![
                vec![s("广东"), s("ABC"), s("一店"), s("1月"), n(2.0)],
                vec![s("广东"), s("ABC"), s("一店"), s("2月"), n(4.0)],
            ],
        );

        let records = builder.shipments(t, &mut log).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].average(), 3.0);
        assert!(log.contains("长表"));
    }

    #[test]
    fn test_narrow_stock_sheet_has_no_data() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table("库存", &["a", "b", "c"], vec![vec![s("1"), s("2"), s("3")]]);

        assert!(builder.stock(t, &mut log).is_none());
        assert!(log.has_errors());
    }

    #[test]
    fn test_stock_rows_filtered_and_classified() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let row = |name: &str, spec: CellValue| {
            vec![
                s("C001"), s("ABC商贸有限公司"), s("P1"), s(name), n(60.0), n(10.0),
                s("广东"), s("ABC"), s("婴幼儿奶粉"), s("配方粉"), spec, s("6罐/箱"),
            ]
        };
        let t = table(
            "库存",
            &["经销商编码", "经销商全称", "产品编码", "产品名称", "库存数量", "库存箱数",
              "省区", "经销商名称", "大类", "小类", "重量规格", "规格"],
            vec![
                row("婴儿配方奶粉2段", n(800.0)),
                row("金装奶粉", s("700g")),
                row("试用装", n(400.0)),
            ],
        );

        let records = builder.stock(t, &mut log).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].specific_class, "2段");
        assert_eq!(records[0].weight_spec, "800");
        assert_eq!(records[1].specific_class, "金装");
    }

    #[test]
    fn test_outbound_two_digit_year_and_dropped_rows() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table(
            "出库",
            &["年份", "月份", "日", "省区", "经销商名称", "门店名称", "大类", "小类", "箱数"],
            vec![
                vec![s("25年"), s("1月"), s("15日"), s("广东"), s("ABC"), s("一店"), s("奶粉"), s("x"), n(3.0)],
                vec![s("未知"), s("1月"), s("1"), s("广东"), s("ABC"), s("一店"), s("奶粉"), s("x"), n(3.0)],
                vec![s("2025"), s("2月"), CellValue::Empty, s("广东"), s("ABC"), CellValue::Empty, s("奶粉"), s("x"), n(-1.0)],
            ],
        );

        let records = builder.outbound(t, &mut log).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].year, records[0].month, records[0].day), (2025, 1, Some(15)));
        assert_eq!(records[1].store, None);
        assert!(log.contains("剔除 1 行"));
        assert!(log.contains("数量为负数"));
    }

    #[test]
    fn test_scan_coordinates_and_positional_columns() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table(
            "扫码",
            &["c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"],
            vec![vec![
                s("一店"), s("ABC"), s("广东"), s("奶粉"), s("2段"),
                s("39.9,116.4"), n(2025.0), n(3.0), n(8.0),
            ]],
        );

        let records = builder.scans(t, &mut log).unwrap();
        assert_eq!(records[0].longitude, Some(116.4));
        assert_eq!(records[0].latitude, Some(39.9));
        assert_eq!((records[0].year, records[0].month, records[0].day), (2025, 3, Some(8)));
        assert!(log.contains("回退"));
    }

    #[test]
    fn test_targets_columns_four_to_six() {
        let config = DashboardConfig::default();
        let builder = RecordBuilder::new(&config);
        let mut log = DiagnosticLog::new();
        let t = table(
            "任务",
            &["省区", "负责人", "备注", "x", "y", "z"],
            vec![vec![s("广东"), s("张三"), CellValue::Empty, s("奶粉"), s("2025年3月"), n(120.0)]],
        );

        let records = builder.targets(t, &mut log).unwrap();
        assert_eq!(records[0].category.as_deref(), Some("奶粉"));
        assert_eq!(records[0].month, MonthKey::new(Some(2025), 3));
        assert_eq!(records[0].quota, 120.0);
    }
}
