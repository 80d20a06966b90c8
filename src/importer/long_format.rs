// ==========================================
// 经销数据看板 - 门店出货长表识别与透视
// ==========================================
// 职责: 判断表1是否为长表（门店 × 月份 × 数量 三元组），是则透视为宽表
// 输出: 宽表表头 = [省区, 经销商名称, 门店名称, 月份...]（月份按时间先后）
// 红线: 缺门店列时以经销商名称占位，必须写入诊断日志
// ==========================================

use crate::domain::columns as col;
use crate::domain::period::MonthKey;
use crate::domain::table::{CellValue, RawTable};
use crate::importer::column_resolver::{specs, ColumnResolver};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::diagnostics::DiagnosticLog;
use std::collections::{BTreeMap, BTreeSet};

/// 时间列的表头提示（优先采样这些列）
const TIME_HEADER_HINTS: [&str; 4] = ["月份", "月", "时间", "日期"];

pub struct LongFormatPivot {
    sample_size: usize,
    cleaner: DataCleaner,
}

impl LongFormatPivot {
    pub fn new(sample_size: usize, cleaner: DataCleaner) -> Self {
        Self {
            sample_size: sample_size.max(1),
            cleaner,
        }
    }

    /// 识别长表的时间列
    ///
    /// # 规则
    /// - 先采样表头含时间提示的列，再采样其余列
    /// - 每列取前 sample_size 个非空值，过半为月份样式文本（"1月" / "2025-01"）即判定
    ///
    /// # 返回
    /// - Some(列下标): 长表
    /// - None: 宽表
    pub fn detect_time_column(&self, table: &RawTable) -> Option<usize> {
        let (hinted, rest): (Vec<usize>, Vec<usize>) = (0..table.width())
            .partition(|&i| TIME_HEADER_HINTS.iter().any(|h| table.headers[i].contains(h)));

        hinted
            .into_iter()
            .chain(rest)
            .find(|&i| self.column_is_month_like(table, i))
    }

    fn column_is_month_like(&self, table: &RawTable, column: usize) -> bool {
        let sample: Vec<&CellValue> = table
            .column(column)
            .filter(|c| !c.is_empty())
            .take(self.sample_size)
            .collect();
        if sample.is_empty() {
            return false;
        }
        let hits = sample
            .iter()
            .filter(|c| self.cleaner.looks_like_month(c))
            .count();
        hits * 2 > sample.len()
    }

    /// 长表透视为宽表
    ///
    /// # 参数
    /// - table: 已完成维度列解析的长表（省区/经销商名称/门店名称 已规范）
    /// - time_column: detect_time_column 的结果
    ///
    /// # 规则
    /// - 按 (省区, 经销商, 门店) 分组，月份为新列，数量求和
    /// - 月份值不带年份且存在年份列时，补上该行年份
    /// - 月份无法解析或缺经销商的行剔除并计数
    pub fn pivot(
        &self,
        table: &mut RawTable,
        time_column: usize,
        sheet: &str,
        log: &mut DiagnosticLog,
    ) -> RawTable {
        table.rename_column(time_column, col::MONTH);
        ColumnResolver.resolve(table, specs::SHIPMENT_LONG, sheet, log);

        let province_col = table.column_index(col::PROVINCE);
        let distributor_col = table.column_index(col::DISTRIBUTOR);
        let store_col = table.column_index(col::STORE);
        let year_col = table.column_index(col::YEAR);
        let quantity_col = table.column_index(col::QUANTITY);

        if store_col.is_none() {
            log.warn(
                Some(sheet),
                "长表缺少门店列，以经销商名称作为门店占位",
            );
        }
        if quantity_col.is_none() {
            log.warn(Some(sheet), "长表缺少数量列，出货量按 0 计");
        }

        let mut grouped: BTreeMap<(String, String, String), BTreeMap<MonthKey, f64>> =
            BTreeMap::new();
        let mut months: BTreeSet<MonthKey> = BTreeSet::new();
        let mut dropped = 0usize;

        for row in 0..table.len() {
            let text_at = |c: Option<usize>| c.and_then(|c| self.cleaner.text(table.cell(row, c)));

            let distributor = match text_at(distributor_col) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let mut month = match self.cleaner.parse_month_key(table.cell(row, time_column)) {
                Some(m) => m,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            if month.year.is_none() {
                month.year = year_col.and_then(|c| self.cleaner.parse_year(table.cell(row, c)));
            }

            let province = text_at(province_col).unwrap_or_default();
            let store = text_at(store_col).unwrap_or_else(|| distributor.clone());
            let quantity = quantity_col
                .and_then(|c| self.cleaner.number(table.cell(row, c)))
                .unwrap_or(0.0);

            months.insert(month);
            *grouped
                .entry((province, distributor, store))
                .or_default()
                .entry(month)
                .or_insert(0.0) += quantity;
        }

        if dropped > 0 {
            log.warn(
                Some(sheet),
                format!("长表透视剔除 {} 行（月份无法解析或缺经销商）", dropped),
            );
        }

        let mut headers = vec![
            col::PROVINCE.to_string(),
            col::DISTRIBUTOR.to_string(),
            col::STORE.to_string(),
        ];
        headers.extend(months.iter().map(MonthKey::to_string));

        let mut wide = RawTable::new(table.name.clone(), headers);
        for ((province, distributor, store), by_month) in grouped {
            let mut row = vec![
                CellValue::Text(province),
                CellValue::Text(distributor),
                CellValue::Text(store),
            ];
            row.extend(
                months
                    .iter()
                    .map(|m| CellValue::Number(by_month.get(m).copied().unwrap_or(0.0))),
            );
            wide.push_row(row);
        }

        log.info(
            Some(sheet),
            format!(
                "长表已透视: {} 行 → {} 个门店 × {} 个月",
                table.len(),
                wide.len(),
                months.len()
            ),
        );
        wide
    }
}
