// ==========================================
// 经销数据看板 - 数据质量校验器实现
// ==========================================
// 职责: 表结构校验 / 库存重量规格过滤 / 剔除行计数 / 负数量提示
// 输出: DqViolation 列表，由导入流程写入诊断日志
// ==========================================

use crate::domain::stock::StockRecord;
use crate::domain::table::RawTable;
use crate::domain::types::SheetKind;
use crate::importer::diagnostics::{DiagLevel, DiagnosticLog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 库存表最少列数
pub const STOCK_MIN_COLUMNS: usize = 12;

/// 单条数据质量问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub sheet: SheetKind,
    pub row_number: Option<usize>,
    pub level: DiagLevel,
    pub field: String,
    pub message: String,
}

impl DqViolation {
    /// 写入诊断日志
    pub fn record(&self, log: &mut DiagnosticLog) {
        let message = match self.row_number {
            Some(row) => format!("第 {} 行 [{}] {}", row, self.field, self.message),
            None => format!("[{}] {}", self.field, self.message),
        };
        let sheet = Some(self.sheet.label());
        match self.level {
            DiagLevel::Info => log.info(sheet, message),
            DiagLevel::Warning => log.warn(sheet, message),
            DiagLevel::Error => log.error(sheet, message),
        }
    }
}

pub struct DqValidator {
    allowed_weight_specs: BTreeSet<String>,
}

impl DqValidator {
    pub fn new(allowed_weight_specs: &[String]) -> Self {
        Self {
            allowed_weight_specs: allowed_weight_specs.iter().cloned().collect(),
        }
    }

    /// 库存表结构校验（列数 < 12 → 库存视图无数据）
    pub fn validate_stock_width(&self, table: &RawTable) -> Option<DqViolation> {
        if table.width() >= STOCK_MIN_COLUMNS {
            return None;
        }
        Some(DqViolation {
            sheet: SheetKind::Stock,
            row_number: None,
            level: DiagLevel::Error,
            field: "<表结构>".to_string(),
            message: format!(
                "库存表仅 {} 列，至少需要 {} 列，库存视图无数据",
                table.width(),
                STOCK_MIN_COLUMNS
            ),
        })
    }

    pub fn is_allowed_weight_spec(&self, spec: &str) -> bool {
        self.allowed_weight_specs.contains(spec)
    }

    /// 重量规格过滤
    ///
    /// # 规则
    /// - 仅保留重量规格在允许集合内的行（剔除，不是隐藏）
    /// - 某经销商的全部行都被剔除时，产生一条 Warning
    ///
    /// # 返回
    /// - (保留的记录, 问题列表)
    pub fn filter_weight_specs(
        &self,
        records: Vec<StockRecord>,
    ) -> (Vec<StockRecord>, Vec<DqViolation>) {
        let mut kept_by_distributor: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            let entry = kept_by_distributor
                .entry(record.distributor.clone())
                .or_insert((0, 0));
            entry.0 += 1;
            if self.is_allowed_weight_spec(&record.weight_spec) {
                entry.1 += 1;
                kept.push(record);
            }
        }

        let violations = kept_by_distributor
            .into_iter()
            .filter(|(_, (total, kept))| *total > 0 && *kept == 0)
            .map(|(distributor, (total, _))| DqViolation {
                sheet: SheetKind::Stock,
                row_number: None,
                level: DiagLevel::Warning,
                field: "重量规格".to_string(),
                message: format!(
                    "经销商 '{}' 的 {} 行库存重量规格均不在允许范围 {:?}，已全部剔除",
                    distributor, total, self.allowed_weight_specs
                ),
            })
            .collect();

        (kept, violations)
    }

    /// 剔除行汇总（年份/月份等关键字段无法解析）
    pub fn dropped_rows(&self, sheet: SheetKind, dropped: usize, reason: &str) -> Option<DqViolation> {
        if dropped == 0 {
            return None;
        }
        Some(DqViolation {
            sheet,
            row_number: None,
            level: DiagLevel::Warning,
            field: "<行>".to_string(),
            message: format!("剔除 {} 行：{}", dropped, reason),
        })
    }

    /// 负数量提示（退货冲减等，保留但提示）
    pub fn validate_non_negative(
        &self,
        sheet: SheetKind,
        row_number: usize,
        field: &str,
        value: f64,
    ) -> Option<DqViolation> {
        if value >= 0.0 {
            return None;
        }
        Some(DqViolation {
            sheet,
            row_number: Some(row_number),
            level: DiagLevel::Warning,
            field: field.to_string(),
            message: format!("数量为负数: {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(distributor: &str, spec: &str, row: usize) -> StockRecord {
        StockRecord {
            distributor_code: None,
            distributor_full_name: None,
            product_code: None,
            product_name: "奶粉".into(),
            stock_units: 6.0,
            stock_boxes: 1.0,
            province: None,
            distributor: distributor.into(),
            category: None,
            subcategory: None,
            weight_spec: spec.into(),
            size_spec: None,
            specific_class: "其他".into(),
            row_number: row,
        }
    }

    fn validator() -> DqValidator {
        DqValidator::new(&["700".into(), "800".into(), "800新包装".into()])
    }

    #[test]
    fn test_weight_spec_filter_drops_rows() {
        let (kept, violations) = validator().filter_weight_specs(vec![
            stock("ABC", "700", 1),
            stock("ABC", "400", 2),
            stock("ABC", "800新包装", 3),
        ]);
        assert_eq!(kept.len(), 2);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_warning_when_distributor_fully_removed() {
        let (kept, violations) = validator().filter_weight_specs(vec![
            stock("ABC", "700", 1),
            stock("XYZ", "400", 2),
            stock("XYZ", "900", 3),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DiagLevel::Warning);
        assert!(violations[0].message.contains("XYZ"));
    }

    #[test]
    fn test_stock_width_check() {
        let narrow = RawTable::new("库存", (0..11).map(|i| i.to_string()).collect());
        let wide = RawTable::new("库存", (0..12).map(|i| i.to_string()).collect());

        let v = validator().validate_stock_width(&narrow).unwrap();
        assert_eq!(v.level, DiagLevel::Error);
        assert!(validator().validate_stock_width(&wide).is_none());
    }

    #[test]
    fn test_violation_is_recorded_with_sheet_label() {
        let mut log = DiagnosticLog::new();
        validator()
            .validate_non_negative(SheetKind::Outbound, 7, "箱数", -2.0)
            .unwrap()
            .record(&mut log);

        assert_eq!(log.entries()[0].sheet.as_deref(), Some("出库"));
        assert!(log.contains("第 7 行"));
        assert!(validator().dropped_rows(SheetKind::Outbound, 0, "x").is_none());
    }
}
