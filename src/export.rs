// ==========================================
// 经销数据看板 - 规范化表导出
// ==========================================
// 职责: 规范化记录 → RawTable → .xlsx 字节
// 红线: 导出列顺序与标准列名保持与导入一致，导出文件可被重新导入并得到相同的行与数值
// 规则: 多表导出时按业务表固定位置写工作表，缺失的表写空占位表，保证位置不偏移
// ==========================================

use crate::domain::columns as col;
use crate::domain::dataset::NormalizedDataset;
use crate::domain::outbound::OutboundTransaction;
use crate::domain::performance::PerformanceRecord;
use crate::domain::period::MonthKey;
use crate::domain::scan::ScanEvent;
use crate::domain::shipment::StoreShipmentRecord;
use crate::domain::stock::StockRecord;
use crate::domain::table::{CellValue, RawTable};
use crate::domain::target::TargetRecord;
use crate::domain::types::SheetKind;
use crate::importer::error::ImportResult;
use crate::perf::PerfGuard;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Excel 工作表名最长 31 字符
const MAX_SHEET_NAME: usize = 31;

fn headers(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn opt_text(value: &Option<String>) -> CellValue {
    value.as_deref().map(CellValue::text).unwrap_or(CellValue::Empty)
}

fn number(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn opt_number<T: Into<f64> + Copy>(value: Option<T>) -> CellValue {
    value.map(|v| CellValue::Number(v.into())).unwrap_or(CellValue::Empty)
}

// ==========================================
// 记录 → RawTable
// ==========================================

/// 门店出货（宽表：维度列 + 各月份列）
pub fn shipments_table(records: &[StoreShipmentRecord]) -> RawTable {
    let months: BTreeSet<MonthKey> = records
        .iter()
        .flat_map(|r| r.monthly.keys().copied())
        .collect();

    let mut labels = headers(&[col::PROVINCE, col::DISTRIBUTOR, col::STORE]);
    labels.extend(months.iter().map(|m| m.to_string()));

    let mut table = RawTable::new(SheetKind::Shipments.label(), labels);
    for r in records {
        let mut row = vec![text(&r.province), text(&r.distributor), text(&r.store)];
        row.extend(
            months
                .iter()
                .map(|m| r.monthly.get(m).map(|q| number(*q)).unwrap_or(CellValue::Empty)),
        );
        table.push_row(row);
    }
    table
}

/// 库存（12 列固定顺序 + 具体分类）
pub fn stock_table(records: &[StockRecord]) -> RawTable {
    let mut table = RawTable::new(
        SheetKind::Stock.label(),
        headers(&[
            col::DISTRIBUTOR_CODE,
            col::DISTRIBUTOR_FULL_NAME,
            col::PRODUCT_CODE,
            col::PRODUCT_NAME,
            col::STOCK_UNITS,
            col::STOCK_BOXES,
            col::PROVINCE,
            col::DISTRIBUTOR,
            col::CATEGORY,
            col::SUBCATEGORY,
            col::WEIGHT_SPEC,
            col::SIZE_SPEC,
            col::SPECIFIC_CLASS,
        ]),
    );
    for r in records {
        table.push_row(vec![
            opt_text(&r.distributor_code),
            opt_text(&r.distributor_full_name),
            opt_text(&r.product_code),
            text(&r.product_name),
            number(r.stock_units),
            number(r.stock_boxes),
            opt_text(&r.province),
            text(&r.distributor),
            opt_text(&r.category),
            opt_text(&r.subcategory),
            text(&r.weight_spec),
            opt_text(&r.size_spec),
            text(&r.specific_class),
        ]);
    }
    table
}

pub fn outbound_table(records: &[OutboundTransaction]) -> RawTable {
    let mut table = RawTable::new(
        SheetKind::Outbound.label(),
        headers(&[
            col::YEAR,
            col::MONTH,
            col::DAY,
            col::PROVINCE,
            col::DISTRIBUTOR,
            col::STORE,
            col::CATEGORY,
            col::SUBCATEGORY,
            col::BOXES,
        ]),
    );
    for r in records {
        table.push_row(vec![
            number(r.year as f64),
            number(r.month as f64),
            opt_number(r.day),
            text(&r.province),
            text(&r.distributor),
            opt_text(&r.store),
            opt_text(&r.category),
            opt_text(&r.subcategory),
            number(r.boxes),
        ]);
    }
    table
}

pub fn performance_table(records: &[PerformanceRecord]) -> RawTable {
    let mut table = RawTable::new(
        SheetKind::Performance.label(),
        headers(&[
            col::YEAR,
            col::MONTH,
            col::PROVINCE,
            col::DISTRIBUTOR,
            col::BOXES,
            col::AMOUNT,
            col::WAREHOUSE,
            col::MID_CATEGORY,
            col::GROUP,
            col::CATEGORY,
        ]),
    );
    for r in records {
        table.push_row(vec![
            number(r.year as f64),
            number(r.month as f64),
            text(&r.province),
            text(&r.distributor),
            number(r.boxes),
            number(r.amount),
            opt_text(&r.warehouse),
            opt_text(&r.mid_category),
            opt_text(&r.group),
            opt_text(&r.top_category),
        ]);
    }
    table
}

pub fn targets_table(records: &[TargetRecord]) -> RawTable {
    let mut table = RawTable::new(
        SheetKind::Targets.label(),
        headers(&[col::PROVINCE, col::CATEGORY, col::MONTH, col::QUOTA]),
    );
    for r in records {
        table.push_row(vec![
            text(&r.province),
            opt_text(&r.category),
            text(&r.month.to_string()),
            number(r.quota),
        ]);
    }
    table
}

pub fn scans_table(records: &[ScanEvent]) -> RawTable {
    let mut table = RawTable::new(
        SheetKind::Scans.label(),
        headers(&[
            col::STORE,
            col::DISTRIBUTOR,
            col::PROVINCE,
            col::CATEGORY,
            col::SUBCATEGORY,
            col::COORDINATES,
            col::YEAR,
            col::MONTH,
            col::DAY,
        ]),
    );
    for r in records {
        let coordinates = match (r.longitude, r.latitude) {
            (Some(lon), Some(lat)) => CellValue::text(format!("{},{}", lon, lat)),
            _ => CellValue::Empty,
        };
        table.push_row(vec![
            opt_text(&r.store),
            text(&r.distributor),
            text(&r.province),
            opt_text(&r.category),
            opt_text(&r.subcategory),
            coordinates,
            number(r.year as f64),
            number(r.month as f64),
            opt_number(r.day),
        ]);
    }
    table
}

/// 数据集中某张表（缺失 → None）
pub fn dataset_table(dataset: &NormalizedDataset, kind: SheetKind) -> Option<RawTable> {
    match kind {
        SheetKind::Shipments => dataset.shipments.as_deref().map(shipments_table),
        SheetKind::Stock => dataset.stock.as_deref().map(stock_table),
        SheetKind::Outbound => dataset.outbound.as_deref().map(outbound_table),
        SheetKind::Performance => dataset.performance.as_deref().map(performance_table),
        SheetKind::Targets => dataset.targets.as_deref().map(targets_table),
        SheetKind::Scans => dataset.scans.as_deref().map(scans_table),
    }
}

// ==========================================
// RawTable → .xlsx
// ==========================================

/// 工作表名去除非法字符并截断
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

fn write_table(worksheet: &mut Worksheet, table: &RawTable, header: &Format) -> Result<(), XlsxError> {
    worksheet.set_name(sheet_name(&table.name))?;
    for (c, label) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, label, header)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let excel_col = c as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(v) => {
                    worksheet.write_number(excel_row, excel_col, *v)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(excel_row, excel_col, s)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(excel_row, excel_col, *b)?;
                }
            }
        }
    }
    Ok(())
}

/// 多表写入同一工作簿（每表一个工作表，顺序保持）
pub fn tables_to_xlsx(tables: &[RawTable]) -> ImportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    for table in tables {
        write_table(workbook.add_worksheet(), table, &header)?;
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn table_to_xlsx(table: &RawTable) -> ImportResult<Vec<u8>> {
    tables_to_xlsx(std::slice::from_ref(table))
}

/// 导出整个数据集（6 个位置，缺失的表写空占位表）
pub fn export_dataset(dataset: &NormalizedDataset) -> ImportResult<Vec<u8>> {
    let mut guard = PerfGuard::new("dataset_export");
    let tables: Vec<RawTable> = export_order()
        .into_iter()
        .map(|kind| {
            dataset_table(dataset, kind)
                .unwrap_or_else(|| RawTable::new(kind.label(), Vec::new()))
        })
        .collect();
    guard.add_rows(tables.iter().map(RawTable::len).sum());

    let bytes = tables_to_xlsx(&tables)?;
    info!(source = %dataset.source_name, bytes = bytes.len(), "数据集导出完成");
    Ok(bytes)
}

/// 写入文件
pub fn save_tables<P: AsRef<Path>>(path: P, tables: &[RawTable]) -> ImportResult<()> {
    let bytes = tables_to_xlsx(tables)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// 工作表位置顺序（与导入时的位置约定一致）
fn export_order() -> [SheetKind; 6] {
    [
        SheetKind::Shipments,
        SheetKind::Stock,
        SheetKind::Outbound,
        SheetKind::Performance,
        SheetKind::Targets,
        SheetKind::Scans,
    ]
}
