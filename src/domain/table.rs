// ==========================================
// 经销数据看板 - 原始表结构
// ==========================================
// 职责: 工作表读入后的统一表示（表头 + 单元格矩阵）
// 说明: 列名规范化、长表透视、导出均在此结构上操作
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元格值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        CellValue::Text(value.into())
    }

    /// 空单元格或空白文本
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 取文本（去首尾空白，空值返回 None）
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(format_plain_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }

    /// 取数值（文本允许千分位逗号）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_plain_number(*n)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or(CellValue::Empty)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }
}

/// 整数值不带小数点输出（700.0 → "700"）
fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 原始表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawTable {
    /// 表名（工作表名或导出名）
    pub name: String,

    /// 表头（已去首尾空白）
    pub headers: Vec<String>,

    /// 数据行（每行长度与表头一致）
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(name: S, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// 追加一行，自动补齐/截断到表头宽度
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按列名精确查找列下标
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 按列名取单元格
    pub fn value(&self, row: usize, label: &str) -> &CellValue {
        match self.column_index(label) {
            Some(col) => self.cell(row, col),
            None => &EMPTY_CELL,
        }
    }

    /// 列的所有值
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |r| r.get(col).unwrap_or(&EMPTY_CELL))
    }

    pub fn rename_column(&mut self, col: usize, label: &str) {
        if let Some(h) = self.headers.get_mut(col) {
            *h = label.to_string();
        }
    }

    /// 保留满足条件的行
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        self.rows.retain(|r| keep(r));
    }

    /// 某列数值合计（空值/非数值跳过）
    pub fn column_sum(&self, label: &str) -> f64 {
        match self.column_index(label) {
            Some(col) => self.column(col).filter_map(CellValue::as_f64).sum(),
            None => 0.0,
        }
    }
}
