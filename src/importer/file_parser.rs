// ==========================================
// 经销数据看板 - 文件解析器实现
// ==========================================
// 支持: 工作簿 (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv, 默认 GB18030)
// 输入: 上传文件的原始字节（不落盘）
// 输出: 每个工作表一张 RawTable（首行为表头）
// ==========================================

use crate::domain::table::{CellValue, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use std::io::Cursor;

/// 文件解析接口
pub trait FileParser {
    /// 原始字节 → 表列表（按工作表顺序）
    fn parse_tables(&self, bytes: &[u8]) -> ImportResult<Vec<RawTable>>;
}

/// 空表头占位名（1 基列号）
fn placeholder_header(col: usize) -> String {
    format!("列{}", col + 1)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    encoding: &'static Encoding,
}

impl CsvParser {
    /// # 参数
    /// - encoding_label: encoding_rs 可识别的编码标签（如 "GB18030" / "utf-8"）
    pub fn new(encoding_label: &str) -> ImportResult<Self> {
        let encoding = Encoding::for_label(encoding_label.trim().as_bytes())
            .ok_or_else(|| ImportError::UnknownEncoding(encoding_label.to_string()))?;
        Ok(Self { encoding })
    }
}

impl FileParser for CsvParser {
    fn parse_tables(&self, bytes: &[u8]) -> ImportResult<Vec<RawTable>> {
        // decode 会先嗅探 BOM，带 UTF-8 BOM 的文件不受默认编码影响
        let (text, actual, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            tracing::warn!(encoding = actual.name(), "CSV 含无法解码的字节，已替换为 U+FFFD");
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    placeholder_header(i)
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut table = RawTable::new("csv", headers);
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(v)
                    }
                })
                .collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            table.push_row(row);
        }

        tracing::debug!(rows = table.len(), columns = table.width(), "CSV 解析完成");
        Ok(vec![table])
    }
}

// ==========================================
// 工作簿 Parser 实现
// ==========================================
pub struct WorkbookParser;

impl WorkbookParser {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => {
                if s.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.clone())
                }
            }
            Data::Bool(b) => CellValue::Bool(*b),
            // 日期单元格保留 Excel 序列号，由清洗器按需解释
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }

    /// Range → RawTable
    ///
    /// calamine 的 Range 从首个非空单元格开始，左侧空列需补齐，
    /// 否则固定列位置回退会整体错位。
    fn range_to_table(name: &str, range: &Range<Data>) -> RawTable {
        let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);
        let pad = |cells: &[Data]| -> Vec<CellValue> {
            std::iter::repeat(CellValue::Empty)
                .take(col_offset)
                .chain(cells.iter().map(Self::convert_cell))
                .collect()
        };

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => pad(header_row)
                .iter()
                .enumerate()
                .map(|(i, c)| c.as_text().unwrap_or_else(|| placeholder_header(i)))
                .collect(),
            None => Vec::new(),
        };

        let mut table = RawTable::new(name, headers);
        for data_row in rows {
            let row = pad(data_row);
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            table.push_row(row);
        }
        table
    }
}

impl FileParser for WorkbookParser {
    fn parse_tables(&self, bytes: &[u8]) -> ImportResult<Vec<RawTable>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("工作簿无工作表".to_string()));
        }

        let mut tables = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;
            let table = Self::range_to_table(&name, &range);
            tracing::debug!(sheet = %name, rows = table.len(), columns = table.width(), "工作表解析完成");
            tables.push(table);
        }
        Ok(tables)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    csv_encoding: String,
}

impl UniversalFileParser {
    pub fn new(csv_encoding: &str) -> Self {
        Self {
            csv_encoding: csv_encoding.to_string(),
        }
    }

    pub fn parse(&self, bytes: &[u8], filename: &str) -> ImportResult<Vec<RawTable>> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => CsvParser::new(&self.csv_encoding)?.parse_tables(bytes),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => WorkbookParser.parse_tables(bytes),
            _ => Err(ImportError::UnsupportedFormat(filename.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_gb18030_decoding() {
        let text = "省区,经销商名称,1月\n广东,ABC,3\n";
        let (bytes, _, _) = encoding_rs::GB18030.encode(text);

        let tables = CsvParser::new("GB18030").unwrap().parse_tables(&bytes).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["省区", "经销商名称", "1月"]);
        assert_eq!(tables[0].cell(0, 1), &CellValue::text("ABC"));
        assert_eq!(tables[0].cell(0, 2).as_f64(), Some(3.0));
    }

    #[test]
    fn test_csv_skip_empty_rows_and_name_blank_headers() {
        let bytes = "a,,c\n1,2,3\n,,\n4,5,6\n".as_bytes();
        let tables = CsvParser::new("utf-8").unwrap().parse_tables(bytes).unwrap();

        assert_eq!(tables[0].headers, vec!["a", "列2", "c"]);
        assert_eq!(tables[0].len(), 2);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        assert!(matches!(
            CsvParser::new("no-such-encoding"),
            Err(ImportError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_malformed_workbook_bytes_is_error() {
        let result = WorkbookParser.parse_tables(b"definitely not a zip archive");
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let parser = UniversalFileParser::new("GB18030");
        assert!(matches!(
            parser.parse(b"", "report.pdf"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
