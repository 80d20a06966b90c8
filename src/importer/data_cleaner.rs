// ==========================================
// 经销数据看板 - 数据清洗器
// ==========================================
// 职责: TRIM / NULL 标准化 / 年月日抽取 / 两位年份归一 / 经纬度解析 / 模糊关联键
// 红线: 两位年份统一按 0 < y < 100 → y + 2000，所有含年份的表一致
// ==========================================

use crate::config::CoordinateRanges;
use crate::domain::period::MonthKey;
use crate::domain::table::CellValue;
use chrono::{Datelike, Duration, NaiveDate};

/// 两位年份归一
///
/// # 规则
/// - 0 < y < 100 → y + 2000
/// - 其他原样返回（已是四位年份时幂等）
pub fn normalize_year(y: i32) -> i32 {
    if y > 0 && y < 100 {
        y + 2000
    } else {
        y
    }
}

/// 文本中所有连续 ASCII 数字段
fn digit_runs(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 经销商名称关联键
///
/// # 规则
/// - 去除全部空白
/// - 全角括号 → 半角括号
/// - 去除 "有限责任公司" / "有限公司" 后缀
pub fn distributor_key(name: &str) -> String {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .collect();
    let trimmed = compact
        .strip_suffix("有限责任公司")
        .or_else(|| compact.strip_suffix("有限公司"))
        .unwrap_or(&compact);
    trimmed.to_string()
}

/// Excel 日期序列号 → 日期（1900 日期系统）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

pub struct DataCleaner {
    ranges: CoordinateRanges,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(CoordinateRanges::default())
    }
}

impl DataCleaner {
    pub fn new(ranges: CoordinateRanges) -> Self {
        Self { ranges }
    }

    /// 清洗文本字段（TRIM + 可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 标准化 NULL 值（空字符串/空白/"nan"/"None" → None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            match trimmed {
                "" | "-" | "nan" | "NaN" | "None" | "null" => None,
                _ => Some(trimmed.to_string()),
            }
        })
    }

    /// 单元格 → 文本（NULL 标准化后）
    pub fn text(&self, cell: &CellValue) -> Option<String> {
        self.normalize_null(cell.as_text())
    }

    /// 单元格 → 数值（空值/非数值 → None）
    pub fn number(&self, cell: &CellValue) -> Option<f64> {
        cell.as_f64()
    }

    /// 年份抽取
    ///
    /// # 示例
    /// - "25年" → 2025
    /// - "2025" / 2025.0 → 2025
    /// - "2025年1月" → 2025
    pub fn parse_year(&self, cell: &CellValue) -> Option<i32> {
        let raw = match cell {
            CellValue::Number(n) if n.is_finite() && *n > 0.0 => *n as i32,
            CellValue::Text(s) => digit_runs(s).first()?.parse::<i32>().ok()?,
            _ => return None,
        };
        let year = normalize_year(raw);
        if (1900..=2999).contains(&year) {
            Some(year)
        } else {
            None
        }
    }

    /// 月份标签解析
    ///
    /// # 支持格式
    /// - "1月" / "01月" → (None, 1)
    /// - "2025年1月" / "25年1月" → (2025, 1)
    /// - "2025-01" / "2025/1" / "2025.01" / "2025-01-15" → (2025, 1)
    /// - "202501" / "20250115" → (2025, 1)
    /// - 1..=12 的数字 → (None, m)
    pub fn parse_month_key(&self, cell: &CellValue) -> Option<MonthKey> {
        match cell {
            CellValue::Number(n) if n.is_finite() => {
                let v = *n as i64;
                if (1..=12).contains(&v) && n.fract() == 0.0 {
                    Some(MonthKey::new(None, v as u32))
                } else {
                    self.parse_month_text(&v.to_string())
                }
            }
            CellValue::Text(s) => self.parse_month_text(s),
            _ => None,
        }
    }

    fn parse_month_text(&self, text: &str) -> Option<MonthKey> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let key = if let Some(year_pos) = text.find('年') {
            let (year_part, rest) = text.split_at(year_pos);
            let year = digit_runs(year_part).last()?.parse::<i32>().ok()?;
            let month = digit_runs(rest).first()?.parse::<u32>().ok()?;
            MonthKey::new(Some(normalize_year(year)), month)
        } else if let Some(month_pos) = text.find('月') {
            let month = digit_runs(&text[..month_pos]).last()?.parse::<u32>().ok()?;
            MonthKey::new(None, month)
        } else {
            let runs = digit_runs(text);
            match runs.as_slice() {
                [single] if single.len() == 6 || single.len() == 8 => {
                    let year = single[..4].parse::<i32>().ok()?;
                    let month = single[4..6].parse::<u32>().ok()?;
                    MonthKey::new(Some(year), month)
                }
                [single] => MonthKey::new(None, single.parse::<u32>().ok()?),
                [year, month, ..] => MonthKey::new(
                    Some(normalize_year(year.parse::<i32>().ok()?)),
                    month.parse::<u32>().ok()?,
                ),
                [] => return None,
            }
        };

        if (1..=12).contains(&key.month) {
            Some(key)
        } else {
            None
        }
    }

    /// 月份抽取（"1月" → 1）
    pub fn parse_month(&self, cell: &CellValue) -> Option<u32> {
        self.parse_month_key(cell).map(|k| k.month)
    }

    /// 是否是月份样式文本（长表识别用）
    pub fn looks_like_month(&self, cell: &CellValue) -> bool {
        match cell {
            CellValue::Text(s) => {
                let s = s.trim();
                (s.contains('月') || s.contains('-') || s.contains('/'))
                    && s.parse::<f64>().is_err()
                    && self.parse_month_text(s).is_some()
            }
            _ => false,
        }
    }

    /// 日抽取（"15日" → 15；"2025-01-15" → 15）
    pub fn parse_day(&self, cell: &CellValue) -> Option<u32> {
        let day = match cell {
            CellValue::Number(n) if n.is_finite() => *n as i64,
            CellValue::Text(s) => {
                let runs = digit_runs(s);
                let run = match runs.as_slice() {
                    [single] if single.len() == 8 => &single[6..8],
                    [single] => *single,
                    [_, _, day, ..] => *day,
                    [.., last] => *last,
                    [] => return None,
                };
                run.parse::<i64>().ok()?
            }
            _ => return None,
        };
        if (1..=31).contains(&day) {
            Some(day as u32)
        } else {
            None
        }
    }

    /// 完整日期（单元格可能是 Excel 序列号或日期文本）
    pub fn parse_date(&self, cell: &CellValue) -> Option<NaiveDate> {
        let date = match cell {
            CellValue::Number(n) if *n > 59.0 => excel_serial_to_date(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y年%m月%d日"]
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            }
            _ => None,
        };
        date.filter(|d| d.year() >= 1900)
    }

    /// 重量规格规范化（700.0 → "700"；"800g" → "800"；"800 新包装" → "800新包装"）
    pub fn normalize_weight_spec(&self, cell: &CellValue) -> Option<String> {
        let text = self.text(cell)?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let stripped = compact
            .strip_suffix("克")
            .or_else(|| compact.strip_suffix('g'))
            .or_else(|| compact.strip_suffix('G'))
            .unwrap_or(&compact);
        if let Ok(v) = stripped.parse::<f64>() {
            if v.fract() == 0.0 {
                return Some(format!("{}", v as i64));
            }
        }
        Some(stripped.to_string())
    }

    /// 经纬度解析
    ///
    /// # 规则
    /// 1. 取文本中前两个数字 a, b
    /// 2. a 落在经度范围且 b 落在纬度范围 → (a, b)
    /// 3. b 落在经度范围且 a 落在纬度范围 → (b, a)
    /// 4. 否则取绝对值较大者为经度；超出 ±180 / ±90 → (None, None)
    /// 5. 经度或纬度之一落在合理范围内即采纳，两者都不合理 → (None, None)
    pub fn parse_coordinates(&self, text: &str) -> (Option<f64>, Option<f64>) {
        let numbers = extract_numbers(text);
        let (a, b) = match numbers.as_slice() {
            [a, b, ..] => (*a, *b),
            _ => return (None, None),
        };

        let r = &self.ranges;
        if r.is_longitude(a) && r.is_latitude(b) {
            return (Some(a), Some(b));
        }
        if r.is_longitude(b) && r.is_latitude(a) {
            return (Some(b), Some(a));
        }

        let (lon, lat) = if a.abs() >= b.abs() { (a, b) } else { (b, a) };
        if lon.abs() > 180.0 || lat.abs() > 90.0 {
            return (None, None);
        }
        if r.is_longitude(lon) || r.is_latitude(lat) {
            (Some(lon), Some(lat))
        } else {
            (None, None)
        }
    }

    /// 经销商名称关联键（见 [`distributor_key`]）
    pub fn distributor_key(&self, name: &str) -> String {
        distributor_key(name)
    }
}

/// 抽取文本中的十进制数（支持负号与小数点）
fn extract_numbers(text: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in text.chars() {
        let continues =
            c.is_ascii_digit() || (c == '.' && !current.is_empty() && !current.contains('.'));
        let starts_negative =
            c == '-' && current.is_empty() && !prev.map_or(false, |p| p.is_ascii_digit());
        if continues || starts_negative {
            current.push(c);
        } else if !current.is_empty() {
            if let Ok(v) = current.parse::<f64>() {
                numbers.push(v);
            }
            current.clear();
        }
        prev = Some(c);
    }
    if let Ok(v) = current.parse::<f64>() {
        numbers.push(v);
    }
    numbers
}
