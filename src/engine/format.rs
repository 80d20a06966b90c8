// ==========================================
// 经销数据看板 - 数值展示格式
// ==========================================
// 职责: 千分位数值 / 百分比 / 未定义标记
// 红线: 未定义比率显示 "—"，不得显示为 0% 或报错
// ==========================================

/// 未定义值的展示标记
pub const UNDEFINED_MARK: &str = "—";

/// 千分位数值（"1234567.891", 2 → "1,234,567.89"）
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return UNDEFINED_MARK.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// 可能未定义的数值
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => UNDEFINED_MARK.to_string(),
    }
}

/// 百分比（0.1234, 1 → "12.3%"）
pub fn format_percent(ratio: Option<f64>, decimals: usize) -> String {
    match ratio {
        Some(r) if r.is_finite() => format!("{}%", format_number(r * 100.0, decimals)),
        _ => UNDEFINED_MARK.to_string(),
    }
}

/// 带符号百分比，用于同比（0.05 → "+5.0%"）
pub fn format_signed_percent(ratio: Option<f64>, decimals: usize) -> String {
    match ratio {
        Some(r) if r.is_finite() && r > 0.0 => format!("+{}", format_percent(Some(r), decimals)),
        other => format_percent(other, decimals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
        assert_eq!(format_number(-0.001, 1), "0.0");
    }

    #[test]
    fn test_undefined_rendering() {
        assert_eq!(format_optional(None, 1), "—");
        assert_eq!(format_percent(None, 1), "—");
        assert_eq!(format_number(f64::NAN, 1), "—");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(Some(0.1234), 1), "12.3%");
        assert_eq!(format_signed_percent(Some(0.05), 1), "+5.0%");
        assert_eq!(format_signed_percent(Some(-0.05), 1), "-5.0%");
        assert_eq!(format_signed_percent(Some(0.0), 1), "0.0%");
    }
}
