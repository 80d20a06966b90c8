use crate::domain::shipment::TierThresholds;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每箱听数（扫码按听计，出库按箱计，折算后才能求扫码率）
pub const SCAN_UNITS_PER_BOX: f64 = 6.0;

/// 看板计算参数
///
/// 所有字段均有默认值；JSON 中缺省的字段回落到默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 门店分级阈值（月均出货 4/2/1）
    pub tier_thresholds: TierThresholds,

    /// DOS 高于此值 → 库存过高
    pub dos_high_threshold: f64,

    /// DOS 低于此值 → 库存不足
    pub dos_low_threshold: f64,

    /// DOS 分母的出库考核月数（季度 = 3）
    pub dos_window_months: u32,

    /// 扫码折箱系数
    pub units_per_box: f64,

    /// 库存表允许的重量规格
    pub allowed_weight_specs: Vec<String>,

    /// 子品牌关键字（按顺序匹配，优先级最高）
    pub sub_brand_keywords: Vec<String>,

    /// 段位匹配仅对该大类生效
    pub segment_category: String,

    /// 段位关键字
    pub segment_tokens: Vec<String>,

    /// 未命中任何规则时的分类
    pub default_class: String,

    /// 品类别名 → 标准品类
    pub category_aliases: BTreeMap<String, String>,

    /// 内容哈希缓存容量
    pub cache_capacity: usize,

    /// CSV 编码（encoding_rs 标签）
    pub csv_encoding: String,

    /// 长表识别的采样数
    pub long_format_sample_size: usize,

    /// 经纬度合理范围
    pub coordinate_ranges: CoordinateRanges,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tier_thresholds: TierThresholds::default(),
            dos_high_threshold: 2.0,
            dos_low_threshold: 0.5,
            dos_window_months: 3,
            units_per_box: SCAN_UNITS_PER_BOX,
            allowed_weight_specs: vec!["700".into(), "800".into(), "800新包装".into()],
            sub_brand_keywords: vec![
                "金装".into(),
                "有机".into(),
                "羊奶".into(),
                "低敏".into(),
            ],
            segment_category: "婴幼儿奶粉".into(),
            segment_tokens: vec!["1段".into(), "2段".into(), "3段".into()],
            default_class: "其他".into(),
            category_aliases: BTreeMap::new(),
            cache_capacity: 2,
            csv_encoding: "GB18030".into(),
            long_format_sample_size: 10,
            coordinate_ranges: CoordinateRanges::default(),
        }
    }
}

impl DashboardConfig {
    /// 校验参数组合是否合法
    pub fn validate(&self) -> ImportResult<()> {
        if self.units_per_box <= 0.0 {
            return Err(ImportError::ConfigValueError {
                key: "units_per_box".to_string(),
                value: self.units_per_box.to_string(),
                message: "折箱系数必须大于 0".to_string(),
            });
        }
        if self.dos_low_threshold > self.dos_high_threshold {
            return Err(ImportError::ConfigValueError {
                key: "dos_low_threshold".to_string(),
                value: self.dos_low_threshold.to_string(),
                message: format!("低阈值大于高阈值 {}", self.dos_high_threshold),
            });
        }
        if self.dos_window_months == 0 {
            return Err(ImportError::ConfigValueError {
                key: "dos_window_months".to_string(),
                value: "0".to_string(),
                message: "考核月数必须大于 0".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ImportError::ConfigValueError {
                key: "cache_capacity".to_string(),
                value: "0".to_string(),
                message: "缓存容量必须大于 0".to_string(),
            });
        }
        let t = &self.tier_thresholds;
        if !(t.a >= t.b && t.b >= t.c) {
            return Err(ImportError::ConfigValueError {
                key: "tier_thresholds".to_string(),
                value: format!("{}/{}/{}", t.a, t.b, t.c),
                message: "分级阈值必须递减".to_string(),
            });
        }
        Ok(())
    }

    /// 品类别名归一（未登记的别名原样返回）
    pub fn canonical_category<'a>(&'a self, name: &'a str) -> &'a str {
        let trimmed = name.trim();
        self.category_aliases
            .get(trimmed)
            .map(String::as_str)
            .unwrap_or(trimmed)
    }
}

/// 经纬度合理范围（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRanges {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Default for CoordinateRanges {
    fn default() -> Self {
        Self {
            lon_min: 70.0,
            lon_max: 140.0,
            lat_min: 0.0,
            lat_max: 60.0,
        }
    }
}

impl CoordinateRanges {
    pub fn is_longitude(&self, v: f64) -> bool {
        v >= self.lon_min && v <= self.lon_max
    }

    pub fn is_latitude(&self, v: f64) -> bool {
        v >= self.lat_min && v <= self.lat_max
    }
}
