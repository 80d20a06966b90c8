// ==========================================
// 经销数据看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value（可由 JSON 文件/快照装载），覆盖在默认值之上
// ==========================================

use crate::config::dashboard_config::DashboardConfig;
use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    kv: HashMap<String, String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有 key-value 创建
    pub fn from_kv(kv: HashMap<String, String>) -> Self {
        Self { kv }
    }

    /// 从 JSON 对象创建（值可以是字符串/数字/数组/对象，统一转为字符串存储）
    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| ImportError::ConfigReadError {
            key: "<root>".to_string(),
            message: "配置必须是 JSON 对象".to_string(),
        })?;

        let kv = object
            .iter()
            .map(|(k, v)| {
                let raw = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), raw)
            })
            .collect();

        Ok(Self { kv })
    }

    /// 从 JSON 文件创建
    pub fn from_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.kv.get(key).cloned()
    }

    /// 写入/覆盖配置值
    pub fn set(&mut self, key: &str, value: &str) {
        self.kv.insert(key.to_string(), value.trim().to_string());
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.kv
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn get_f64(&self, key: &str, default: f64) -> f64 {
        let value = self.get_config_or_default(key, &default.to_string());
        value.trim().parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %value, "配置值不是数字，使用默认值");
            default
        })
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        let value = self.get_config_or_default(key, &default.to_string());
        value.trim().parse::<u32>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %value, "配置值不是整数，使用默认值");
            default
        })
    }

    /// 逗号分隔列表；为空时回落到默认
    fn get_list(&self, key: &str, default: &[String]) -> Vec<String> {
        match self.kv.get(key) {
            None => default.to_vec(),
            Some(value) => {
                let items: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if items.is_empty() {
                    default.to_vec()
                } else {
                    items
                }
            }
        }
    }

    /// 组装看板参数（未配置项使用默认值），并做合法性校验
    pub fn dashboard_config(&self) -> ImportResult<DashboardConfig> {
        let d = DashboardConfig::default();

        let mut config = DashboardConfig {
            dos_high_threshold: self.get_f64(config_keys::DOS_HIGH_THRESHOLD, d.dos_high_threshold),
            dos_low_threshold: self.get_f64(config_keys::DOS_LOW_THRESHOLD, d.dos_low_threshold),
            dos_window_months: self.get_u32(config_keys::DOS_WINDOW_MONTHS, d.dos_window_months),
            units_per_box: self.get_f64(config_keys::UNITS_PER_BOX, d.units_per_box),
            allowed_weight_specs: self
                .get_list(config_keys::ALLOWED_WEIGHT_SPECS, &d.allowed_weight_specs),
            sub_brand_keywords: self.get_list(config_keys::SUB_BRAND_KEYWORDS, &d.sub_brand_keywords),
            segment_category: self
                .get_config_or_default(config_keys::SEGMENT_CATEGORY, &d.segment_category),
            segment_tokens: self.get_list(config_keys::SEGMENT_TOKENS, &d.segment_tokens),
            cache_capacity: self.get_u32(config_keys::CACHE_CAPACITY, d.cache_capacity as u32)
                as usize,
            csv_encoding: self.get_config_or_default(config_keys::CSV_ENCODING, &d.csv_encoding),
            long_format_sample_size: self
                .get_u32(config_keys::LONG_FORMAT_SAMPLE_SIZE, d.long_format_sample_size as u32)
                as usize,
            ..d.clone()
        };

        config.tier_thresholds.a = self.get_f64(config_keys::TIER_A_MIN, d.tier_thresholds.a);
        config.tier_thresholds.b = self.get_f64(config_keys::TIER_B_MIN, d.tier_thresholds.b);
        config.tier_thresholds.c = self.get_f64(config_keys::TIER_C_MIN, d.tier_thresholds.c);

        // 品类别名配置格式为 JSON: {"婴儿奶粉": "婴幼儿奶粉"}
        if let Some(raw) = self.kv.get(config_keys::CATEGORY_ALIASES) {
            config.category_aliases = serde_json::from_str::<BTreeMap<String, String>>(raw)
                .unwrap_or_else(|_| {
                    tracing::warn!(
                        config_key = config_keys::CATEGORY_ALIASES,
                        raw_value = %raw,
                        "品类别名配置格式错误，使用空配置"
                    );
                    BTreeMap::new()
                });
        }

        config.validate()?;
        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let ordered: BTreeMap<&String, &String> = self.kv.iter().collect();
        Ok(serde_json::to_string(&ordered)?)
    }

    /// 从配置快照恢复配置（覆盖同名键）
    ///
    /// # 返回
    /// - 恢复的配置项数量
    pub fn restore_config_from_snapshot(&mut self, snapshot_json: &str) -> ImportResult<usize> {
        let map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;
        let count = map.len();
        self.kv.extend(map);
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 门店分级
    pub const TIER_A_MIN: &str = "tier_a_min";
    pub const TIER_B_MIN: &str = "tier_b_min";
    pub const TIER_C_MIN: &str = "tier_c_min";

    // 库存可销天数
    pub const DOS_HIGH_THRESHOLD: &str = "dos_high_threshold";
    pub const DOS_LOW_THRESHOLD: &str = "dos_low_threshold";
    pub const DOS_WINDOW_MONTHS: &str = "dos_window_months";

    // 扫码
    pub const UNITS_PER_BOX: &str = "units_per_box";

    // 库存过滤与分类
    pub const ALLOWED_WEIGHT_SPECS: &str = "allowed_weight_specs"; // 逗号分隔
    pub const SUB_BRAND_KEYWORDS: &str = "sub_brand_keywords"; // 逗号分隔
    pub const SEGMENT_CATEGORY: &str = "segment_category";
    pub const SEGMENT_TOKENS: &str = "segment_tokens"; // 逗号分隔
    pub const CATEGORY_ALIASES: &str = "category_aliases"; // JSON 对象

    // 载入
    pub const CACHE_CAPACITY: &str = "cache_capacity";
    pub const CSV_ENCODING: &str = "csv_encoding";
    pub const LONG_FORMAT_SAMPLE_SIZE: &str = "long_format_sample_size";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manager_yields_defaults() {
        let config = ConfigManager::new().dashboard_config().unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_overrides_from_json() {
        let manager = ConfigManager::from_json_str(
            r#"{
                "dos_high_threshold": 3,
                "units_per_box": "12",
                "allowed_weight_specs": "700, 900",
                "category_aliases": {"婴儿奶粉": "婴幼儿奶粉"}
            }"#,
        )
        .unwrap();

        let config = manager.dashboard_config().unwrap();
        assert_eq!(config.dos_high_threshold, 3.0);
        assert_eq!(config.units_per_box, 12.0);
        assert_eq!(config.allowed_weight_specs, vec!["700", "900"]);
        assert_eq!(
            config.category_aliases.get("婴儿奶粉").map(String::as_str),
            Some("婴幼儿奶粉")
        );
    }

    #[test]
    fn test_invalid_number_falls_back_to_default() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::DOS_LOW_THRESHOLD, "abc");
        let config = manager.dashboard_config().unwrap();
        assert_eq!(config.dos_low_threshold, 0.5);
    }

    #[test]
    fn test_zero_units_per_box_rejected() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::UNITS_PER_BOX, "0");
        assert!(manager.dashboard_config().is_err());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::DOS_HIGH_THRESHOLD, "2.5");
        let snapshot = manager.get_config_snapshot().unwrap();

        let mut restored = ConfigManager::new();
        assert_eq!(restored.restore_config_from_snapshot(&snapshot).unwrap(), 1);
        assert_eq!(
            restored.get_global_config_value(config_keys::DOS_HIGH_THRESHOLD),
            Some("2.5".to_string())
        );
    }

    #[test]
    fn test_non_object_json_rejected() {
        assert!(ConfigManager::from_json_str("[1,2]").is_err());
    }
}
