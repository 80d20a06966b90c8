// ==========================================
// 经销数据看板 - 配置层
// ==========================================
// 职责: 看板计算参数（阈值/系数/分类关键字），支持 key-value 覆写
// ==========================================

pub mod config_manager;
pub mod dashboard_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_config::{CoordinateRanges, DashboardConfig, SCAN_UNITS_PER_BOX};
