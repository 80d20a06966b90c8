// ==========================================
// 经销数据看板 - 核心库
// ==========================================
// 职责: 多工作表上传文件的规范化与指标计算
// 系统定位: 展示层之下的数据核心（不含界面、不含持久化）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 计算参数
pub mod config;

// 导入层 - 解析与规范化
pub mod importer;

// 计算层 - 指标、筛选、聚合、报表
pub mod engine;

// 内容哈希缓存
pub mod cache;

// 会话上下文
pub mod session;

// 规范化表导出
pub mod export;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Dimension, SheetKind, StockStatus, StoreTier};

// 领域实体
pub use domain::{
    MonthKey, NormalizedDataset, OutboundTransaction, PerformanceRecord, RawTable, ScanEvent,
    StockRecord, StoreShipmentRecord, TargetRecord, YearMonth,
};

// 配置
pub use config::{ConfigManager, DashboardConfig};

// 导入
pub use importer::{DatasetImporter, DiagnosticLog, ImportError, ImportResult};

// 计算
pub use engine::{EngineError, EngineResult, FilterCatalog, FilterState, ReportService, TimeWindow};

// 会话
pub use cache::ContentCache;
pub use session::{DashboardSession, LoadOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "经销数据看板";
