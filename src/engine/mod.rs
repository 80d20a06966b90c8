// ==========================================
// 经销数据看板 - 计算层
// ==========================================
// 职责: 派生指标、时间窗口、级联筛选、分组聚合、报表
// 红线: 计算层不读文件；筛选变更只重跑本层，不重新导入
// ==========================================

pub mod aggregation;
pub mod error;
pub mod filters;
pub mod format;
pub mod metrics;
pub mod reports;
pub mod window;

// 重导出核心类型
pub use aggregation::{
    compare_with_last_year, group_sum, ComparisonRow, ComparisonTable, GroupRow, GroupedTable,
};
pub use error::{EngineError, EngineResult};
pub use filters::{FilterCatalog, FilterState};
pub use format::{format_number, format_optional, format_percent, UNDEFINED_MARK};
pub use metrics::{DosAssessment, DosEvaluator};
pub use reports::{
    latest_outbound_month, AttainmentReport, DosReport, KpiSummary, PerformanceComparison,
    ReportService, ScanRateReport, StoreTierReport,
};
pub use window::TimeWindow;
