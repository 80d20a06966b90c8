// ==========================================
// 经销数据看板 - 领域模型层
// ==========================================
// 职责: 定义规范化后的业务实体、类型、期间键
// 红线: 不含文件读取逻辑,不含聚合逻辑
// ==========================================

pub mod columns;
pub mod dataset;
pub mod fact;
pub mod outbound;
pub mod performance;
pub mod period;
pub mod scan;
pub mod shipment;
pub mod stock;
pub mod table;
pub mod target;
pub mod types;

// 重导出核心类型
pub use dataset::NormalizedDataset;
pub use fact::{Dated, Dimensional};
pub use outbound::OutboundTransaction;
pub use performance::PerformanceRecord;
pub use period::{MonthKey, YearMonth};
pub use scan::ScanEvent;
pub use shipment::{StoreShipmentRecord, TierThresholds};
pub use stock::StockRecord;
pub use table::{CellValue, RawTable};
pub use target::TargetRecord;
pub use types::{Dimension, SheetKind, StockStatus, StoreTier};
