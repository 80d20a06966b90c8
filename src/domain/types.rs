// ==========================================
// 经销数据看板 - 领域类型定义
// ==========================================
// 职责: 门店分级 / 库存状态 / 分析维度 / 工作表种类
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 门店等级 (Store Tier)
// ==========================================
// 红线: 等级由月均出货实时计算,不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreTier {
    A, // 月均 >= 4
    B, // 2 <= 月均 < 4
    C, // 1 <= 月均 < 2
    D, // 月均 < 1
}

impl StoreTier {
    pub const ALL: [StoreTier; 4] = [StoreTier::A, StoreTier::B, StoreTier::C, StoreTier::D];
}

impl fmt::Display for StoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreTier::A => write!(f, "A"),
            StoreTier::B => write!(f, "B"),
            StoreTier::C => write!(f, "C"),
            StoreTier::D => write!(f, "D"),
        }
    }
}

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 依据: 库存可销天数(DOS)判定
// NoOutbound 优先于阈值判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Normal,     // 正常
    TooHigh,    // 库存过高
    TooLow,     // 库存不足
    NoOutbound, // 有库存但考核期内无出库
    NoStock,    // 无库存且无出库
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Normal => write!(f, "正常"),
            StockStatus::TooHigh => write!(f, "库存过高"),
            StockStatus::TooLow => write!(f, "库存不足"),
            StockStatus::NoOutbound => write!(f, "无出库"),
            StockStatus::NoStock => write!(f, "无库存"),
        }
    }
}

// ==========================================
// 分析维度 (Dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Province,
    Distributor,
    Store,
    Category,
    Subcategory,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Province => write!(f, "省区"),
            Dimension::Distributor => write!(f, "经销商"),
            Dimension::Store => write!(f, "门店"),
            Dimension::Category => write!(f, "大类"),
            Dimension::Subcategory => write!(f, "小类"),
        }
    }
}

// ==========================================
// 工作表种类 (Sheet Kind)
// ==========================================
// 上传文件中的 6 张业务表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetKind {
    Shipments,   // 门店月度出货
    Stock,       // 仓库库存
    Outbound,    // 出库流水
    Performance, // 业绩台账
    Targets,     // 任务指标
    Scans,       // 扫码溯源
}

impl SheetKind {
    pub const ALL: [SheetKind; 6] = [
        SheetKind::Shipments,
        SheetKind::Stock,
        SheetKind::Outbound,
        SheetKind::Performance,
        SheetKind::Targets,
        SheetKind::Scans,
    ];

    /// 中文表名（用于诊断日志与导出工作表名）
    pub fn label(&self) -> &'static str {
        match self {
            SheetKind::Shipments => "门店出货",
            SheetKind::Stock => "库存",
            SheetKind::Outbound => "出库",
            SheetKind::Performance => "业绩",
            SheetKind::Targets => "任务",
            SheetKind::Scans => "扫码",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
