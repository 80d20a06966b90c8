// ==========================================
// 经销数据看板 - 计算层错误类型
// ==========================================
// 职责: 筛选与报表参数错误
// 说明: 除零等"未定义"不是错误，用 Option 表达
// ==========================================

use crate::domain::types::SheetKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 选择了当前上级筛选下不存在的选项
    #[error("筛选项不可选: {field}='{value}' 不在可选范围内")]
    InvalidSelection { field: String, value: String },

    #[error("无效的时间窗口: {0}")]
    InvalidWindow(String),

    #[error("无效的报表参数: {0}")]
    InvalidParameter(String),

    /// 会话尚未加载任何文件
    #[error("尚未加载数据文件")]
    NotLoaded,

    /// 报表依赖的表缺失（视图应显示"无数据"）
    #[error("{0} 无数据")]
    NoData(SheetKind),
}

pub type EngineResult<T> = Result<T, EngineError>;
