// ==========================================
// 经销数据看板 - 事实记录接口
// ==========================================
// 职责: 为聚合层提供统一的维度/日期访问
// 实现者: OutboundTransaction, PerformanceRecord, ScanEvent, TargetRecord, StockRecord
// ==========================================

use crate::domain::period::YearMonth;
use crate::domain::types::Dimension;

/// 维度访问
pub trait Dimensional {
    fn province(&self) -> Option<&str>;
    fn distributor(&self) -> Option<&str>;
    fn store(&self) -> Option<&str> {
        None
    }
    fn category(&self) -> Option<&str>;
    fn subcategory(&self) -> Option<&str> {
        None
    }

    /// 记录类型是否带有该维度（不带的维度不参与筛选）
    fn has_dimension(&self, _dimension: Dimension) -> bool {
        true
    }

    /// 按维度取值
    fn dimension_value(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Province => self.province(),
            Dimension::Distributor => self.distributor(),
            Dimension::Store => self.store(),
            Dimension::Category => self.category(),
            Dimension::Subcategory => self.subcategory(),
        }
    }
}

/// 日期访问（年/月必有，日可缺）
pub trait Dated {
    fn year(&self) -> i32;
    fn month(&self) -> u32;
    fn day(&self) -> Option<u32> {
        None
    }

    fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year(),
            month: self.month(),
        }
    }
}
