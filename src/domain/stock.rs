// ==========================================
// 经销数据看板 - 仓库库存
// ==========================================
// 职责: StockRecord（经销商 × 产品 SKU）
// 说明: specific_class 在载入时由分类规则计算；重量规格不在允许集合的行载入时即剔除
// ==========================================

use crate::domain::fact::Dimensional;
use crate::domain::types::Dimension;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub distributor_code: Option<String>,
    pub distributor_full_name: Option<String>,
    pub product_code: Option<String>,
    pub product_name: String,

    /// 库存数量（听/罐）
    pub stock_units: f64,

    /// 库存箱数
    pub stock_boxes: f64,

    pub province: Option<String>,

    /// 经销商简称（跨表关联键）
    pub distributor: String,

    pub category: Option<String>,
    pub subcategory: Option<String>,

    /// 重量规格（规范化文本，如 "700" / "800" / "800新包装"）
    pub weight_spec: String,

    pub size_spec: Option<String>,

    /// 具体分类（子品牌 / 段位 / 其他）
    pub specific_class: String,

    /// 源表行号（1 基，含表头行之后的数据行计数）
    pub row_number: usize,
}

impl Dimensional for StockRecord {
    fn has_dimension(&self, dimension: Dimension) -> bool {
        dimension != Dimension::Store
    }

    fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    fn distributor(&self) -> Option<&str> {
        Some(&self.distributor)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }
}
