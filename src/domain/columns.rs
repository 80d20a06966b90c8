// ==========================================
// 经销数据看板 - 标准列名
// ==========================================
// 职责: 规范化后各表统一使用的列名
// 说明: 源表列名不稳定，经列名解析后统一改写为以下名称
// ==========================================

// ===== 通用维度 =====
pub const PROVINCE: &str = "省区";
pub const DISTRIBUTOR: &str = "经销商名称";
pub const STORE: &str = "门店名称";
pub const CATEGORY: &str = "大类";
pub const SUBCATEGORY: &str = "小类";

// ===== 时间 =====
pub const YEAR: &str = "年份";
pub const MONTH: &str = "月份";
pub const DAY: &str = "日";

// ===== 数量/金额 =====
pub const BOXES: &str = "箱数";
pub const QUANTITY: &str = "数量";
pub const AMOUNT: &str = "金额";

// ===== 库存表 =====
pub const DISTRIBUTOR_CODE: &str = "经销商编码";
pub const DISTRIBUTOR_FULL_NAME: &str = "经销商全称";
pub const PRODUCT_CODE: &str = "产品编码";
pub const PRODUCT_NAME: &str = "产品名称";
pub const STOCK_UNITS: &str = "库存数量";
pub const STOCK_BOXES: &str = "库存箱数";
pub const WEIGHT_SPEC: &str = "重量规格";
pub const SIZE_SPEC: &str = "规格";
pub const SPECIFIC_CLASS: &str = "具体分类";

// ===== 业绩台账 =====
pub const WAREHOUSE: &str = "仓库";
pub const MID_CATEGORY: &str = "中类";
pub const GROUP: &str = "归类";

// ===== 任务表 =====
pub const QUOTA: &str = "任务量";

// ===== 扫码表 =====
pub const COORDINATES: &str = "经纬度";
pub const LONGITUDE: &str = "经度";
pub const LATITUDE: &str = "纬度";

// ===== 派生列 =====
pub const TOTAL_SHIPMENT: &str = "总出货";
pub const ACTIVE_MONTHS: &str = "有效月数";
pub const AVG_SHIPMENT: &str = "月均出货";
pub const TIER: &str = "门店等级";
pub const YEAR_MONTH: &str = "年月";
