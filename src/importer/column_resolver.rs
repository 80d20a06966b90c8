// ==========================================
// 经销数据看板 - 列名解析器
// ==========================================
// 职责: 源列 → 标准列映射（精确列名 → 别名包含 → 固定列位置）
// 说明: 部分客户导出会匿名化/平移表头但保持列顺序，因此需要列位置兜底
// ==========================================

use crate::domain::columns as col;
use crate::domain::table::RawTable;
use crate::importer::diagnostics::DiagnosticLog;
use std::collections::HashSet;
use std::fmt;

/// 单一解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// 列名（去空白后）完全相等
    Exact(&'static str),
    /// 列名包含别名片段
    Contains(&'static str),
    /// 固定列位置（0 基）
    Index(usize),
}

impl ResolveStrategy {
    fn is_positional(&self) -> bool {
        matches!(self, ResolveStrategy::Index(_))
    }
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveStrategy::Exact(name) => write!(f, "精确列名 '{}'", name),
            ResolveStrategy::Contains(alias) => write!(f, "别名包含 '{}'", alias),
            ResolveStrategy::Index(i) => write!(f, "第 {} 列", i + 1),
        }
    }
}

/// 标准字段定义：按顺序尝试的策略链
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub strategies: &'static [ResolveStrategy],
    pub required: bool,
}

/// 单字段解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub canonical: &'static str,
    pub column: usize,
    pub source_label: String,
    pub via: ResolveStrategy,
}

pub struct ColumnResolver;

impl ColumnResolver {
    /// 解析并原地改写列名
    ///
    /// # 规则
    /// 1. 第一轮：所有字段按 精确 → 包含 尝试，已被占用的列不再参与
    /// 2. 第二轮：仍未解析的字段尝试固定列位置
    /// 3. 改名前若另有一列恰好叫标准名，先给那一列加后缀，避免两列同名被误合并
    ///
    /// # 返回
    /// - 成功解析的字段列表（按 specs 顺序）
    pub fn resolve(
        &self,
        table: &mut RawTable,
        specs: &[FieldSpec],
        sheet: &str,
        log: &mut DiagnosticLog,
    ) -> Vec<Resolution> {
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut found: Vec<Option<(usize, ResolveStrategy)>> = vec![None; specs.len()];

        // 第一轮：列名匹配
        for (i, spec) in specs.iter().enumerate() {
            found[i] = spec
                .strategies
                .iter()
                .filter(|s| !s.is_positional())
                .find_map(|s| Self::locate(table, s, &claimed).map(|c| (c, *s)));
            if let Some((column, _)) = found[i] {
                claimed.insert(column);
            }
        }

        // 第二轮：列位置兜底
        for (i, spec) in specs.iter().enumerate() {
            if found[i].is_some() {
                continue;
            }
            found[i] = spec
                .strategies
                .iter()
                .filter(|s| s.is_positional())
                .find_map(|s| Self::locate(table, s, &claimed).map(|c| (c, *s)));
            if let Some((column, _)) = found[i] {
                claimed.insert(column);
            }
        }

        let mut resolutions = Vec::new();
        for (spec, hit) in specs.iter().zip(found) {
            let (column, via) = match hit {
                Some(h) => h,
                None => {
                    if spec.required {
                        log.warn(Some(sheet), format!("未找到列 '{}'", spec.canonical));
                    }
                    continue;
                }
            };

            let source_label = table.headers[column].clone();
            if via.is_positional() {
                log.warn(
                    Some(sheet),
                    format!(
                        "列名未匹配，按{}回退: '{}' → '{}'",
                        via, source_label, spec.canonical
                    ),
                );
            }

            // 同名冲突：先给冲突列改名
            if source_label != spec.canonical {
                if let Some(other) = table.column_index(spec.canonical) {
                    if other != column {
                        let renamed = format!("{}_原{}", spec.canonical, other + 1);
                        log.warn(
                            Some(sheet),
                            format!("列名冲突: 第 {} 列 '{}' 改名为 '{}'", other + 1, spec.canonical, renamed),
                        );
                        table.rename_column(other, &renamed);
                    }
                }
                table.rename_column(column, spec.canonical);
            }

            resolutions.push(Resolution {
                canonical: spec.canonical,
                column,
                source_label,
                via,
            });
        }

        tracing::debug!(
            sheet,
            resolved = resolutions.len(),
            expected = specs.len(),
            "列名解析完成"
        );
        resolutions
    }

    fn locate(table: &RawTable, strategy: &ResolveStrategy, claimed: &HashSet<usize>) -> Option<usize> {
        let free = |idx: &usize| !claimed.contains(idx);
        match strategy {
            ResolveStrategy::Exact(name) => (0..table.width())
                .filter(free)
                .find(|&i| table.headers[i].trim() == *name),
            ResolveStrategy::Contains(alias) => (0..table.width())
                .filter(free)
                .find(|&i| table.headers[i].contains(alias)),
            ResolveStrategy::Index(idx) => Some(*idx).filter(|i| *i < table.width()).filter(free),
        }
    }
}

// ==========================================
// 各表标准字段定义
// ==========================================
pub mod specs {
    use super::{col, FieldSpec, ResolveStrategy::*};

    const fn field(
        canonical: &'static str,
        strategies: &'static [super::ResolveStrategy],
        required: bool,
    ) -> FieldSpec {
        FieldSpec {
            canonical,
            strategies,
            required,
        }
    }

    /// 表1 门店出货（宽表/长表共用的维度列）
    pub const SHIPMENT_KEYS: &[FieldSpec] = &[
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(0)], true),
        field(
            col::DISTRIBUTOR,
            &[
                Exact(col::DISTRIBUTOR),
                Contains("客户简称"),
                Contains("购货单位"),
                Contains("经销商"),
                Index(1),
            ],
            true,
        ),
        field(col::STORE, &[Exact(col::STORE), Contains("门店"), Contains("终端")], false),
    ];

    /// 表1 长表额外列
    pub const SHIPMENT_LONG: &[FieldSpec] = &[
        field(col::YEAR, &[Exact(col::YEAR), Exact("年")], false),
        field(
            col::MONTH,
            &[Exact(col::MONTH), Contains("月"), Contains("时间"), Contains("日期")],
            true,
        ),
        field(
            col::QUANTITY,
            &[Exact(col::QUANTITY), Contains("数量"), Contains("箱"), Contains("出货")],
            true,
        ),
    ];

    /// 表2 库存（12 列固定顺序）
    pub const STOCK: &[FieldSpec] = &[
        field(
            col::DISTRIBUTOR_CODE,
            &[Exact(col::DISTRIBUTOR_CODE), Contains("客户编码"), Index(0)],
            false,
        ),
        field(
            col::DISTRIBUTOR_FULL_NAME,
            &[Exact(col::DISTRIBUTOR_FULL_NAME), Contains("全称"), Index(1)],
            false,
        ),
        field(
            col::PRODUCT_CODE,
            &[Exact(col::PRODUCT_CODE), Contains("物料编码"), Index(2)],
            false,
        ),
        field(
            col::PRODUCT_NAME,
            &[Exact(col::PRODUCT_NAME), Contains("物料名称"), Contains("品名"), Index(3)],
            true,
        ),
        field(col::STOCK_UNITS, &[Exact(col::STOCK_UNITS), Contains("听"), Index(4)], false),
        field(col::STOCK_BOXES, &[Exact(col::STOCK_BOXES), Contains("箱"), Index(5)], true),
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(6)], false),
        field(
            col::DISTRIBUTOR,
            &[
                Exact(col::DISTRIBUTOR),
                Contains("客户简称"),
                Contains("购货单位"),
                Contains("简称"),
                Index(7),
            ],
            true,
        ),
        field(col::CATEGORY, &[Exact(col::CATEGORY), Contains("大类"), Index(8)], false),
        field(col::SUBCATEGORY, &[Exact(col::SUBCATEGORY), Contains("小类"), Index(9)], false),
        field(col::WEIGHT_SPEC, &[Exact(col::WEIGHT_SPEC), Contains("重量"), Index(10)], true),
        field(col::SIZE_SPEC, &[Exact(col::SIZE_SPEC), Index(11)], false),
    ];

    /// 表3 出库流水
    pub const OUTBOUND: &[FieldSpec] = &[
        field(col::YEAR, &[Exact(col::YEAR), Exact("年"), Contains("年"), Index(0)], true),
        field(col::MONTH, &[Exact(col::MONTH), Exact("月"), Contains("月"), Index(1)], true),
        field(col::DAY, &[Exact(col::DAY), Exact("日期"), Contains("日"), Index(2)], false),
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(3)], true),
        field(
            col::DISTRIBUTOR,
            &[
                Exact(col::DISTRIBUTOR),
                Contains("客户简称"),
                Contains("购货单位"),
                Contains("经销商"),
                Index(4),
            ],
            true,
        ),
        field(col::STORE, &[Exact(col::STORE), Contains("门店"), Contains("终端")], false),
        field(col::CATEGORY, &[Exact(col::CATEGORY), Contains("大类"), Contains("品类"), Index(6)], false),
        field(col::SUBCATEGORY, &[Exact(col::SUBCATEGORY), Contains("小类"), Index(7)], false),
        field(col::BOXES, &[Exact(col::BOXES), Contains("箱"), Contains("数量"), Index(8)], true),
    ];

    /// 表4 业绩台账
    pub const PERFORMANCE: &[FieldSpec] = &[
        field(col::YEAR, &[Exact(col::YEAR), Exact("年"), Contains("年"), Index(0)], true),
        field(col::MONTH, &[Exact(col::MONTH), Exact("月"), Contains("月"), Index(1)], true),
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(2)], true),
        field(
            col::DISTRIBUTOR,
            &[
                Exact(col::DISTRIBUTOR),
                Contains("客户简称"),
                Contains("购货单位"),
                Contains("经销商"),
                Index(3),
            ],
            true,
        ),
        field(col::BOXES, &[Exact(col::BOXES), Contains("箱"), Contains("数量"), Index(4)], true),
        field(col::AMOUNT, &[Exact(col::AMOUNT), Contains("金额"), Contains("额"), Index(5)], false),
        field(col::WAREHOUSE, &[Exact(col::WAREHOUSE), Contains("仓"), Index(6)], false),
        field(col::MID_CATEGORY, &[Exact(col::MID_CATEGORY), Contains("中类"), Index(7)], false),
        field(col::GROUP, &[Exact(col::GROUP), Contains("归类"), Contains("组"), Index(8)], false),
        field(col::CATEGORY, &[Exact(col::CATEGORY), Contains("大类"), Index(9)], false),
    ];

    /// 表5 任务（品类/月份/任务量 位于第 4~6 列）
    pub const TARGETS: &[FieldSpec] = &[
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(0)], true),
        field(
            col::CATEGORY,
            &[Exact(col::CATEGORY), Contains("品类"), Contains("类"), Index(3)],
            false,
        ),
        field(col::MONTH, &[Exact(col::MONTH), Contains("月"), Index(4)], true),
        field(
            col::QUOTA,
            &[
                Exact(col::QUOTA),
                Contains("任务"),
                Contains("指标"),
                Contains("目标"),
                Index(5),
            ],
            true,
        ),
    ];

    /// 表6 扫码溯源（固定列位置）
    pub const SCANS: &[FieldSpec] = &[
        field(col::STORE, &[Exact(col::STORE), Contains("门店"), Contains("终端"), Index(0)], false),
        field(
            col::DISTRIBUTOR,
            &[Exact(col::DISTRIBUTOR), Contains("客户简称"), Contains("经销商"), Index(1)],
            true,
        ),
        field(col::PROVINCE, &[Exact(col::PROVINCE), Contains("省"), Index(2)], true),
        field(col::CATEGORY, &[Exact(col::CATEGORY), Contains("大类"), Index(3)], false),
        field(col::SUBCATEGORY, &[Exact(col::SUBCATEGORY), Contains("小类"), Index(4)], false),
        field(
            col::COORDINATES,
            &[Exact(col::COORDINATES), Contains("经纬"), Contains("坐标"), Contains("位置"), Index(5)],
            false,
        ),
        field(col::YEAR, &[Exact(col::YEAR), Exact("年"), Contains("年"), Index(6)], true),
        field(col::MONTH, &[Exact(col::MONTH), Exact("月"), Contains("月"), Index(7)], true),
        field(col::DAY, &[Exact(col::DAY), Exact("日期"), Index(8)], false),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    fn table(headers: &[&str]) -> RawTable {
        let mut t = RawTable::new("t", headers.iter().map(|s| s.to_string()).collect());
        t.push_row(headers.iter().map(|_| CellValue::Number(1.0)).collect());
        t
    }

    const SPECS: &[FieldSpec] = &[
        FieldSpec {
            canonical: "经销商名称",
            strategies: &[
                ResolveStrategy::Exact("经销商名称"),
                ResolveStrategy::Contains("客户简称"),
                ResolveStrategy::Contains("购货单位"),
                ResolveStrategy::Index(1),
            ],
            required: true,
        },
        FieldSpec {
            canonical: "箱数",
            strategies: &[ResolveStrategy::Exact("箱数"), ResolveStrategy::Index(2)],
            required: true,
        },
    ];

    #[test]
    fn test_exact_match_wins() {
        let mut t = table(&["省区", " 经销商名称 ", "箱数"]);
        let mut log = DiagnosticLog::new();
        let res = ColumnResolver.resolve(&mut t, SPECS, "出库", &mut log);

        assert_eq!(res.len(), 2);
        assert_eq!(res[0].via, ResolveStrategy::Exact("经销商名称"));
        assert_eq!(t.headers, vec!["省区", "经销商名称", "箱数"]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_alias_substring_match() {
        let mut t = table(&["购货单位(简称)", "x", "箱数"]);
        let mut log = DiagnosticLog::new();
        let res = ColumnResolver.resolve(&mut t, SPECS, "出库", &mut log);

        assert_eq!(res[0].column, 0);
        assert_eq!(res[0].via, ResolveStrategy::Contains("购货单位"));
        assert_eq!(t.headers[0], "经销商名称");
    }

    #[test]
    fn test_positional_fallback_is_logged() {
        let mut t = table(&["A", "B", "C"]);
        let mut log = DiagnosticLog::new();
        let res = ColumnResolver.resolve(&mut t, SPECS, "出库", &mut log);

        assert_eq!(res.len(), 2);
        assert_eq!(t.headers, vec!["A", "经销商名称", "箱数"]);
        assert_eq!(log.len(), 2);
        assert!(log.contains("回退"));
    }

    #[test]
    fn test_positional_fallback_renames_colliding_column() {
        // 第 1 列恰好叫 "箱数" 但已被经销商字段以别名占用之外的情况：
        // "箱数" 精确匹配失败（被占用）时按位置回退到第 3 列，原同名列需改名
        const ONLY_INDEX: &[FieldSpec] = &[FieldSpec {
            canonical: "箱数",
            strategies: &[ResolveStrategy::Index(2)],
            required: true,
        }];
        let mut t = table(&["箱数", "B", "C"]);
        let mut log = DiagnosticLog::new();
        ColumnResolver.resolve(&mut t, ONLY_INDEX, "出库", &mut log);

        assert_eq!(t.headers, vec!["箱数_原1", "B", "箱数"]);
        assert!(log.contains("列名冲突"));
    }

    #[test]
    fn test_name_pass_runs_before_positional_pass() {
        // 经销商的列位置兜底(1)不应抢走按名匹配到的 "箱数"
        const SPECS2: &[FieldSpec] = &[
            FieldSpec {
                canonical: "经销商名称",
                strategies: &[ResolveStrategy::Exact("经销商名称"), ResolveStrategy::Index(1)],
                required: true,
            },
            FieldSpec {
                canonical: "箱数",
                strategies: &[ResolveStrategy::Exact("箱数")],
                required: true,
            },
        ];
        let mut t = table(&["客户", "箱数"]);
        let mut log = DiagnosticLog::new();
        let res = ColumnResolver.resolve(&mut t, SPECS2, "出库", &mut log);

        assert_eq!(res.len(), 1);
        assert_eq!(res[0].canonical, "箱数");
        assert!(log.contains("未找到列 '经销商名称'"));
    }

    #[test]
    fn test_missing_optional_field_not_logged() {
        const OPTIONAL: &[FieldSpec] = &[FieldSpec {
            canonical: "门店名称",
            strategies: &[ResolveStrategy::Contains("门店")],
            required: false,
        }];
        let mut t = table(&["a"]);
        let mut log = DiagnosticLog::new();
        assert!(ColumnResolver.resolve(&mut t, OPTIONAL, "门店出货", &mut log).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_stock_spec_on_anonymized_headers() {
        let headers: Vec<String> = (1..=12).map(|i| format!("列{}", i)).collect();
        let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let mut t = table(&refs);
        let mut log = DiagnosticLog::new();
        let res = ColumnResolver.resolve(&mut t, specs::STOCK, "库存", &mut log);

        assert_eq!(res.len(), 12);
        assert_eq!(t.headers[5], col::STOCK_BOXES);
        assert_eq!(t.headers[7], col::DISTRIBUTOR);
        assert_eq!(t.headers[10], col::WEIGHT_SPEC);
    }
}
