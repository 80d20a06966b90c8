// ==========================================
// 经销数据看板 - 工作表识别
// ==========================================
// 职责: 将解析出的表分配到 6 种业务表
// 规则: 表1/2/3/5 按位置 0/1/2/4；表6 按位置 5；
//       表4（业绩台账）按表头特征评分定位，不依赖位置
// 红线: 找不到业绩台账不是错误，对应视图显示"无数据"
// ==========================================

use crate::domain::table::RawTable;
use crate::domain::types::SheetKind;
use crate::importer::diagnostics::DiagnosticLog;
use serde::{Deserialize, Serialize};

/// 关键字段（年/月/省区）
const KEY_TOKENS: [&str; 3] = ["年", "月", "省"];

/// 信号字段（仓库/金额/数量/品类层级）
const SIGNAL_TOKENS: [&str; 9] = [
    "仓库", "金额", "数量", "箱", "大类", "中类", "品类", "类别", "归类",
];

/// 固定位置表的下标（不参与表4候选）
const FIXED_POSITIONS: [usize; 4] = [0, 1, 2, 4];
const SCAN_POSITION: usize = 5;

/// 表头特征评分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSignature {
    pub key_hits: usize,
    pub signal_hits: usize,
}

impl SheetSignature {
    /// 按命中的不同关键字计数（同一关键字出现在多列只计一次）
    pub fn score(headers: &[String]) -> Self {
        let hits = |tokens: &[&str]| {
            tokens
                .iter()
                .filter(|t| headers.iter().any(|h| h.contains(*t)))
                .count()
        };
        Self {
            key_hits: hits(&KEY_TOKENS[..]),
            signal_hits: hits(&SIGNAL_TOKENS[..]),
        }
    }

    /// 关键字段 >= 2 且信号字段 >= 1
    pub fn qualifies(&self) -> bool {
        self.key_hits >= 2 && self.signal_hits >= 1
    }

    pub fn total(&self) -> usize {
        self.key_hits + self.signal_hits
    }
}

/// 分配结果（缺失的表为 None）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheets {
    pub shipments: Option<RawTable>,
    pub stock: Option<RawTable>,
    pub outbound: Option<RawTable>,
    pub performance: Option<RawTable>,
    pub targets: Option<RawTable>,
    pub scans: Option<RawTable>,
}

impl RawSheets {
    pub fn get(&self, kind: SheetKind) -> Option<&RawTable> {
        match kind {
            SheetKind::Shipments => self.shipments.as_ref(),
            SheetKind::Stock => self.stock.as_ref(),
            SheetKind::Outbound => self.outbound.as_ref(),
            SheetKind::Performance => self.performance.as_ref(),
            SheetKind::Targets => self.targets.as_ref(),
            SheetKind::Scans => self.scans.as_ref(),
        }
    }

    pub fn present(&self) -> Vec<SheetKind> {
        SheetKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }
}

pub struct SheetDetector;

impl SheetDetector {
    /// 定位业绩台账
    ///
    /// # 规则
    /// 1. 表名含 "sheet4"（忽略大小写与空白）的表优先尝试，但必须通过评分门槛
    /// 2. 其余非固定位置（含扫码表位置）的表中，取通过门槛且总分最高者（同分取靠前者）
    pub fn locate_ledger(&self, tables: &[RawTable]) -> Option<usize> {
        let named = tables.iter().position(|t| {
            let compact: String = t.name.chars().filter(|c| !c.is_whitespace()).collect();
            compact.to_lowercase().contains("sheet4")
        });
        if let Some(i) = named {
            let sig = SheetSignature::score(&tables[i].headers);
            if sig.qualifies() {
                return Some(i);
            }
            tracing::debug!(sheet = %tables[i].name, ?sig, "sheet4 命名表未通过评分");
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, table) in tables.iter().enumerate() {
            if FIXED_POSITIONS.contains(&i) || i == SCAN_POSITION {
                continue;
            }
            let sig = SheetSignature::score(&table.headers);
            if !sig.qualifies() {
                continue;
            }
            if best.map_or(true, |(_, score)| sig.total() > score) {
                best = Some((i, sig.total()));
            }
        }
        best.map(|(i, _)| i)
    }

    /// 分配业务表
    ///
    /// # 规则
    /// - 单表输入（CSV）→ 仅表1
    /// - 被选为业绩台账的表不再作为其他表使用
    /// - 无表头的空表视为缺失
    pub fn assign(&self, tables: Vec<RawTable>, log: &mut DiagnosticLog) -> RawSheets {
        let ledger = self.locate_ledger(&tables);
        match ledger {
            Some(i) => log.info(
                Some(SheetKind::Performance.label()),
                format!("业绩台账定位到第 {} 个工作表 '{}'", i + 1, tables[i].name),
            ),
            None if tables.len() > 1 => log.info(
                Some(SheetKind::Performance.label()),
                "未找到符合特征的业绩台账，业绩视图无数据",
            ),
            None => {}
        }

        let mut slots: Vec<Option<RawTable>> = tables.into_iter().map(Some).collect();
        let mut take = |i: usize| -> Option<RawTable> {
            if Some(i) == ledger {
                return None;
            }
            // 无表头的空表（导出时的占位表）视为缺失
            slots
                .get_mut(i)
                .and_then(Option::take)
                .filter(|t| t.width() > 0)
        };

        let mut sheets = RawSheets {
            shipments: take(0),
            stock: take(1),
            outbound: take(2),
            targets: take(4),
            scans: take(SCAN_POSITION),
            performance: None,
        };
        sheets.performance = ledger.and_then(|i| slots.get_mut(i).and_then(Option::take));

        for kind in SheetKind::ALL {
            if sheets.get(kind).is_none() && kind != SheetKind::Performance {
                log.info(Some(kind.label()), "工作表缺失，对应视图无数据");
            }
        }
        sheets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, headers: &[&str]) -> RawTable {
        RawTable::new(name, headers.iter().map(|s| s.to_string()).collect())
    }

    fn ledger_headers() -> Vec<&'static str> {
        vec!["年份", "月份", "省区", "经销商", "箱数", "金额", "仓库", "中类", "归类", "大类"]
    }

    #[test]
    fn test_signature_gate() {
        let sig = SheetSignature::score(&["年份".into(), "月份".into(), "仓库".into()]);
        assert_eq!(sig.key_hits, 2);
        assert_eq!(sig.signal_hits, 1);
        assert!(sig.qualifies());

        let sig = SheetSignature::score(&["年份".into(), "月份".into(), "门店".into()]);
        assert!(!sig.qualifies());
    }

    #[test]
    fn test_named_sheet4_must_pass_gate() {
        let tables = vec![
            sheet("a", &[]),
            sheet("b", &[]),
            sheet("c", &[]),
            sheet("Sheet 4", &["说明"]),
            sheet("e", &[]),
            sheet("f", &[]),
            sheet("业绩", &ledger_headers()),
        ];
        assert_eq!(SheetDetector.locate_ledger(&tables), Some(6));
    }

    #[test]
    fn test_named_sheet4_shortcut() {
        let tables = vec![sheet("x", &[]), sheet("SHEET4", &ledger_headers())];
        assert_eq!(SheetDetector.locate_ledger(&tables), Some(1));
    }

    #[test]
    fn test_no_qualifying_sheet_is_not_error() {
        let tables = vec![sheet("a", &["省区"]), sheet("b", &["x"]), sheet("c", &["y"]), sheet("d", &["z"])];
        let mut log = DiagnosticLog::new();
        let sheets = SheetDetector.assign(tables, &mut log);

        assert!(sheets.performance.is_none());
        assert!(sheets.shipments.is_some());
        assert!(!log.has_errors());
    }

    #[test]
    fn test_assign_positions() {
        let tables = vec![
            sheet("出货", &["省区"]),
            sheet("库存", &["经销商编码"]),
            sheet("出库", &["年份"]),
            sheet("业绩", &ledger_headers()),
            sheet("任务", &["省区"]),
            sheet("扫码", &["门店"]),
        ];
        let mut log = DiagnosticLog::new();
        let sheets = SheetDetector.assign(tables, &mut log);

        assert_eq!(sheets.performance.as_ref().map(|t| t.name.as_str()), Some("业绩"));
        assert_eq!(sheets.targets.as_ref().map(|t| t.name.as_str()), Some("任务"));
        assert_eq!(sheets.scans.as_ref().map(|t| t.name.as_str()), Some("扫码"));
        assert_eq!(sheets.present().len(), 6);
    }

    #[test]
    fn test_single_table_goes_to_shipments() {
        let mut log = DiagnosticLog::new();
        let sheets = SheetDetector.assign(vec![sheet("csv", &["省区"])], &mut log);
        assert_eq!(sheets.present(), vec![SheetKind::Shipments]);
    }

    #[test]
    fn test_scan_position_not_taken_as_ledger() {
        let tables = vec![
            sheet("出货", &["省区"]),
            sheet("库存", &["经销商编码"]),
            sheet("出库", &["年份"]),
            sheet("空", &[]),
            sheet("任务", &["省区"]),
            sheet("扫码", &["门店名称", "省区", "大类", "年份", "月份"]),
        ];
        let mut log = DiagnosticLog::new();
        let sheets = SheetDetector.assign(tables, &mut log);

        assert!(sheets.performance.is_none());
        assert_eq!(sheets.scans.as_ref().map(|t| t.name.as_str()), Some("扫码"));
    }

    #[test]
    fn test_headerless_sheet_treated_as_missing() {
        let tables = vec![sheet("出货", &["省区"]), sheet("库存", &[])];
        let mut log = DiagnosticLog::new();
        let sheets = SheetDetector.assign(tables, &mut log);
        assert!(sheets.stock.is_none());
        assert!(log.contains("工作表缺失"));
    }
}
