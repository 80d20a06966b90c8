// ==========================================
// 经销数据看板 - 规范化数据集
// ==========================================
// 职责: 一次上传解析后的全部业务表 + 诊断日志
// 红线: 缺失/结构不符的表为 None（视图显示"无数据"），不影响其他表
// ==========================================

use crate::domain::outbound::OutboundTransaction;
use crate::domain::performance::PerformanceRecord;
use crate::domain::scan::ScanEvent;
use crate::domain::shipment::StoreShipmentRecord;
use crate::domain::stock::StockRecord;
use crate::domain::target::TargetRecord;
use crate::domain::types::SheetKind;
use crate::importer::diagnostics::DiagnosticLog;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDataset {
    /// 上传文件名
    pub source_name: String,

    pub shipments: Option<Vec<StoreShipmentRecord>>,
    pub stock: Option<Vec<StockRecord>>,
    pub outbound: Option<Vec<OutboundTransaction>>,
    pub performance: Option<Vec<PerformanceRecord>>,
    pub targets: Option<Vec<TargetRecord>>,
    pub scans: Option<Vec<ScanEvent>>,

    pub log: DiagnosticLog,
}

impl NormalizedDataset {
    pub fn new<S: Into<String>>(source_name: S) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    /// 表行数；表不可用时返回 None
    pub fn row_count(&self, kind: SheetKind) -> Option<usize> {
        match kind {
            SheetKind::Shipments => self.shipments.as_ref().map(Vec::len),
            SheetKind::Stock => self.stock.as_ref().map(Vec::len),
            SheetKind::Outbound => self.outbound.as_ref().map(Vec::len),
            SheetKind::Performance => self.performance.as_ref().map(Vec::len),
            SheetKind::Targets => self.targets.as_ref().map(Vec::len),
            SheetKind::Scans => self.scans.as_ref().map(Vec::len),
        }
    }

    pub fn is_available(&self, kind: SheetKind) -> bool {
        self.row_count(kind).is_some()
    }

    /// 所有表均不可用（如文件无法解析）
    pub fn is_empty(&self) -> bool {
        SheetKind::ALL.iter().all(|k| !self.is_available(*k))
    }

    /// 可用表摘要（用于日志）
    pub fn summary(&self) -> String {
        SheetKind::ALL
            .iter()
            .map(|k| match self.row_count(*k) {
                Some(n) => format!("{}={}", k.label(), n),
                None => format!("{}=无数据", k.label()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
