// ==========================================
// 经销数据看板 - 数据集导入器
// ==========================================
// 职责: 整合导入流程，从上传字节到规范化数据集
// 流程: 解析 → 工作表识别 → 列名解析 → 清洗/派生 → DQ → 数据集
// 红线: 任何失败只写诊断日志，不 panic、不向上抛出；会话保持可用
// ==========================================

use crate::config::DashboardConfig;
use crate::domain::dataset::NormalizedDataset;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_builder::RecordBuilder;
use crate::importer::sheet_detector::SheetDetector;
use crate::perf::PerfGuard;
use tracing::{debug, error, info, instrument};

pub struct DatasetImporter {
    config: DashboardConfig,
}

impl DatasetImporter {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// 导入上传文件
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    /// - filename: 文件名（据扩展名选择解析器）
    ///
    /// # 返回
    /// - 数据集；文件无法解析时所有表为 None，日志含原始错误文本
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn import(&self, bytes: &[u8], filename: &str) -> NormalizedDataset {
        let mut perf = PerfGuard::new("dataset_import");
        let mut dataset = NormalizedDataset::new(filename);
        info!(filename, "开始导入数据文件");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let parser = UniversalFileParser::new(&self.config.csv_encoding);
        let tables = match parser.parse(bytes, filename) {
            Ok(tables) => tables,
            Err(e) => {
                error!(error = %e, "文件解析失败");
                dataset.log.error(None, format!("文件无法解析: {}", e));
                return dataset;
            }
        };
        perf.add_rows(tables.iter().map(|t| t.len()).sum());

        // === 步骤 2: 工作表识别 ===
        debug!(sheets = tables.len(), "步骤 2: 工作表识别");
        let sheets = SheetDetector.assign(tables, &mut dataset.log);

        // === 步骤 3: 逐表规范化 ===
        debug!("步骤 3: 逐表规范化");
        let builder = RecordBuilder::new(&self.config);
        let log = &mut dataset.log;
        dataset.shipments = sheets.shipments.and_then(|t| builder.shipments(t, log));
        dataset.stock = sheets.stock.and_then(|t| builder.stock(t, log));
        dataset.outbound = sheets.outbound.and_then(|t| builder.outbound(t, log));
        dataset.performance = sheets.performance.and_then(|t| builder.performance(t, log));
        dataset.targets = sheets.targets.and_then(|t| builder.targets(t, log));
        dataset.scans = sheets.scans.and_then(|t| builder.scans(t, log));

        info!(summary = %dataset.summary(), warnings = dataset.log.len(), "导入完成");
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SheetKind;

    #[test]
    fn test_malformed_bytes_yield_empty_dataset_with_log() {
        let importer = DatasetImporter::new(DashboardConfig::default());
        let dataset = importer.import(b"\x00\x01garbage", "upload.xlsx");

        assert!(dataset.is_empty());
        assert!(dataset.log.has_errors());
        assert!(dataset.log.contains("文件无法解析"));
    }

    #[test]
    fn test_csv_loads_as_shipments_only() {
        let (bytes, _, _) = encoding_rs::GB18030.encode("省区,经销商名称,门店名称,1月,2月\n广东,ABC,一店,4,4\n");
        let importer = DatasetImporter::new(DashboardConfig::default());
        let dataset = importer.import(&bytes, "门店出货.csv");

        assert_eq!(dataset.row_count(SheetKind::Shipments), Some(1));
        assert!(!dataset.is_available(SheetKind::Stock));
        let shipments = dataset.shipments.unwrap();
        assert_eq!(shipments[0].average(), 4.0);
    }
}
