// ==========================================
// 经销数据看板 - 导入层
// ==========================================
// 职责: 上传字节 → 规范化数据集
// 流程: 文件解析 → 工作表识别 → 列名解析 / 长表透视 → 清洗 / 派生 → DQ 校验
// 支持: CSV (GB18030), xlsx / xlsm / xlsb / xls / ods
// ==========================================

// 模块声明
pub mod column_resolver;
pub mod data_cleaner;
pub mod dataset_importer;
pub mod derivation;
pub mod diagnostics;
pub mod dq_validator;
pub mod error;
pub mod file_parser;
pub mod long_format;
pub mod record_builder;
pub mod sheet_detector;

// 重导出核心类型
pub use column_resolver::{ColumnResolver, FieldSpec, ResolveStrategy, Resolution};
pub use data_cleaner::{distributor_key, normalize_year, DataCleaner};
pub use dataset_importer::DatasetImporter;
pub use derivation::{ClassRule, SpecificClassifier};
pub use diagnostics::{DiagLevel, DiagnosticEntry, DiagnosticLog};
pub use dq_validator::{DqValidator, DqViolation};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, FileParser, UniversalFileParser, WorkbookParser};
pub use long_format::LongFormatPivot;
pub use record_builder::RecordBuilder;
pub use sheet_detector::{RawSheets, SheetDetector, SheetSignature};
