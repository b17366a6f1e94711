// ==========================================
// OEE 班次报表系统 - 导入层
// ==========================================
// 职责: 产品目录导入（只读参考数据）
// 支持: Excel, CSV
// ==========================================

pub mod catalog_loader;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use catalog_loader::CatalogLoader;
pub use dq_validator::{CatalogDqReport, DqLevel, DqSummary, DqValidator, DqViolation};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, RawProductRecord};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
