// ==========================================
// OEE 班次报表系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、校验结果
// 红线: 不含文件访问逻辑,不含引擎逻辑
// ==========================================

pub mod product;
pub mod session;
pub mod shift;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use product::{Product, ProductCatalog};
pub use session::{EditingSession, DEFAULT_AVAILABLE_MIN};
pub use shift::{ProducedItem, ShiftKey, ShiftRecord, Stoppage, TimeBuckets};
pub use types::{
    BarKind, DistributionPeriod, ParetoClass, ParetoWindow, QueryStatus, TrendGranularity,
};
pub use validation::{ErrorKind, ValidationReport, Violation};
