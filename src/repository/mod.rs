// ==========================================
// OEE 班次报表系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 记录文件读写,屏蔽 CSV 细节
// ==========================================

pub mod error;
pub mod record_codec;
pub mod shift_record_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use shift_record_repo::{ShiftRecordRepository, UpsertOutcome};
