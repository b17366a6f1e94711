// ==========================================
// OEE 班次报表系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 并发控制错误 =====
    #[error("乐观锁冲突: key={key}, expected_fingerprint={expected:?}, actual_fingerprint={actual:?}")]
    OptimisticLockFailure {
        key: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    // ===== 文件错误 =====
    #[error("记录文件读写失败: {0}")]
    FileIoError(String),

    #[error("记录文件 CSV 格式错误: {0}")]
    CsvError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::FileIoError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for RepositoryError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => RepositoryError::FileIoError(err.to_string()),
            _ => RepositoryError::CsvError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
