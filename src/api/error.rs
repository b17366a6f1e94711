// ==========================================
// OEE 班次报表系统 - API 层错误类型
// ==========================================
// 职责: 汇总各层错误,转换为表现层可直接展示的消息
// 构建器错误保留稳定错误码 (ErrorKind)
// ==========================================

use crate::config::TaxonomyError;
use crate::domain::{ErrorKind, Violation};
use crate::engine::ShiftReportError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 录入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 构建器拒绝操作（会话未修改）
    #[error("{kind}: {message}")]
    BuilderRejected { kind: ErrorKind, message: String },

    /// 保存前校验未通过
    #[error("保存前校验未通过: {message}")]
    ValidationFailed {
        message: String,
        violations: Vec<Violation>,
    },

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("乐观锁冲突: {0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("记录文件错误: {0}")]
    StorageError(String),

    #[error("产品目录导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（仅录入/存储类错误有）
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::BuilderRejected { kind, .. } => Some(*kind),
            ApiError::ValidationFailed { violations, .. } => violations.first().map(|v| v.kind),
            ApiError::StorageError(_) => Some(ErrorKind::StorageIoError),
            ApiError::OptimisticLockFailure(_) => Some(ErrorKind::ConcurrentModification),
            _ => None,
        }
    }
}

// ==========================================
// 从 ShiftReportError 转换
// ==========================================
impl From<ShiftReportError> for ApiError {
    fn from(err: ShiftReportError) -> Self {
        match err {
            ShiftReportError::ValidationFailed(report) => ApiError::ValidationFailed {
                message: report.to_string(),
                violations: report.violations,
            },
            ShiftReportError::Storage(repo_err) => repo_err.into(),
            other => ApiError::BuilderRejected {
                kind: other.kind(),
                message: other.user_message(),
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure { key, .. } => ApiError::OptimisticLockFailure(
                format!("记录 {} 在编辑期间已被修改，请重新加载后再保存", key),
            ),
            RepositoryError::FileIoError(msg) | RepositoryError::CsvError(msg) => {
                ApiError::StorageError(msg)
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<TaxonomyError> for ApiError {
    fn from(err: TaxonomyError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationReport;

    #[test]
    fn test_builder_error_keeps_kind() {
        let err: ApiError = ShiftReportError::TooManyStoppages { max: 10 }.into();
        assert_eq!(err.kind(), Some(ErrorKind::TooManyStoppages));
        match err {
            ApiError::BuilderRejected { message, .. } => assert!(message.contains("10")),
            other => panic!("Expected BuilderRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_failure_carries_violations() {
        let mut report = ValidationReport::default();
        report.push(Violation::new(ErrorKind::UnjustifiedTime, "faltan 20 min"));
        let err: ApiError = ShiftReportError::ValidationFailed(report).into();
        assert_eq!(err.kind(), Some(ErrorKind::UnjustifiedTime));
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::OptimisticLockFailure {
            key: "2025-03-04/1/L1".to_string(),
            expected: Some(1),
            actual: Some(2),
        };
        let api_err: ApiError = ShiftReportError::Storage(repo_err).into();
        assert_eq!(api_err.kind(), Some(ErrorKind::ConcurrentModification));
        match api_err {
            ApiError::OptimisticLockFailure(msg) => assert!(msg.contains("2025-03-04/1/L1")),
            other => panic!("Expected OptimisticLockFailure, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::FileIoError("disk full".to_string()).into();
        assert_eq!(api_err.kind(), Some(ErrorKind::StorageIoError));
    }
}
