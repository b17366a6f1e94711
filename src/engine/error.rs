// ==========================================
// OEE 班次报表系统 - 构建器错误类型
// ==========================================
// 所有构建器错误都是值（kind + message），不 panic
// Display 为开发者日志；user_message() 为本地化提示
// ==========================================

use crate::domain::{ErrorKind, ValidationReport};
use crate::i18n::{t, t_with_args};
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiftReportError {
    // ===== 产出条目 =====
    #[error("产品已添加: {code}")]
    DuplicateItem { code: String },

    #[error("产品不在目录中或不属于当前生产线: {code}")]
    UnknownProduct { code: String },

    #[error("索引越界: index={index}, len={len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== 停机条目 =====
    #[error("必填字段为空: {field}")]
    MissingField { field: String },

    #[error("停机时长必须为正数: {minutes}")]
    InvalidDuration { minutes: i64 },

    #[error("停机时长超出待解释时间: minutes={minutes}, remaining={remaining}")]
    JustifyBudgetExceeded { minutes: u32, remaining: u32 },

    #[error("停机条数已达上限: {max}")]
    TooManyStoppages { max: usize },

    #[error("停机原因不在分类表中: {cause} / {subcause}")]
    UnknownStoppageCause { cause: String, subcause: String },

    // ===== 保存 =====
    #[error("保存前校验未通过: {0}")]
    ValidationFailed(ValidationReport),

    #[error("记录文件写入失败: {0}")]
    Storage(#[from] RepositoryError),
}

impl ShiftReportError {
    /// 稳定错误码
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShiftReportError::DuplicateItem { .. } => ErrorKind::DuplicateItem,
            ShiftReportError::UnknownProduct { .. } => ErrorKind::UnknownProduct,
            ShiftReportError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            ShiftReportError::MissingField { .. } => ErrorKind::MissingField,
            ShiftReportError::InvalidDuration { .. } => ErrorKind::InvalidDuration,
            ShiftReportError::JustifyBudgetExceeded { .. } => ErrorKind::JustifyBudgetExceeded,
            ShiftReportError::TooManyStoppages { .. } => ErrorKind::TooManyStoppages,
            ShiftReportError::UnknownStoppageCause { .. } => ErrorKind::UnknownStoppageCause,
            ShiftReportError::ValidationFailed(report) => report
                .violations
                .first()
                .map(|v| v.kind)
                .unwrap_or(ErrorKind::MissingField),
            ShiftReportError::Storage(RepositoryError::OptimisticLockFailure { .. }) => {
                ErrorKind::ConcurrentModification
            }
            ShiftReportError::Storage(_) => ErrorKind::StorageIoError,
        }
    }

    /// 面向操作员的本地化提示
    pub fn user_message(&self) -> String {
        match self {
            ShiftReportError::DuplicateItem { code } => {
                t_with_args("builder.duplicate_item", &[("code", code.as_str())])
            }
            ShiftReportError::UnknownProduct { code } => {
                t_with_args("builder.unknown_product", &[("code", code.as_str())])
            }
            ShiftReportError::IndexOutOfRange { index, len } => t_with_args(
                "builder.index_out_of_range",
                &[("index", index.to_string().as_str()), ("len", len.to_string().as_str())],
            ),
            ShiftReportError::MissingField { field } => {
                t_with_args("builder.missing_field", &[("field", field.as_str())])
            }
            ShiftReportError::InvalidDuration { minutes } => t_with_args(
                "builder.invalid_duration",
                &[("minutes", minutes.to_string().as_str())],
            ),
            ShiftReportError::JustifyBudgetExceeded { minutes, remaining } => t_with_args(
                "builder.justify_budget_exceeded",
                &[
                    ("minutes", minutes.to_string().as_str()),
                    ("remaining", remaining.to_string().as_str()),
                ],
            ),
            ShiftReportError::TooManyStoppages { max } => {
                t_with_args("builder.too_many_stoppages", &[("max", max.to_string().as_str())])
            }
            ShiftReportError::UnknownStoppageCause { cause, subcause } => t_with_args(
                "builder.unknown_cause",
                &[("cause", cause.as_str()), ("subcause", subcause.as_str())],
            ),
            ShiftReportError::ValidationFailed(report) => report.to_string(),
            ShiftReportError::Storage(e @ RepositoryError::OptimisticLockFailure { .. }) => {
                format!("{} ({})", t("storage.concurrent_modification"), e)
            }
            ShiftReportError::Storage(e) => format!("{} ({})", t("storage.write_failed"), e),
        }
    }
}

/// Result 类型别名
pub type ShiftReportResult<T> = Result<T, ShiftReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_separates_lock_failure() {
        let lock = ShiftReportError::Storage(RepositoryError::OptimisticLockFailure {
            key: "2025-03-04/1/L1".to_string(),
            expected: None,
            actual: Some(7),
        });
        assert_eq!(lock.kind(), ErrorKind::ConcurrentModification);

        let io = ShiftReportError::Storage(RepositoryError::FileIoError("disk full".to_string()));
        assert_eq!(io.kind(), ErrorKind::StorageIoError);
    }
}
