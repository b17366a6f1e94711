// ==========================================
// OEE 班次报表系统 - 校验结果类型
// ==========================================
// 构建器错误对表现层以 (kind + message) 的结构化形式暴露
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ErrorKind - 错误/违规类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    DuplicateItem,
    UnknownProduct,
    IndexOutOfRange,
    MissingField,
    InvalidDuration,
    JustifyBudgetExceeded,
    TooManyStoppages,
    UnknownStoppageCause,
    TimeCoherenceViolation,
    StoppageBudgetViolation,
    UnjustifiedTime,
    EmptyResultSet,
    StorageIoError,
    ConcurrentModification,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateItem => "DUPLICATE_ITEM",
            ErrorKind::UnknownProduct => "UNKNOWN_PRODUCT",
            ErrorKind::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            ErrorKind::MissingField => "MISSING_FIELD",
            ErrorKind::InvalidDuration => "INVALID_DURATION",
            ErrorKind::JustifyBudgetExceeded => "JUSTIFY_BUDGET_EXCEEDED",
            ErrorKind::TooManyStoppages => "TOO_MANY_STOPPAGES",
            ErrorKind::UnknownStoppageCause => "UNKNOWN_STOPPAGE_CAUSE",
            ErrorKind::TimeCoherenceViolation => "TIME_COHERENCE_VIOLATION",
            ErrorKind::StoppageBudgetViolation => "STOPPAGE_BUDGET_VIOLATION",
            ErrorKind::UnjustifiedTime => "UNJUSTIFIED_TIME",
            ErrorKind::EmptyResultSet => "EMPTY_RESULT_SET",
            ErrorKind::StorageIoError => "STORAGE_IO_ERROR",
            ErrorKind::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Violation - 保存前校验违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ErrorKind,
    /// 涉及字段（可选）
    pub field: Option<String>,
    /// 用户可读原因（已本地化）
    pub message: String,
}

impl Violation {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

// ==========================================
// ValidationReport - 校验报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn has(&self, kind: ErrorKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("[{}] {}", v.kind, v.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}
