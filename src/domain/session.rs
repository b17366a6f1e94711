// ==========================================
// OEE 班次报表系统 - 编辑会话
// ==========================================
// 由调用方持有并显式传递,替代进程级可变会话状态
// 产出/停机列表只能经由 ShiftReportBuilder 修改
// ==========================================

use crate::domain::shift::{ProducedItem, ShiftKey, Stoppage, TimeBuckets};
use crate::domain::validation::ValidationReport;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 标准班可用时间 (分钟)
pub const DEFAULT_AVAILABLE_MIN: u32 = 480;

// ==========================================
// EditingSession - 单个班次报表的编辑状态
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditingSession {
    /// 会话 ID（日志关联用）
    pub session_id: Uuid,

    // ===== 表头 =====
    pub date: Option<NaiveDate>,
    pub shift: String,
    pub supervisor: String,
    pub line: String,

    // ===== 时间 =====
    pub available_min: u32,
    /// 修改后需调用 ShiftReportBuilder::recompute
    pub programmed_min: u32,

    // ===== 由构建器维护 =====
    pub(crate) items: Vec<ProducedItem>,
    pub(crate) stoppages: Vec<Stoppage>,
    pub(crate) buckets: TimeBuckets,
    pub(crate) validation: ValidationReport,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            date: None,
            shift: String::new(),
            supervisor: String::new(),
            line: String::new(),
            available_min: DEFAULT_AVAILABLE_MIN,
            programmed_min: 0,
            items: Vec::new(),
            stoppages: Vec::new(),
            buckets: TimeBuckets::default(),
            validation: ValidationReport::default(),
        }
    }

    /// 便捷构造: 填好表头
    pub fn with_header(
        date: NaiveDate,
        shift: impl Into<String>,
        supervisor: impl Into<String>,
        line: impl Into<String>,
        programmed_min: u32,
    ) -> Self {
        Self {
            date: Some(date),
            shift: shift.into(),
            supervisor: supervisor.into(),
            line: line.into(),
            programmed_min,
            ..Self::new()
        }
    }

    pub fn items(&self) -> &[ProducedItem] {
        &self.items
    }

    pub fn stoppages(&self) -> &[Stoppage] {
        &self.stoppages
    }

    /// 最近一次 recompute 的分桶结果
    pub fn buckets(&self) -> TimeBuckets {
        self.buckets
    }

    /// 最近一次 recompute 的校验状态
    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    pub fn is_invalid(&self) -> bool {
        !self.validation.is_ok()
    }

    pub fn total_stoppage_min(&self) -> u32 {
        self.stoppages.iter().map(|s| s.minutes).sum()
    }

    /// 自然键（日期缺失时为 None）
    pub fn key(&self) -> Option<ShiftKey> {
        self.date
            .map(|date| ShiftKey::new(date, self.shift.trim(), self.line.trim()))
    }

    /// 清空表单（保存成功后或用户主动清除）
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = EditingSession::new();
        assert_eq!(session.available_min, 480);
        assert!(session.items().is_empty());
        assert!(session.key().is_none());
        assert!(!session.is_invalid());
    }

    #[test]
    fn test_clear_resets_header_and_id() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let mut session = EditingSession::with_header(date, "1", "Ana", "L1", 420);
        let old_id = session.session_id;
        session.clear();
        assert!(session.date.is_none());
        assert_eq!(session.programmed_min, 0);
        assert_ne!(session.session_id, old_id);
    }
}
