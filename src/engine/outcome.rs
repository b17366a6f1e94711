// ==========================================
// OEE 班次报表系统 - 查询结果包装
// ==========================================

use crate::domain::QueryStatus;
use serde::Serialize;

/// 聚合查询结果：空结果集是合法终态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome<T> {
    pub status: QueryStatus,
    pub view: T,
}

impl<T> QueryOutcome<T> {
    pub fn ready(view: T) -> Self {
        Self {
            status: QueryStatus::Ready,
            view,
        }
    }

    pub fn empty(view: T) -> Self {
        Self {
            status: QueryStatus::EmptyResultSet,
            view,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status == QueryStatus::EmptyResultSet
    }
}
