// ==========================================
// OEE 班次报表系统 - API 层
// ==========================================
// 职责: 提供表现层协作接口（录入表单 + 驾驶舱）
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod shift_report_api;

// 重导出核心类型
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use shift_report_api::ShiftReportApi;
