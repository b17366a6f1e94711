// ==========================================
// OEE 班次报表系统 - 引擎层
// ==========================================
// 职责: 录入校验与时间分桶 (构建器) + 驾驶舱聚合视图
// 红线: 引擎不访问文件,记录由调用方传入
// 红线: 聚合查询不返回错误,空集以 EmptyResultSet 表示
// ==========================================

pub mod distribution;
pub mod error;
pub mod history;
pub mod outcome;
pub mod pareto;
pub mod shift_builder;
pub mod time_buckets;
pub mod trend;
pub mod waterfall;

// 重导出核心引擎
pub use distribution::{DistributionEngine, DistributionReport, HistogramBin, LineDistribution};
pub use error::{ShiftReportError, ShiftReportResult};
pub use history::{HistoryEngine, HistoryFilter, HistoryReport, HistorySummary};
pub use outcome::QueryOutcome;
pub use pareto::{ParetoEngine, ParetoEntry, ParetoReport, ParetoSelection};
pub use shift_builder::{RecomputeOutcome, SaveOutcome, ShiftReportBuilder};
pub use time_buckets::derive_time_buckets;
pub use trend::{LineTrendSummary, TrendEngine, TrendPoint, TrendReport, TrendSelection, TrendSeries};
pub use waterfall::{WaterfallBar, WaterfallEngine, WaterfallReport, WaterfallSelection};
