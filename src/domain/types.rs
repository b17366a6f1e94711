// ==========================================
// OEE 班次报表系统 - 领域类型定义
// ==========================================
// 职责: 聚合视图与查询选择器使用的枚举
// ==========================================

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 查询状态 (Query Status)
// ==========================================
// 空结果集是合法终态,不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Ready,          // 有数据
    EmptyResultSet, // 过滤后无数据
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Ready => write!(f, "READY"),
            QueryStatus::EmptyResultSet => write!(f, "EMPTY_RESULT_SET"),
        }
    }
}

// ==========================================
// 瀑布图柱类型 (Waterfall Bar Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarKind {
    Programmed, // 计划时间 (起点)
    Stoppage,   // 停机原因 (按分钟降序)
    SpeedLoss,  // 速度损失
    Defects,    // 缺陷时间
    Effective,  // 最终有效时间 (终点)
}

impl fmt::Display for BarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarKind::Programmed => write!(f, "PROGRAMMED"),
            BarKind::Stoppage => write!(f, "STOPPAGE"),
            BarKind::SpeedLoss => write!(f, "SPEED_LOSS"),
            BarKind::Defects => write!(f, "DEFECTS"),
            BarKind::Effective => write!(f, "EFFECTIVE"),
        }
    }
}

// ==========================================
// 帕累托分类 (Pareto Class)
// ==========================================
// 累计占比 <= 阈值 为 Vital,其余为 Trivial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParetoClass {
    Vital,   // 少数关键
    Trivial, // 多数次要
}

impl fmt::Display for ParetoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParetoClass::Vital => write!(f, "VITAL"),
            ParetoClass::Trivial => write!(f, "TRIVIAL"),
        }
    }
}

// ==========================================
// 趋势粒度 (Trend Granularity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendGranularity {
    DayOfMonth, // 1..=31
    Week,       // ISO 周 1..=53
    Month,      // 1..=12
}

impl TrendGranularity {
    /// 取日期在该粒度下的周期编号
    pub fn period_of(&self, date: NaiveDate) -> u32 {
        match self {
            TrendGranularity::DayOfMonth => date.day(),
            TrendGranularity::Week => date.iso_week().week(),
            TrendGranularity::Month => date.month(),
        }
    }

    /// X 轴范围 (含端点)
    pub fn axis_range(&self) -> (u32, u32) {
        match self {
            TrendGranularity::DayOfMonth => (1, 31),
            TrendGranularity::Week => (1, 53),
            TrendGranularity::Month => (1, 12),
        }
    }
}

impl fmt::Display for TrendGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendGranularity::DayOfMonth => write!(f, "DAY_OF_MONTH"),
            TrendGranularity::Week => write!(f, "WEEK"),
            TrendGranularity::Month => write!(f, "MONTH"),
        }
    }
}

impl std::str::FromStr for TrendGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAY" | "DAY_OF_MONTH" => Ok(TrendGranularity::DayOfMonth),
            "WEEK" => Ok(TrendGranularity::Week),
            "MONTH" => Ok(TrendGranularity::Month),
            other => Err(format!("未知趋势粒度: {}", other)),
        }
    }
}

// ==========================================
// 帕累托时间窗口 (Pareto Window)
// ==========================================
// 以当前日期为基准的预设偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParetoWindow {
    LastWeek,
    LastMonth,
    LastSixMonths,
    LastYear,
    YearToDate,
    All,
}

impl ParetoWindow {
    /// 窗口起始日期 (含); None 表示不设下限
    ///
    /// 偏移预设不含边界日本身: 今天减 7 天那一天不在"最近一周"内
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let boundary = match self {
            ParetoWindow::LastWeek => today.checked_sub_days(chrono::Days::new(7)),
            ParetoWindow::LastMonth => today.checked_sub_months(Months::new(1)),
            ParetoWindow::LastSixMonths => today.checked_sub_months(Months::new(6)),
            ParetoWindow::LastYear => today.checked_sub_months(Months::new(12)),
            ParetoWindow::YearToDate => return NaiveDate::from_ymd_opt(today.year(), 1, 1),
            ParetoWindow::All => return None,
        };
        boundary.and_then(|d| d.succ_opt())
    }
}

impl Default for ParetoWindow {
    fn default() -> Self {
        ParetoWindow::YearToDate
    }
}

impl fmt::Display for ParetoWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParetoWindow::LastWeek => write!(f, "LAST_WEEK"),
            ParetoWindow::LastMonth => write!(f, "LAST_MONTH"),
            ParetoWindow::LastSixMonths => write!(f, "LAST_SIX_MONTHS"),
            ParetoWindow::LastYear => write!(f, "LAST_YEAR"),
            ParetoWindow::YearToDate => write!(f, "YTD"),
            ParetoWindow::All => write!(f, "ALL"),
        }
    }
}

impl std::str::FromStr for ParetoWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WEEK" | "LAST_WEEK" => Ok(ParetoWindow::LastWeek),
            "MONTH" | "LAST_MONTH" => Ok(ParetoWindow::LastMonth),
            "6M" | "LAST_SIX_MONTHS" => Ok(ParetoWindow::LastSixMonths),
            "YEAR" | "LAST_YEAR" => Ok(ParetoWindow::LastYear),
            "YTD" => Ok(ParetoWindow::YearToDate),
            "ALL" => Ok(ParetoWindow::All),
            other => Err(format!("未知帕累托窗口: {}", other)),
        }
    }
}

// ==========================================
// 分布统计周期 (Distribution Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionPeriod {
    YearToDate,     // 当年
    LastFullMonth,  // 上一个完整自然月
    LastSixMonths,  // 六个月前当月 1 日 .. 今天
    LastFullYear,   // 上一个完整自然年
}

impl DistributionPeriod {
    /// 判断日期是否落在周期内
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DistributionPeriod::YearToDate => date.year() == today.year(),
            DistributionPeriod::LastFullMonth => {
                let prev = first_day_of_previous_month(today);
                date.year() == prev.year() && date.month() == prev.month()
            }
            DistributionPeriod::LastSixMonths => {
                let start = today
                    .checked_sub_months(Months::new(6))
                    .and_then(|d| d.with_day(1));
                match start {
                    Some(start) => date >= start && date <= today,
                    None => date <= today,
                }
            }
            DistributionPeriod::LastFullYear => date.year() == today.year() - 1,
        }
    }

    /// 周期标题
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            DistributionPeriod::YearToDate => format!("YTD {}", today.year()),
            DistributionPeriod::LastFullMonth => {
                let prev = first_day_of_previous_month(today);
                format!("{:04}-{:02}", prev.year(), prev.month())
            }
            DistributionPeriod::LastSixMonths => "6M".to_string(),
            DistributionPeriod::LastFullYear => format!("{}", today.year() - 1),
        }
    }
}

impl Default for DistributionPeriod {
    fn default() -> Self {
        DistributionPeriod::YearToDate
    }
}

impl std::str::FromStr for DistributionPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "YTD" => Ok(DistributionPeriod::YearToDate),
            "MONTH" | "LAST_FULL_MONTH" => Ok(DistributionPeriod::LastFullMonth),
            "6M" | "LAST_SIX_MONTHS" => Ok(DistributionPeriod::LastSixMonths),
            "YEAR" | "LAST_FULL_YEAR" => Ok(DistributionPeriod::LastFullYear),
            other => Err(format!("未知分布周期: {}", other)),
        }
    }
}

fn first_day_of_previous_month(today: NaiveDate) -> NaiveDate {
    let first = today.with_day(1).unwrap_or(today);
    first
        .pred_opt()
        .and_then(|d| d.with_day(1))
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_pareto_window_start() {
        let today = d(2025, 3, 31);
        assert_eq!(ParetoWindow::LastWeek.start_date(today), Some(d(2025, 3, 25)));
        // 月末回退时按月末截断，再跳过边界日
        assert_eq!(ParetoWindow::LastMonth.start_date(today), Some(d(2025, 3, 1)));
        assert_eq!(ParetoWindow::LastYear.start_date(today), Some(d(2024, 4, 1)));
        assert_eq!(ParetoWindow::YearToDate.start_date(today), Some(d(2025, 1, 1)));
        assert_eq!(ParetoWindow::All.start_date(today), None);
    }

    #[test]
    fn test_distribution_last_full_month_crosses_year() {
        let today = d(2025, 1, 15);
        assert!(DistributionPeriod::LastFullMonth.contains(d(2024, 12, 3), today));
        assert!(!DistributionPeriod::LastFullMonth.contains(d(2025, 1, 3), today));
        assert_eq!(DistributionPeriod::LastFullMonth.label(today), "2024-12");
    }

    #[test]
    fn test_distribution_last_six_months_starts_on_first_day() {
        let today = d(2025, 8, 20);
        assert!(DistributionPeriod::LastSixMonths.contains(d(2025, 2, 1), today));
        assert!(!DistributionPeriod::LastSixMonths.contains(d(2025, 1, 31), today));
        assert!(!DistributionPeriod::LastSixMonths.contains(d(2025, 8, 21), today));
    }

    #[test]
    fn test_trend_period_of() {
        let date = d(2025, 1, 1);
        assert_eq!(TrendGranularity::DayOfMonth.period_of(date), 1);
        assert_eq!(TrendGranularity::Month.period_of(date), 1);
        // 2025-01-01 属于 ISO 第 1 周
        assert_eq!(TrendGranularity::Week.period_of(date), 1);
    }
}
