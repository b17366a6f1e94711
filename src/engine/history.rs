// ==========================================
// OEE 班次报表系统 - 历史记录查询
// ==========================================
// 过滤条件全部可选,组合为 AND
// 汇总: 报表数 / 实际产量合计 / 效率 (单位每计划小时)
// ==========================================

use crate::domain::ShiftRecord;
use crate::engine::outcome::QueryOutcome;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub line: Option<String>,
    pub shift: Option<String>,
    /// "YYYY-MM"
    pub month: Option<String>,
    pub supervisor: Option<String>,
    pub date: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &ShiftRecord) -> bool {
        if let Some(line) = &self.line {
            if record.line != *line {
                return false;
            }
        }
        if let Some(shift) = &self.shift {
            if record.shift.trim() != shift.trim() {
                return false;
            }
        }
        if let Some(month) = &self.month {
            let record_month = format!("{:04}-{:02}", record.date.year(), record.date.month());
            if record_month != month.trim() {
                return false;
            }
        }
        if let Some(supervisor) = &self.supervisor {
            if record.supervisor.trim() != supervisor.trim() {
                return false;
            }
        }
        if let Some(date) = self.date {
            if record.date != date {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub report_count: usize,
    pub total_units: u64,
    pub programmed_hours: f64,
    /// 单位/小时；计划时间为 0 时为 0
    pub efficiency_units_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub filter: HistoryFilter,
    pub summary: HistorySummary,
    /// 按日期降序,同日按班次
    pub records: Vec<ShiftRecord>,
}

pub struct HistoryEngine;

impl HistoryEngine {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, records, filter))]
    pub fn compute(&self, records: &[ShiftRecord], filter: &HistoryFilter) -> QueryOutcome<HistoryReport> {
        let mut matching: Vec<ShiftRecord> = records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.shift.cmp(&b.shift))
                .then_with(|| a.line.cmp(&b.line))
        });

        let total_units: u64 = matching.iter().map(|r| r.actual_units).sum();
        let programmed_hours = matching.iter().map(|r| r.programmed_min).sum::<f64>() / 60.0;
        let efficiency_units_per_hour = if programmed_hours > 0.0 {
            total_units as f64 / programmed_hours
        } else {
            0.0
        };

        debug!(reports = matching.len(), total_units, "历史查询完成");

        let report = HistoryReport {
            filter: filter.clone(),
            summary: HistorySummary {
                report_count: matching.len(),
                total_units,
                programmed_hours,
                efficiency_units_per_hour,
            },
            records: matching,
        };
        if report.records.is_empty() {
            QueryOutcome::empty(report)
        } else {
            QueryOutcome::ready(report)
        }
    }
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: NaiveDate, shift: &str, line: &str, supervisor: &str, units: u64) -> ShiftRecord {
        ShiftRecord {
            date,
            shift: shift.to_string(),
            line: line.to_string(),
            supervisor: supervisor.to_string(),
            available_min: 480.0,
            programmed_min: 480.0,
            effective_min: 240.0,
            non_conforming_min: 0.0,
            to_justify_min: 240.0,
            product_codes: vec![],
            actual_units: units,
            defective_units: 0,
            stoppages: vec![],
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Vec<ShiftRecord> {
        vec![
            record(d(2025, 3, 1), "1", "L1", "Ana", 400),
            record(d(2025, 3, 2), "2", "L1", "Luis", 560),
            record(d(2025, 4, 1), "1", "L2", "Ana", 100),
        ]
    }

    #[test]
    fn test_month_and_line_filter() {
        let filter = HistoryFilter {
            line: Some("L1".to_string()),
            month: Some("2025-03".to_string()),
            ..Default::default()
        };
        let outcome = HistoryEngine::new().compute(&sample(), &filter);
        let report = outcome.view;

        assert_eq!(report.summary.report_count, 2);
        assert_eq!(report.summary.total_units, 960);
        // 960 单位 / 16 小时
        assert_eq!(report.summary.efficiency_units_per_hour, 60.0);
        assert_eq!(report.records[0].date, d(2025, 3, 2));
    }

    #[test]
    fn test_supervisor_matches_exactly() {
        let filter = HistoryFilter {
            supervisor: Some("Ana".to_string()),
            ..Default::default()
        };
        let report = HistoryEngine::new().compute(&sample(), &filter).view;
        assert_eq!(report.summary.report_count, 2);

        let filter = HistoryFilter {
            supervisor: Some("ana".to_string()),
            ..Default::default()
        };
        assert!(HistoryEngine::new().compute(&sample(), &filter).is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let filter = HistoryFilter {
            date: Some(d(2020, 1, 1)),
            ..Default::default()
        };
        let outcome = HistoryEngine::new().compute(&sample(), &filter);
        assert!(outcome.is_empty());
        assert_eq!(outcome.view.summary.efficiency_units_per_hour, 0.0);
    }
}
