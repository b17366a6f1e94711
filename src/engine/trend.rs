// ==========================================
// OEE 班次报表系统 - 同比趋势引擎
// ==========================================
// 输入: 全部班次记录 + (生产线集合, 粒度, 当年)
// 流程: 仅取当年与上一年 → 按 (生产线, 年, 周期) 分组 → 单条 OEE 净值取均值
// 输出: 每条生产线两条序列 + 参考带 + 年均值与变化
// ==========================================

use crate::config::OeeRules;
use crate::domain::{ShiftRecord, TrendGranularity};
use crate::engine::outcome::QueryOutcome;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSelection {
    /// 为空时取记录中出现的全部生产线
    pub lines: Vec<String>,
    pub granularity: TrendGranularity,
    /// 当年；None 时取当前日期所在年
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: u32,
    pub oee_net_pct: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub line: String,
    pub year: i32,
    /// 按周期升序
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrendSummary {
    pub line: String,
    pub previous_avg_pct: Option<f64>,
    pub current_avg_pct: Option<f64>,
    /// 当年均值 - 上年均值（百分点）
    pub variation_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub granularity: TrendGranularity,
    pub current_year: i32,
    pub previous_year: i32,
    pub axis_range: (u32, u32),
    pub lower_band_pct: f64,
    pub upper_band_pct: f64,
    pub series: Vec<TrendSeries>,
    pub summaries: Vec<LineTrendSummary>,
}

pub struct TrendEngine {
    rules: OeeRules,
}

impl TrendEngine {
    pub fn new(rules: OeeRules) -> Self {
        Self { rules }
    }

    #[instrument(skip(self, records), fields(granularity = %selection.granularity))]
    pub fn compute(
        &self,
        records: &[ShiftRecord],
        selection: &TrendSelection,
        today: NaiveDate,
    ) -> QueryOutcome<TrendReport> {
        let current_year = selection.current_year.unwrap_or_else(|| today.year());
        let previous_year = current_year - 1;

        let lines: BTreeSet<&str> = if selection.lines.is_empty() {
            records.iter().map(|r| r.line.as_str()).collect()
        } else {
            selection.lines.iter().map(String::as_str).collect()
        };

        // (生产线, 年, 周期) → (OEE 合计, 条数)
        let mut groups: BTreeMap<(&str, i32, u32), (f64, usize)> = BTreeMap::new();
        for record in records {
            let year = record.date.year();
            if year != current_year && year != previous_year {
                continue;
            }
            if !lines.contains(record.line.as_str()) {
                continue;
            }
            let period = selection.granularity.period_of(record.date);
            let entry = groups
                .entry((record.line.as_str(), year, period))
                .or_insert((0.0, 0));
            entry.0 += record.oee_net_pct();
            entry.1 += 1;
        }

        let mut series = Vec::new();
        let mut summaries = Vec::new();
        for line in &lines {
            let mut yearly_avg = |year: i32| -> Option<f64> {
                let points: Vec<TrendPoint> = groups
                    .range((*line, year, 0)..=(*line, year, u32::MAX))
                    .map(|(&(_, _, period), &(sum, count))| TrendPoint {
                        period,
                        oee_net_pct: sum / count as f64,
                        record_count: count,
                    })
                    .collect();
                if points.is_empty() {
                    return None;
                }
                // 年均值 = 各周期均值的平均
                let avg = points.iter().map(|p| p.oee_net_pct).sum::<f64>() / points.len() as f64;
                series.push(TrendSeries {
                    line: line.to_string(),
                    year,
                    points,
                });
                Some(avg)
            };

            let previous_avg_pct = yearly_avg(previous_year);
            let current_avg_pct = yearly_avg(current_year);
            let variation_pct = match (previous_avg_pct, current_avg_pct) {
                (Some(prev), Some(curr)) => Some(curr - prev),
                _ => None,
            };
            summaries.push(LineTrendSummary {
                line: line.to_string(),
                previous_avg_pct,
                current_avg_pct,
                variation_pct,
            });
        }

        let report = TrendReport {
            granularity: selection.granularity,
            current_year,
            previous_year,
            axis_range: selection.granularity.axis_range(),
            lower_band_pct: self.rules.trend_lower_band_pct,
            upper_band_pct: self.rules.trend_upper_band_pct,
            series,
            summaries,
        };

        debug!(series = report.series.len(), "趋势视图计算完成");
        if report.series.is_empty() {
            QueryOutcome::empty(report)
        } else {
            QueryOutcome::ready(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueryStatus;

    fn record(date: NaiveDate, line: &str, programmed: f64, effective: f64) -> ShiftRecord {
        ShiftRecord {
            date,
            shift: "1".to_string(),
            line: line.to_string(),
            supervisor: "Ana".to_string(),
            available_min: 480.0,
            programmed_min: programmed,
            effective_min: effective,
            non_conforming_min: 0.0,
            to_justify_min: programmed - effective,
            product_codes: vec![],
            actual_units: 0,
            defective_units: 0,
            stoppages: vec![],
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_year_over_year() {
        let records = vec![
            record(d(2025, 3, 1), "L1", 480.0, 480.0),
            record(d(2025, 3, 2), "L1", 480.0, 240.0),
            record(d(2025, 4, 1), "L1", 0.0, 0.0),
            record(d(2024, 3, 5), "L1", 480.0, 360.0),
            record(d(2023, 3, 5), "L1", 480.0, 480.0),
            record(d(2025, 3, 5), "L2", 480.0, 480.0),
        ];
        let selection = TrendSelection {
            lines: vec!["L1".to_string()],
            granularity: TrendGranularity::Month,
            current_year: None,
        };
        let outcome = TrendEngine::new(OeeRules::default()).compute(&records, &selection, d(2025, 6, 1));
        assert_eq!(outcome.status, QueryStatus::Ready);
        let report = outcome.view;

        assert_eq!(report.previous_year, 2024);
        assert_eq!(report.series.len(), 2);
        let current = report.series.iter().find(|s| s.year == 2025).unwrap();
        assert_eq!(current.points.len(), 2);
        assert_eq!(current.points[0].period, 3);
        assert_eq!(current.points[0].oee_net_pct, 75.0);
        assert_eq!(current.points[0].record_count, 2);
        // 计划时间为 0 的记录 OEE 记为 0
        assert_eq!(current.points[1].oee_net_pct, 0.0);

        let summary = &report.summaries[0];
        assert_eq!(summary.previous_avg_pct, Some(75.0));
        assert_eq!(summary.current_avg_pct, Some(37.5));
        assert_eq!(summary.variation_pct, Some(-37.5));
        assert_eq!((report.lower_band_pct, report.upper_band_pct), (70.0, 85.0));
    }

    #[test]
    fn test_week_granularity_uses_iso_week() {
        let records = vec![record(d(2025, 1, 6), "L1", 480.0, 480.0)];
        let selection = TrendSelection {
            lines: vec![],
            granularity: TrendGranularity::Week,
            current_year: Some(2025),
        };
        let report = TrendEngine::new(OeeRules::default())
            .compute(&records, &selection, d(2025, 6, 1))
            .view;
        assert_eq!(report.series[0].points[0].period, 2);
        assert_eq!(report.axis_range, (1, 53));
    }

    #[test]
    fn test_no_data_in_years() {
        let records = vec![record(d(2020, 1, 6), "L1", 480.0, 480.0)];
        let selection = TrendSelection {
            lines: vec!["L1".to_string()],
            granularity: TrendGranularity::DayOfMonth,
            current_year: None,
        };
        let outcome = TrendEngine::new(OeeRules::default()).compute(&records, &selection, d(2025, 6, 1));
        assert!(outcome.is_empty());
        assert_eq!(outcome.view.summaries[0].current_avg_pct, None);
    }
}
