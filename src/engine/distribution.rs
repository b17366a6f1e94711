// ==========================================
// OEE 班次报表系统 - 产量分布引擎
// ==========================================
// 输入: 全部班次记录 + 周期预设 + 当前日期
// 输出: 按生产线的实际产量统计（条数/均值/中位数/极值）与等宽直方图
// 无数据的生产线不出现在结果中
// ==========================================

use crate::config::OeeRules;
use crate::domain::{DistributionPeriod, ShiftRecord};
use crate::engine::outcome::QueryOutcome;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDistribution {
    pub line: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub period: DistributionPeriod,
    pub period_label: String,
    /// 按生产线名称升序
    pub lines: Vec<LineDistribution>,
}

pub struct DistributionEngine {
    rules: OeeRules,
}

impl DistributionEngine {
    pub fn new(rules: OeeRules) -> Self {
        Self { rules }
    }

    #[instrument(skip(self, records))]
    pub fn compute(
        &self,
        records: &[ShiftRecord],
        period: DistributionPeriod,
        today: NaiveDate,
    ) -> QueryOutcome<DistributionReport> {
        let mut by_line: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records.iter().filter(|r| period.contains(r.date, today)) {
            by_line
                .entry(record.line.as_str())
                .or_default()
                .push(record.actual_units as f64);
        }

        let lines: Vec<LineDistribution> = by_line
            .into_iter()
            .map(|(line, values)| summarize(line, values, self.rules.histogram_bins))
            .collect();

        debug!(lines = lines.len(), "分布视图计算完成");

        let report = DistributionReport {
            period,
            period_label: period.label(today),
            lines,
        };
        if report.lines.is_empty() {
            QueryOutcome::empty(report)
        } else {
            QueryOutcome::ready(report)
        }
    }
}

/// 单条生产线统计；values 非空
fn summarize(line: &str, mut values: Vec<f64>, bin_count: usize) -> LineDistribution {
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let min = values[0];
    let max = values[count - 1];
    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };

    LineDistribution {
        line: line.to_string(),
        count,
        mean,
        median,
        min,
        max,
        bins: histogram(&values, min, max, bin_count.max(1)),
    }
}

/// 等宽分箱 [lower, upper)，最后一箱含上端点
fn histogram(values: &[f64], min: f64, max: f64, bin_count: usize) -> Vec<HistogramBin> {
    // 所有值相同时按单位宽度分箱
    let width = if max > min {
        (max - min) / bin_count as f64
    } else {
        1.0
    };

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in values {
        let idx = (((value - min) / width).floor() as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }
    bins
}
