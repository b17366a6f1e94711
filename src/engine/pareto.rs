// ==========================================
// OEE 班次报表系统 - 停机原因帕累托引擎
// ==========================================
// 输入: 全部班次记录 + (生产线, 时间窗口) + 当前日期
// 流程: 展开 10 个停机槽位 → 按原因汇总 → 降序 → 累计占比
// 分类: 累计占比 <= 阈值 (默认 80%) 为 Vital
// ==========================================

use crate::config::OeeRules;
use crate::domain::{ParetoClass, ParetoWindow, ShiftRecord};
use crate::engine::outcome::QueryOutcome;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParetoSelection {
    pub line: String,
    pub window: ParetoWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub cause: String,
    pub minutes: f64,
    pub hours: f64,
    pub cumulative_pct: f64,
    pub class: ParetoClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoReport {
    pub selection: ParetoSelection,
    /// 窗口起始日期（含）；None 表示全部
    pub window_start: Option<NaiveDate>,
    pub total_minutes: f64,
    pub entries: Vec<ParetoEntry>,
}

pub struct ParetoEngine {
    rules: OeeRules,
}

impl ParetoEngine {
    pub fn new(rules: OeeRules) -> Self {
        Self { rules }
    }

    #[instrument(skip(self, records), fields(line = %selection.line, window = %selection.window))]
    pub fn compute(
        &self,
        records: &[ShiftRecord],
        selection: &ParetoSelection,
        today: NaiveDate,
    ) -> QueryOutcome<ParetoReport> {
        let window_start = selection.window.start_date(today);

        // 展开槽位,仅保留分钟 > 0
        let mut totals: Vec<(String, f64)> = Vec::new();
        let slots = records
            .iter()
            .filter(|r| r.line == selection.line)
            .filter(|r| window_start.map_or(true, |start| r.date >= start))
            .flat_map(|r| r.stoppages.iter())
            .filter(|s| s.minutes > 0 && !s.cause.trim().is_empty());
        for stoppage in slots {
            let minutes = stoppage.minutes as f64;
            match totals.iter_mut().find(|(cause, _)| *cause == stoppage.cause) {
                Some((_, total)) => *total += minutes,
                None => totals.push((stoppage.cause.clone(), minutes)),
            }
        }

        let total_minutes: f64 = totals.iter().map(|(_, m)| m).sum();
        if totals.is_empty() || total_minutes <= 0.0 {
            debug!("帕累托视图无停机数据");
            return QueryOutcome::empty(ParetoReport {
                selection: selection.clone(),
                window_start,
                total_minutes: 0.0,
                entries: Vec::new(),
            });
        }

        // 稳定降序
        totals.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut running = 0.0;
        let last = totals.len() - 1;
        let entries = totals
            .into_iter()
            .enumerate()
            .map(|(idx, (cause, minutes))| {
                running += minutes;
                // 末项固定为 100，避免浮点累计误差
                let cumulative_pct = if idx == last {
                    100.0
                } else {
                    running / total_minutes * 100.0
                };
                let class = if cumulative_pct <= self.rules.pareto_vital_threshold_pct {
                    ParetoClass::Vital
                } else {
                    ParetoClass::Trivial
                };
                ParetoEntry {
                    cause,
                    minutes,
                    hours: minutes / 60.0,
                    cumulative_pct,
                    class,
                }
            })
            .collect::<Vec<_>>();

        debug!(causes = entries.len(), total_minutes, "帕累托视图计算完成");

        QueryOutcome::ready(ParetoReport {
            selection: selection.clone(),
            window_start,
            total_minutes,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QueryStatus, Stoppage};

    fn record(date: NaiveDate, line: &str, stoppages: Vec<Stoppage>) -> ShiftRecord {
        ShiftRecord {
            date,
            shift: "1".to_string(),
            line: line.to_string(),
            supervisor: "Ana".to_string(),
            available_min: 480.0,
            programmed_min: 480.0,
            effective_min: 300.0,
            non_conforming_min: 0.0,
            to_justify_min: 180.0,
            product_codes: vec![],
            actual_units: 0,
            defective_units: 0,
            stoppages,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_pareto_ordering_and_classes() {
        let today = d(2025, 6, 30);
        let records = vec![
            record(
                d(2025, 6, 2),
                "L1",
                vec![
                    Stoppage::new("Falla de equipo", "Fallo mecanico", 60),
                    Stoppage::new("Corte", "x", 0),
                    Stoppage::new("Calidad del producto", "Reproceso en linea", 10),
                ],
            ),
            record(
                d(2025, 6, 3),
                "L1",
                vec![
                    Stoppage::new("Falla de equipo", "Fallo electrico", 20),
                    Stoppage::new("Perdida de velocidad", "Materia Prima", 10),
                ],
            ),
            record(d(2025, 6, 3), "L2", vec![Stoppage::new("Otro", "x", 500)]),
        ];
        let selection = ParetoSelection {
            line: "L1".to_string(),
            window: ParetoWindow::All,
        };
        let outcome = ParetoEngine::new(OeeRules::default()).compute(&records, &selection, today);
        assert_eq!(outcome.status, QueryStatus::Ready);

        let entries = &outcome.view.entries;
        let causes: Vec<&str> = entries.iter().map(|e| e.cause.as_str()).collect();
        // 同为 10 分钟时保持首次出现顺序；分钟为 0 的槽位不计入
        assert_eq!(
            causes,
            vec!["Falla de equipo", "Calidad del producto", "Perdida de velocidad"]
        );
        assert_eq!(outcome.view.total_minutes, 100.0);
        assert_eq!(entries[0].cumulative_pct, 80.0);
        assert_eq!(entries[0].class, ParetoClass::Vital);
        assert_eq!(entries[1].class, ParetoClass::Trivial);
        assert_eq!(entries[2].cumulative_pct, 100.0);
        assert!(entries.windows(2).all(|w| w[0].minutes >= w[1].minutes));
        assert!(entries.windows(2).all(|w| w[0].cumulative_pct <= w[1].cumulative_pct));
    }

    #[test]
    fn test_window_filters_old_records() {
        let today = d(2025, 6, 30);
        let records = vec![
            record(d(2024, 12, 31), "L1", vec![Stoppage::new("Falla de equipo", "Fallo mecanico", 60)]),
            record(d(2025, 1, 1), "L1", vec![Stoppage::new("Calidad del producto", "Reproceso en linea", 5)]),
        ];
        let selection = ParetoSelection {
            line: "L1".to_string(),
            window: ParetoWindow::YearToDate,
        };
        let outcome = ParetoEngine::new(OeeRules::default()).compute(&records, &selection, today);
        assert_eq!(outcome.view.entries.len(), 1);
        assert_eq!(outcome.view.window_start, Some(d(2025, 1, 1)));
    }

    #[test]
    fn test_last_week_excludes_boundary_day() {
        let today = d(2025, 6, 30);
        let records = vec![
            record(d(2025, 6, 23), "L1", vec![Stoppage::new("Falla de equipo", "Fallo mecanico", 60)]),
            record(d(2025, 6, 24), "L1", vec![Stoppage::new("Calidad del producto", "Reproceso en linea", 5)]),
        ];
        let selection = ParetoSelection {
            line: "L1".to_string(),
            window: ParetoWindow::LastWeek,
        };
        let outcome = ParetoEngine::new(OeeRules::default()).compute(&records, &selection, today);
        assert_eq!(outcome.view.window_start, Some(d(2025, 6, 24)));
        assert_eq!(outcome.view.entries.len(), 1);
        assert_eq!(outcome.view.entries[0].cause, "Calidad del producto");
    }

    #[test]
    fn test_empty_selection() {
        let selection = ParetoSelection {
            line: "L1".to_string(),
            window: ParetoWindow::LastWeek,
        };
        let outcome = ParetoEngine::new(OeeRules::default()).compute(&[], &selection, d(2025, 6, 30));
        assert_eq!(outcome.status, QueryStatus::EmptyResultSet);
        assert!(outcome.view.entries.is_empty());
    }
}
