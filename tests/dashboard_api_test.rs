// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试目标: 记录文件 → 各聚合视图
// ==========================================

mod test_helpers;

use std::sync::Arc;

use oee_shift_report::config::OeeRules;
use oee_shift_report::domain::{
    BarKind, DistributionPeriod, ParetoClass, ParetoWindow, QueryStatus, Stoppage,
    TrendGranularity,
};
use oee_shift_report::engine::{HistoryFilter, ParetoSelection, TrendSelection, WaterfallSelection};
use oee_shift_report::repository::ShiftRecordRepository;
use oee_shift_report::DashboardApi;
use tempfile::TempDir;
use test_helpers::{create_test_repository, d, sample_record};

fn seeded_api() -> (TempDir, DashboardApi) {
    let (dir, repo) = create_test_repository();
    let records = vec![
        sample_record(
            d(2025, 5, 3),
            "1",
            "L1",
            300.0,
            240,
            10,
            vec![Stoppage::new("Falla de equipo", "Fallo mecanico", 100)],
        ),
        sample_record(
            d(2025, 6, 10),
            "1",
            "L1",
            400.0,
            400,
            0,
            vec![
                Stoppage::new("Servicios auxiliares", "Corte de agua", 50),
                Stoppage::new("Perdida de velocidad", "Materia Prima", 30),
            ],
        ),
        sample_record(d(2024, 6, 10), "2", "L1", 240.0, 200, 0, vec![]),
        sample_record(d(2025, 6, 11), "1", "L2", 480.0, 600, 0, vec![]),
    ];
    for record in &records {
        repo.upsert(record).unwrap();
    }
    (dir, DashboardApi::new(Arc::new(repo), OeeRules::default()))
}

#[test]
fn test_waterfall_from_store() {
    let (_dir, api) = seeded_api();
    let outcome = api.waterfall(&WaterfallSelection {
        line: "L1".to_string(),
        month: 5,
        year: 2025,
    });

    assert_eq!(outcome.status, QueryStatus::Ready);
    let report = outcome.view;
    let shape: Vec<(BarKind, f64)> = report.bars.iter().map(|b| (b.kind, b.minutes)).collect();
    assert_eq!(
        shape,
        vec![
            (BarKind::Programmed, 480.0),
            (BarKind::Stoppage, -100.0),
            (BarKind::Defects, -20.0),
            (BarKind::Effective, 360.0),
        ]
    );
    assert!((report.oee_net_pct - 75.0).abs() < 1e-9);
}

#[test]
fn test_pareto_year_to_date() {
    let (_dir, api) = seeded_api();
    let outcome = api.pareto(
        &ParetoSelection {
            line: "L1".to_string(),
            window: ParetoWindow::YearToDate,
        },
        d(2025, 6, 30),
    );

    let entries = &outcome.view.entries;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].cause, "Falla de equipo");
    assert_eq!(entries[0].class, ParetoClass::Vital);
    assert_eq!(entries.last().unwrap().cumulative_pct, 100.0);
    assert!((entries[0].hours - 100.0 / 60.0).abs() < 1e-9);
}

#[test]
fn test_pareto_empty_selection() {
    let (_dir, api) = seeded_api();
    let outcome = api.pareto(
        &ParetoSelection {
            line: "L2".to_string(),
            window: ParetoWindow::All,
        },
        d(2025, 6, 30),
    );
    assert_eq!(outcome.status, QueryStatus::EmptyResultSet);
    assert!(outcome.view.entries.is_empty());
}

#[test]
fn test_trend_and_distribution() {
    let (_dir, api) = seeded_api();
    let trend = api.trend(
        &TrendSelection {
            lines: vec!["L1".to_string()],
            granularity: TrendGranularity::Month,
            current_year: None,
        },
        d(2025, 6, 30),
    );
    let summary = &trend.view.summaries[0];
    assert_eq!(summary.previous_avg_pct, Some(50.0));
    assert!(summary.current_avg_pct.is_some());

    let distribution = api.distribution(DistributionPeriod::YearToDate, d(2025, 6, 30));
    let lines: Vec<&str> = distribution.view.lines.iter().map(|l| l.line.as_str()).collect();
    assert_eq!(lines, vec!["L1", "L2"]);
    assert_eq!(distribution.view.lines[0].count, 2);
}

#[test]
fn test_history_and_lines() {
    let (_dir, api) = seeded_api();
    assert_eq!(api.list_lines(), vec!["L1".to_string(), "L2".to_string()]);

    let outcome = api.history(&HistoryFilter {
        line: Some("L1".to_string()),
        ..Default::default()
    });
    assert_eq!(outcome.view.summary.report_count, 3);
    assert_eq!(outcome.view.summary.total_units, 840);
}

#[test]
fn test_missing_store_degrades_to_empty_views() {
    let dir = TempDir::new().unwrap();
    let repo = ShiftRecordRepository::new(dir.path().join("missing.csv"));
    let api = DashboardApi::new(Arc::new(repo), OeeRules::default());

    let outcome = api.waterfall(&WaterfallSelection {
        line: "L1".to_string(),
        month: 1,
        year: 2025,
    });
    assert!(outcome.is_empty());
    assert!(api.list_lines().is_empty());
    assert!(api
        .distribution(DistributionPeriod::LastFullYear, d(2025, 6, 30))
        .is_empty());
}
