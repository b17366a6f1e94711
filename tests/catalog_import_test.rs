// ==========================================
// 产品目录导入 + ShiftReportApi 集成测试
// ==========================================
// 测试目标: 目录文件 → DQ 报告 → 录入 API 装配与保存
// ==========================================

mod test_helpers;

use oee_shift_report::api::{ApiError, ShiftReportApi};
use oee_shift_report::config::{config_keys, ConfigManager};
use oee_shift_report::domain::{EditingSession, ErrorKind};
use oee_shift_report::importer::{CatalogLoader, DqLevel, ImportError};
use oee_shift_report::logging;
use std::path::Path;
use tempfile::TempDir;
use test_helpers::{d, write_catalog, CATALOG_CSV};

fn config_for(dir: &Path, catalog: &Path) -> ConfigManager {
    let mut config = ConfigManager::new();
    config.set(config_keys::CATALOG_PATH, catalog.display().to_string());
    config.set(
        config_keys::RECORDS_PATH,
        dir.join("registros_produccion.csv").display().to_string(),
    );
    config
}

#[test]
fn test_catalog_with_bad_rows_and_duplicates() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let path = write_catalog(
        dir.path(),
        "\u{feff}codigo_producto,linea_produccion,estandar_produccion\n\
A,L1,100\n\
,L1,50\n\
B,L1,0\n\
C,L2,abc\n\
A,L1,120\n\
D,L3,80.0\n",
    );

    let (catalog, report) = CatalogLoader::new().load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    // 重复代码：后者覆盖
    assert_eq!(catalog.get("A").unwrap().standard_rate, 120);
    assert_eq!(catalog.get("D").unwrap().standard_rate, 80);
    assert_eq!(catalog.lines(), vec!["L1".to_string(), "L3".to_string()]);

    assert_eq!(report.summary.total_rows, 6);
    assert_eq!(report.summary.blocked, 3);
    assert!(report.has_errors());
    assert!(report
        .violations
        .iter()
        .any(|v| v.level == DqLevel::Conflict && v.product_code.as_deref() == Some("A")));
}

#[test]
fn test_catalog_missing_column_is_blocking() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), "codigo_producto,linea_produccion\nA,L1\n");
    let err = CatalogLoader::new().load(&path).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn(_)));

    let err = CatalogLoader::new()
        .load(dir.path().join("no-existe.csv"))
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_shift_report_api_end_to_end() {
    let dir = TempDir::new().unwrap();
    let catalog_path = write_catalog(dir.path(), CATALOG_CSV);
    let config = config_for(dir.path(), &catalog_path);

    let (api, dq_report) = ShiftReportApi::from_config(&config).unwrap();
    assert!(!dq_report.has_errors());
    assert_eq!(api.available_lines(), vec!["L1".to_string(), "L2".to_string()]);
    assert_eq!(api.products_for_line("L1").len(), 2);
    assert_eq!(api.stoppage_causes().len(), 11);
    assert_eq!(
        api.stoppage_subcauses("Perdida de velocidad").unwrap(),
        vec!["Materia Prima", "Equipos/Proceso", "Gestión/Personal"]
    );

    api.ensure_initialized().unwrap();
    assert!(api.report_exists(d(2025, 3, 4), "1", "L1").unwrap().is_none());

    let mut session = EditingSession::with_header(d(2025, 3, 4), "1", "Ana", "L1", 480);
    // 其他生产线的产品不可选
    let err = api.add_produced_item(&mut session, "C").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnknownProduct));

    api.add_produced_item(&mut session, "A").unwrap();
    let err = api.add_produced_item(&mut session, "A").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::DuplicateItem));

    api.update_item_quantities(&mut session, 0, 50, 10).unwrap();
    let err = api
        .add_stoppage(&mut session, "Falla de equipo", "Inexistente", 10)
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnknownStoppageCause));
    api.add_stoppage(&mut session, "Falla de equipo", "Fallo mecanico", 192)
        .unwrap();

    let expected = api.fingerprint(&session).unwrap();
    let saved = api.save_checked(&mut session, expected).unwrap();
    assert!(!saved.replaced);
    assert!(api.report_exists(d(2025, 3, 4), "1", "L1").unwrap().is_some());
}

#[test]
fn test_shift_report_api_validation_failure() {
    let dir = TempDir::new().unwrap();
    let catalog_path = write_catalog(dir.path(), CATALOG_CSV);
    let (api, _) = ShiftReportApi::from_config(&config_for(dir.path(), &catalog_path)).unwrap();

    let mut session = api.new_session();
    match api.save(&mut session) {
        Err(ApiError::ValidationFailed { violations, .. }) => {
            assert!(violations.iter().all(|v| v.kind == ErrorKind::MissingField));
            assert_eq!(violations.len(), 5);
        }
        other => panic!("Expected ValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_missing_catalog_blocks_api() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path(), &dir.path().join("productos.csv"));
    let err = ShiftReportApi::from_config(&config).err().unwrap();
    assert!(matches!(err, ApiError::ImportError(_)));
}
