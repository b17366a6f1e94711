// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时目录、产品目录文件、记录样本的构造
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use oee_shift_report::config::{OeeRules, StoppageTaxonomy};
use oee_shift_report::domain::{Product, ProductCatalog, ShiftRecord, Stoppage};
use oee_shift_report::engine::ShiftReportBuilder;
use oee_shift_report::repository::ShiftRecordRepository;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 测试用产品目录 CSV 内容
pub const CATALOG_CSV: &str = "\
codigo_producto,linea_produccion,estandar_produccion
A,L1,100
B,L1,240
C,L2,600
";

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// 创建临时目录并返回记录文件路径（文件尚不存在）
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - PathBuf: 记录文件路径
pub fn create_temp_store() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("registros_produccion.csv");
    (dir, path)
}

pub fn create_test_repository() -> (TempDir, ShiftRecordRepository) {
    let (dir, path) = create_temp_store();
    (dir, ShiftRecordRepository::new(path))
}

/// 在目录中写入产品目录文件
pub fn write_catalog(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("productos.csv");
    fs::write(&path, content).expect("Failed to write catalog");
    path
}

pub fn test_catalog() -> ProductCatalog {
    ProductCatalog::from_products(vec![
        Product {
            code: "A".to_string(),
            line: "L1".to_string(),
            standard_rate: 100,
        },
        Product {
            code: "B".to_string(),
            line: "L1".to_string(),
            standard_rate: 240,
        },
        Product {
            code: "C".to_string(),
            line: "L2".to_string(),
            standard_rate: 600,
        },
    ])
}

pub fn test_builder() -> ShiftReportBuilder {
    ShiftReportBuilder::new(OeeRules::default(), StoppageTaxonomy::builtin())
}

/// 构造一条记录（可用 480, 计划 480）
pub fn sample_record(
    date: NaiveDate,
    shift: &str,
    line: &str,
    effective_min: f64,
    actual_units: u64,
    defective_units: u64,
    stoppages: Vec<Stoppage>,
) -> ShiftRecord {
    let stoppage_min: f64 = stoppages.iter().map(|s| s.minutes as f64).sum();
    ShiftRecord {
        date,
        shift: shift.to_string(),
        line: line.to_string(),
        supervisor: "Ana".to_string(),
        available_min: 480.0,
        programmed_min: 480.0,
        effective_min,
        non_conforming_min: 0.0,
        to_justify_min: (480.0 - effective_min).max(stoppage_min),
        product_codes: vec!["A".to_string()],
        actual_units,
        defective_units,
        stoppages,
    }
}
