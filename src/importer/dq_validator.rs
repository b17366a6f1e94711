// ==========================================
// OEE 班次报表系统 - 产品目录数据质量校验
// ==========================================
// 规则: 代码/生产线缺失、标准产量 <= 0 → ERROR (跳过该行)
//       代码重复 → CONFLICT (后者覆盖前者)
// ==========================================

use crate::domain::Product;
use crate::importer::field_mapper::RawProductRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,    // 错误（该行不入目录）
    Conflict, // 冲突（后者覆盖）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub product_code: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 总行数
    pub success: usize,    // 进入目录
    pub blocked: usize,    // 跳过（ERROR）
    pub conflict: usize,   // 重复代码
}

// ==========================================
// CatalogDqReport - 目录加载报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDqReport {
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
}

impl CatalogDqReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.level == DqLevel::Error)
    }
}

pub struct DqValidator;

impl DqValidator {
    /// 校验单行，通过时返回产品
    pub fn validate_record(&self, record: &RawProductRecord) -> Result<Product, Vec<DqViolation>> {
        let mut violations = Vec::new();

        let error = |field: &str, message: String| DqViolation {
            row_number: record.row_number,
            product_code: record.code.clone(),
            level: DqLevel::Error,
            field: field.to_string(),
            message,
        };

        if record.code.is_none() {
            violations.push(error("codigo_producto", "产品代码缺失".to_string()));
        }
        if record.line.is_none() {
            violations.push(error("linea_produccion", "生产线缺失".to_string()));
        }

        let rate = match record.standard_rate {
            None => {
                violations.push(error("estandar_produccion", "标准产量缺失".to_string()));
                None
            }
            Some(rate) if rate <= 0.0 || !rate.is_finite() => {
                violations.push(error(
                    "estandar_produccion",
                    format!("标准产量必须为正数: {}", rate),
                ));
                None
            }
            Some(rate) if rate > u32::MAX as f64 => {
                violations.push(error(
                    "estandar_produccion",
                    format!("标准产量超出范围: {}", rate),
                ));
                None
            }
            Some(rate) => Some(rate.round() as u32),
        };

        match (&record.code, &record.line, rate) {
            (Some(code), Some(line), Some(rate)) if violations.is_empty() && rate > 0 => Ok(Product {
                code: code.clone(),
                line: line.clone(),
                standard_rate: rate,
            }),
            (_, _, Some(0)) => {
                violations.push(error(
                    "estandar_produccion",
                    "标准产量取整后为 0".to_string(),
                ));
                Err(violations)
            }
            _ => Err(violations),
        }
    }

    /// 代码重复检查（同一文件内）
    pub fn validate_duplicates(&self, products: &[(usize, Product)]) -> Vec<DqViolation> {
        let mut seen = HashSet::new();
        let mut violations = Vec::new();
        for (row_number, product) in products {
            if !seen.insert(product.code.as_str()) {
                violations.push(DqViolation {
                    row_number: *row_number,
                    product_code: Some(product.code.clone()),
                    level: DqLevel::Conflict,
                    field: "codigo_producto".to_string(),
                    message: "重复产品代码，以后出现者为准".to_string(),
                });
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(code: Option<&str>, line: Option<&str>, rate: Option<f64>) -> RawProductRecord {
        RawProductRecord {
            code: code.map(str::to_string),
            line: line.map(str::to_string),
            standard_rate: rate,
            row_number: 2,
        }
    }

    #[test]
    fn test_valid_record() {
        let product = DqValidator
            .validate_record(&raw(Some("A"), Some("L1"), Some(100.0)))
            .unwrap();
        assert_eq!(product.standard_rate, 100);
    }

    #[test]
    fn test_missing_code_and_bad_rate() {
        let violations = DqValidator
            .validate_record(&raw(None, Some("L1"), Some(0.0)))
            .unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.level == DqLevel::Error));
    }

    #[test]
    fn test_rate_rounding_to_zero_is_rejected() {
        let violations = DqValidator
            .validate_record(&raw(Some("A"), Some("L1"), Some(0.2)))
            .unwrap_err();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_duplicates_flagged_as_conflict() {
        let product = |code: &str| Product {
            code: code.to_string(),
            line: "L1".to_string(),
            standard_rate: 10,
        };
        let violations =
            DqValidator.validate_duplicates(&[(2, product("A")), (3, product("B")), (4, product("A"))]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].row_number, 4);
        assert_eq!(violations[0].level, DqLevel::Conflict);
    }
}
