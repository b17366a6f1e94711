// ==========================================
// OEE 班次报表系统 - 产品目录字段映射器
// ==========================================
// 职责: 源列名 → 标准字段映射 + 类型转换
// 标准列: codigo_producto, linea_produccion, estandar_produccion
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;

pub const COL_CODE: &str = "codigo_producto";
pub const COL_LINE: &str = "linea_produccion";
pub const COL_RATE: &str = "estandar_produccion";

// ==========================================
// RawProductRecord - 映射后的目录行（未校验）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawProductRecord {
    pub code: Option<String>,
    pub line: Option<String>,
    pub standard_rate: Option<f64>,
    pub row_number: usize, // 原始文件行号（表头为第 1 行）
}

pub struct FieldMapper;

impl FieldMapper {
    pub fn map_to_raw_product(&self, row: &RawRow, row_number: usize) -> ImportResult<RawProductRecord> {
        Ok(RawProductRecord {
            code: self.get_string(row, COL_CODE),
            line: self.get_string(row, COL_LINE),
            standard_rate: self.parse_f64(row, COL_RATE, row_number)?,
            row_number,
        })
    }

    /// 表头是否覆盖三个标准列（含别名）
    pub fn missing_columns(&self, headers: &[&str]) -> Vec<&'static str> {
        [COL_CODE, COL_LINE, COL_RATE]
            .into_iter()
            .filter(|key| !Self::aliases(key).iter().any(|alias| headers.contains(alias)))
            .collect()
    }

    fn aliases(key: &str) -> Vec<&str> {
        match key {
            COL_CODE => vec![COL_CODE, "codigo", "producto", "product_code"],
            COL_LINE => vec![COL_LINE, "linea", "line"],
            COL_RATE => vec![COL_RATE, "estandar", "standard_rate"],
            _ => vec![key],
        }
    }

    /// 提取字符串字段，支持多个可能的列名（别名）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        for alias in Self::aliases(key) {
            if let Some(v) = row.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 解析浮点数（接受 "100" 与 "100.0"）
    fn parse_f64(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为数值: {}", value),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_field_mapper_basic() {
        let raw = row(&[
            ("codigo_producto", " A "),
            ("linea_produccion", "L1"),
            ("estandar_produccion", "100.0"),
        ]);
        let mapped = FieldMapper.map_to_raw_product(&raw, 2).unwrap();
        assert_eq!(mapped.code.as_deref(), Some("A"));
        assert_eq!(mapped.line.as_deref(), Some("L1"));
        assert_eq!(mapped.standard_rate, Some(100.0));
    }

    #[test]
    fn test_field_mapper_aliases() {
        let raw = row(&[("codigo", "B"), ("linea", "L2"), ("estandar", "80")]);
        let mapped = FieldMapper.map_to_raw_product(&raw, 3).unwrap();
        assert_eq!(mapped.code.as_deref(), Some("B"));
        assert_eq!(mapped.standard_rate, Some(80.0));
    }

    #[test]
    fn test_field_mapper_invalid_number() {
        let raw = row(&[("codigo_producto", "A"), ("estandar_produccion", "cien")]);
        let result = FieldMapper.map_to_raw_product(&raw, 4);
        assert!(matches!(
            result,
            Err(ImportError::TypeConversionError { row: 4, .. })
        ));
    }

    #[test]
    fn test_missing_columns() {
        let missing = FieldMapper.missing_columns(&["codigo_producto", "linea"]);
        assert_eq!(missing, vec![COL_RATE]);
    }
}
