// ==========================================
// OEE 班次报表系统 - 产品目录加载器
// ==========================================
// 流程: 文件解析 → 字段映射 → DQ 校验 → 重复代码处理 → 目录
// 加载失败（文件缺失/格式错误/目录为空）为阻断性错误
// ==========================================

use crate::domain::{Product, ProductCatalog};
use crate::importer::dq_validator::{CatalogDqReport, DqLevel, DqValidator, DqViolation};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use std::path::Path;
use tracing::{info, instrument, warn};

pub struct CatalogLoader {
    parser: UniversalFileParser,
    mapper: FieldMapper,
    validator: DqValidator,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
            validator: DqValidator,
        }
    }

    /// 加载产品目录
    ///
    /// # 返回
    /// - Ok((目录, DQ 报告)): 至少一行有效
    /// - Err: 文件不可读、缺少必需列或没有任何有效行
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ImportResult<(ProductCatalog, CatalogDqReport)> {
        let path = path.as_ref();
        let rows = self.parser.parse(path)?;

        let Some(first) = rows.first() else {
            return Err(ImportError::EmptyCatalog(path.display().to_string()));
        };
        let headers: Vec<&str> = first.keys().map(String::as_str).collect();
        if let Some(column) = self.mapper.missing_columns(&headers).first() {
            return Err(ImportError::MissingColumn(column.to_string()));
        }

        let mut report = CatalogDqReport::default();
        report.summary.total_rows = rows.len();

        let mut accepted: Vec<(usize, Product)> = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            // 表头为第 1 行
            let row_number = idx + 2;
            let mapped = match self.mapper.map_to_raw_product(row, row_number) {
                Ok(mapped) => mapped,
                Err(e) => {
                    report.violations.push(DqViolation {
                        row_number,
                        product_code: None,
                        level: DqLevel::Error,
                        field: "estandar_produccion".to_string(),
                        message: e.to_string(),
                    });
                    report.summary.blocked += 1;
                    continue;
                }
            };

            match self.validator.validate_record(&mapped) {
                Ok(product) => accepted.push((row_number, product)),
                Err(violations) => {
                    report.violations.extend(violations);
                    report.summary.blocked += 1;
                }
            }
        }

        let conflicts = self.validator.validate_duplicates(&accepted);
        report.summary.conflict = conflicts.len();
        report.violations.extend(conflicts);

        for violation in &report.violations {
            warn!(
                row = violation.row_number,
                field = %violation.field,
                level = ?violation.level,
                "目录行校验未通过: {}",
                violation.message
            );
        }

        let catalog = ProductCatalog::from_products(accepted.into_iter().map(|(_, p)| p));
        report.summary.success = catalog.len();

        if catalog.is_empty() {
            return Err(ImportError::EmptyCatalog(path.display().to_string()));
        }

        info!(
            products = catalog.len(),
            lines = catalog.lines().len(),
            blocked = report.summary.blocked,
            "产品目录加载完成"
        );
        Ok((catalog, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_catalog_with_bad_rows() {
        let file = csv_file(
            "codigo_producto,linea_produccion,estandar_produccion\n\
             A,L1,100\n\
             B,,50\n\
             C,L2,0\n\
             D,L2,abc\n\
             A,L1,120\n",
        );
        let (catalog, report) = CatalogLoader::new().load(file.path()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("A").unwrap().standard_rate, 120);
        assert_eq!(report.summary.total_rows, 5);
        assert_eq!(report.summary.blocked, 3);
        assert_eq!(report.summary.conflict, 1);
        assert!(report.has_errors());
    }

    #[test]
    fn test_missing_column_is_blocking() {
        let file = csv_file("codigo_producto,linea_produccion\nA,L1\n");
        let result = CatalogLoader::new().load(file.path());
        assert!(matches!(result, Err(ImportError::MissingColumn(c)) if c == "estandar_produccion"));
    }

    #[test]
    fn test_header_only_file_is_empty_catalog() {
        let file = csv_file("codigo_producto,linea_produccion,estandar_produccion\n");
        let result = CatalogLoader::new().load(file.path());
        assert!(matches!(result, Err(ImportError::EmptyCatalog(_))));
    }
}
