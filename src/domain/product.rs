// ==========================================
// OEE 班次报表系统 - 产品目录领域模型
// ==========================================
// 产品目录为只读参考数据,每个会话加载一次
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ==========================================
// Product - 产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,          // 产品代码 (codigo_producto)
    pub line: String,          // 生产线 (linea_produccion)
    pub standard_rate: u32,    // 标准产量 (件 / 480 分钟标准班)
}

// ==========================================
// ProductCatalog - 产品目录
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    /// 由产品列表构建目录（代码重复时后者覆盖前者）
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut map = HashMap::new();
        for product in products {
            map.insert(product.code.clone(), product);
        }
        Self { products: map }
    }

    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// 可选生产线（去重、排序）
    pub fn lines(&self) -> Vec<String> {
        self.products
            .values()
            .map(|p| p.line.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 指定生产线的产品 → 标准产量
    pub fn products_for_line(&self, line: &str) -> BTreeMap<String, u32> {
        if line.trim().is_empty() {
            return BTreeMap::new();
        }
        self.products
            .values()
            .filter(|p| p.line == line)
            .map(|p| (p.code.clone(), p.standard_rate))
            .collect()
    }
}
