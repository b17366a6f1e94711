// ==========================================
// OEE 班次报表系统 - 停机原因分类表
// ==========================================
// 两级分类: 11 个一级原因,每个 3-5 个二级原因
// 标签必须与历史数据逐字一致（西班牙语原文）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// 一级原因数量
pub const EXPECTED_CAUSE_COUNT: usize = 11;
/// 二级原因数量下限
pub const MIN_SUBCAUSES: usize = 3;
/// 二级原因数量上限
pub const MAX_SUBCAUSES: usize = 5;

/// 速度损失（保留原因）
pub const SPEED_LOSS_CAUSE: &str = "Perdida de velocidad";
pub const SPEED_LOSS_SUBCAUSES: [&str; 3] = ["Materia Prima", "Equipos/Proceso", "Gestión/Personal"];

// 内置分类表
const BUILTIN_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Falla de equipo",
        &["Fallo mecanico", "Fallo electrico", "Falla de sensores", "Fuga de aceite/aire"],
    ),
    (
        "Mantenimiento no programado",
        &["Ajustes de emergencia", "Cambio de repuestos criticos", "Inspecciones correctivas"],
    ),
    (
        "Cambio de producto / setup",
        &["Ajuste de maquina", "Limpieza de linea", "Cambio de herramientas/moldes"],
    ),
    (
        "Abastecimiento de materiales",
        &[
            "Falta de materia prima",
            "Retraso de logistica interna",
            "Retraso de proveedor externo",
            "Material defectuoso recibido",
        ],
    ),
    (
        "Calidad del producto",
        &["Producto fuera de especificacion", "Reproceso en linea", "Bloqueo por inspeccion de calidad"],
    ),
    (
        "Problemas de planeacion/programa",
        &["Orden cancelada", "Espera por programacion", "Secuencia incorrecta"],
    ),
    (
        "Servicios auxiliares",
        &[
            "Falta de energia electrica",
            "Corte de agua",
            "Falla de aire comprimido",
            "Fallo de vapor/gas",
        ],
    ),
    (
        "Mano de obra / personal",
        &["Falta de operador", "Capacitacion en maquina", "Relevo de turno retrasado"],
    ),
    (
        "Retrabajo / reproceso",
        &["Ajuste de lote", "Correccion por error de empaque", "Correccion por error de etiquetado"],
    ),
    (
        "Inicio / fin de produccion",
        &[
            "Arranque de linea (puesta a punto)",
            "Parada por fin de orden de produccion",
            "Limpieza final",
        ],
    ),
    (SPEED_LOSS_CAUSE, &SPEED_LOSS_SUBCAUSES),
];

/// 分类表结构错误
#[derive(Error, Debug, PartialEq)]
pub enum TaxonomyError {
    #[error("一级原因数量错误: 期望 {expected}, 实际 {actual}")]
    WrongCauseCount { expected: usize, actual: usize },

    #[error("二级原因数量错误 ({cause}): {count} 不在 [{min}, {max}] 内")]
    WrongSubcauseCount {
        cause: String,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("空标签 (一级原因: {0})")]
    EmptyLabel(String),

    #[error("重复标签: {0}")]
    DuplicateLabel(String),

    #[error("缺少速度损失原因或其二级原因: {0}")]
    MissingSpeedLoss(String),

    #[error("分类表解析失败: {0}")]
    ParseError(String),
}

// ==========================================
// StoppageCause - 一级原因及其二级原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppageCause {
    pub cause: String,
    pub subcauses: Vec<String>,
}

// ==========================================
// StoppageTaxonomy - 停机分类表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppageTaxonomy {
    causes: Vec<StoppageCause>,
}

impl Default for StoppageTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StoppageTaxonomy {
    /// 内置分类表
    pub fn builtin() -> Self {
        let causes = BUILTIN_TAXONOMY
            .iter()
            .map(|(cause, subs)| StoppageCause {
                cause: cause.to_string(),
                subcauses: subs.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { causes }
    }

    /// 从 JSON 加载（数组: [{"cause": "...", "subcauses": [...]}, ...]）并校验
    pub fn from_json(raw: &str) -> Result<Self, TaxonomyError> {
        let causes: Vec<StoppageCause> =
            serde_json::from_str(raw).map_err(|e| TaxonomyError::ParseError(e.to_string()))?;
        let taxonomy = Self { causes };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// 启动时形状校验
    pub fn validate(&self) -> Result<(), TaxonomyError> {
        if self.causes.len() != EXPECTED_CAUSE_COUNT {
            return Err(TaxonomyError::WrongCauseCount {
                expected: EXPECTED_CAUSE_COUNT,
                actual: self.causes.len(),
            });
        }

        let mut seen_causes = HashSet::new();
        for entry in &self.causes {
            if entry.cause.trim().is_empty() {
                return Err(TaxonomyError::EmptyLabel(entry.cause.clone()));
            }
            if !seen_causes.insert(entry.cause.as_str()) {
                return Err(TaxonomyError::DuplicateLabel(entry.cause.clone()));
            }

            let count = entry.subcauses.len();
            if !(MIN_SUBCAUSES..=MAX_SUBCAUSES).contains(&count) {
                return Err(TaxonomyError::WrongSubcauseCount {
                    cause: entry.cause.clone(),
                    count,
                    min: MIN_SUBCAUSES,
                    max: MAX_SUBCAUSES,
                });
            }

            let mut seen_subs = HashSet::new();
            for sub in &entry.subcauses {
                if sub.trim().is_empty() {
                    return Err(TaxonomyError::EmptyLabel(entry.cause.clone()));
                }
                if !seen_subs.insert(sub.as_str()) {
                    return Err(TaxonomyError::DuplicateLabel(format!("{} / {}", entry.cause, sub)));
                }
            }
        }

        let speed_loss = self
            .subcauses(SPEED_LOSS_CAUSE)
            .ok_or_else(|| TaxonomyError::MissingSpeedLoss(SPEED_LOSS_CAUSE.to_string()))?;
        for expected in SPEED_LOSS_SUBCAUSES {
            if !speed_loss.iter().any(|s| s == expected) {
                return Err(TaxonomyError::MissingSpeedLoss(expected.to_string()));
            }
        }

        Ok(())
    }

    pub fn causes(&self) -> &[StoppageCause] {
        &self.causes
    }

    /// 一级原因列表（保持表内顺序）
    pub fn cause_labels(&self) -> Vec<&str> {
        self.causes.iter().map(|c| c.cause.as_str()).collect()
    }

    pub fn subcauses(&self, cause: &str) -> Option<&[String]> {
        self.causes
            .iter()
            .find(|c| c.cause == cause)
            .map(|c| c.subcauses.as_slice())
    }

    pub fn contains(&self, cause: &str, subcause: &str) -> bool {
        self.subcauses(cause)
            .map(|subs| subs.iter().any(|s| s == subcause))
            .unwrap_or(false)
    }
}
