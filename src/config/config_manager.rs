// ==========================================
// OEE 班次报表系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 扁平 key-value JSON 文件
// ==========================================

use crate::config::rules::{OeeRules, STOPPAGE_SLOTS};
use crate::config::taxonomy::{StoppageTaxonomy, TaxonomyError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

/// 记录文件默认名
pub const DEFAULT_RECORDS_FILE: &str = "registros_produccion.csv";
/// 产品目录默认名
pub const DEFAULT_CATALOG_FILE: &str = "productos.csv";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径（顶层为对象，值可为字符串/数字/布尔/数组）
    ///
    /// # 说明
    /// 文件不存在时返回空配置,不视为错误
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self {
                values: HashMap::new(),
                source: Some(path.to_path_buf()),
            });
        }

        let raw = std::fs::read_to_string(path)?;
        let mut manager = Self::from_json(&raw)?;
        manager.source = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), keys = manager.values.len(), "配置加载完成");
        Ok(manager)
    }

    /// 从 JSON 文本解析配置
    pub fn from_json(raw: &str) -> Result<Self, Box<dyn Error>> {
        let parsed: HashMap<String, Value> = serde_json::from_str(raw)?;
        let values = parsed
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();
        Ok(Self {
            values,
            source: None,
        })
    }

    /// 从环境变量 OEE_CONFIG_PATH 或默认数据目录加载
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load(get_default_config_path())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// 覆写配置值（仅内存）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn get_f64(&self, key: &str, default: f64) -> f64 {
        let value = self.get_config_or_default(key, &default.to_string());
        value.trim().parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
            default
        })
    }

    fn get_usize(&self, key: &str, default: usize) -> usize {
        let value = self.get_config_or_default(key, &default.to_string());
        value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
            default
        })
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            None => default,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "on" => true,
                "0" | "false" | "no" | "n" | "off" => false,
                _ => {
                    tracing::warn!(config_key = key, raw_value = %v, "配置值格式错误，使用默认值");
                    default
                }
            },
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let json_value = json!(self.values);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&mut self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;
        let count = config_map.len();
        for (key, value) in config_map {
            self.values.insert(key, value);
        }
        Ok(count)
    }

    // ===== 业务规则 =====

    /// 获取规则参数（缺省项取默认值）
    pub fn get_rules(&self) -> OeeRules {
        let defaults = OeeRules::default();

        let mut max_stoppages = self.get_usize(config_keys::MAX_STOPPAGES, defaults.max_stoppages);
        if max_stoppages == 0 || max_stoppages > STOPPAGE_SLOTS {
            tracing::warn!(
                config_key = config_keys::MAX_STOPPAGES,
                value = max_stoppages,
                "停机上限超出记录槽位范围，使用 {}",
                STOPPAGE_SLOTS
            );
            max_stoppages = STOPPAGE_SLOTS;
        }

        let speed_loss_labels = match self.values.get(config_keys::SPEED_LOSS_LABELS) {
            Some(raw) => {
                let labels: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                if labels.is_empty() {
                    defaults.speed_loss_labels.clone()
                } else {
                    labels
                }
            }
            None => defaults.speed_loss_labels.clone(),
        };

        let histogram_bins = self
            .get_usize(config_keys::HISTOGRAM_BINS, defaults.histogram_bins)
            .max(1);

        OeeRules {
            standard_shift_min: self
                .get_f64(config_keys::STANDARD_SHIFT_MIN, defaults.standard_shift_min),
            coherence_tolerance_min: self
                .get_f64(config_keys::COHERENCE_TOLERANCE_MIN, defaults.coherence_tolerance_min),
            max_stoppages,
            require_full_justification: self.get_bool(
                config_keys::REQUIRE_FULL_JUSTIFICATION,
                defaults.require_full_justification,
            ),
            pareto_vital_threshold_pct: self.get_f64(
                config_keys::PARETO_VITAL_THRESHOLD_PCT,
                defaults.pareto_vital_threshold_pct,
            ),
            trend_lower_band_pct: self
                .get_f64(config_keys::TREND_LOWER_BAND_PCT, defaults.trend_lower_band_pct),
            trend_upper_band_pct: self
                .get_f64(config_keys::TREND_UPPER_BAND_PCT, defaults.trend_upper_band_pct),
            histogram_bins,
            speed_loss_labels,
        }
    }

    /// 获取停机分类表（配置中提供时加载并校验，否则使用内置表）
    pub fn get_taxonomy(&self) -> Result<StoppageTaxonomy, TaxonomyError> {
        match self.values.get(config_keys::STOPPAGE_TAXONOMY) {
            Some(raw) => StoppageTaxonomy::from_json(raw),
            None => {
                let taxonomy = StoppageTaxonomy::builtin();
                taxonomy.validate()?;
                Ok(taxonomy)
            }
        }
    }

    // ===== 文件路径 =====

    /// 记录文件路径: 环境变量 > 配置项 > 默认数据目录
    pub fn records_path(&self) -> PathBuf {
        self.resolve_path(
            "OEE_RECORDS_PATH",
            config_keys::RECORDS_PATH,
            DEFAULT_RECORDS_FILE,
        )
    }

    /// 产品目录路径: 环境变量 > 配置项 > 默认数据目录
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve_path(
            "OEE_CATALOG_PATH",
            config_keys::CATALOG_PATH,
            DEFAULT_CATALOG_FILE,
        )
    }

    fn resolve_path(&self, env_key: &str, config_key: &str, file_name: &str) -> PathBuf {
        if let Ok(path) = std::env::var(env_key) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        if let Some(path) = self.values.get(config_key) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        default_data_dir().join(file_name)
    }
}

/// 默认数据目录
///
/// - 用户数据目录/oee-shift-report
/// - 拿不到用户目录时回退到当前目录
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("oee-shift-report"),
        None => PathBuf::from("."),
    }
}

/// 默认配置文件路径（允许通过 OEE_CONFIG_PATH 显式指定）
pub fn get_default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("OEE_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    default_data_dir().join("oee_config.json")
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 时间分桶
    pub const STANDARD_SHIFT_MIN: &str = "standard_shift_min";
    pub const COHERENCE_TOLERANCE_MIN: &str = "coherence_tolerance_min";

    // 停机
    pub const MAX_STOPPAGES: &str = "max_stoppages";
    pub const REQUIRE_FULL_JUSTIFICATION: &str = "require_full_justification";
    pub const STOPPAGE_TAXONOMY: &str = "stoppage_taxonomy"; // JSON 数组
    pub const SPEED_LOSS_LABELS: &str = "speed_loss_labels"; // 逗号分隔

    // 驾驶舱
    pub const PARETO_VITAL_THRESHOLD_PCT: &str = "pareto_vital_threshold_pct";
    pub const TREND_LOWER_BAND_PCT: &str = "trend_lower_band_pct";
    pub const TREND_UPPER_BAND_PCT: &str = "trend_upper_band_pct";
    pub const HISTOGRAM_BINS: &str = "histogram_bins";

    // 文件
    pub const RECORDS_PATH: &str = "records_path";
    pub const CATALOG_PATH: &str = "catalog_path";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let manager = ConfigManager::new();
        assert_eq!(manager.get_rules(), OeeRules::default());
    }

    #[test]
    fn test_from_json_accepts_numbers_and_bools() {
        let manager = ConfigManager::from_json(
            r#"{"pareto_vital_threshold_pct": 75, "require_full_justification": false, "coherence_tolerance_min": "0.5"}"#,
        )
        .unwrap();
        let rules = manager.get_rules();
        assert_eq!(rules.pareto_vital_threshold_pct, 75.0);
        assert!(!rules.require_full_justification);
        assert_eq!(rules.coherence_tolerance_min, 0.5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::HISTOGRAM_BINS, "muchos");
        manager.set(config_keys::MAX_STOPPAGES, "25");
        let rules = manager.get_rules();
        assert_eq!(rules.histogram_bins, 15);
        assert_eq!(rules.max_stoppages, STOPPAGE_SLOTS);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut source = ConfigManager::new();
        source.set(config_keys::TREND_UPPER_BAND_PCT, "90");
        let snapshot = source.get_config_snapshot().unwrap();

        let mut target = ConfigManager::new();
        let restored = target.restore_config_from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(target.get_rules().trend_upper_band_pct, 90.0);
    }

    #[test]
    fn test_invalid_taxonomy_in_config_is_rejected() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::STOPPAGE_TAXONOMY, "[]");
        assert!(manager.get_taxonomy().is_err());
        assert!(ConfigManager::new().get_taxonomy().is_ok());
    }

    #[test]
    fn test_records_path_from_config_key() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::RECORDS_PATH, "/tmp/registros.csv");
        if std::env::var("OEE_RECORDS_PATH").is_err() {
            assert_eq!(manager.records_path(), PathBuf::from("/tmp/registros.csv"));
        }
    }
}
