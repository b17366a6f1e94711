// ==========================================
// OEE 班次报表系统 - 配置层
// ==========================================
// 职责: 规则常量、停机分类表、文件路径
// 存储: key-value JSON 文件 + 内置默认值
// ==========================================

pub mod config_manager;
pub mod rules;
pub mod taxonomy;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_data_dir, get_default_config_path, ConfigManager};
pub use rules::{OeeRules, STOPPAGE_SLOTS};
pub use taxonomy::{StoppageCause, StoppageTaxonomy, TaxonomyError, SPEED_LOSS_CAUSE};
