// ==========================================
// OEE 班次报表系统 - 核心库
// ==========================================
// 组成: 班次报表构建器 (录入校验) + OEE 聚合引擎 (驾驶舱视图)
// 存储: 扁平 CSV 记录文件 (单写单读)
// 系统定位: 表现层之外的全部业务规则
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 记录文件读写
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 产品目录
pub mod importer;

// 配置层 - 规则常量与停机分类
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 表现层协作接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BarKind, ParetoClass, QueryStatus, TrendGranularity};

// 领域实体
pub use domain::{
    EditingSession, ProducedItem, Product, ProductCatalog, ShiftKey, ShiftRecord, Stoppage,
    TimeBuckets,
};

// 引擎
pub use engine::{
    DistributionEngine, HistoryEngine, ParetoEngine, ShiftReportBuilder, TrendEngine,
    WaterfallEngine,
};

// 配置
pub use config::{ConfigManager, OeeRules, StoppageTaxonomy};

// API
pub use api::{DashboardApi, ShiftReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Reporte de Efectividad - OEE";
