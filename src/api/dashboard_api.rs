// ==========================================
// OEE 班次报表系统 - 驾驶舱 API
// ==========================================
// 职责: 读取记录文件并委托各聚合引擎
// 红线: 记录文件不可读时降级为"无历史"（warn 日志）,查询不返回错误
// 当前日期由调用方传入,便于测试与回放
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::config::{ConfigManager, OeeRules};
use crate::domain::{DistributionPeriod, ShiftRecord};
use crate::engine::{
    DistributionEngine, DistributionReport, HistoryEngine, HistoryFilter, HistoryReport,
    ParetoEngine, ParetoReport, ParetoSelection, QueryOutcome, TrendEngine, TrendReport,
    TrendSelection, WaterfallEngine, WaterfallReport, WaterfallSelection,
};
use crate::repository::ShiftRecordRepository;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    repository: Arc<ShiftRecordRepository>,
    waterfall_engine: WaterfallEngine,
    pareto_engine: ParetoEngine,
    trend_engine: TrendEngine,
    distribution_engine: DistributionEngine,
    history_engine: HistoryEngine,
}

impl DashboardApi {
    pub fn new(repository: Arc<ShiftRecordRepository>, rules: OeeRules) -> Self {
        Self {
            repository,
            waterfall_engine: WaterfallEngine::new(rules.clone()),
            pareto_engine: ParetoEngine::new(rules.clone()),
            trend_engine: TrendEngine::new(rules.clone()),
            distribution_engine: DistributionEngine::new(rules),
            history_engine: HistoryEngine::new(),
        }
    }

    pub fn from_config(config: &ConfigManager) -> Self {
        let repository = ShiftRecordRepository::new(config.records_path());
        info!(records = %repository.path().display(), "驾驶舱 API 已初始化");
        Self::new(Arc::new(repository), config.get_rules())
    }

    /// 每次查询重新读取记录文件
    fn records(&self) -> Vec<ShiftRecord> {
        self.repository.load_all_or_empty()
    }

    /// 记录中出现过的生产线（升序去重）
    pub fn list_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.records().into_iter().map(|r| r.line).collect();
        lines.sort();
        lines.dedup();
        lines
    }

    // ==========================================
    // 聚合视图
    // ==========================================

    pub fn waterfall(&self, selection: &WaterfallSelection) -> QueryOutcome<WaterfallReport> {
        self.waterfall_engine.compute(&self.records(), selection)
    }

    pub fn pareto(&self, selection: &ParetoSelection, today: NaiveDate) -> QueryOutcome<ParetoReport> {
        self.pareto_engine.compute(&self.records(), selection, today)
    }

    pub fn trend(&self, selection: &TrendSelection, today: NaiveDate) -> QueryOutcome<TrendReport> {
        self.trend_engine.compute(&self.records(), selection, today)
    }

    pub fn distribution(
        &self,
        period: DistributionPeriod,
        today: NaiveDate,
    ) -> QueryOutcome<DistributionReport> {
        self.distribution_engine.compute(&self.records(), period, today)
    }

    pub fn history(&self, filter: &HistoryFilter) -> QueryOutcome<HistoryReport> {
        self.history_engine.compute(&self.records(), filter)
    }
}
