// ==========================================
// OEE 班次报表系统 - 班次报表录入 API
// ==========================================
// 职责: 表单协作接口（下拉数据、条目增删、保存）
// 会话由调用方持有,每次调用显式传入
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::{EditingSession, ProductCatalog, ShiftKey};
use crate::engine::{RecomputeOutcome, SaveOutcome, ShiftReportBuilder};
use crate::i18n::t;
use crate::importer::{CatalogDqReport, CatalogLoader};
use crate::repository::ShiftRecordRepository;

// ==========================================
// ShiftReportApi - 录入 API
// ==========================================
pub struct ShiftReportApi {
    builder: ShiftReportBuilder,
    repository: Arc<ShiftRecordRepository>,
    catalog: Arc<ProductCatalog>,
}

impl ShiftReportApi {
    pub fn new(
        builder: ShiftReportBuilder,
        repository: Arc<ShiftRecordRepository>,
        catalog: Arc<ProductCatalog>,
    ) -> Self {
        Self {
            builder,
            repository,
            catalog,
        }
    }

    /// 由配置装配：加载产品目录（阻断）并校验停机分类表
    ///
    /// # 返回
    /// - Ok((api, DQ 报告)): 目录中被跳过的行记录在 DQ 报告中
    /// - Err(ApiError::ImportError): 目录不可用
    pub fn from_config(config: &ConfigManager) -> ApiResult<(Self, CatalogDqReport)> {
        let builder = ShiftReportBuilder::from_config(config)?;
        let (catalog, dq_report) = CatalogLoader::new().load(config.catalog_path())?;
        if dq_report.has_errors() {
            warn!(
                blocked = dq_report.summary.blocked,
                conflict = dq_report.summary.conflict,
                "产品目录存在被跳过的行"
            );
        }
        let repository = ShiftRecordRepository::new(config.records_path());
        info!(
            products = catalog.len(),
            records = %repository.path().display(),
            "班次报表 API 已初始化"
        );
        Ok((
            Self::new(builder, Arc::new(repository), Arc::new(catalog)),
            dq_report,
        ))
    }

    // ==========================================
    // 下拉数据
    // ==========================================

    pub fn available_lines(&self) -> Vec<String> {
        self.catalog.lines()
    }

    /// 指定生产线的产品（代码 → 标准产量）
    pub fn products_for_line(&self, line: &str) -> BTreeMap<String, u32> {
        self.catalog.products_for_line(line)
    }

    pub fn stoppage_causes(&self) -> Vec<&str> {
        self.builder.taxonomy().cause_labels()
    }

    pub fn stoppage_subcauses(&self, cause: &str) -> ApiResult<Vec<String>> {
        self.builder
            .taxonomy()
            .subcauses(cause)
            .map(|subs| subs.to_vec())
            .ok_or_else(|| ApiError::InvalidInput(format!("未知停机原因: {}", cause)))
    }

    // ==========================================
    // 会话操作
    // ==========================================

    pub fn new_session(&self) -> EditingSession {
        EditingSession::new()
    }

    pub fn add_produced_item(
        &self,
        session: &mut EditingSession,
        code: &str,
    ) -> ApiResult<RecomputeOutcome> {
        Ok(self.builder.add_produced_item(session, code, &self.catalog)?)
    }

    pub fn remove_produced_item(
        &self,
        session: &mut EditingSession,
        index: usize,
    ) -> ApiResult<RecomputeOutcome> {
        Ok(self.builder.remove_produced_item(session, index)?)
    }

    pub fn update_item_quantities(
        &self,
        session: &mut EditingSession,
        index: usize,
        actual_units: u32,
        defective_units: u32,
    ) -> ApiResult<RecomputeOutcome> {
        Ok(self
            .builder
            .update_item_quantities(session, index, actual_units, defective_units)?)
    }

    pub fn add_stoppage(
        &self,
        session: &mut EditingSession,
        cause: &str,
        subcause: &str,
        minutes: i64,
    ) -> ApiResult<RecomputeOutcome> {
        Ok(self.builder.add_stoppage(session, cause, subcause, minutes)?)
    }

    pub fn remove_stoppage(
        &self,
        session: &mut EditingSession,
        index: usize,
    ) -> ApiResult<RecomputeOutcome> {
        Ok(self.builder.remove_stoppage(session, index)?)
    }

    /// 表头或计划时间修改后调用
    pub fn recompute(&self, session: &mut EditingSession) -> RecomputeOutcome {
        self.builder.recompute(session)
    }

    pub fn clear_session(&self, session: &mut EditingSession) {
        session.clear();
    }

    // ==========================================
    // 保存
    // ==========================================

    /// 同键记录已存在时返回覆盖提示
    pub fn report_exists(&self, date: NaiveDate, shift: &str, line: &str) -> ApiResult<Option<String>> {
        let key = ShiftKey::new(date, shift.trim(), line.trim());
        if self.repository.exists(&key)? {
            Ok(Some(t("storage.replace_warning")))
        } else {
            Ok(None)
        }
    }

    /// 读取行指纹，供 save_checked 使用
    pub fn fingerprint(&self, session: &EditingSession) -> ApiResult<Option<u64>> {
        match session.key() {
            Some(key) => Ok(self.repository.find_fingerprint(&key)?),
            None => Ok(None),
        }
    }

    pub fn save(&self, session: &mut EditingSession) -> ApiResult<SaveOutcome> {
        Ok(self.builder.save(session, &self.repository)?)
    }

    pub fn save_checked(
        &self,
        session: &mut EditingSession,
        expected_fingerprint: Option<u64>,
    ) -> ApiResult<SaveOutcome> {
        Ok(self
            .builder
            .save_checked(session, &self.repository, expected_fingerprint)?)
    }

    /// 创建只含表头的空记录文件
    pub fn ensure_initialized(&self) -> ApiResult<()> {
        Ok(self.repository.ensure_initialized()?)
    }

    pub fn repository(&self) -> &Arc<ShiftRecordRepository> {
        &self.repository
    }
}
