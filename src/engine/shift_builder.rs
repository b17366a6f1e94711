// ==========================================
// OEE 班次报表系统 - 班次报表构建器
// ==========================================
// 职责: 单个班次数据的录入校验与时间对账
// 输入: EditingSession (调用方持有) + 产品目录 + 停机分类表
// 输出: 校验通过的 ShiftRecord → 记录文件 upsert
// 红线: 失败的操作不修改会话中的列表
//       数量修改后必须从零重新推导时间分桶
// ==========================================

use crate::config::{ConfigManager, OeeRules, StoppageTaxonomy, TaxonomyError};
use crate::domain::{
    EditingSession, ErrorKind, ProducedItem, ProductCatalog, ShiftKey, ShiftRecord, Stoppage,
    TimeBuckets, ValidationReport, Violation,
};
use crate::engine::error::{ShiftReportError, ShiftReportResult};
use crate::engine::time_buckets::derive_time_buckets;
use crate::i18n::{t, t_with_args};
use crate::repository::ShiftRecordRepository;
use serde::Serialize;
use tracing::{debug, info, instrument};

// ==========================================
// RecomputeOutcome - 重算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecomputeOutcome {
    pub buckets: TimeBuckets,
    /// 已登记停机总分钟
    pub total_stoppage_min: u32,
    /// 待解释时间 - 已登记停机（可能为负）
    pub remaining_to_justify_min: i64,
    /// 当前违规（为空表示会话有效）
    pub violations: ValidationReport,
}

/// 保存结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub key: ShiftKey,
    /// 是否覆盖了已有记录
    pub replaced: bool,
}

// ==========================================
// ShiftReportBuilder - 班次报表构建器
// ==========================================
pub struct ShiftReportBuilder {
    rules: OeeRules,
    taxonomy: StoppageTaxonomy,
}

impl ShiftReportBuilder {
    pub fn new(rules: OeeRules, taxonomy: StoppageTaxonomy) -> Self {
        Self { rules, taxonomy }
    }

    /// 由配置构建（分类表在此校验）
    pub fn from_config(config: &ConfigManager) -> Result<Self, TaxonomyError> {
        Ok(Self::new(config.get_rules(), config.get_taxonomy()?))
    }

    pub fn rules(&self) -> &OeeRules {
        &self.rules
    }

    pub fn taxonomy(&self) -> &StoppageTaxonomy {
        &self.taxonomy
    }

    // ==========================================
    // 产出条目
    // ==========================================

    /// 添加产出条目（合格/不合格数量初始为 0）
    pub fn add_produced_item(
        &self,
        session: &mut EditingSession,
        code: &str,
        catalog: &ProductCatalog,
    ) -> ShiftReportResult<RecomputeOutcome> {
        let code = code.trim();
        if session.items.iter().any(|item| item.code == code) {
            return Err(ShiftReportError::DuplicateItem {
                code: code.to_string(),
            });
        }

        let product = catalog
            .get(code)
            .filter(|p| {
                let line = session.line.trim();
                line.is_empty() || p.line == line
            })
            .ok_or_else(|| ShiftReportError::UnknownProduct {
                code: code.to_string(),
            })?;

        session
            .items
            .push(ProducedItem::new(product.code.clone(), product.standard_rate));
        debug!(session_id = %session.session_id, code, "添加产出条目");
        Ok(self.recompute(session))
    }

    pub fn remove_produced_item(
        &self,
        session: &mut EditingSession,
        index: usize,
    ) -> ShiftReportResult<RecomputeOutcome> {
        check_index(index, session.items.len())?;
        let removed = session.items.remove(index);
        debug!(session_id = %session.session_id, code = %removed.code, "移除产出条目");
        Ok(self.recompute(session))
    }

    /// 修改数量后从零重算；已登记停机超出新预算时不删除停机，会话标记为无效
    pub fn update_item_quantities(
        &self,
        session: &mut EditingSession,
        index: usize,
        actual_units: u32,
        defective_units: u32,
    ) -> ShiftReportResult<RecomputeOutcome> {
        check_index(index, session.items.len())?;
        let item = &mut session.items[index];
        item.actual_units = actual_units;
        item.defective_units = defective_units;
        Ok(self.recompute(session))
    }

    /// 时间分桶推导（纯函数，使用当前规则的标准班时长）
    pub fn derive_time_buckets(&self, programmed_min: u32, items: &[ProducedItem]) -> TimeBuckets {
        derive_time_buckets(programmed_min as f64, items, self.rules.standard_shift_min)
    }

    // ==========================================
    // 停机条目
    // ==========================================

    /// 登记非计划停机
    ///
    /// 校验顺序: 必填 → 时长 → 分类表 → 条数上限 → 待解释预算
    pub fn add_stoppage(
        &self,
        session: &mut EditingSession,
        cause: &str,
        subcause: &str,
        minutes: i64,
    ) -> ShiftReportResult<RecomputeOutcome> {
        let cause = cause.trim();
        let subcause = subcause.trim();

        if cause.is_empty() {
            return Err(ShiftReportError::MissingField {
                field: "paro_causal".to_string(),
            });
        }
        if subcause.is_empty() {
            return Err(ShiftReportError::MissingField {
                field: "paro_subcausal".to_string(),
            });
        }
        let minutes = match u32::try_from(minutes) {
            Ok(m) if m > 0 => m,
            _ => return Err(ShiftReportError::InvalidDuration { minutes }),
        };
        if !self.taxonomy.contains(cause, subcause) {
            return Err(ShiftReportError::UnknownStoppageCause {
                cause: cause.to_string(),
                subcause: subcause.to_string(),
            });
        }
        if session.stoppages.len() >= self.rules.max_stoppages {
            return Err(ShiftReportError::TooManyStoppages {
                max: self.rules.max_stoppages,
            });
        }

        // 预算总是基于最新数量重新推导
        let buckets = self.derive_time_buckets(session.programmed_min, &session.items);
        let existing = session.total_stoppage_min();
        if existing as u64 + minutes as u64 > buckets.to_justify_min as u64 {
            return Err(ShiftReportError::JustifyBudgetExceeded {
                minutes,
                remaining: buckets.to_justify_min.saturating_sub(existing),
            });
        }

        session.stoppages.push(Stoppage::new(cause, subcause, minutes));
        debug!(session_id = %session.session_id, cause, subcause, minutes, "登记停机");
        Ok(self.recompute(session))
    }

    pub fn remove_stoppage(
        &self,
        session: &mut EditingSession,
        index: usize,
    ) -> ShiftReportResult<RecomputeOutcome> {
        check_index(index, session.stoppages.len())?;
        session.stoppages.remove(index);
        Ok(self.recompute(session))
    }

    // ==========================================
    // 重算与校验
    // ==========================================

    /// 显式重算: 分桶、停机合计、剩余待解释时间、当前违规
    pub fn recompute(&self, session: &mut EditingSession) -> RecomputeOutcome {
        let buckets = self.derive_time_buckets(session.programmed_min, &session.items);
        let total_stoppage_min = session.total_stoppage_min();

        let mut violations = ValidationReport::default();
        self.check_time_coherence(session.programmed_min, &buckets, &mut violations);
        self.check_stoppage_budget(total_stoppage_min, &buckets, &mut violations);

        session.buckets = buckets;
        session.validation = violations.clone();

        debug!(
            session_id = %session.session_id,
            effective = buckets.effective_min,
            non_conforming = buckets.non_conforming_min,
            to_justify = buckets.to_justify_min,
            invalid = !violations.is_ok(),
            "重算时间分桶"
        );

        RecomputeOutcome {
            buckets,
            total_stoppage_min,
            remaining_to_justify_min: buckets.to_justify_min as i64 - total_stoppage_min as i64,
            violations,
        }
    }

    /// 保存前校验（fail closed）
    pub fn validate_for_save(&self, session: &EditingSession) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();

        if session.items.is_empty() {
            report.push(
                Violation::new(ErrorKind::MissingField, t("validation.no_items"))
                    .with_field("producto_terminado"),
            );
        }

        let header_fields = [
            ("fecha", session.date.is_none()),
            ("turno", session.shift.trim().is_empty()),
            ("supervisor", session.supervisor.trim().is_empty()),
            ("linea_produccion", session.line.trim().is_empty()),
        ];
        for (field, missing) in header_fields {
            if missing {
                report.push(
                    Violation::new(
                        ErrorKind::MissingField,
                        t_with_args("validation.missing_field", &[("field", field)]),
                    )
                    .with_field(field),
                );
            }
        }

        if session.programmed_min > session.available_min {
            report.push(
                Violation::new(
                    ErrorKind::TimeCoherenceViolation,
                    t_with_args(
                        "validation.time_coherence",
                        &[
                            ("sum", session.programmed_min.to_string().as_str()),
                            ("programmed", session.available_min.to_string().as_str()),
                            (
                                "diff",
                                (session.programmed_min - session.available_min).to_string().as_str(),
                            ),
                        ],
                    ),
                )
                .with_field("tiempo_programado_min"),
            );
        }

        // 不信任缓存的分桶
        let buckets = self.derive_time_buckets(session.programmed_min, &session.items);
        let total_stoppage_min = session.total_stoppage_min();
        self.check_time_coherence(session.programmed_min, &buckets, &mut report);
        self.check_stoppage_budget(total_stoppage_min, &buckets, &mut report);

        if self.rules.require_full_justification {
            let missing = buckets.to_justify_min as f64 - total_stoppage_min as f64;
            if missing > self.rules.coherence_tolerance_min {
                report.push(Violation::new(
                    ErrorKind::UnjustifiedTime,
                    t_with_args("validation.unjustified_time", &[("missing", missing.to_string().as_str())]),
                ));
            }
        }

        if report.is_ok() {
            Ok(())
        } else {
            Err(report)
        }
    }

    /// 由会话生成待保存记录（先校验）
    pub fn build_record(&self, session: &EditingSession) -> ShiftReportResult<ShiftRecord> {
        self.validate_for_save(session)
            .map_err(ShiftReportError::ValidationFailed)?;

        let date = session.date.ok_or_else(|| ShiftReportError::MissingField {
            field: "fecha".to_string(),
        })?;
        let buckets = self.derive_time_buckets(session.programmed_min, &session.items);

        Ok(ShiftRecord {
            date,
            shift: session.shift.trim().to_string(),
            line: session.line.trim().to_string(),
            supervisor: session.supervisor.trim().to_string(),
            available_min: session.available_min as f64,
            programmed_min: session.programmed_min as f64,
            effective_min: buckets.effective_min.round_ties_even(),
            non_conforming_min: buckets.non_conforming_min.round_ties_even(),
            to_justify_min: buckets.to_justify_min as f64,
            product_codes: session.items.iter().map(|i| i.code.clone()).collect(),
            actual_units: session.items.iter().map(|i| i.actual_units as u64).sum(),
            defective_units: session.items.iter().map(|i| i.defective_units as u64).sum(),
            stoppages: session.stoppages.clone(),
        })
    }

    /// 保存: 按自然键 upsert，成功后清空会话
    #[instrument(skip(self, session, store), fields(session_id = %session.session_id))]
    pub fn save(
        &self,
        session: &mut EditingSession,
        store: &ShiftRecordRepository,
    ) -> ShiftReportResult<SaveOutcome> {
        let record = self.build_record(session)?;
        let outcome = store.upsert(&record)?;
        Ok(self.finish_save(session, record, outcome.replaced))
    }

    /// 保存（带乐观并发检查）
    ///
    /// # 参数
    /// - expected_fingerprint: 会话开始时读取的行指纹
    #[instrument(skip(self, session, store), fields(session_id = %session.session_id))]
    pub fn save_checked(
        &self,
        session: &mut EditingSession,
        store: &ShiftRecordRepository,
        expected_fingerprint: Option<u64>,
    ) -> ShiftReportResult<SaveOutcome> {
        let record = self.build_record(session)?;
        let outcome = store.upsert_checked(&record, expected_fingerprint)?;
        Ok(self.finish_save(session, record, outcome.replaced))
    }

    // ===== 内部实现 =====

    fn finish_save(&self, session: &mut EditingSession, record: ShiftRecord, replaced: bool) -> SaveOutcome {
        let key = record.key();
        info!(
            key = %key,
            replaced,
            items = record.product_codes.len(),
            stoppages = record.stoppages.len(),
            "班次报表已保存"
        );
        session.clear();
        SaveOutcome { key, replaced }
    }

    fn check_time_coherence(&self, programmed_min: u32, buckets: &TimeBuckets, report: &mut ValidationReport) {
        let programmed = programmed_min as f64;
        if !buckets.is_coherent(programmed, self.rules.coherence_tolerance_min) {
            report.push(Violation::new(
                ErrorKind::TimeCoherenceViolation,
                t_with_args(
                    "validation.time_coherence",
                    &[
                        ("sum", format!("{:.1}", buckets.total()).as_str()),
                        ("programmed", programmed_min.to_string().as_str()),
                        ("diff", format!("{:.1}", buckets.total() - programmed).as_str()),
                    ],
                ),
            ));
        }
    }

    fn check_stoppage_budget(&self, total_stoppage_min: u32, buckets: &TimeBuckets, report: &mut ValidationReport) {
        let excess = total_stoppage_min as f64 - buckets.to_justify_min as f64;
        if excess > self.rules.coherence_tolerance_min {
            report.push(Violation::new(
                ErrorKind::StoppageBudgetViolation,
                t_with_args(
                    "validation.stoppage_budget",
                    &[
                        ("stops", total_stoppage_min.to_string().as_str()),
                        ("to_justify", buckets.to_justify_min.to_string().as_str()),
                    ],
                ),
            ));
        }
    }
}

fn check_index(index: usize, len: usize) -> ShiftReportResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(ShiftReportError::IndexOutOfRange { index, len })
    }
}
