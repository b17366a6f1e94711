// ==========================================
// OEE 班次报表系统 - 时间分解瀑布引擎
// ==========================================
// 输入: 全部班次记录 + (生产线, 月, 年)
// 流程:
//   1. 汇总可用/计划/有效时间
//   2. 维护时间 = 可用 - 计划
//   3. 停机按一级原因汇总,速度损失单独成桶
//   4. 原因按分钟降序（同值保持首次出现顺序）
//   5. 缺陷时间 = (Σ不合格 / Σ合格) × 计划
//   6. 从计划时间依次扣减 → 最终有效时间
//   7. OEE 净值 = 最终有效 / 计划 × 100
// 红线: 空集返回零值视图,不报错
// ==========================================

use crate::config::OeeRules;
use crate::domain::{BarKind, ShiftRecord};
use crate::engine::outcome::QueryOutcome;
use crate::i18n::t;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ==========================================
// WaterfallSelection - 查询条件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallSelection {
    pub line: String,
    pub month: u32,
    pub year: i32,
}

// ==========================================
// WaterfallBar - 单根柱
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallBar {
    pub kind: BarKind,
    pub label: String,
    /// 带符号分钟（损失为负）
    pub minutes: f64,
    /// 柱起点（绘图基线）
    pub base: f64,
}

// ==========================================
// WaterfallReport - 瀑布视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallReport {
    pub selection: WaterfallSelection,
    pub record_count: usize,
    pub available_min: f64,
    pub programmed_min: f64,
    pub maintenance_min: f64,
    /// 记录中登记的有效时间合计
    pub recorded_effective_min: f64,
    pub speed_loss_min: f64,
    pub defect_min: f64,
    /// 扣减全部损失后的有效时间
    pub effective_final_min: f64,
    pub oee_net_pct: f64,
    pub bars: Vec<WaterfallBar>,
}

impl WaterfallReport {
    fn empty(selection: WaterfallSelection) -> Self {
        Self {
            selection,
            record_count: 0,
            available_min: 0.0,
            programmed_min: 0.0,
            maintenance_min: 0.0,
            recorded_effective_min: 0.0,
            speed_loss_min: 0.0,
            defect_min: 0.0,
            effective_final_min: 0.0,
            oee_net_pct: 0.0,
            bars: Vec::new(),
        }
    }

    /// 按类型取柱（测试与表现层使用）
    pub fn bars_of(&self, kind: BarKind) -> impl Iterator<Item = &WaterfallBar> {
        self.bars.iter().filter(move |b| b.kind == kind)
    }
}

// ==========================================
// WaterfallEngine - 瀑布引擎
// ==========================================
pub struct WaterfallEngine {
    rules: OeeRules,
}

impl WaterfallEngine {
    pub fn new(rules: OeeRules) -> Self {
        Self { rules }
    }

    #[instrument(skip(self, records), fields(line = %selection.line, month = selection.month, year = selection.year))]
    pub fn compute(
        &self,
        records: &[ShiftRecord],
        selection: &WaterfallSelection,
    ) -> QueryOutcome<WaterfallReport> {
        let matching: Vec<&ShiftRecord> = records
            .iter()
            .filter(|r| {
                r.line == selection.line
                    && r.date.month() == selection.month
                    && r.date.year() == selection.year
            })
            .collect();

        if matching.is_empty() {
            debug!("瀑布视图无匹配记录");
            return QueryOutcome::empty(WaterfallReport::empty(selection.clone()));
        }

        // ===== 1-2. 时间汇总 =====
        let available_min: f64 = matching.iter().map(|r| r.available_min).sum();
        let programmed_min: f64 = matching.iter().map(|r| r.programmed_min).sum();
        let recorded_effective_min: f64 = matching.iter().map(|r| r.effective_min).sum();
        let maintenance_min = available_min - programmed_min;

        // ===== 3-4. 停机原因汇总 =====
        let mut causes: Vec<(String, f64)> = Vec::new();
        let mut speed_loss_min = 0.0;
        for stoppage in matching.iter().flat_map(|r| r.stoppages.iter()) {
            let minutes = stoppage.minutes as f64;
            if self.rules.is_speed_loss(&stoppage.cause) {
                speed_loss_min += minutes;
                continue;
            }
            match causes.iter_mut().find(|(cause, _)| *cause == stoppage.cause) {
                Some((_, total)) => *total += minutes,
                None => causes.push((stoppage.cause.clone(), minutes)),
            }
        }
        // sort_by 为稳定排序
        causes.sort_by(|a, b| b.1.total_cmp(&a.1));

        // ===== 5. 缺陷时间 =====
        let actual_units: u64 = matching.iter().map(|r| r.actual_units).sum();
        let defective_units: u64 = matching.iter().map(|r| r.defective_units).sum();
        let defect_min = if actual_units > 0 {
            defective_units as f64 / actual_units as f64 * programmed_min
        } else {
            0.0
        };

        // ===== 6. 逐级扣减 =====
        let mut bars = vec![WaterfallBar {
            kind: BarKind::Programmed,
            label: t("waterfall.programmed"),
            minutes: programmed_min,
            base: 0.0,
        }];
        let mut level = programmed_min;
        let mut deplete = |kind: BarKind, label: String, minutes: f64, bars: &mut Vec<WaterfallBar>| {
            level -= minutes;
            bars.push(WaterfallBar {
                kind,
                label,
                minutes: -minutes,
                base: level,
            });
        };

        for (cause, minutes) in &causes {
            deplete(BarKind::Stoppage, cause.clone(), *minutes, &mut bars);
        }
        if speed_loss_min > 0.0 {
            deplete(BarKind::SpeedLoss, t("waterfall.speed_loss"), speed_loss_min, &mut bars);
        }
        if defect_min > 0.0 {
            deplete(BarKind::Defects, t("waterfall.defects"), defect_min, &mut bars);
        }

        let effective_final_min = programmed_min
            - causes.iter().map(|(_, m)| m).sum::<f64>()
            - speed_loss_min
            - defect_min;
        bars.push(WaterfallBar {
            kind: BarKind::Effective,
            label: t("waterfall.effective"),
            minutes: effective_final_min,
            base: 0.0,
        });

        // ===== 7. OEE 净值 =====
        let oee_net_pct = if programmed_min > 0.0 {
            effective_final_min / programmed_min * 100.0
        } else {
            0.0
        };

        debug!(
            records = matching.len(),
            causes = causes.len(),
            oee_net_pct,
            "瀑布视图计算完成"
        );

        QueryOutcome::ready(WaterfallReport {
            selection: selection.clone(),
            record_count: matching.len(),
            available_min,
            programmed_min,
            maintenance_min,
            recorded_effective_min,
            speed_loss_min,
            defect_min,
            effective_final_min,
            oee_net_pct,
            bars,
        })
    }
}
