// ==========================================
// OEE 班次报表系统 - 业务规则常量
// ==========================================
// 原系统中散落的魔法常量集中于此,可由配置覆写
// ==========================================

use serde::{Deserialize, Serialize};

/// 记录文件中固定的停机槽位数
pub const STOPPAGE_SLOTS: usize = 10;

// ==========================================
// OeeRules - 规则参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OeeRules {
    /// 标准班时长（标准产量的分母，分钟）
    pub standard_shift_min: f64,
    /// 时间分桶一致性容差（分钟）
    pub coherence_tolerance_min: f64,
    /// 单班停机条数上限（不超过 STOPPAGE_SLOTS）
    pub max_stoppages: usize,
    /// 保存前要求停机时间覆盖待解释时间
    pub require_full_justification: bool,
    /// 帕累托 Vital 阈值（累计占比 <= 该值）
    pub pareto_vital_threshold_pct: f64,
    /// 趋势参考带下限
    pub trend_lower_band_pct: f64,
    /// 趋势参考带上限
    pub trend_upper_band_pct: f64,
    /// 分布直方图分箱数
    pub histogram_bins: usize,
    /// 速度损失标签（小写,子串匹配）
    pub speed_loss_labels: Vec<String>,
}

impl Default for OeeRules {
    fn default() -> Self {
        Self {
            standard_shift_min: 480.0,
            coherence_tolerance_min: 1.0,
            max_stoppages: STOPPAGE_SLOTS,
            require_full_justification: true,
            pareto_vital_threshold_pct: 80.0,
            trend_lower_band_pct: 70.0,
            trend_upper_band_pct: 85.0,
            histogram_bins: 15,
            speed_loss_labels: vec![
                "pérdida de velocidad".to_string(),
                "perdida de velocidad".to_string(),
            ],
        }
    }
}

impl OeeRules {
    /// 是否为速度损失原因（大小写不敏感）
    pub fn is_speed_loss(&self, cause: &str) -> bool {
        let lowered = cause.to_lowercase();
        self.speed_loss_labels
            .iter()
            .any(|label| lowered.contains(label.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_loss_matching() {
        let rules = OeeRules::default();
        assert!(rules.is_speed_loss("Perdida de velocidad"));
        assert!(rules.is_speed_loss("PÉRDIDA DE VELOCIDAD"));
        assert!(rules.is_speed_loss("Pérdida de velocidad - linea 2"));
        assert!(!rules.is_speed_loss("Falla de equipo"));
    }
}
