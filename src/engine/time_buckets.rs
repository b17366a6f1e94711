// ==========================================
// OEE 班次报表系统 - 时间分桶推导
// ==========================================
// effective      = Σ (合格量 / 标准产量) × 标准班时长
// non_conforming = Σ (不合格量 / 标准产量) × 标准班时长
// to_justify     = max(0, round(计划 - effective - non_conforming))，.5 取偶
// 纯函数: 不修改任何状态,一致性由调用方另行校验
// ==========================================

use crate::domain::{ProducedItem, TimeBuckets};

pub fn derive_time_buckets(
    programmed_min: f64,
    items: &[ProducedItem],
    standard_shift_min: f64,
) -> TimeBuckets {
    if programmed_min <= 0.0 {
        return TimeBuckets::default();
    }

    let mut effective_min = 0.0;
    let mut non_conforming_min = 0.0;
    for item in items.iter().filter(|i| i.standard_rate > 0) {
        let rate = item.standard_rate as f64;
        effective_min += item.actual_units as f64 / rate * standard_shift_min;
        non_conforming_min += item.defective_units as f64 / rate * standard_shift_min;
    }

    let remainder = (programmed_min - effective_min - non_conforming_min).round_ties_even();
    TimeBuckets {
        effective_min,
        non_conforming_min,
        to_justify_min: if remainder > 0.0 { remainder as u32 } else { 0 },
    }
}
