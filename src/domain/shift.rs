// ==========================================
// OEE 班次报表系统 - 班次记录领域模型
// ==========================================
// 自然键: (日期, 班次, 生产线)
// 不变量: effective + non_conforming + to_justify == programmed (± 容差)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ShiftKey - 班次自然键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftKey {
    pub date: NaiveDate,
    pub shift: String,
    pub line: String,
}

impl ShiftKey {
    pub fn new(date: NaiveDate, shift: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            date,
            shift: shift.into(),
            line: line.into(),
        }
    }

    /// 与原始行的三个键列比对（日期取前 10 位按 YYYY-MM-DD 文本比较）
    pub fn matches_raw(&self, date: &str, shift: &str, line: &str) -> bool {
        let date = date.trim();
        let date = date.get(..10).unwrap_or(date);
        date == self.date.format("%Y-%m-%d").to_string()
            && shift.trim() == self.shift
            && line.trim() == self.line
    }
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.date, self.shift, self.line)
    }
}

// ==========================================
// ProducedItem - 产出条目
// ==========================================
// 标准产量在加入时从目录复制,之后不随目录变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedItem {
    pub code: String,
    pub standard_rate: u32,
    pub actual_units: u32,    // 合格产量
    pub defective_units: u32, // 不合格产量
}

impl ProducedItem {
    pub fn new(code: impl Into<String>, standard_rate: u32) -> Self {
        Self {
            code: code.into(),
            standard_rate,
            actual_units: 0,
            defective_units: 0,
        }
    }
}

// ==========================================
// Stoppage - 非计划停机
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stoppage {
    pub cause: String,
    pub subcause: String,
    pub minutes: u32,
}

impl Stoppage {
    pub fn new(cause: impl Into<String>, subcause: impl Into<String>, minutes: u32) -> Self {
        Self {
            cause: cause.into(),
            subcause: subcause.into(),
            minutes,
        }
    }
}

// ==========================================
// TimeBuckets - 时间分桶
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeBuckets {
    pub effective_min: f64,      // 有效时间
    pub non_conforming_min: f64, // 不合格品时间
    pub to_justify_min: u32,     // 待解释时间 (取整, >= 0)
}

impl TimeBuckets {
    pub fn total(&self) -> f64 {
        self.effective_min + self.non_conforming_min + self.to_justify_min as f64
    }

    /// 与计划时间的偏差绝对值
    pub fn coherence_gap(&self, programmed_min: f64) -> f64 {
        (self.total() - programmed_min).abs()
    }

    pub fn is_coherent(&self, programmed_min: f64, tolerance_min: f64) -> bool {
        self.coherence_gap(programmed_min) <= tolerance_min
    }
}

// ==========================================
// ShiftRecord - 记录文件中的一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    // ===== 自然键 =====
    pub date: NaiveDate,
    pub shift: String,
    pub line: String,

    pub supervisor: String,

    // ===== 时间 (分钟) =====
    pub available_min: f64,
    pub programmed_min: f64,
    pub effective_min: f64,
    pub non_conforming_min: f64,
    pub to_justify_min: f64,

    // ===== 产出 =====
    pub product_codes: Vec<String>,
    pub actual_units: u64,
    pub defective_units: u64,

    // ===== 停机 (最多 10 条) =====
    pub stoppages: Vec<Stoppage>,
}

impl ShiftRecord {
    pub fn key(&self) -> ShiftKey {
        ShiftKey::new(self.date, self.shift.clone(), self.line.clone())
    }

    /// 单条记录 OEE 净值 (%)，计划时间为 0 时返回 0
    pub fn oee_net_pct(&self) -> f64 {
        if self.programmed_min > 0.0 {
            self.effective_min / self.programmed_min * 100.0
        } else {
            0.0
        }
    }

    pub fn total_stoppage_min(&self) -> u64 {
        self.stoppages.iter().map(|s| s.minutes as u64).sum()
    }
}
