// ==========================================
// OEE 班次报表系统 - 记录文件行编解码
// ==========================================
// 格式: 12 个基础列 + 10 组 (原因, 子原因, 分钟) 停机槽位
// 读取宽松: "100.0" 形式的数值、空单元格均可接受
// ==========================================

use crate::config::STOPPAGE_SLOTS;
use crate::domain::{ShiftRecord, Stoppage};
use chrono::NaiveDate;
use std::collections::HashMap;

// ===== 基础列 =====
pub const COL_DATE: &str = "fecha";
pub const COL_SHIFT: &str = "turno";
pub const COL_SUPERVISOR: &str = "supervisor";
pub const COL_LINE: &str = "linea_produccion";
pub const COL_AVAILABLE: &str = "tiempo_disponible_min";
pub const COL_PROGRAMMED: &str = "tiempo_programado_min";
pub const COL_PRODUCTS: &str = "producto_terminado";
pub const COL_ACTUAL: &str = "produccion_real_unidades";
pub const COL_DEFECTIVE: &str = "produccion_defectuosa_unidades";
pub const COL_EFFECTIVE: &str = "tiempo_efectivo_min";
pub const COL_NON_CONFORMING: &str = "tiempo_no_conformidad_min";
pub const COL_TO_JUSTIFY: &str = "tiempo_a_justificar_min";

const BASE_COLUMNS: [&str; 12] = [
    COL_DATE,
    COL_SHIFT,
    COL_SUPERVISOR,
    COL_LINE,
    COL_AVAILABLE,
    COL_PROGRAMMED,
    COL_PRODUCTS,
    COL_ACTUAL,
    COL_DEFECTIVE,
    COL_EFFECTIVE,
    COL_NON_CONFORMING,
    COL_TO_JUSTIFY,
];

/// 产品代码分隔符
const PRODUCT_SEPARATOR: &str = ", ";

pub fn cause_column(slot: usize) -> String {
    format!("paro_causal_{}", slot)
}

pub fn subcause_column(slot: usize) -> String {
    format!("paro_subcausal_{}", slot)
}

pub fn minutes_column(slot: usize) -> String {
    format!("tiempo_paro_min_{}", slot)
}

/// 标准表头（42 列）
pub fn canonical_header() -> Vec<String> {
    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for slot in 1..=STOPPAGE_SLOTS {
        header.push(cause_column(slot));
        header.push(subcause_column(slot));
        header.push(minutes_column(slot));
    }
    header
}

/// 数值输出: 整数不带小数位
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

// ==========================================
// 编码: ShiftRecord → 列名 → 文本
// ==========================================
pub fn encode_record(record: &ShiftRecord) -> HashMap<String, String> {
    let mut cells = HashMap::new();
    cells.insert(COL_DATE.to_string(), record.date.format("%Y-%m-%d").to_string());
    cells.insert(COL_SHIFT.to_string(), record.shift.clone());
    cells.insert(COL_SUPERVISOR.to_string(), record.supervisor.clone());
    cells.insert(COL_LINE.to_string(), record.line.clone());
    cells.insert(COL_AVAILABLE.to_string(), format_number(record.available_min));
    cells.insert(COL_PROGRAMMED.to_string(), format_number(record.programmed_min));
    cells.insert(COL_PRODUCTS.to_string(), record.product_codes.join(PRODUCT_SEPARATOR));
    cells.insert(COL_ACTUAL.to_string(), record.actual_units.to_string());
    cells.insert(COL_DEFECTIVE.to_string(), record.defective_units.to_string());
    cells.insert(COL_EFFECTIVE.to_string(), format_number(record.effective_min));
    cells.insert(
        COL_NON_CONFORMING.to_string(),
        format_number(record.non_conforming_min),
    );
    cells.insert(COL_TO_JUSTIFY.to_string(), format_number(record.to_justify_min));

    // 不足 10 条时以空字符串补齐
    for slot in 1..=STOPPAGE_SLOTS {
        let (cause, subcause, minutes) = match record.stoppages.get(slot - 1) {
            Some(s) => (s.cause.clone(), s.subcause.clone(), s.minutes.to_string()),
            None => (String::new(), String::new(), String::new()),
        };
        cells.insert(cause_column(slot), cause);
        cells.insert(subcause_column(slot), subcause);
        cells.insert(minutes_column(slot), minutes);
    }
    cells
}

/// 按给定表头顺序输出一行
pub fn encode_row(record: &ShiftRecord, header: &[String]) -> Vec<String> {
    let mut cells = encode_record(record);
    header
        .iter()
        .map(|column| cells.remove(column).unwrap_or_default())
        .collect()
}

// ==========================================
// 解码: 列名 → 文本 → ShiftRecord
// ==========================================

/// 解析日期（接受 "YYYY-MM-DD" 及带时间后缀的形式）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// 宽松数值解析: 空值/非法值 → None
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_units(raw: &str) -> u64 {
    parse_number(raw)
        .map(|v| if v > 0.0 { v.round() as u64 } else { 0 })
        .unwrap_or(0)
}

/// 单行解码；日期无法解析时返回 None
pub fn decode_row(row: &HashMap<&str, &str>) -> Option<ShiftRecord> {
    let text = |column: &str| row.get(column).map(|v| v.trim()).unwrap_or("");
    let number = |column: &str| parse_number(text(column)).unwrap_or(0.0);

    let date = parse_date(text(COL_DATE))?;

    let product_codes = text(COL_PRODUCTS)
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();

    // 原因与分钟均非空的槽位才计入
    let mut stoppages = Vec::new();
    for slot in 1..=STOPPAGE_SLOTS {
        let cause = text(&cause_column(slot));
        let minutes = match parse_number(text(&minutes_column(slot))) {
            Some(minutes) => minutes,
            None => continue,
        };
        if cause.is_empty() {
            continue;
        }
        stoppages.push(Stoppage::new(
            cause,
            text(&subcause_column(slot)),
            if minutes > 0.0 { minutes.round() as u32 } else { 0 },
        ));
    }

    Some(ShiftRecord {
        date,
        shift: text(COL_SHIFT).to_string(),
        line: text(COL_LINE).to_string(),
        supervisor: text(COL_SUPERVISOR).to_string(),
        available_min: number(COL_AVAILABLE),
        programmed_min: number(COL_PROGRAMMED),
        effective_min: number(COL_EFFECTIVE),
        non_conforming_min: number(COL_NON_CONFORMING),
        to_justify_min: number(COL_TO_JUSTIFY),
        product_codes,
        actual_units: parse_units(text(COL_ACTUAL)),
        defective_units: parse_units(text(COL_DEFECTIVE)),
        stoppages,
    })
}
