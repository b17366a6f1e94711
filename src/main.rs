// ==========================================
// OEE 班次报表系统 - 驾驶舱命令行入口
// ==========================================
// 用法:
//   oee-dashboard <command> [key=value ...]
//
//   waterfall    line=L1 month=5 year=2025
//   pareto       line=L1 [window=ytd|week|month|6m|year|all]
//   trend        [lines=L1,L2] [granularity=day|week|month] [year=2025]
//   distribution [period=ytd|month|6m|year]
//   history      [line=] [shift=] [month=YYYY-MM] [supervisor=] [date=YYYY-MM-DD]
//   lines
//   init
//
// 通用参数: today=YYYY-MM-DD（默认本地日期）
// 路径: OEE_CONFIG_PATH / OEE_RECORDS_PATH / OEE_CATALOG_PATH
// 视图以 JSON 输出到 stdout
// ==========================================

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use oee_shift_report::config::{get_default_config_path, ConfigManager};
use oee_shift_report::domain::{DistributionPeriod, ParetoWindow, TrendGranularity};
use oee_shift_report::engine::{HistoryFilter, ParetoSelection, TrendSelection, WaterfallSelection};
use oee_shift_report::repository::ShiftRecordRepository;
use oee_shift_report::{logging, DashboardApi, APP_NAME, VERSION};
use serde::Serialize;

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "help".to_string());
    let options = parse_options(args)?;

    let config_path = get_default_config_path();
    let config = ConfigManager::load(&config_path)
        .map_err(|e| anyhow!("无法加载配置 {}: {}", config_path.display(), e))?;
    let today = match options.get("today") {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    tracing::info!(version = VERSION, command = %command, "{}", APP_NAME);

    let api = DashboardApi::from_config(&config);
    match command.as_str() {
        "waterfall" => {
            let selection = WaterfallSelection {
                line: required(&options, "line")?,
                month: optional_parse(&options, "month")?.unwrap_or_else(|| today.month()),
                year: optional_parse(&options, "year")?.unwrap_or_else(|| today.year()),
            };
            print_json(&api.waterfall(&selection))
        }
        "pareto" => {
            let selection = ParetoSelection {
                line: required(&options, "line")?,
                window: optional_parse::<ParetoWindow>(&options, "window")?.unwrap_or_default(),
            };
            print_json(&api.pareto(&selection, today))
        }
        "trend" => {
            let selection = TrendSelection {
                lines: options
                    .get("lines")
                    .map(|raw| {
                        raw.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
                granularity: optional_parse(&options, "granularity")?
                    .unwrap_or(TrendGranularity::Month),
                current_year: optional_parse(&options, "year")?,
            };
            print_json(&api.trend(&selection, today))
        }
        "distribution" => {
            let period: DistributionPeriod =
                optional_parse(&options, "period")?.unwrap_or_default();
            print_json(&api.distribution(period, today))
        }
        "history" => {
            let filter = HistoryFilter {
                line: options.get("line").cloned(),
                shift: options.get("shift").cloned(),
                month: options.get("month").cloned(),
                supervisor: options.get("supervisor").cloned(),
                date: options.get("date").map(|raw| parse_date(raw)).transpose()?,
            };
            print_json(&api.history(&filter))
        }
        "lines" => print_json(&api.list_lines()),
        "init" => {
            let repository = ShiftRecordRepository::new(config.records_path());
            repository
                .ensure_initialized()
                .with_context(|| format!("无法初始化记录文件 {}", repository.path().display()))?;
            println!("{}", repository.path().display());
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("未知命令: {}", other)
        }
    }
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<HashMap<String, String>> {
    let mut options = HashMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("参数格式应为 key=value: {}", arg))?;
        options.insert(key.trim().to_lowercase(), value.trim().to_string());
    }
    Ok(options)
}

fn required(options: &HashMap<String, String>, key: &str) -> Result<String> {
    options
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| anyhow!("缺少参数: {}", key))
}

fn optional_parse<T>(options: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    options
        .get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow!("参数 {} 无效 ({}): {}", key, raw, e))
        })
        .transpose()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("日期格式应为 YYYY-MM-DD: {}", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_usage() {
    eprintln!("{} v{}", APP_NAME, VERSION);
    eprintln!("usage: oee-dashboard <waterfall|pareto|trend|distribution|history|lines|init> [key=value ...]");
}
