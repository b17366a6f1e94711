// ==========================================
// OEE 班次报表系统 - 班次记录仓储
// ==========================================
// 存储: 单个带表头的 CSV 文件,单写单读
// 写入: 按自然键 (日期, 班次, 生产线) upsert,先写临时文件再改名
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::{ShiftKey, ShiftRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_codec::{
    canonical_header, decode_row, encode_row, COL_DATE, COL_LINE, COL_SHIFT,
};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// upsert 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// 是否替换了已有行
    pub replaced: bool,
}

// 原始表: 表头 + 未解析行
struct RawTable {
    header: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RawTable {
    fn find_row(&self, key: &ShiftKey) -> Option<&StringRecord> {
        self.rows
            .iter()
            .find(|row| row_matches(&self.header, row, key))
    }
}

fn row_matches(header: &[String], row: &StringRecord, key: &ShiftKey) -> bool {
    let cell = |column: &str| {
        header
            .iter()
            .position(|h| h == column)
            .and_then(|idx| row.get(idx))
            .unwrap_or("")
    };
    key.matches_raw(cell(COL_DATE), cell(COL_SHIFT), cell(COL_LINE))
}

// ==========================================
// ShiftRecordRepository - 班次记录仓储
// ==========================================
pub struct ShiftRecordRepository {
    path: PathBuf,
}

impl ShiftRecordRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时创建仅含表头的空文件
    pub fn ensure_initialized(&self) -> RepositoryResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = WriterBuilder::new().from_path(&self.path)?;
        writer.write_record(canonical_header())?;
        writer.flush()?;
        info!(path = %self.path.display(), "记录文件已初始化");
        Ok(())
    }

    /// 读取全部记录（文件不存在视为空表；日期无法解析的行跳过）
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_all(&self) -> RepositoryResult<Vec<ShiftRecord>> {
        let table = self.read_table()?;
        let mut records = Vec::with_capacity(table.rows.len());
        let mut skipped = 0usize;

        for row in &table.rows {
            let cells: HashMap<&str, &str> = table
                .header
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect();
            match decode_row(&cells) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "跳过日期无法解析的记录行");
        }
        Ok(records)
    }

    /// 读取全部记录，失败时降级为空表并记录警告
    pub fn load_all_or_empty(&self) -> Vec<ShiftRecord> {
        match self.load_all() {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "记录文件读取失败，按无历史数据处理");
                Vec::new()
            }
        }
    }

    /// 是否已存在同一自然键的记录
    pub fn exists(&self, key: &ShiftKey) -> RepositoryResult<bool> {
        Ok(self.read_table()?.find_row(key).is_some())
    }

    /// 行指纹（乐观并发检查用）；无记录时为 None
    pub fn find_fingerprint(&self, key: &ShiftKey) -> RepositoryResult<Option<u64>> {
        Ok(self.read_table()?.find_row(key).map(fingerprint))
    }

    /// 按自然键 upsert（last write wins）
    #[instrument(skip(self, record), fields(key = %record.key()))]
    pub fn upsert(&self, record: &ShiftRecord) -> RepositoryResult<UpsertOutcome> {
        let table = self.read_table()?;
        self.write_upsert(table, record)
    }

    /// 带指纹检查的 upsert
    ///
    /// # 参数
    /// - expected: 读取时的行指纹（None 表示期望该键尚无记录）
    ///
    /// # 返回
    /// - Err(OptimisticLockFailure): 行在读取后被改写
    #[instrument(skip(self, record), fields(key = %record.key()))]
    pub fn upsert_checked(
        &self,
        record: &ShiftRecord,
        expected: Option<u64>,
    ) -> RepositoryResult<UpsertOutcome> {
        let key = record.key();
        let table = self.read_table()?;
        let actual = table.find_row(&key).map(fingerprint);
        if actual != expected {
            return Err(RepositoryError::OptimisticLockFailure {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        self.write_upsert(table, record)
    }

    // ===== 内部实现 =====

    fn read_table(&self) -> RepositoryResult<RawTable> {
        if !self.path.exists() {
            return Ok(RawTable {
                header: canonical_header(),
                rows: Vec::new(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(result?);
        }

        // 空文件: 使用标准表头
        let header = if header.iter().all(|h| h.is_empty()) {
            canonical_header()
        } else {
            header
        };
        Ok(RawTable { header, rows })
    }

    fn write_upsert(&self, table: RawTable, record: &ShiftRecord) -> RepositoryResult<UpsertOutcome> {
        let key = record.key();
        let RawTable { mut header, rows } = table;

        // 保留已有表头顺序，缺失的标准列追加到末尾
        for column in canonical_header() {
            if !header.contains(&column) {
                header.push(column);
            }
        }

        let before = rows.len();
        let kept: Vec<StringRecord> = rows
            .into_iter()
            .filter(|row| !row_matches(&header, row, &key))
            .collect();
        let replaced = kept.len() < before;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        {
            let mut writer = WriterBuilder::new().flexible(true).from_path(&tmp_path)?;
            writer.write_record(&header)?;
            for row in &kept {
                writer.write_record(row)?;
            }
            writer.write_record(encode_row(record, &header))?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        info!(
            key = %key,
            replaced,
            rows = kept.len() + 1,
            "班次记录已保存"
        );
        Ok(UpsertOutcome { replaced })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn fingerprint(row: &StringRecord) -> u64 {
    let mut hasher = DefaultHasher::new();
    for field in row.iter() {
        field.hash(&mut hasher);
    }
    hasher.finish()
}
