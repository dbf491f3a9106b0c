use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::HistoryScan;
use crate::utils::{FileUtils, Formatter, Logger};

pub const MESSAGES_FILE: &str = "messages.json";
pub const EXPENSES_FILE: &str = "expenses.json";

/// 把扫描结果写成 messages.json 和 expenses.json
#[derive(Clone, Debug)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn messages_path(&self) -> PathBuf {
        self.output_dir.join(MESSAGES_FILE)
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.output_dir.join(EXPENSES_FILE)
    }

    pub fn write(&self, scan: &HistoryScan) -> Result<()> {
        FileUtils::ensure_dir_exists(&self.output_dir)?;

        write_json(&self.messages_path(), &scan.messages)?;
        Logger::log_report_written(&self.messages_path(), scan.messages.len());

        write_json(&self.expenses_path(), &scan.expenses)?;
        Logger::log_report_written(&self.expenses_path(), scan.expenses.len());

        Ok(())
    }

    /// 有支出记录时返回汇总行
    pub fn summary_line(scan: &HistoryScan) -> Option<String> {
        if scan.expenses.is_empty() {
            return None;
        }
        Some(format!(
            "Total expenses found: {}",
            Formatter::format_amount(scan.total_amount())
        ))
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
