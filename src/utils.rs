use crate::error::Result;
use log::{error, info};
use std::fs;
use std::path::Path;

/// 日志记录工具
pub struct Logger;

impl Logger {
    /// 按 RUST_LOG 语法的过滤串初始化 env_logger，已初始化时返回 false
    pub fn init(filters: &str) -> bool {
        env_logger::Builder::new()
            .parse_filters(filters)
            .try_init()
            .is_ok()
    }

    pub fn log_operation_start(operation: &str, details: &str) {
        info!("🚀 Starting {}: {}", operation, details);
    }

    pub fn log_operation_success(operation: &str, details: &str) {
        info!("✅ {} completed successfully: {}", operation, details);
    }

    pub fn log_operation_failure(operation: &str, error: &str) {
        error!("❌ {} failed: {}", operation, error);
    }

    pub fn log_report_written(path: &Path, records: usize) {
        info!("📝 Report written: {} ({} records)", path.display(), records);
    }
}

/// 格式化工具
pub struct Formatter;

impl Formatter {
    /// 千位分隔、两位小数: 1234567.891 -> "1,234,567.89"
    pub fn format_amount(amount: f64) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// 文件工具
pub struct FileUtils;

impl FileUtils {
    /// 确保目录存在
    pub fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }
}
