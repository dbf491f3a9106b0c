use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::parser::regex::{DEFAULT_CURRENCY_TOKENS, DEFAULT_PAYMENT_STEMS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Telegram Desktop 导出的 result.json
    Export(PathBuf),
    /// Bot API 待处理更新
    Bot(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub telegram_bot_token: Option<String>,
    pub export_path: Option<PathBuf>,
    pub group_name: String,
    pub output_dir: PathBuf,
    pub progress_interval: usize,
    pub currency_tokens: Vec<String>,
    pub payment_stems: Vec<String>,
    pub max_retry_attempts: u32,
    pub log_level: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let defaults = Settings::default();

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let export_path = env::var("TELEGRAM_EXPORT").ok().map(PathBuf::from);

        let group_name = env::var("GROUP_NAME").unwrap_or_default();

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let progress_interval = match env::var("PROGRESS_INTERVAL") {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|_| anyhow!("PROGRESS_INTERVAL must be a positive integer"))?,
            Err(_) => defaults.progress_interval,
        };

        let currency_tokens = env::var("CURRENCY_TOKENS")
            .map(|value| split_list(&value))
            .unwrap_or(defaults.currency_tokens);

        let payment_stems = env::var("PAYMENT_STEMS")
            .map(|value| split_list(&value))
            .unwrap_or(defaults.payment_stems);

        let max_retry_attempts = env::var("MAX_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .unwrap_or(3);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Settings {
            telegram_bot_token,
            export_path,
            group_name,
            output_dir,
            progress_interval,
            currency_tokens,
            payment_stems,
            max_retry_attempts,
            log_level,
        })
    }

    /// 导出文件优先于 Bot API
    pub fn source(&self) -> Result<SourceKind> {
        if let Some(path) = &self.export_path {
            return Ok(SourceKind::Export(path.clone()));
        }
        match &self.telegram_bot_token {
            Some(token) => Ok(SourceKind::Bot(token.clone())),
            None => Err(anyhow!(
                "Either TELEGRAM_EXPORT or TELEGRAM_BOT_TOKEN must be set"
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_name.trim().is_empty() {
            return Err(anyhow!("Group name cannot be empty"));
        }

        self.source()?;

        if self.progress_interval == 0 {
            return Err(anyhow!("Progress interval must be greater than 0"));
        }

        if self.max_retry_attempts == 0 {
            return Err(anyhow!("Max retry attempts must be greater than 0"));
        }

        if self.currency_tokens.is_empty() || self.payment_stems.is_empty() {
            return Err(anyhow!("Currency tokens and payment stems cannot be empty"));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            telegram_bot_token: None,
            export_path: None,
            group_name: String::new(),
            output_dir: PathBuf::from("output"),
            progress_interval: 100,
            currency_tokens: DEFAULT_CURRENCY_TOKENS.iter().map(|s| s.to_string()).collect(),
            payment_stems: DEFAULT_PAYMENT_STEMS.iter().map(|s| s.to_string()).collect(),
            max_retry_attempts: 3,
            log_level: "info".to_string(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_EXPORT",
        "GROUP_NAME",
        "OUTPUT_DIR",
        "PROGRESS_INTERVAL",
        "CURRENCY_TOKENS",
        "PAYMENT_STEMS",
        "MAX_RETRY_ATTEMPTS",
        "RUST_LOG",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let settings = Settings::new().unwrap();
        assert_eq!(settings.telegram_bot_token, None);
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.progress_interval, 100);
        assert_eq!(settings.currency_tokens.len(), DEFAULT_CURRENCY_TOKENS.len());
        assert_eq!(settings.log_level, "info");
        // 没有会话名也没有消息源
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("GROUP_NAME", "Будівництво");
        env::set_var("OUTPUT_DIR", "/tmp/reports");
        env::set_var("PROGRESS_INTERVAL", "25");
        env::set_var("CURRENCY_TOKENS", "usd, $ ,, eur");
        env::set_var("RUST_LOG", "expensebot=debug");

        let settings = Settings::new().unwrap();
        clear_env();

        assert_eq!(settings.group_name, "Будівництво");
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(settings.progress_interval, 25);
        assert_eq!(settings.currency_tokens, vec!["usd", "$", "eur"]);
        assert_eq!(settings.log_level, "expensebot=debug");
        assert_eq!(settings.source().unwrap(), SourceKind::Bot("123:abc".to_string()));
        assert!(settings.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_invalid_progress_interval() {
        clear_env();
        env::set_var("PROGRESS_INTERVAL", "often");
        let result = Settings::new();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_export_takes_precedence() {
        let settings = Settings {
            telegram_bot_token: Some("123:abc".to_string()),
            export_path: Some(PathBuf::from("result.json")),
            group_name: "дім".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.source().unwrap(),
            SourceKind::Export(PathBuf::from("result.json"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let base = Settings {
            export_path: Some(PathBuf::from("result.json")),
            group_name: "дім".to_string(),
            ..Settings::default()
        };
        assert!(base.validate().is_ok());

        let zero_interval = Settings {
            progress_interval: 0,
            ..base.clone()
        };
        assert!(zero_interval.validate().is_err());

        let no_stems = Settings {
            payment_stems: Vec::new(),
            ..base.clone()
        };
        assert!(no_stems.validate().is_err());

        let blank_group = Settings {
            group_name: "   ".to_string(),
            ..base
        };
        assert!(blank_group.validate().is_err());
    }
}
