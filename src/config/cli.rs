use clap::Parser;
use std::path::PathBuf;

use crate::config::settings::Settings;

/// 读取 Telegram 会话历史并提取其中的支出金额
#[derive(Debug, Parser)]
#[command(name = "expensebot", version)]
pub struct Cli {
    /// 会话名称（不区分大小写的子串匹配）
    pub group: Option<String>,

    /// Bot API token
    #[arg(long)]
    pub token: Option<String>,

    /// Telegram Desktop 导出的 result.json
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// 输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// 命令行参数覆盖环境变量
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(group) = self.group {
            settings.group_name = group;
        }
        if let Some(token) = self.token {
            settings.telegram_bot_token = Some(token);
        }
        if let Some(export) = self.export {
            settings.export_path = Some(export);
        }
        if let Some(output) = self.output {
            settings.output_dir = output;
        }
        settings
    }
}
