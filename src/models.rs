use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 支出记录中保留的原文最大字符数
pub const EXCERPT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSender {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RawSender {
    /// 拼接非空的名和姓，都没有时退回到数字ID
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.id.to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// 消息源返回的原始消息
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub id: i64,
    pub date: Option<DateTime<Utc>>,
    pub text: Option<String>,
    pub sender: Option<RawSender>,
    pub media: Option<String>, // 媒体类型标签，例如 "photo"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub id: i64,
    pub date: Option<String>,
    pub sender: Option<String>,
    pub text: String,
    pub has_media: bool,
}

impl NormalizedMessage {
    pub fn from_raw(raw: &RawMessage) -> Self {
        Self {
            id: raw.id,
            date: raw
                .date
                .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            sender: raw.sender.as_ref().map(RawSender::display_name),
            text: raw.text.clone().unwrap_or_default(),
            has_media: raw.media.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub date: Option<String>,
    pub sender: Option<String>,
    pub amounts: Vec<f64>,
    pub text: String,
}

impl ExpenseRecord {
    /// 没有金额时不生成记录
    pub fn from_message(message: &NormalizedMessage, amounts: Vec<f64>) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }

        Some(Self {
            id: message.id,
            date: message.date.clone(),
            sender: message.sender.clone(),
            amounts,
            text: message.text.chars().take(EXCERPT_LIMIT).collect(),
        })
    }
}

/// 一次历史扫描的结果
#[derive(Debug, Clone, Default)]
pub struct HistoryScan {
    pub conversation: Option<Conversation>,
    pub messages: Vec<NormalizedMessage>,
    pub expenses: Vec<ExpenseRecord>,
}

impl HistoryScan {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.conversation.is_some()
    }

    pub fn total_amount(&self) -> f64 {
        self.expenses
            .iter()
            .flat_map(|e| e.amounts.iter())
            .sum()
    }
}
