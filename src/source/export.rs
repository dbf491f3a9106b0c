//! Telegram Desktop 导出文件 (`result.json`) 作为离线消息源。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

use crate::error::{ExpenseBotError, Result};
use crate::models::{Conversation, RawMessage, RawSender};
use crate::source::traits::MessageSource;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportFile {
    // 完整导出: { "chats": { "list": [...] } }
    Full { chats: ChatList },
    // 单个会话导出
    Single(ExportChat),
}

#[derive(Debug, Deserialize)]
struct ChatList {
    #[serde(default)]
    list: Vec<ExportChat>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExportChat {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    messages: Vec<ExportMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExportMessage {
    id: i64,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    date_unixtime: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    from_id: Option<String>,
    #[serde(default)]
    text: ExportText,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    poll: Option<serde_json::Value>,
    #[serde(default)]
    location_information: Option<serde_json::Value>,
    #[serde(default)]
    contact_information: Option<serde_json::Value>,
}

/// 文本可能是字符串，也可能是字符串和实体片段的数组
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ExportText {
    Plain(String),
    Rich(Vec<TextFragment>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TextFragment {
    Plain(String),
    Entity { text: String },
}

impl Default for ExportText {
    fn default() -> Self {
        ExportText::Plain(String::new())
    }
}

impl ExportText {
    fn flatten(&self) -> String {
        match self {
            ExportText::Plain(s) => s.clone(),
            ExportText::Rich(parts) => parts
                .iter()
                .map(|part| match part {
                    TextFragment::Plain(s) => s.as_str(),
                    TextFragment::Entity { text } => text.as_str(),
                })
                .collect(),
        }
    }
}

impl ExportMessage {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self
            .date_unixtime
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Utc.timestamp_opt(secs, 0).single();
        }

        let naive = NaiveDateTime::parse_from_str(self.date.as_deref()?, "%Y-%m-%dT%H:%M:%S").ok()?;
        Some(Utc.from_utc_datetime(&naive))
    }

    fn sender(&self) -> Option<RawSender> {
        // from_id 形如 "user123456" 或 "channel777"
        let id = self
            .from_id
            .as_deref()
            .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
            .and_then(|digits| digits.parse::<i64>().ok());

        if self.from.is_none() && id.is_none() {
            return None;
        }

        // 频道发言时 from 是频道标题，不是姓名
        let is_channel = self
            .from_id
            .as_deref()
            .is_some_and(|raw| raw.starts_with("channel"));

        Some(RawSender {
            id: id.unwrap_or_default(),
            first_name: if is_channel { None } else { self.from.clone() },
            last_name: None,
        })
    }

    fn media(&self) -> Option<String> {
        let label = if self.photo.is_some() {
            "photo"
        } else if let Some(kind) = &self.media_type {
            return Some(kind.clone());
        } else if self.file.is_some() {
            "file"
        } else if self.poll.is_some() {
            "poll"
        } else if self.location_information.is_some() {
            "location"
        } else if self.contact_information.is_some() {
            "contact"
        } else {
            return None;
        };
        Some(label.to_string())
    }

    fn into_raw(self) -> RawMessage {
        let text = self.text.flatten();
        RawMessage {
            id: self.id,
            date: self.timestamp(),
            sender: self.sender(),
            media: self.media(),
            text: (!text.is_empty()).then_some(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSource {
    chats: Vec<ExportChat>,
}

impl ExportSource {
    pub async fn open(path: &Path) -> Result<Self> {
        info!("📂 Reading Telegram export: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let chats = match serde_json::from_str::<ExportFile>(content) {
            Ok(ExportFile::Full { chats }) => chats.list,
            Ok(ExportFile::Single(chat)) => vec![chat],
            Err(e) => {
                return Err(ExpenseBotError::malformed_export(format!(
                    "not a Telegram chat export: {e}"
                )))
            }
        };

        debug!("Export contains {} chats", chats.len());
        Ok(Self { chats })
    }
}

#[async_trait]
impl MessageSource for ExportSource {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self
            .chats
            .iter()
            .map(|chat| Conversation {
                id: chat.id,
                name: chat.name.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_history(
        &self,
        conversation_id: i64,
    ) -> Result<BoxStream<'static, Result<RawMessage>>> {
        let chat = self
            .chats
            .iter()
            .find(|chat| chat.id == conversation_id)
            .ok_or(ExpenseBotError::UnknownConversation { id: conversation_id })?;

        // 导出文件按时间正序，这里反转为从新到旧
        let messages: Vec<ExportMessage> = chat.messages.iter().rev().cloned().collect();
        Ok(stream::iter(messages.into_iter().map(|m| Ok(m.into_raw()))).boxed())
    }
}
