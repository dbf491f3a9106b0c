use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use teloxide::{
    payloads::GetUpdatesSetters,
    requests::Requester,
    types::{Chat, MediaKind, Message, MessageKind, Update, UpdateKind},
    Bot,
};
use tokio::sync::Mutex;

use crate::error::{ExpenseBotError, Result};
use crate::models::{Conversation, RawMessage, RawSender};
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::source::traits::MessageSource;

/// 基于 Bot API 的消息源。
///
/// Bot API 没有历史接口，只能通过 getUpdates 取回服务器上尚未确认的更新，
/// 因此第一次访问时会把待处理的更新全部取回并缓存，之后按会话分组提供。
///
/// 读取时会用 offset 确认这些更新，服务器随即丢弃它们：再次运行或同一个
/// bot 的其他消费者都拿不到已读过的更新。
pub struct BotUpdatesSource {
    bot: Bot,
    retry: RetryConfig,
    buffered: Mutex<Option<Vec<Message>>>,
}

impl BotUpdatesSource {
    pub async fn connect(bot: Bot, retry: RetryConfig) -> Result<Self> {
        let me = bot.get_me().await?;
        info!(
            "✅ Logged in as: {} (@{})",
            me.user.first_name,
            me.user.username.as_deref().unwrap_or("N/A")
        );

        Ok(Self {
            bot,
            retry,
            buffered: Mutex::new(None),
        })
    }

    async fn drain_updates(&self) -> Result<Vec<Message>> {
        let mut offset: Option<i32> = None;
        let mut messages: Vec<Message> = Vec::new();

        loop {
            let bot = self.bot.clone();
            let batch: Vec<Update> = retry_with_backoff(
                || {
                    let bot = bot.clone();
                    async move {
                        let mut request = bot.get_updates().timeout(0);
                        if let Some(next) = offset {
                            request = request.offset(next);
                        }
                        Ok::<_, ExpenseBotError>(request.await?)
                    }
                },
                self.retry.clone(),
                "getUpdates",
            )
            .await?;

            if batch.is_empty() {
                break;
            }
            debug!("Received {} updates", batch.len());

            for update in batch {
                // 下一次请求带上 offset，服务器会确认之前的更新
                offset = Some(update.id + 1);
                match update.kind {
                    UpdateKind::Message(m) | UpdateKind::ChannelPost(m) => messages.push(m),
                    UpdateKind::EditedMessage(m) | UpdateKind::EditedChannelPost(m) => {
                        // 编辑过的消息替换原内容
                        match messages
                            .iter_mut()
                            .find(|old| old.id == m.id && old.chat.id == m.chat.id)
                        {
                            Some(old) => *old = m,
                            None => messages.push(m),
                        }
                    }
                    _ => {}
                }
            }
        }

        info!("📥 Buffered {} messages from pending updates", messages.len());
        Ok(messages)
    }

    async fn with_buffer<T>(&self, f: impl FnOnce(&[Message]) -> T) -> Result<T> {
        let mut buffered = self.buffered.lock().await;
        if buffered.is_none() {
            *buffered = Some(self.drain_updates().await?);
        }
        Ok(f(buffered.as_deref().unwrap_or_default()))
    }
}

#[async_trait]
impl MessageSource for BotUpdatesSource {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.with_buffer(|messages| {
            let mut conversations: Vec<Conversation> = Vec::new();
            for message in messages {
                if conversations.iter().all(|c| c.id != message.chat.id.0) {
                    conversations.push(Conversation {
                        id: message.chat.id.0,
                        name: chat_name(&message.chat),
                    });
                }
            }
            conversations
        })
        .await
    }

    async fn fetch_history(
        &self,
        conversation_id: i64,
    ) -> Result<BoxStream<'static, Result<RawMessage>>> {
        let history: Vec<RawMessage> = self
            .with_buffer(|messages| {
                messages
                    .iter()
                    .rev()
                    .filter(|m| m.chat.id.0 == conversation_id)
                    .map(to_raw)
                    .collect()
            })
            .await?;

        Ok(stream::iter(history.into_iter().map(Ok)).boxed())
    }
}

fn chat_name(chat: &Chat) -> String {
    if let Some(title) = chat.title() {
        return title.to_string();
    }

    let parts: Vec<&str> = [chat.first_name(), chat.last_name()]
        .into_iter()
        .flatten()
        .collect();
    if !parts.is_empty() {
        return parts.join(" ");
    }

    chat.username().unwrap_or_default().to_string()
}

fn to_raw(message: &Message) -> RawMessage {
    // 匿名管理员和频道消息的发送者是 sender_chat，没有个人姓名，只保留 id
    let sender = match (message.sender_chat(), message.from()) {
        (Some(chat), _) => Some(RawSender {
            id: chat.id.0,
            first_name: None,
            last_name: None,
        }),
        (None, Some(user)) => Some(RawSender {
            id: user.id.0 as i64,
            first_name: Some(user.first_name.clone()),
            last_name: user.last_name.clone(),
        }),
        (None, None) => None,
    };

    RawMessage {
        id: message.id.0 as i64,
        date: Some(message.date),
        text: message
            .text()
            .or_else(|| message.caption())
            .map(str::to_string),
        sender,
        media: media_label(message),
    }
}

fn media_label(message: &Message) -> Option<String> {
    let common = match &message.kind {
        MessageKind::Common(common) => common,
        _ => return None,
    };

    let label = match &common.media_kind {
        MediaKind::Text(_) => return None,
        MediaKind::Photo(_) => "photo",
        MediaKind::Document(_) => "document",
        MediaKind::Video(_) => "video",
        MediaKind::Audio(_) => "audio",
        MediaKind::Voice(_) => "voice",
        MediaKind::Sticker(_) => "sticker",
        _ => "other",
    };
    Some(label.to_string())
}
