use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::models::{Conversation, RawMessage};

/// 消息历史的来源，抽象出具体的传输和鉴权，测试时可替换为mock
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// 列出可见的会话，顺序由来源决定
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    /// 拉取会话的全部历史，从新到旧
    async fn fetch_history(
        &self,
        conversation_id: i64,
    ) -> Result<BoxStream<'static, Result<RawMessage>>>;
}
