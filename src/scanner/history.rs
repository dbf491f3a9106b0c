use futures::TryStreamExt;
use log::{debug, info};

use crate::error::Result;
use crate::models::{Conversation, ExpenseRecord, HistoryScan, NormalizedMessage};
use crate::parser::amount::AmountExtractor;
use crate::source::traits::MessageSource;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

#[derive(Clone, Debug)]
pub struct HistoryAggregator {
    extractor: AmountExtractor,
    progress_interval: usize,
}

impl HistoryAggregator {
    pub fn new(extractor: AmountExtractor) -> Self {
        Self {
            extractor,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// 找到第一个名称包含目标（不区分大小写）的会话
    pub async fn find_conversation<S>(&self, source: &S, group_name: &str) -> Result<Option<Conversation>>
    where
        S: MessageSource + ?Sized,
    {
        let needle = group_name.to_lowercase();
        let conversations = source.list_conversations().await?;
        debug!("Source listed {} conversations", conversations.len());

        Ok(conversations
            .into_iter()
            .find(|c| c.name.to_lowercase().contains(&needle)))
    }

    /// 读取会话的全部历史，找不到会话时返回空结果。来源的错误原样向上传递，不做重试。
    pub async fn scan<S>(&self, source: &S, group_name: &str) -> Result<HistoryScan>
    where
        S: MessageSource + ?Sized,
    {
        let conversation = match self.find_conversation(source, group_name).await? {
            Some(c) => c,
            None => {
                info!("Group '{group_name}' not found.");
                return Ok(HistoryScan::not_found());
            }
        };

        info!("Reading messages from '{}'...", conversation.name);

        let mut history = source.fetch_history(conversation.id).await?;
        let mut messages: Vec<NormalizedMessage> = Vec::new();
        let mut expenses: Vec<ExpenseRecord> = Vec::new();

        while let Some(raw) = history.try_next().await? {
            let message = NormalizedMessage::from_raw(&raw);
            let amounts = self.extractor.extract(raw.text.as_deref());

            if let Some(record) = ExpenseRecord::from_message(&message, amounts) {
                debug!("Message {} amounts: {:?}", record.id, record.amounts);
                expenses.push(record);
            }
            messages.push(message);

            if messages.len() % self.progress_interval == 0 {
                info!("  Read {} messages...", messages.len());
            }
        }

        info!(
            "Total: {} messages, {} expense records found.",
            messages.len(),
            expenses.len()
        );

        Ok(HistoryScan {
            conversation: Some(conversation),
            messages,
            expenses,
        })
    }
}

impl Default for HistoryAggregator {
    fn default() -> Self {
        Self::new(AmountExtractor::new())
    }
}
