// 公开内部模块以便测试
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod source;
pub mod utils;

// 重新导出常用的类型和结构体
pub use config::{Cli, Settings, SourceKind};
pub use error::ExpenseBotError;
pub use models::{Conversation, ExpenseRecord, HistoryScan, NormalizedMessage, RawMessage, RawSender};
pub use parser::AmountExtractor;
pub use report::ReportWriter;
pub use scanner::HistoryAggregator;
pub use source::{BotUpdatesSource, ExportSource, MessageSource};
