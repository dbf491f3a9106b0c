pub mod history;

pub use history::HistoryAggregator;
