pub mod export;
pub mod telegram;
pub mod traits;

pub use export::ExportSource;
pub use telegram::BotUpdatesSource;
pub use traits::MessageSource;
