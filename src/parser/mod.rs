pub mod amount;
pub mod regex;

pub use amount::{try_parse_amount, AmountExtractor};
pub use regex::{AmountPatterns, MatchRule, RuleKind};
