use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ExpenseBotError, Result};

/// 默认的货币标记（拉丁和西里尔字母的"格里夫纳"），按前缀匹配
pub const DEFAULT_CURRENCY_TOKENS: &[&str] = &["hrn", "grn", "uah", "грн", "грив"];

/// 默认的付款动词词干（оплатив / заплатила / перерахував / переказ ...）
pub const DEFAULT_PAYMENT_STEMS: &[&str] = &["оплат", "заплат", "перерахув", "переказ"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// 数字后紧跟货币标记: "12 000 грн"
    CurrencySuffix,
    /// 付款动词后的数字: "оплатив 15000"
    PaymentVerb,
    /// 四位以上的裸数字，可带1-2位小数
    BareNumber,
}

#[derive(Debug, Clone)]
pub struct MatchRule {
    pub kind: RuleKind,
    pub pattern: Regex,
}

impl MatchRule {
    /// 返回第一个捕获组的所有匹配
    pub fn candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AmountPatterns {
    pub rules: Vec<MatchRule>,
}

impl AmountPatterns {
    pub fn new() -> Self {
        // 默认词表都经过转义，编译不会失败
        Self::with_tokens(DEFAULT_CURRENCY_TOKENS, DEFAULT_PAYMENT_STEMS)
            .expect("default amount patterns must compile")
    }

    pub fn with_tokens<S: AsRef<str>>(currency_tokens: &[S], payment_stems: &[S]) -> Result<Self> {
        if currency_tokens.is_empty() || payment_stems.is_empty() {
            return Err(ExpenseBotError::Config(anyhow::anyhow!(
                "currency tokens and payment stems must not be empty"
            )));
        }

        let currency = alternation(currency_tokens, "");
        let stems = alternation(payment_stems, r"\w*");

        let rules = vec![
            MatchRule {
                kind: RuleKind::CurrencySuffix,
                pattern: Regex::new(&format!(r"(?i)(\d[\d\s]*\d)\s*(?:{currency})"))?,
            },
            MatchRule {
                kind: RuleKind::PaymentVerb,
                pattern: Regex::new(&format!(r"(?i)(?:{stems})\s*(\d[\d\s.,]*\d)"))?,
            },
            MatchRule {
                kind: RuleKind::BareNumber,
                pattern: Regex::new(r"(\d{4,}(?:[.,]\d{1,2})?)")?,
            },
        ];

        Ok(Self { rules })
    }

    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<AmountPatterns> = OnceLock::new();
        INSTANCE.get_or_init(AmountPatterns::new)
    }

    pub fn rule(&self, kind: RuleKind) -> Option<&MatchRule> {
        self.rules.iter().find(|rule| rule.kind == kind)
    }
}

impl Default for AmountPatterns {
    fn default() -> Self {
        Self::new()
    }
}

fn alternation<S: AsRef<str>>(tokens: &[S], suffix: &str) -> String {
    tokens
        .iter()
        .map(|t| format!("{}{suffix}", regex::escape(t.as_ref().trim())))
        .collect::<Vec<_>>()
        .join("|")
}
