use crate::error::Result;
use crate::parser::regex::AmountPatterns;
use log::debug;
use std::borrow::Cow;

pub const MIN_AMOUNT: f64 = 100.0;
pub const MAX_AMOUNT: f64 = 10_000_000.0;

/// 从任意文本中提取可能的金额
#[derive(Clone, Debug)]
pub struct AmountExtractor {
    patterns: Cow<'static, AmountPatterns>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            patterns: Cow::Borrowed(AmountPatterns::get_instance()),
        }
    }

    /// 使用自定义的货币标记和付款词干
    pub fn with_tokens<S: AsRef<str>>(currency_tokens: &[S], payment_stems: &[S]) -> Result<Self> {
        Ok(Self {
            patterns: Cow::Owned(AmountPatterns::with_tokens(currency_tokens, payment_stems)?),
        })
    }

    /// 三条规则独立执行、合并、去重，结果按升序排列
    pub fn extract(&self, text: Option<&str>) -> Vec<f64> {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => return Vec::new(),
        };

        let mut amounts: Vec<f64> = Vec::new();
        for rule in &self.patterns.rules {
            for candidate in rule.candidates(text) {
                match try_parse_amount(candidate) {
                    Some(value) => {
                        debug!("{:?} matched {candidate:?} -> {value}", rule.kind);
                        amounts.push(value);
                    }
                    None => debug!("{:?} skipped {candidate:?}", rule.kind),
                }
            }
        }

        amounts.sort_by(f64::total_cmp);
        amounts.dedup();
        amounts
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 去掉空白、逗号换成小数点后解析；解析失败或超出范围返回 None
pub fn try_parse_amount(candidate: &str) -> Option<f64> {
    let cleaned: String = candidate
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let value = cleaned.parse::<f64>().ok()?;
    (MIN_AMOUNT..=MAX_AMOUNT).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<f64> {
        AmountExtractor::new().extract(Some(text))
    }

    #[test]
    fn test_payment_with_currency() {
        let amounts = extract("Оплатив 15000 грн за матеріали");
        assert!(amounts.contains(&15000.0));
        assert_eq!(amounts, vec![15000.0]);
    }

    #[test]
    fn test_spaced_thousands() {
        assert!(extract("12 000 грн").contains(&12000.0));
    }

    #[test]
    fn test_time_is_not_an_amount() {
        assert!(extract("доброго дня, зустрінемось в 15:30").is_empty());
    }

    #[test]
    fn test_empty_and_missing_text() {
        let extractor = AmountExtractor::new();
        assert!(extractor.extract(Some("")).is_empty());
        assert!(extractor.extract(None).is_empty());
    }

    #[test]
    fn test_range_boundaries_inclusive() {
        assert_eq!(extract("100 грн"), vec![100.0]);
        assert_eq!(extract("10000000"), vec![10_000_000.0]);
        assert!(extract("99 грн").is_empty());
        assert!(extract("10000001").is_empty());
    }

    #[test]
    fn test_comma_decimal() {
        assert_eq!(extract("переказав 2500,50"), vec![2500.5]);
    }

    #[test]
    fn test_multiple_amounts_deduplicated() {
        let amounts = extract("500 грн і ще 500 грн, разом 1000 грн");
        assert_eq!(amounts, vec![500.0, 1000.0]);
    }

    #[test]
    fn test_unparseable_candidate_skipped() {
        // "1.500.00" 不是合法数字，整段被丢弃，也没有四位连续数字
        assert!(extract("оплатили 1.500.00").is_empty());
    }

    #[test]
    fn test_try_parse_amount() {
        assert_eq!(try_parse_amount("12 000"), Some(12000.0));
        assert_eq!(try_parse_amount("1234,56"), Some(1234.56));
        assert_eq!(try_parse_amount("1.2.3"), None);
        assert_eq!(try_parse_amount("50"), None);
        assert_eq!(try_parse_amount("20000000"), None);
    }

    #[test]
    fn test_results_are_sorted_and_in_range() {
        let samples = [
            "Рахунок №2024-0153 на 48 500 грн, оплатили 20 000",
            "тел. 0671234567, сума 3200",
            "uah 500, 700 UAH, 7000hrn",
            "1 2 3 4 5 6 7 8 9",
        ];
        let extractor = AmountExtractor::new();
        for text in samples {
            let amounts = extractor.extract(Some(text));
            for pair in amounts.windows(2) {
                assert!(pair[0] < pair[1], "not strictly increasing for {text:?}");
            }
            for value in &amounts {
                assert!((MIN_AMOUNT..=MAX_AMOUNT).contains(value));
            }
            // 同一输入多次提取结果一致
            assert_eq!(amounts, extractor.extract(Some(text)));
        }
    }

    #[test]
    fn test_custom_tokens() {
        let extractor = AmountExtractor::with_tokens(&["usd"], &["paid"]).unwrap();
        assert_eq!(extractor.extract(Some("paid 450 today")), vec![450.0]);
        assert_eq!(extractor.extract(Some("250 USD")), vec![250.0]);
        // 默认的西里尔标记不再生效，三位数也达不到裸数字规则
        assert!(extractor.extract(Some("250 грн")).is_empty());
    }

    #[test]
    fn test_rule_order_does_not_change_result() {
        let samples = [
            "Оплатив 15000 грн",
            "Рахунок №2024-0153 на 48 500 грн, оплатили 20 000",
            "переказав 2500,50 грн",
            "заплатила 12 000 грн, а не 1200",
        ];
        let default_order = AmountExtractor::new();

        // 规则的所有排列
        let permutations: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in permutations {
            let base = AmountPatterns::new();
            let rules = order.iter().map(|&i| base.rules[i].clone()).collect();
            let permuted = AmountExtractor {
                patterns: Cow::Owned(AmountPatterns { rules }),
            };

            for text in samples {
                assert_eq!(
                    permuted.extract(Some(text)),
                    default_order.extract(Some(text)),
                    "order {order:?} changed result for {text:?}"
                );
            }
        }
    }
}
