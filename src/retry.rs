use crate::error::Result;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::sleep;

#[cfg(test)]
use crate::error::ExpenseBotError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;

    loop {
        debug!(
            "Attempting operation '{}' (attempt {}/{})",
            operation_name, attempt, config.max_attempts
        );

        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("Operation '{operation_name}' succeeded on attempt {attempt}");
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        warn!("Operation '{operation_name}' failed on attempt {attempt}: {error}");

        // 检查错误是否可重试
        if !error.is_retryable() {
            warn!("Error is not retryable, stopping attempts");
            return Err(error);
        }

        if attempt >= config.max_attempts {
            warn!(
                "Operation '{}' failed after {} attempts: {}",
                operation_name, config.max_attempts, error
            );
            return Err(error);
        }

        debug!("Waiting {delay:?} before next attempt");
        sleep(delay).await;

        // 指数退避
        delay = std::cmp::min(
            Duration::from_millis((delay.as_millis() as f64 * config.backoff_multiplier) as u64),
            config.max_delay,
        );
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        }
    }

    fn timed_out() -> ExpenseBotError {
        ExpenseBotError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "Temporary error",
        ))
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        let operation = || {
            let counter = counter_clone.clone();
            async move {
                let mut count = counter.lock().unwrap();
                *count += 1;

                if *count == 1 {
                    Err(timed_out())
                } else {
                    Ok("success")
                }
            }
        };

        let result = retry_with_backoff(operation, fast_config(3), "test_operation").await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*counter.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        let operation = || {
            let counter = counter_clone.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Err::<(), _>(timed_out())
            }
        };

        let result = retry_with_backoff(operation, fast_config(3), "test_operation").await;

        assert!(result.is_err());
        assert_eq!(*counter.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_retry_non_retryable_error() {
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        let operation = || {
            let counter = counter_clone.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Err::<(), _>(ExpenseBotError::malformed_export("Non-retryable error"))
            }
        };

        let result = retry_with_backoff(operation, fast_config(3), "test_operation").await;

        assert!(result.is_err());
        // 应该立即失败，不重试
        assert_eq!(*counter.lock().unwrap(), 1);
    }

    #[test]
    fn test_with_attempts_never_zero() {
        assert_eq!(RetryConfig::with_attempts(0).max_attempts, 1);
        assert_eq!(RetryConfig::with_attempts(5).max_attempts, 5);
    }
}
