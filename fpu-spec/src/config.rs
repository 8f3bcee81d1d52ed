//! # Coprocessor Configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Longest accepted yield between poll-loop iterations
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime configuration for one coprocessor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoprocessorConfig {
    /// Sleep between poll-loop iterations (zero means busy polling)
    pub poll_interval: Duration,

    /// Count unsupported transaction shapes as protocol violations and log them at `warn`
    pub strict_protocol: bool,

    /// Stop `run` after this many handled transactions
    pub max_transactions_per_run: Option<u64>,
}

impl CoprocessorConfig {
    /// 1 ms poll interval, strict protocol, unbounded run
    pub const DEFAULT: Self = Self {
        poll_interval: Duration::from_millis(1),
        strict_protocol: true,
        max_transactions_per_run: None,
    };

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(ConfigError::PollIntervalTooLong(self.poll_interval));
        }
        if self.max_transactions_per_run == Some(0) {
            return Err(ConfigError::ZeroTransactionBudget);
        }
        Ok(())
    }
}

impl Default for CoprocessorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CoprocessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CoprocessorConfig {{ poll: {:?}, strict: {}, budget: ",
            self.poll_interval, self.strict_protocol
        )?;
        match self.max_transactions_per_run {
            Some(limit) => write!(f, "{} }}", limit),
            None => write!(f, "unbounded }}"),
        }
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("poll interval {0:?} exceeds 1s")]
    PollIntervalTooLong(Duration),

    #[error("transaction budget must be at least 1")]
    ZeroTransactionBudget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoprocessorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert!(config.strict_protocol);
        assert_eq!(config.max_transactions_per_run, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let busy_poll = CoprocessorConfig {
            poll_interval: Duration::ZERO,
            ..CoprocessorConfig::DEFAULT
        };
        assert!(busy_poll.validate().is_ok());

        let slow = CoprocessorConfig {
            poll_interval: Duration::from_secs(2),
            ..CoprocessorConfig::DEFAULT
        };
        assert_eq!(
            slow.validate().unwrap_err(),
            ConfigError::PollIntervalTooLong(Duration::from_secs(2))
        );

        let no_budget = CoprocessorConfig {
            max_transactions_per_run: Some(0),
            ..CoprocessorConfig::DEFAULT
        };
        assert_eq!(
            no_budget.validate().unwrap_err(),
            ConfigError::ZeroTransactionBudget
        );
    }

    #[test]
    fn test_display() {
        let config = CoprocessorConfig {
            max_transactions_per_run: Some(8),
            ..CoprocessorConfig::DEFAULT
        };
        assert_eq!(
            config.to_string(),
            "CoprocessorConfig { poll: 1ms, strict: true, budget: 8 }"
        );
    }
}
