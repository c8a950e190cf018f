use thiserror::Error;

use crate::domain::loan::{LOAN_PERIOD_DAYS, LoanPolicy};

/// 貸出期間の環境変数
pub const LOAN_PERIOD_ENV: &str = "LIBRARY_LOAN_PERIOD_DAYS";

/// `RUST_LOG`未設定時のログフィルタ
pub const DEFAULT_LOG_FILTER: &str = "library_ledger=info";

/// 貸出期間の上限（日数）
const MAX_LOAN_PERIOD_DAYS: u32 = 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LIBRARY_LOAN_PERIOD_DAYS must be an integer between 1 and 365, got {0:?}")]
    InvalidLoanPeriod(String),
}

/// 起動時設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub loan_period_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loan_period_days: LOAN_PERIOD_DAYS,
        }
    }
}

impl Config {
    /// 環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の取得関数から読み込む（未設定の項目は既定値）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOAN_PERIOD_ENV) {
            config.loan_period_days = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| (1..=MAX_LOAN_PERIOD_DAYS).contains(days))
                .ok_or(ConfigError::InvalidLoanPeriod(raw))?;
        }

        Ok(config)
    }

    pub fn loan_policy(&self) -> LoanPolicy {
        LoanPolicy::new(self.loan_period_days)
    }
}
