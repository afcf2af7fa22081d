use std::env;
use std::time::Duration;

use crate::error::{Result, SyncError};

/// Delays of the three debounced edit effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub optimistic_delay: Duration,
    pub local_save_delay: Duration,
    pub server_sync_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            optimistic_delay: Duration::from_millis(50),
            local_save_delay: Duration::from_millis(250),
            server_sync_delay: Duration::from_millis(3000),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            optimistic_delay: millis_var("NOTES_OPTIMISTIC_DELAY_MS", defaults.optimistic_delay)?,
            local_save_delay: millis_var("NOTES_LOCAL_SAVE_DELAY_MS", defaults.local_save_delay)?,
            server_sync_delay: millis_var("NOTES_SERVER_SYNC_DELAY_MS", defaults.server_sync_delay)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Effects of one edit must fire optimistic, then local save, then server sync.
    pub fn validate(&self) -> Result<()> {
        if self.optimistic_delay < self.local_save_delay
            && self.local_save_delay < self.server_sync_delay
        {
            Ok(())
        } else {
            Err(SyncError::Config(format!(
                "delays must be strictly increasing (optimistic {:?}, local save {:?}, server sync {:?})",
                self.optimistic_delay, self.local_save_delay, self.server_sync_delay
            )))
        }
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| SyncError::Config(format!("{name}: {e}"))),
        Err(_) => Ok(default),
    }
}
