//! Mutable in-memory exchange-rate store.
//!
//! Rates live for the process lifetime only; there is no persistence. Updates
//! are whole-value replacements driven by the `/rate` command.

use tokio::sync::RwLock;

use crate::calc::RateConfig;
use crate::{errors::Error, Result};

pub struct RateStore {
    inner: RwLock<RateConfig>,
}

impl RateStore {
    pub fn new(initial: RateConfig) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// One atomic read per calculation, so a calculation stays internally
    /// consistent even if an operator updates a rate mid-flight.
    pub async fn snapshot(&self) -> RateConfig {
        *self.inner.read().await
    }

    pub async fn set_reference_to_home(&self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.inner.write().await.reference_to_home = rate;
        tracing::info!("reference rate updated to {rate}");
        Ok(())
    }

    pub async fn set_source_to_home(&self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.inner.write().await.source_to_home = rate;
        tracing::info!("source rate updated to {rate}");
        Ok(())
    }
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::Validation(format!(
            "an exchange rate must be a positive number, got {rate}"
        )));
    }
    Ok(())
}
