use std::{env, fs, net::SocketAddr, path::Path};

use crate::calc::RateConfig;
use crate::{errors::Error, Result};

/// Typed configuration, loaded once at startup from the environment (with an
/// optional `.env` file that never overrides already-set variables).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Webhook mode when set; long polling otherwise.
    pub webhook: Option<WebhookConfig>,

    /// Seed values for the mutable rate store.
    pub initial_rates: RateConfig,

    pub fee_defaults: FeeDefaults,
    pub labels: CurrencyLabels,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Public base URL the webhook is registered under (no trailing slash).
    pub public_url: String,
    /// Shared-secret path segment; the only caller authentication there is.
    pub secret: String,
    pub bind_addr: SocketAddr,
}

/// Home-currency cost add-ons applied when the user does not override them.
#[derive(Clone, Debug, PartialEq)]
pub struct FeeDefaults {
    pub delivery_home: f64,
    pub broker_home: f64,
    pub inspection_home: f64,
    pub extra_home: f64,
}

/// Display labels only; the engine itself is currency-agnostic.
#[derive(Clone, Debug)]
pub struct CurrencyLabels {
    /// Currency the duty bands are denominated in (e.g. EUR).
    pub reference_code: String,
    /// Currency the vehicle is priced in at origin (e.g. KRW).
    pub source_code: String,
    /// Symbol of the importing country's currency (e.g. ₽).
    pub home_symbol: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let webhook = match env_str("WEBHOOK_PUBLIC_URL").and_then(non_empty) {
            Some(public_url) => {
                let secret = env_str("WEBHOOK_SECRET")
                    .and_then(non_empty)
                    .unwrap_or_else(|| "supersecret".to_string());
                let bind_addr = env_str("WEBHOOK_BIND")
                    .unwrap_or_else(|| "0.0.0.0:8080".to_string())
                    .parse::<SocketAddr>()
                    .map_err(|e| {
                        Error::Config(format!("WEBHOOK_BIND is not a socket address: {e}"))
                    })?;
                Some(WebhookConfig {
                    public_url: public_url.trim_end_matches('/').to_string(),
                    secret,
                    bind_addr,
                })
            }
            None => None,
        };

        let initial_rates = RateConfig {
            reference_to_home: env_f64("REFERENCE_RATE").unwrap_or(110.0),
            source_to_home: env_f64("SOURCE_RATE").unwrap_or(0.07),
        };
        if initial_rates.reference_to_home <= 0.0 || initial_rates.source_to_home <= 0.0 {
            return Err(Error::Config(
                "REFERENCE_RATE and SOURCE_RATE must be positive".to_string(),
            ));
        }

        let fee_defaults = FeeDefaults {
            delivery_home: env_f64("DELIVERY_FEE").unwrap_or(120_000.0),
            broker_home: env_f64("BROKER_FEE").unwrap_or(25_000.0),
            inspection_home: env_f64("INSPECTION_FEE").unwrap_or(30_000.0),
            extra_home: env_f64("EXTRA_FEE").unwrap_or(0.0),
        };
        if [
            fee_defaults.delivery_home,
            fee_defaults.broker_home,
            fee_defaults.inspection_home,
            fee_defaults.extra_home,
        ]
        .iter()
        .any(|f| *f < 0.0 || !f.is_finite())
        {
            return Err(Error::Config(
                "fee defaults must be non-negative numbers".to_string(),
            ));
        }

        let labels = CurrencyLabels {
            reference_code: env_str("REFERENCE_CURRENCY")
                .and_then(non_empty)
                .unwrap_or_else(|| "EUR".to_string()),
            source_code: env_str("SOURCE_CURRENCY")
                .and_then(non_empty)
                .unwrap_or_else(|| "KRW".to_string()),
            home_symbol: env_str("HOME_CURRENCY_SYMBOL")
                .and_then(non_empty)
                .unwrap_or_else(|| "₽".to_string()),
        };

        Ok(Self {
            telegram_bot_token,
            webhook,
            initial_rates,
            fee_defaults,
            labels,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_f64(key: &str) -> Option<f64> {
    env_str(key).and_then(|s| s.trim().parse::<f64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
