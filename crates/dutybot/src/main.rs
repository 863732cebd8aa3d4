use std::sync::Arc;

use dutybot_core::{config::Config, rates::RateStore};

#[tokio::main]
async fn main() -> Result<(), dutybot_core::Error> {
    dutybot_core::logging::init("dutybot")?;

    let cfg = Arc::new(Config::load()?);
    let rates = Arc::new(RateStore::new(cfg.initial_rates));

    dutybot_telegram::router::run(cfg, rates)
        .await
        .map_err(|e| dutybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
