//! Webhook update listener plus the service's plain HTTP routes.
//!
//! teloxide registers the webhook URL with Telegram when the listener
//! starts, so no separate registration endpoint is needed. The secret path
//! segment is the only caller authentication.

use std::convert::Infallible;

use axum::{routing::get, Json};

use teloxide::{
    prelude::*,
    update_listeners::{webhooks, UpdateListener},
};

use tracing::error;
use url::Url;

use dutybot_core::config::WebhookConfig;

pub async fn listener(
    bot: Bot,
    cfg: &WebhookConfig,
) -> anyhow::Result<impl UpdateListener<Err = Infallible>> {
    let url: Url = format!("{}/webhook/{}", cfg.public_url, cfg.secret).parse()?;
    let options = webhooks::Options::new(cfg.bind_addr, url).drop_pending_updates();

    let (listener, stop_flag, router) = webhooks::axum_to_router(bot, options).await?;

    let router = router
        .route("/", get(|| async { "OK" }))
        .route("/health", get(health));

    let bind_addr = cfg.bind_addr;
    tokio::spawn(async move {
        let server = axum::Server::bind(&bind_addr)
            .serve(router.into_make_service())
            .with_graceful_shutdown(stop_flag);
        if let Err(e) = server.await {
            error!("webhook server failed: {e}");
        }
    });

    Ok(listener)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
