use std::{collections::HashMap, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
};

use tokio::sync::Mutex;
use tracing::info;

use dutybot_core::{config::Config, dialogue::DialogueState, rates::RateStore};

use crate::{handlers, webhook};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub rates: Arc<RateStore>,
    pub dialogues: Arc<DialogueRegistry>,
}

/// Per-chat wizard state. A mutex-guarded map is enough here: entries are
/// tiny and touched once per incoming message.
#[derive(Default)]
pub struct DialogueRegistry {
    inner: Mutex<HashMap<i64, DialogueState>>,
}

impl DialogueRegistry {
    pub async fn get(&self, chat_id: i64) -> Option<DialogueState> {
        self.inner.lock().await.get(&chat_id).cloned()
    }

    pub async fn set(&self, chat_id: i64, state: DialogueState) {
        self.inner.lock().await.insert(chat_id, state);
    }

    /// Returns whether a wizard was actually in progress.
    pub async fn clear(&self, chat_id: i64) -> bool {
        self.inner.lock().await.remove(&chat_id).is_some()
    }
}

/// Run the bot: webhook mode when a public URL is configured, long polling
/// otherwise.
pub async fn run(cfg: Arc<Config>, rates: Arc<RateStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("dutybot started: @{}", me.username());
    }

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        rates,
        dialogues: Arc::new(DialogueRegistry::default()),
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    match &cfg.webhook {
        Some(wh) => {
            let listener = webhook::listener(bot, wh).await?;
            info!("serving webhook on {}", wh.bind_addr);
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("update listener error"),
                )
                .await;
        }
        None => {
            info!("no WEBHOOK_PUBLIC_URL configured, using long polling");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
