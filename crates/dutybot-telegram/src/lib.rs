//! Telegram adapter (teloxide).
//!
//! Routes updates to the command and wizard handlers; the calculation engine
//! itself lives in `dutybot-core`.

use teloxide::{prelude::*, types::ParseMode};

use tokio::time::sleep;

pub mod handlers;
pub mod router;
pub mod webhook;

/// Send an HTML message with a single retry on a Telegram flood-wait.
pub(crate) async fn send_html(
    bot: &Bot,
    chat_id: teloxide::types::ChatId,
    html: &str,
) -> ResponseResult<()> {
    match bot
        .send_message(chat_id, html.to_string())
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(_) => Ok(()),
        Err(teloxide::RequestError::RetryAfter(d)) => {
            sleep(d).await;
            bot.send_message(chat_id, html.to_string())
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ())
        }
        Err(e) => Err(e),
    }
}
