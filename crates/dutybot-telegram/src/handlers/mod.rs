//! Telegram update handlers.
//!
//! Each handler validates input, calls into `dutybot-core`, and renders the
//! result as HTML.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;
use crate::send_html;

mod commands;
mod report;
mod text;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(raw) = msg.text() else {
        send_html(&bot, msg.chat.id, "I only understand text messages.").await?;
        return Ok(());
    };

    if raw.starts_with('/') {
        return commands::handle_command(bot, msg, state).await;
    }

    text::handle_text(bot, msg, state).await
}
