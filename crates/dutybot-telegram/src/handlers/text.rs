use std::sync::Arc;

use teloxide::prelude::*;

use dutybot_core::{
    dialogue::{self, StepOutcome},
    formatting::escape_html,
};

use crate::router::AppState;
use crate::send_html;

use super::report;

/// Non-command text only means something while a wizard is in progress.
pub async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let Some(current) = state.dialogues.get(chat_id.0).await else {
        return send_html(
            &bot,
            chat_id,
            "Send /calc &lt;price&gt; &lt;volume&gt; &lt;year&gt; for a one-shot calculation, \
             or /wizard to be asked step by step. /help shows the details.",
        )
        .await;
    };

    match dialogue::step(&current, text, &state.cfg.fee_defaults, &state.cfg.labels) {
        StepOutcome::Retry { prompt } => send_html(&bot, chat_id, &escape_html(&prompt)).await,

        StepOutcome::Next { state: next, prompt } => {
            state.dialogues.set(chat_id.0, next).await;
            send_html(&bot, chat_id, &escape_html(&prompt)).await
        }

        StepOutcome::Done(input) => {
            state.dialogues.clear(chat_id.0).await;
            report::send_report(&bot, chat_id, &state, &input).await
        }
    }
}
