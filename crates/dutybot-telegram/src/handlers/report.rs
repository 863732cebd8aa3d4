//! Shared calculation + reply path for the single-shot and wizard flows.

use teloxide::prelude::*;
use teloxide::types::ChatId;

use dutybot_core::{
    calc::{calculate, CalcInput},
    formatting::{escape_html, format_breakdown},
};

use crate::router::AppState;
use crate::send_html;

pub async fn send_report(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    input: &CalcInput,
) -> ResponseResult<()> {
    // One rate snapshot per calculation, so the result is internally
    // consistent even if a rate changes mid-flight.
    let rates = state.rates.snapshot().await;

    match calculate(input, &rates) {
        Ok(res) => send_html(bot, chat_id, &format_breakdown(&res, &state.cfg.labels)).await,
        Err(e) => {
            send_html(bot, chat_id, &format!("❌ {}", escape_html(&e.to_string()))).await
        }
    }
}
