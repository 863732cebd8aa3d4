use std::sync::Arc;

use teloxide::prelude::*;

use dutybot_core::{
    dialogue::{start_prompt, DialogueState},
    formatting::{escape_html, format_rates},
    parse::{parse_number, parse_quick_args},
};

use crate::router::AppState;
use crate::send_html;

use super::report;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn help_text(state: &AppState) -> String {
    let labels = &state.cfg.labels;
    format!(
        "🚗 <b>Vehicle import cost bot</b>\n\n\
         I estimate the full cost of importing a personal-use vehicle,\n\
         customs duty and statutory fees included.\n\n\
         <b>Commands:</b>\n\
         /rate - show current exchange rates\n\
         /rate {r} 110 - set the {r} rate\n\
         /rate {s} 0.07 - set the {s} rate\n\
         /calc &lt;price {s}&gt; &lt;volume cm³&gt; &lt;year&gt; [delivery] - one-shot calculation\n\
         (example: /calc 6500000 1591 2011 120000)\n\
         /wizard - step-by-step calculation\n\
         /cancel - abandon the wizard",
        r = labels.reference_code,
        s = labels.source_code,
    )
}

fn calc_usage(state: &AppState) -> String {
    let s = &state.cfg.labels.source_code;
    format!(
        "Format: /calc &lt;price {s}&gt; &lt;volume cm³&gt; &lt;year&gt; [delivery]\n\
         Example: /calc 6500000 1591 2011 120000"
    )
}

fn rate_usage(state: &AppState) -> String {
    let labels = &state.cfg.labels;
    format!(
        "Use: /rate {} &lt;number&gt; or /rate {} &lt;number&gt;",
        labels.reference_code, labels.source_code
    )
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let (cmd, arg) = parse_command(text);

    match cmd.as_str() {
        "start" | "help" => send_html(&bot, chat_id, &help_text(&state)).await,

        "rate" => handle_rate(&bot, chat_id, &state, &arg).await,

        "calc" => {
            let Some(input) = parse_quick_args(&arg, &state.cfg.fee_defaults) else {
                return send_html(&bot, chat_id, &calc_usage(&state)).await;
            };
            report::send_report(&bot, chat_id, &state, &input).await
        }

        "wizard" => {
            state.dialogues.set(chat_id.0, DialogueState::AwaitPrice).await;
            send_html(
                &bot,
                chat_id,
                &escape_html(&start_prompt(&state.cfg.labels)),
            )
            .await
        }

        "cancel" => {
            let reply = if state.dialogues.clear(chat_id.0).await {
                "Calculation cancelled."
            } else {
                "Nothing to cancel."
            };
            send_html(&bot, chat_id, reply).await
        }

        _ => {
            let reply = format!("Unknown command: /{}", escape_html(&cmd));
            send_html(&bot, chat_id, &reply).await
        }
    }
}

async fn handle_rate(
    bot: &Bot,
    chat_id: teloxide::types::ChatId,
    state: &AppState,
    arg: &str,
) -> ResponseResult<()> {
    if arg.trim().is_empty() {
        let rates = state.rates.snapshot().await;
        return send_html(bot, chat_id, &format_rates(&rates, &state.cfg.labels)).await;
    }

    let mut parts = arg.split_whitespace();
    let (Some(code), Some(raw), None) = (parts.next(), parts.next(), parts.next()) else {
        return send_html(bot, chat_id, &rate_usage(state)).await;
    };

    let Some(value) = parse_number(raw) else {
        let labels = &state.cfg.labels;
        let reply = format!(
            "Could not read the number. Example: /rate {} 110",
            labels.reference_code
        );
        return send_html(bot, chat_id, &reply).await;
    };

    let labels = &state.cfg.labels;
    let updated = if code.eq_ignore_ascii_case(&labels.reference_code) {
        state
            .rates
            .set_reference_to_home(value)
            .await
            .map(|_| labels.reference_code.clone())
    } else if code.eq_ignore_ascii_case(&labels.source_code) {
        state
            .rates
            .set_source_to_home(value)
            .await
            .map(|_| labels.source_code.clone())
    } else {
        return send_html(bot, chat_id, &rate_usage(state)).await;
    };

    match updated {
        Ok(code) => {
            let reply = format!("✅ {code} rate updated: {value} {}", labels.home_symbol);
            send_html(bot, chat_id, &reply).await
        }
        Err(e) => {
            send_html(bot, chat_id, &format!("❌ {}", escape_html(&e.to_string()))).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_slash_and_botname_and_lowercases() {
        assert_eq!(
            parse_command("/Calc@my_bot 6500000 1591 2011"),
            ("calc".to_string(), "6500000 1591 2011".to_string())
        );
        assert_eq!(parse_command("/rate"), ("rate".to_string(), String::new()));
    }
}
