//! Step-by-step collection of a [`CalcInput`], one field per message.
//!
//! The wizard is a plain state machine: each accepted answer produces the
//! next state and prompt, and the finished record goes through the exact
//! same calculation path as the single-shot `/calc` command. Transition
//! logic is pure; the adapter owns the per-chat state map and the replies.

use crate::calc::CalcInput;
use crate::config::{CurrencyLabels, FeeDefaults};
use crate::formatting::group_digits;
use crate::parse::parse_number;

/// Token the user sends to accept the default on an optional step (Telegram
/// has no empty messages).
const SKIP_TOKEN: &str = "-";

#[derive(Clone, Debug, PartialEq)]
pub enum DialogueState {
    AwaitPrice,
    AwaitVolume {
        price_source: f64,
    },
    AwaitYear {
        price_source: f64,
        volume_cm3: u32,
    },
    AwaitDelivery {
        price_source: f64,
        volume_cm3: u32,
        year: i32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Field accepted; move to `state` and send `prompt`.
    Next { state: DialogueState, prompt: String },
    /// Input rejected; stay in the current state and send `prompt`.
    Retry { prompt: String },
    /// All fields collected.
    Done(CalcInput),
}

pub fn start_prompt(labels: &CurrencyLabels) -> String {
    format!(
        "Enter the vehicle price in {} (e.g. 6500000)",
        labels.source_code
    )
}

/// Feed one user answer into the wizard.
pub fn step(
    state: &DialogueState,
    text: &str,
    defaults: &FeeDefaults,
    labels: &CurrencyLabels,
) -> StepOutcome {
    match *state {
        DialogueState::AwaitPrice => {
            let Some(price) = parse_number(text).filter(|p| *p >= 0.0) else {
                return StepOutcome::Retry {
                    prompt: format!(
                        "A price in {} is expected, e.g. 6500000",
                        labels.source_code
                    ),
                };
            };
            StepOutcome::Next {
                state: DialogueState::AwaitVolume {
                    price_source: price,
                },
                prompt: "Engine volume in cm³ (e.g. 1591)".to_string(),
            }
        }

        DialogueState::AwaitVolume { price_source } => {
            let Some(volume) = parse_number(text).filter(|v| *v >= 1.0) else {
                return StepOutcome::Retry {
                    prompt: "A whole number of cm³ is expected, e.g. 1591".to_string(),
                };
            };
            StepOutcome::Next {
                state: DialogueState::AwaitYear {
                    price_source,
                    volume_cm3: volume as u32,
                },
                prompt: "Model year (e.g. 2011)".to_string(),
            }
        }

        DialogueState::AwaitYear {
            price_source,
            volume_cm3,
        } => {
            let year = parse_number(text).map(|y| y as i32);
            let Some(year) = year.filter(|y| (1900..=2100).contains(y)) else {
                return StepOutcome::Retry {
                    prompt: "A model year is expected, e.g. 2011".to_string(),
                };
            };
            StepOutcome::Next {
                state: DialogueState::AwaitDelivery {
                    price_source,
                    volume_cm3,
                    year,
                },
                prompt: format!(
                    "Delivery cost in {} (send \"{}\" to keep the default {})",
                    labels.home_symbol,
                    SKIP_TOKEN,
                    group_digits(defaults.delivery_home.round() as i64)
                ),
            }
        }

        DialogueState::AwaitDelivery {
            price_source,
            volume_cm3,
            year,
        } => {
            let trimmed = text.trim();
            let delivery = if trimmed.is_empty() || trimmed == SKIP_TOKEN {
                defaults.delivery_home
            } else {
                match parse_number(trimmed).filter(|d| *d >= 0.0) {
                    Some(d) => d,
                    None => {
                        return StepOutcome::Retry {
                            prompt: format!(
                                "A delivery cost in {} is expected, or \"{}\" for the default",
                                labels.home_symbol, SKIP_TOKEN
                            ),
                        }
                    }
                }
            };

            StepOutcome::Done(CalcInput {
                price_source,
                volume_cm3,
                year,
                delivery_home: delivery,
                broker_home: defaults.broker_home,
                inspection_home: defaults.inspection_home,
                extra_home: defaults.extra_home,
            })
        }
    }
}
