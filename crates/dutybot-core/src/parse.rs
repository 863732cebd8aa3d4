//! Free-text argument parsing for the single-shot `/calc` path.

use regex::Regex;

use crate::calc::CalcInput;
use crate::config::FeeDefaults;

/// Parse a decimal number, accepting both `.` and `,` as the separator.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Extract `price volume year [delivery]` from free text.
///
/// Any non-numeric noise between the numbers is tolerated; fewer than three
/// numbers means the message was not a calculation request.
pub fn parse_quick_args(text: &str, defaults: &FeeDefaults) -> Option<CalcInput> {
    let re = Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex");
    let nums: Vec<f64> = re
        .find_iter(text)
        .filter_map(|m| parse_number(m.as_str()))
        .collect();

    if nums.len() < 3 {
        return None;
    }

    Some(CalcInput {
        price_source: nums[0],
        volume_cm3: nums[1] as u32,
        year: nums[2] as i32,
        delivery_home: nums.get(3).copied().unwrap_or(defaults.delivery_home),
        broker_home: defaults.broker_home,
        inspection_home: defaults.inspection_home,
        extra_home: defaults.extra_home,
    })
}
