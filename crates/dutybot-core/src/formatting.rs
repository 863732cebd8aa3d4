//! Presentation helpers (Telegram HTML, number formatting).
//!
//! Rounding lives here, not in the engine: home-currency amounts are shown
//! as whole units, the reference-currency duty keeps two decimals.

use crate::calc::{CalcResult, RateConfig};
use crate::config::CurrencyLabels;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Group digits in threes with commas: `1252004` → `1,252,004`.
pub fn group_digits(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Home-currency amount: rounded to the nearest whole unit, grouped.
pub fn format_home(value: f64) -> String {
    group_digits(value.round() as i64)
}

/// Reference-currency amount: grouped integer part, always two decimals.
pub fn format_reference(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    format!("{}.{:02}", group_digits(cents / 100), (cents % 100).abs())
}

pub fn format_breakdown(res: &CalcResult, labels: &CurrencyLabels) -> String {
    let h = &labels.home_symbol;
    format!(
        "📦 <b>Import cost breakdown</b>\n\
         Vehicle price: ~{price} {h}\n\
         Delivery: {delivery} {h}\n\
         Customs duty: ≈ {duty_ref} {r} (~{duty} {h})\n\
         Utilization fee: {util} {h}\n\
         Clearance fee: {clearance} {h}\n\
         Broker: {broker} {h}\n\
         Inspection: {inspection} {h}\n\
         Other: {extra} {h}\n\
         — — — — — — — —\n\
         <b>Total: {total} {h}</b>\n\
         (Vehicle age: {age} years)",
        price = format_home(res.price_home),
        delivery = format_home(res.delivery_home),
        duty_ref = format_reference(res.duty_reference),
        r = labels.reference_code,
        duty = format_home(res.duty_home),
        util = format_home(res.utilization_home),
        clearance = format_home(res.clearance_home),
        broker = format_home(res.broker_home),
        inspection = format_home(res.inspection_home),
        extra = format_home(res.extra_home),
        total = format_home(res.total_home),
        age = res.age_years,
    )
}

pub fn format_rates(rates: &RateConfig, labels: &CurrencyLabels) -> String {
    format!(
        "Current rates: 1 {} = {} {}, 1 {} = {} {}",
        labels.reference_code,
        rates.reference_to_home,
        labels.home_symbol,
        labels.source_code,
        rates.source_to_home,
        labels.home_symbol,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> CurrencyLabels {
        CurrencyLabels {
            reference_code: "EUR".to_string(),
            source_code: "KRW".to_string(),
            home_symbol: "₽".to_string(),
        }
    }

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn groups_digits_in_threes() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(1_252_004), "1,252,004");
        assert_eq!(group_digits(-45_000), "-45,000");
    }

    #[test]
    fn reference_amounts_keep_two_decimals() {
        assert_eq!(format_reference(5_568.5), "5,568.50");
        assert_eq!(format_reference(4_800.0), "4,800.00");
        assert_eq!(format_reference(0.125), "0.13");
    }

    #[test]
    fn breakdown_lists_every_component() {
        let res = CalcResult {
            age_years: 14,
            price_home: 455_000.0,
            duty_reference: 5_568.5,
            duty_home: 612_535.0,
            utilization_home: 5_200.0,
            clearance_home: 4_269.0,
            delivery_home: 120_000.0,
            broker_home: 25_000.0,
            inspection_home: 30_000.0,
            extra_home: 0.0,
            total_home: 1_252_004.0,
        };

        let text = format_breakdown(&res, &labels());
        assert!(text.contains("455,000 ₽"));
        assert!(text.contains("5,568.50 EUR"));
        assert!(text.contains("612,535 ₽"));
        assert!(text.contains("Total: 1,252,004 ₽"));
        assert!(text.contains("14 years"));
    }

    #[test]
    fn rates_line_shows_both_rates() {
        let rates = RateConfig {
            reference_to_home: 110.0,
            source_to_home: 0.07,
        };
        assert_eq!(
            format_rates(&rates, &labels()),
            "Current rates: 1 EUR = 110 ₽, 1 KRW = 0.07 ₽"
        );
    }
}
