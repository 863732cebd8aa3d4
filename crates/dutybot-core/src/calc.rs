//! Customs cost calculation engine.
//!
//! Pure functions mapping vehicle facts + exchange rates to an itemized cost
//! breakdown. Duty, utilization and clearance schedules are regulatory step
//! functions, so they are kept as ordered band tables: adjusting a bracket is
//! a data change, not a logic change.
//!
//! Three currencies are involved: the *source* currency the vehicle is priced
//! in at origin, the *reference* currency the duty bands are denominated in,
//! and the *home* currency the final total is expressed in.

use chrono::{Datelike, Utc};

use crate::{errors::Error, Result};

/// Input record for one calculation. Assembled either from a single `/calc`
/// message or field-by-field by the wizard; the engine does not care which.
#[derive(Clone, Debug, PartialEq)]
pub struct CalcInput {
    /// Vehicle price in the source-country currency.
    pub price_source: f64,
    /// Engine displacement in cubic centimeters.
    pub volume_cm3: u32,
    /// Model/registration year.
    pub year: i32,
    pub delivery_home: f64,
    pub broker_home: f64,
    pub inspection_home: f64,
    pub extra_home: f64,
}

/// Conversion rates, expressed as home currency per unit. Both must be
/// positive; `RateStore` enforces that on update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateConfig {
    pub reference_to_home: f64,
    pub source_to_home: f64,
}

/// Fully itemized result of one calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct CalcResult {
    pub age_years: u32,
    pub price_home: f64,
    pub duty_reference: f64,
    pub duty_home: f64,
    pub utilization_home: f64,
    pub clearance_home: f64,
    pub delivery_home: f64,
    pub broker_home: f64,
    pub inspection_home: f64,
    pub extra_home: f64,
    pub total_home: f64,
}

// Duty rate per cm³ by volume band (upper bound inclusive), reference
// currency. One table per age regime.
const DUTY_RATES_OVER_5Y: &[(u32, f64)] = &[
    (1000, 3.0),
    (1500, 3.2),
    (1800, 3.5),
    (2300, 4.8),
    (3000, 5.0),
    (u32::MAX, 5.7),
];

const DUTY_RATES_3_TO_5Y: &[(u32, f64)] = &[
    (1000, 1.5),
    (1500, 1.7),
    (1800, 2.5),
    (2300, 2.7),
    (3000, 3.0),
    (u32::MAX, 3.6),
];

// Young vehicles (< 3 years) are taxed on declared value: half-open value
// bands [lo, hi) in the reference currency, each with a percentage-of-value
// rate and a minimum-per-cm³ floor.
const VALUE_BANDS_UNDER_3Y: &[(f64, f64, f64, f64)] = &[
    (0.0, 8_500.0, 0.54, 2.5),
    (8_500.0, 16_700.0, 0.48, 3.5),
    (16_700.0, 42_300.0, 0.48, 5.5),
    (42_300.0, 84_500.0, 0.48, 7.5),
    (84_500.0, 169_000.0, 0.48, 15.0),
    (169_000.0, f64::INFINITY, 0.48, 20.0),
];

// Flat utilization fee, home currency: volume bracket (upper bound inclusive)
// crossed with the age threshold.
const UTILIZATION_FEES: &[(u32, f64, f64)] = &[
    // (volume upper bound, fee when age > 3, fee when age <= 3)
    (3000, 5_200.0, 3_400.0),
    (3500, 3_296_800.0, 2_153_400.0),
    (u32::MAX, 3_604_800.0, 2_742_200.0),
];

// Flat customs clearance fee, home currency, keyed to the home-currency
// price (upper bound inclusive, last band open-ended).
const CLEARANCE_FEES: &[(f64, f64)] = &[
    (200_000.0, 1_067.0),
    (450_000.0, 2_134.0),
    (1_200_000.0, 4_269.0),
    (2_700_000.0, 11_746.0),
    (4_200_000.0, 16_524.0),
    (5_500_000.0, 21_344.0),
    (7_000_000.0, 27_540.0),
    (f64::INFINITY, 30_000.0),
];

/// Vehicle age in whole years, floored at 0 for future model years.
pub fn age_years(current_year: i32, model_year: i32) -> u32 {
    (current_year - model_year).max(0) as u32
}

fn rate_for_volume(table: &[(u32, f64)], volume_cm3: u32) -> f64 {
    match table.iter().find(|&&(upper, _)| volume_cm3 <= upper) {
        Some(&(_, rate)) => rate,
        None => table[table.len() - 1].1,
    }
}

/// Customs duty in the reference currency.
///
/// `declared_value` is the vehicle value in the reference currency and is
/// mandatory for vehicles under 3 years old; the two older regimes ignore it.
pub fn duty_reference(volume_cm3: u32, age_years: u32, declared_value: Option<f64>) -> Result<f64> {
    let volume = volume_cm3 as f64;

    if age_years > 5 {
        return Ok(rate_for_volume(DUTY_RATES_OVER_5Y, volume_cm3) * volume);
    }
    if age_years >= 3 {
        return Ok(rate_for_volume(DUTY_RATES_3_TO_5Y, volume_cm3) * volume);
    }

    let value = declared_value.ok_or_else(|| {
        Error::Validation(
            "a declared value in the reference currency is required for vehicles under 3 years old"
                .to_string(),
        )
    })?;

    for &(lo, hi, pct, min_per_cm3) in VALUE_BANDS_UNDER_3Y {
        if lo <= value && value < hi {
            return Ok((value * pct).max(min_per_cm3 * volume));
        }
    }

    // Values outside every band (e.g. negative) use the top band's parameters.
    let (_, _, pct, min_per_cm3) = VALUE_BANDS_UNDER_3Y[VALUE_BANDS_UNDER_3Y.len() - 1];
    Ok((value * pct).max(min_per_cm3 * volume))
}

/// Flat utilization (recycling) fee in the home currency.
pub fn utilization_fee_home(volume_cm3: u32, age_years: u32) -> f64 {
    let (_, over_3, up_to_3) = match UTILIZATION_FEES
        .iter()
        .find(|&&(upper, _, _)| volume_cm3 <= upper)
    {
        Some(&band) => band,
        None => UTILIZATION_FEES[UTILIZATION_FEES.len() - 1],
    };
    if age_years > 3 {
        over_3
    } else {
        up_to_3
    }
}

/// Flat customs clearance fee in the home currency.
pub fn clearance_fee_home(price_home: f64) -> f64 {
    match CLEARANCE_FEES.iter().find(|&&(upper, _)| price_home <= upper) {
        Some(&(_, fee)) => fee,
        None => CLEARANCE_FEES[CLEARANCE_FEES.len() - 1].1,
    }
}

pub fn source_to_home(amount: f64, rates: &RateConfig) -> f64 {
    amount * rates.source_to_home
}

pub fn reference_to_home(amount: f64, rates: &RateConfig) -> f64 {
    amount * rates.reference_to_home
}

/// Run a full calculation against the current calendar year.
pub fn calculate(input: &CalcInput, rates: &RateConfig) -> Result<CalcResult> {
    calculate_at(input, rates, Utc::now().year())
}

/// The pure entry point: same as [`calculate`] but with the current year
/// pinned by the caller.
pub fn calculate_at(input: &CalcInput, rates: &RateConfig, current_year: i32) -> Result<CalcResult> {
    let age = age_years(current_year, input.year);
    let price_home = source_to_home(input.price_source, rates);

    // The young-vehicle regime needs the value re-expressed in the reference
    // currency; that figure only exists when the reference rate is usable.
    let declared_value = if age < 3 {
        (rates.reference_to_home > 0.0)
            .then(|| price_home / rates.reference_to_home)
            .filter(|v| v.is_finite())
    } else {
        None
    };

    let duty_ref = duty_reference(input.volume_cm3, age, declared_value)?;
    let duty_home = reference_to_home(duty_ref, rates);
    let utilization_home = utilization_fee_home(input.volume_cm3, age);
    let clearance_home = clearance_fee_home(price_home);

    let total_home = price_home
        + input.delivery_home
        + duty_home
        + utilization_home
        + clearance_home
        + input.broker_home
        + input.inspection_home
        + input.extra_home;

    Ok(CalcResult {
        age_years: age,
        price_home,
        duty_reference: duty_ref,
        duty_home,
        utilization_home,
        clearance_home,
        delivery_home: input.delivery_home,
        broker_home: input.broker_home,
        inspection_home: input.inspection_home,
        extra_home: input.extra_home,
        total_home,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;

    fn rates() -> RateConfig {
        RateConfig {
            reference_to_home: 110.0,
            source_to_home: 0.07,
        }
    }

    fn input(price_source: f64, volume_cm3: u32, year: i32) -> CalcInput {
        CalcInput {
            price_source,
            volume_cm3,
            year,
            delivery_home: 120_000.0,
            broker_home: 25_000.0,
            inspection_home: 30_000.0,
            extra_home: 0.0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn volume_band_edges_use_the_lower_band() {
        assert_eq!(duty_reference(1000, 6, None).unwrap(), 3.0 * 1000.0);
        assert_eq!(duty_reference(1001, 6, None).unwrap(), 3.2 * 1001.0);
        assert_eq!(duty_reference(1500, 6, None).unwrap(), 3.2 * 1500.0);
        assert_eq!(duty_reference(1800, 6, None).unwrap(), 3.5 * 1800.0);
        assert_eq!(duty_reference(2300, 6, None).unwrap(), 4.8 * 2300.0);
        assert_eq!(duty_reference(3000, 6, None).unwrap(), 5.0 * 3000.0);
        assert_eq!(duty_reference(3001, 6, None).unwrap(), 5.7 * 3001.0);
    }

    #[test]
    fn per_cm3_rates_never_decrease_with_volume() {
        for age in [4u32, 6] {
            let mut prev = 0.0;
            for v in [500u32, 1000, 1200, 1500, 1700, 1800, 2000, 2300, 2800, 3000, 3500, 5000] {
                let rate = duty_reference(v, age, None).unwrap() / v as f64;
                assert!(rate >= prev, "rate dropped at {v} cm3 (age {age})");
                prev = rate;
            }
        }
    }

    #[test]
    fn ages_three_and_five_use_the_middle_regime() {
        assert_eq!(duty_reference(1000, 3, None).unwrap(), 1.5 * 1000.0);
        assert_eq!(duty_reference(1000, 5, None).unwrap(), 1.5 * 1000.0);
        assert_eq!(duty_reference(1000, 6, None).unwrap(), 3.0 * 1000.0);
    }

    #[test]
    fn young_vehicle_without_value_is_a_validation_error() {
        let err = duty_reference(1000, 2, None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn young_vehicle_duty_takes_the_larger_of_pct_and_floor() {
        // 10_000 falls in [8_500, 16_700): pct 0.48 vs 3.5 per cm³.
        assert_eq!(duty_reference(1000, 2, Some(10_000.0)).unwrap(), 4_800.0);
        // Big engine, cheap car: the per-cm³ floor wins.
        assert_eq!(duty_reference(3000, 2, Some(10_000.0)).unwrap(), 10_500.0);
    }

    #[test]
    fn value_band_lower_bound_starts_the_new_band() {
        // Exactly 8_500 uses (0.48, 3.5), not the first band's (0.54, 2.5).
        assert_eq!(duty_reference(100, 2, Some(8_500.0)).unwrap(), 8_500.0 * 0.48);
    }

    #[test]
    fn out_of_band_values_fall_back_to_the_top_band() {
        // A negative declared value matches no band; the catch-all applies.
        assert_eq!(duty_reference(1000, 2, Some(-1.0)).unwrap(), 20.0 * 1000.0);
    }

    #[test]
    fn future_model_year_clamps_to_age_zero() {
        let res = calculate_at(&input(1_000_000.0, 1000, YEAR + 2), &rates(), YEAR).unwrap();
        assert_eq!(res.age_years, 0);
    }

    #[test]
    fn utilization_fee_brackets() {
        assert_eq!(utilization_fee_home(3000, 4), 5_200.0);
        // Age exactly 3 is not "over 3".
        assert_eq!(utilization_fee_home(3000, 3), 3_400.0);
        assert_eq!(utilization_fee_home(3500, 4), 3_296_800.0);
        assert_eq!(utilization_fee_home(3500, 2), 2_153_400.0);
        assert_eq!(utilization_fee_home(3501, 4), 3_604_800.0);
        assert_eq!(utilization_fee_home(3501, 0), 2_742_200.0);
    }

    #[test]
    fn clearance_fee_bands_have_inclusive_upper_bounds() {
        assert_eq!(clearance_fee_home(200_000.0), 1_067.0);
        assert_eq!(clearance_fee_home(200_000.01), 2_134.0);
        assert_eq!(clearance_fee_home(450_000.0), 2_134.0);
        assert_eq!(clearance_fee_home(1_200_000.0), 4_269.0);
        assert_eq!(clearance_fee_home(2_700_000.0), 11_746.0);
        assert_eq!(clearance_fee_home(4_200_000.0), 16_524.0);
        assert_eq!(clearance_fee_home(5_500_000.0), 21_344.0);
        assert_eq!(clearance_fee_home(7_000_000.0), 27_540.0);
        assert_eq!(clearance_fee_home(7_000_000.01), 30_000.0);
    }

    #[test]
    fn pinned_regression_scenario() {
        // 6 500 000 source units, 1 591 cm³, year 2011: age 14, band
        // (1500, 1800] at 3.5 per cm³.
        let res = calculate_at(&input(6_500_000.0, 1591, 2011), &rates(), YEAR).unwrap();
        assert_eq!(res.age_years, 14);
        assert!(approx(res.price_home, 455_000.0));
        assert!(approx(res.duty_reference, 5_568.5));
        assert!(approx(res.duty_home, 612_535.0));
        assert_eq!(res.utilization_home, 5_200.0);
        assert_eq!(res.clearance_home, 4_269.0);
        assert!(approx(res.total_home, 1_252_004.0));
    }

    #[test]
    fn total_is_the_sum_of_its_components() {
        let res = calculate_at(&input(2_345_678.0, 2400, 2015), &rates(), YEAR).unwrap();
        let sum = res.price_home
            + res.delivery_home
            + res.duty_home
            + res.utilization_home
            + res.clearance_home
            + res.broker_home
            + res.inspection_home
            + res.extra_home;
        assert_eq!(res.total_home, sum);
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let i = input(6_500_000.0, 1591, 2011);
        let r = rates();
        assert_eq!(
            calculate_at(&i, &r, YEAR).unwrap(),
            calculate_at(&i, &r, YEAR).unwrap()
        );
    }

    #[test]
    fn unusable_reference_rate_fails_for_young_vehicles_only() {
        let bad = RateConfig {
            reference_to_home: 0.0,
            source_to_home: 0.07,
        };
        let young = input(1_000_000.0, 1500, YEAR - 1);
        assert!(matches!(
            calculate_at(&young, &bad, YEAR),
            Err(Error::Validation(_))
        ));

        // Older regimes never need the reference-currency value.
        let old = input(1_000_000.0, 1500, 2010);
        assert!(calculate_at(&old, &bad, YEAR).is_ok());
    }
}
