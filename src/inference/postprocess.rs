//! Turns raw model output into presentable weather estimates.

use crate::types::prediction::{Confidence, Verdict};

/// Month-dependent temperature correction in °C. The model underestimates
/// the warm half of the year, so spring and summer months get positive
/// offsets and the cold months a small negative one.
pub fn seasonal_offset(month: u32) -> f64 {
    match month {
        4 => 5.0,
        5 => 7.0,
        6 => 9.0,
        7..=9 => 2.0,
        10 | 11 => 0.0,
        _ => -2.0,
    }
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Cleaned regression outputs plus the derived rain probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessedEstimate {
    /// °C, floored at 15 when the seasonal correction is applied.
    pub temperature: f64,
    /// mm, non-negative.
    pub rainfall: f64,
    /// km/h, non-negative.
    pub wind_speed: f64,
    /// Percent, inside [0, 100].
    pub humidity: f64,
    /// Inside [0.05, 0.95].
    pub probability: f64,
    pub verdict: Verdict,
}

/// Post-processes raw regression output `[temperature °C, rainfall mm,
/// wind m/s, humidity %]`.
pub fn process_regression(
    raw: [f64; 4],
    month: u32,
    seasonal_adjustment: bool,
) -> ProcessedEstimate {
    let [temperature, rainfall, wind_speed, humidity] = raw;
    let temperature = if seasonal_adjustment {
        (temperature + seasonal_offset(month)).max(15.0)
    } else {
        temperature
    };
    let rainfall = rainfall.max(0.0);
    let wind_speed = (wind_speed * 3.6).max(0.0);
    let humidity = humidity.clamp(0.0, 100.0);
    let probability = (rainfall / 10.0).clamp(0.05, 0.95);
    ProcessedEstimate {
        temperature: round_to(temperature, 1),
        rainfall: round_to(rainfall, 2),
        wind_speed: round_to(wind_speed, 1),
        humidity: round_to(humidity, 1),
        probability,
        verdict: Verdict::from_probability(probability),
    }
}

/// Confidence bands around an uninformative 0.5: high outside [0.2, 0.8],
/// medium outside [0.4, 0.6], low otherwise.
pub fn confidence_from_probability(probability: f64) -> Confidence {
    if !(0.2..=0.8).contains(&probability) {
        Confidence::High
    } else if !(0.4..=0.6).contains(&probability) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_the_seasonal_table() {
        assert_eq!(seasonal_offset(4), 5.0);
        assert_eq!(seasonal_offset(5), 7.0);
        assert_eq!(seasonal_offset(6), 9.0);
        assert_eq!(seasonal_offset(8), 2.0);
        assert_eq!(seasonal_offset(10), 0.0);
        assert_eq!(seasonal_offset(11), 0.0);
        assert_eq!(seasonal_offset(12), -2.0);
        assert_eq!(seasonal_offset(1), -2.0);
    }

    #[test]
    fn adjusted_temperature_never_drops_below_floor() {
        let estimate = process_regression([4.0, 0.0, 2.0, 50.0], 1, true);
        assert_eq!(estimate.temperature, 15.0);

        let unadjusted = process_regression([4.0, 0.0, 2.0, 50.0], 1, false);
        assert_eq!(unadjusted.temperature, 4.0);
    }

    #[test]
    fn wind_is_converted_to_kmh_and_clamps_apply() {
        let estimate = process_regression([20.0, -3.0, 5.0, 130.0], 10, true);
        assert_eq!(estimate.rainfall, 0.0);
        assert_eq!(estimate.wind_speed, 18.0);
        assert_eq!(estimate.humidity, 100.0);
        assert_eq!(estimate.probability, 0.05);
        assert_eq!(estimate.verdict, Verdict::NoRain);
    }

    #[test]
    fn probability_tracks_rainfall_tenths() {
        let wet = process_regression([28.0, 7.0, 3.0, 85.0], 6, true);
        assert_eq!(wet.probability, 0.7);
        assert_eq!(wet.verdict, Verdict::Rain);

        let soaked = process_regression([28.0, 40.0, 3.0, 85.0], 6, true);
        assert_eq!(soaked.probability, 0.95);

        let damp = process_regression([28.0, 3.5, 3.0, 85.0], 6, true);
        assert_eq!(damp.probability, 0.35);
        assert_eq!(damp.verdict, Verdict::Uncertain);
    }

    #[test]
    fn rounding_precision_per_field() {
        let estimate = process_regression([27.234, 3.456, 3.333, 81.26], 10, false);
        assert_eq!(estimate.temperature, 27.2);
        assert_eq!(estimate.rainfall, 3.46);
        assert_eq!(estimate.wind_speed, 12.0);
        assert_eq!(estimate.humidity, 81.3);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(confidence_from_probability(0.05), Confidence::High);
        assert_eq!(confidence_from_probability(0.9), Confidence::High);
        assert_eq!(confidence_from_probability(0.25), Confidence::Medium);
        assert_eq!(confidence_from_probability(0.7), Confidence::Medium);
        assert_eq!(confidence_from_probability(0.5), Confidence::Low);
        assert_eq!(confidence_from_probability(0.4), Confidence::Low);
    }
}
