use crate::fetch::PriceSample;

/// Arithmetic mean of the sample prices, `None` for an empty window.
pub fn average_price(samples: &[PriceSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|sample| sample.price).sum();
    Some(sum / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn samples(prices: &[f64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(minute, price)| PriceSample {
                price: *price,
                observed_at: Utc
                    .with_ymd_and_hms(2025, 5, 8, 4, minute as u32, 0)
                    .unwrap(),
            })
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn averages_two_samples() {
        assert_close(average_price(&samples(&[10.0, 20.0])).unwrap(), 15.0);
    }

    #[test]
    fn single_sample_is_its_own_average() {
        assert_close(average_price(&samples(&[5.0])).unwrap(), 5.0);
    }

    #[test]
    fn empty_window_has_no_average() {
        assert_eq!(average_price(&[]), None);
    }

    #[test]
    fn matches_mean_for_irregular_prices() {
        let prices = [231.95, 232.1, 230.875, 229.0004, 1.5, 9999.99];
        let expected = prices.iter().sum::<f64>() / prices.len() as f64;
        assert_close(average_price(&samples(&prices)).unwrap(), expected);
    }
}
