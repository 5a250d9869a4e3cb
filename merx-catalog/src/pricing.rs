use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Result of a VAT calculation for one unit of a product.
///
/// `vat_amount` is derived from the rounded final price, so
/// `base_price + vat_amount == final_price` holds exactly and the figure
/// shown to a customer always adds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub vat_amount: Decimal,
    pub final_price: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),
}

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Gross price for one unit: base price plus region VAT.
///
/// The raw VAT share is kept at 4 decimal places (half-up) before the gross
/// price is settled at 2 decimal places (half-up). Pure function, safe to
/// call from any number of tasks.
pub fn price_with_vat(base_price: Decimal, vat_percentage: Decimal) -> Result<PriceQuote, PricingError> {
    if base_price <= Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!(
            "base price must be greater than zero, got {base_price}"
        )));
    }
    if vat_percentage < Decimal::ZERO || vat_percentage > ONE_HUNDRED {
        return Err(PricingError::InvalidInput(format!(
            "VAT percentage must be between 0 and 100, got {vat_percentage}"
        )));
    }

    let raw_vat = (base_price * vat_percentage / ONE_HUNDRED)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    let final_price =
        (base_price + raw_vat).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(PriceQuote {
        vat_amount: final_price - base_price,
        final_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn standard_us_rate() {
        let quote = price_with_vat(dec!(100.00), dec!(8.25)).unwrap();
        assert_eq!(quote.vat_amount, dec!(8.25));
        assert_eq!(quote.final_price, dec!(108.25));
    }

    #[test]
    fn zero_vat_is_passthrough() {
        let quote = price_with_vat(dec!(49.99), dec!(0)).unwrap();
        assert_eq!(quote.vat_amount, dec!(0.00));
        assert_eq!(quote.final_price, dec!(49.99));
    }

    #[test]
    fn full_vat_doubles_the_price() {
        let quote = price_with_vat(dec!(12.50), dec!(100)).unwrap();
        assert_eq!(quote.final_price, dec!(25.00));
        assert_eq!(quote.vat_amount, dec!(12.50));
    }

    #[test]
    fn intermediate_keeps_four_places_before_settling() {
        // 19.99 * 7.77% = 1.553223 -> 1.5532; 21.5432 -> 21.54
        let quote = price_with_vat(dec!(19.99), dec!(7.77)).unwrap();
        assert_eq!(quote.final_price, dec!(21.54));
        assert_eq!(quote.vat_amount, dec!(1.55));
    }

    #[test]
    fn half_up_at_the_final_cent() {
        // 10.00 * 2.25% = 0.2250; 10.2250 rounds up to 10.23
        let quote = price_with_vat(dec!(10.00), dec!(2.25)).unwrap();
        assert_eq!(quote.final_price, dec!(10.23));
        assert_eq!(quote.vat_amount, dec!(0.23));
    }

    #[test]
    fn base_plus_vat_equals_final_exactly() {
        let samples = [
            (dec!(0.01), dec!(19.00)),
            (dec!(3.33), dec!(7.77)),
            (dec!(19.99), dec!(8.25)),
            (dec!(100.00), dec!(8.25)),
            (dec!(999999.99), dec!(25.00)),
            (dec!(42.42), dec!(0.01)),
            (dec!(42.42), dec!(99.99)),
        ];
        for (base, vat) in samples {
            let quote = price_with_vat(base, vat).unwrap();
            assert_eq!(base + quote.vat_amount, quote.final_price, "base {base} vat {vat}");

            // Spelled-out rounding chain the calculation must match.
            let expected = (base
                + (base * vat / dec!(100))
                    .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            assert_eq!(quote.final_price, expected, "base {base} vat {vat}");
        }
    }

    #[test]
    fn rejects_non_positive_base() {
        assert!(price_with_vat(dec!(0), dec!(8.25)).is_err());
        assert!(price_with_vat(dec!(-1.00), dec!(8.25)).is_err());
    }

    #[test]
    fn rejects_out_of_range_vat() {
        assert!(price_with_vat(dec!(10.00), dec!(-0.01)).is_err());
        assert!(price_with_vat(dec!(10.00), dec!(100.01)).is_err());
    }
}
