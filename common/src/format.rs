//! Display [`Format`]s of numeric values.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Currency, Money};

/// How a numeric value is meant to be displayed.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Format {
    /// Amount of [`Money`] in the scenario [`Currency`].
    Currency,

    /// Percentage, e.g. a rate or a return.
    Percentage,

    /// Plain number, e.g. a ratio or a count.
    Plain,

    /// Floor or lot area in square meters.
    Area,
}

impl Format {
    /// Renders the provided `value` according to this [`Format`].
    #[must_use]
    pub fn render(self, value: Decimal, currency: Currency) -> String {
        match self {
            Self::Currency => Money::new(value, currency).to_string(),
            Self::Percentage => format!("{:.2}%", round(value, 2)),
            Self::Plain => round(value, 2).normalize().to_string(),
            Self::Area => format!("{:.1} m\u{b2}", round(value, 1)),
        }
    }
}

/// Rounds the `value` to `dp` decimal places, half away from zero.
fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::Currency;

    use super::Format;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn renders_each_format() {
        let eur = Currency::Eur;

        assert_eq!(
            Format::Currency.render(decimal("1616.1876"), eur),
            "1616.19EUR",
        );
        assert_eq!(
            Format::Percentage.render(decimal("4.2666"), eur),
            "4.27%",
        );
        assert_eq!(Format::Plain.render(decimal("1.2500"), eur), "1.25");
        assert_eq!(Format::Plain.render(decimal("3"), eur), "3");
        assert_eq!(Format::Area.render(decimal("85.25"), eur), "85.3 m\u{b2}");
    }
}
