//! [`Money`]-related definitions.

use std::fmt;

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Number of minor units digits kept when displaying [`Money`].
    pub const MINOR_DIGITS: u32 = 2;

    /// Creates a new [`Money`] of the provided `amount` in the `currency`.
    #[must_use]
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Returns this [`Money`] rounded to its minor units, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(
                    Self::MINOR_DIGITS,
                    RoundingStrategy::MidpointAwayFromZero,
                )
                .normalize(),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self.rounded();
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount:.2}{currency}")
        }
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Russian Ruble."]
        Rub = 3,
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Eur
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn to_string_rounds_to_minor_units() {
        assert_eq!(
            Money::new(decimal("1616.1876"), Currency::Eur).to_string(),
            "1616.19EUR",
        );
        assert_eq!(
            Money::new(decimal("-615.995"), Currency::Usd).to_string(),
            "-616USD",
        );
        assert_eq!(
            Money::new(decimal("12.5"), Currency::Rub).to_string(),
            "12.50RUB",
        );
        assert_eq!(
            Money::new(decimal("123.00"), Currency::Usd).to_string(),
            "123USD",
        );
    }
}
