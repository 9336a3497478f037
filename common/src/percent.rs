//! [`Percent`]-related definitions.

use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Floating-point percentage in the `[0, 100]` range.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[derive(Serialize)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One hundred [`Percent`].
    pub const HUNDRED: Self = Self(Decimal::ONE_HUNDRED);

    /// Creates a new [`Percent`] clamping the provided value into the
    /// `[0, 100]` range.
    #[must_use]
    pub fn clamped(val: Decimal) -> Self {
        Self(val.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Returns the value of this [`Percent`], e.g. `3.5` for `3.5%`.
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Returns this [`Percent`] as a fraction of one, e.g. `0.035` for `3.5%`.
    #[must_use]
    pub fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Applies this [`Percent`] to the provided `amount`.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        amount * self.fraction()
    }
}

impl From<Percent> for Decimal {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl<'de> Deserialize<'de> for Percent {
    /// Deserializes leniently: anything non-numeric becomes `0` and
    /// out-of-range values are clamped.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        crate::lenient::decimal(d).map(Self::clamped)
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::Percent;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn bounds() {
        assert_eq!(Percent::clamped(decimal("100")), Percent::HUNDRED);
        assert_eq!(Percent::clamped(decimal("0")), Percent::ZERO);
        assert_eq!(Percent::clamped(decimal("120")), Percent::HUNDRED);
        assert_eq!(Percent::clamped(decimal("-3")), Percent::ZERO);
    }

    #[test]
    fn fraction_and_application() {
        let rate = Percent::clamped(decimal("3.5"));

        assert_eq!(rate.fraction(), decimal("0.035"));
        assert_eq!(rate.of(decimal("1000")), decimal("35"));
    }

    #[test]
    fn deserializes_leniently() {
        let p: Percent = serde_json::from_str("\"20\"").unwrap();
        assert_eq!(p.value(), decimal("20"));

        let p: Percent = serde_json::from_str("null").unwrap();
        assert_eq!(p, Percent::ZERO);

        let p: Percent = serde_json::from_str("250").unwrap();
        assert_eq!(p, Percent::HUNDRED);
    }
}
