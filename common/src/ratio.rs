//! Division guarded against zero denominators.
//!
//! Every ratio of the analysis is degenerate for some inputs (zero price,
//! zero rent, zero payment). Such a ratio is reported as `0` (or as [`None`]
//! where "not applicable" is meaningful) instead of failing.

use rust_decimal::Decimal;

/// Divides `num` by `den`.
///
/// [`None`] is returned if `den` is zero or the result overflows.
#[must_use]
pub fn checked(num: Decimal, den: Decimal) -> Option<Decimal> {
    if den.is_zero() {
        return None;
    }
    num.checked_div(den)
}

/// Divides `num` by `den`, yielding `0` if the ratio is undefined.
#[must_use]
pub fn or_zero(num: Decimal, den: Decimal) -> Decimal {
    checked(num, den).unwrap_or_default()
}

/// Expresses `num` as a percentage of `den`, yielding `0` if undefined or
/// not representable.
#[must_use]
pub fn percent(num: Decimal, den: Decimal) -> Decimal {
    checked(num, den)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_default()
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn zero_denominator() {
        assert_eq!(super::checked(decimal("5"), Decimal::ZERO), None);
        assert_eq!(
            super::or_zero(decimal("5"), Decimal::ZERO),
            Decimal::ZERO,
        );
        assert_eq!(
            super::percent(decimal("5"), Decimal::ZERO),
            Decimal::ZERO,
        );
    }

    #[test]
    fn regular_division() {
        assert_eq!(
            super::checked(decimal("1"), decimal("4")),
            Some(decimal("0.25")),
        );
        assert_eq!(
            super::percent(decimal("21000"), decimal("450000")).round_dp(4),
            decimal("4.6667"),
        );
    }

    #[test]
    fn overflow_is_undefined() {
        assert_eq!(super::checked(Decimal::MAX, decimal("0.5")), None);
        assert_eq!(super::or_zero(Decimal::MAX, decimal("0.5")), Decimal::ZERO);
        assert_eq!(super::percent(Decimal::MAX, Decimal::ONE), Decimal::ZERO);
    }
}
