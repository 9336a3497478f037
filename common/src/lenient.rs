//! Lenient numeric deserialization.
//!
//! Form layers hand over numeric fields as numbers, numeric strings, `null`
//! or not at all. All of them are accepted here: whatever cannot be read as
//! a number becomes `0` instead of failing the whole record.
//!
//! Use with `#[serde(default, deserialize_with = "...")]`, so that missing
//! fields fall back to the type's default as well.
//!
//! Numbers beyond [`MAX`] in magnitude are unreadable as well, so that no
//! accepted input can overflow the arithmetic done on it.
//!
//! Textual fields (addresses, names, dates) follow the same rule: blank or
//! unreadable input is treated as absent.

use std::{fmt, str::FromStr};

use rust_decimal::{
    prelude::{FromPrimitive as _, ToPrimitive as _},
    Decimal,
};
use serde::de::{self, Deserializer, IgnoredAny, Visitor};
use time::macros::format_description;

use crate::{Date, Percent};

/// Largest magnitude of an accepted number: `10^15`.
pub const MAX: Decimal =
    Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Deserializes a [`Decimal`], coercing non-numeric input and numbers beyond
/// [`MAX`] to `0`.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn decimal<'de, D>(d: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(Lenient)
        .map(|v| if v.abs() > MAX { Decimal::ZERO } else { v })
}

/// Deserializes a [`Decimal`], coercing non-numeric and negative input to `0`.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn non_negative<'de, D>(d: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    decimal(d).map(|v| v.max(Decimal::ZERO))
}

/// Deserializes a present field of a partial update.
///
/// A present field is always [`Some`], even if its value is `null` or
/// garbage (which becomes `0`). Missing fields are [`None`] via
/// `#[serde(default)]`.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn optional<'de, D>(d: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    non_negative(d).map(Some)
}

/// Deserializes a present [`Percent`] field of a partial update, clamping
/// it into the `[0, 100]` range.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn optional_percent<'de, D>(d: D) -> Result<Option<Percent>, D::Error>
where
    D: Deserializer<'de>,
{
    decimal(d).map(|v| Some(Percent::clamped(v)))
}

/// Deserializes a whole count (years, rooms), truncating fractions and
/// coercing non-numeric, negative or out-of-range input to `0`.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn count<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    decimal(d).map(to_count)
}

/// Deserializes a present count field of a partial update.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn optional_count<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    count(d).map(Some)
}

/// Deserializes an optional textual value parsed into `T`.
///
/// Numbers are read as their decimal text (postal codes often arrive as
/// numbers). Blank, unparsable or non-textual input becomes [`None`].
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn text<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(d.deserialize_any(Textual)?.and_then(|s| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.parse().ok()).flatten()
    }))
}

/// Deserializes a present textual field of a partial update.
///
/// `Some(None)` means the field was present but blank, so it is cleared.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn optional_text<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    text(d).map(Some)
}

/// Deserializes an optional ISO `YYYY-MM-DD` [`Date`].
///
/// A trailing time part (as in an RFC 3339 timestamp) is ignored.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn date<'de, D>(d: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(d.deserialize_any(Textual)?.and_then(|s| {
        let s = s.trim();
        Date::parse(
            s.get(..10).unwrap_or(s),
            format_description!("[year]-[month]-[day]"),
        )
        .ok()
    }))
}

/// Deserializes a present [`Date`] field of a partial update.
///
/// # Errors
///
/// Only if the underlying [`Deserializer`] fails itself.
pub fn optional_date<'de, D>(d: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: Deserializer<'de>,
{
    date(d).map(Some)
}

/// Converts the provided [`Decimal`] into a whole count.
fn to_count<T: TryFrom<u64> + Default>(v: Decimal) -> T {
    v.trunc()
        .to_u64()
        .and_then(|v| T::try_from(v).ok())
        .unwrap_or_default()
}

/// [`Visitor`] accepting any value and reading a number out of it.
#[derive(Clone, Copy, Debug)]
struct Lenient;

impl<'de> Visitor<'de> for Lenient {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Decimal, E> {
        Ok(Decimal::from_i128(v).unwrap_or_default())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Decimal, E> {
        Ok(Decimal::from_u128(v).unwrap_or_default())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        // `NaN` and infinities have no `Decimal` representation.
        Ok(Decimal::from_f64(v).unwrap_or_default())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        let v = v.trim();
        Ok(v.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(v))
            .unwrap_or_default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        d: D,
    ) -> Result<Decimal, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> Result<Decimal, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }

    fn visit_map<A: de::MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<Decimal, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }
}

/// [`Visitor`] accepting any value and reading text out of it.
#[derive(Clone, Copy, Debug)]
struct Textual;

impl<'de> Visitor<'de> for Textual {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        d: D,
    ) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: de::MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use time::macros::date;

    use crate::Date;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Form {
        #[serde(deserialize_with = "super::decimal")]
        price: Decimal,

        #[serde(deserialize_with = "super::non_negative")]
        rent: Decimal,

        #[serde(deserialize_with = "super::optional")]
        closing: Option<Decimal>,

        #[serde(deserialize_with = "super::count")]
        years: u16,

        #[serde(deserialize_with = "super::text")]
        postal_code: Option<String>,

        #[serde(deserialize_with = "super::optional_text")]
        city: Option<Option<String>>,

        #[serde(deserialize_with = "super::date")]
        since: Option<Date>,
    }

    fn parse(json: &str) -> Form {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn reads_numbers_and_numeric_strings() {
        let form =
            parse(r#"{"price": "450000.50", "rent": 2800, "years": 30}"#);

        assert_eq!(form.price, decimal("450000.50"));
        assert_eq!(form.rent, decimal("2800"));
        assert_eq!(form.years, 30);
    }

    #[test]
    fn coerces_garbage_to_zero() {
        let form = parse(
            r#"{
                "price": "n/a",
                "rent": null,
                "closing": {"x": 1},
                "years": true
            }"#,
        );

        assert_eq!(form.price, Decimal::ZERO);
        assert_eq!(form.rent, Decimal::ZERO);
        assert_eq!(form.closing, Some(Decimal::ZERO));
        assert_eq!(form.years, 0);
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let form = parse("{}");

        assert_eq!(form.price, Decimal::ZERO);
        assert_eq!(form.closing, None);
    }

    #[test]
    fn clamps_negative_and_truncates_counts() {
        let form = parse(r#"{"rent": -100, "years": 29.9}"#);

        assert_eq!(form.rent, Decimal::ZERO);
        assert_eq!(form.years, 29);

        let form = parse(r#"{"years": 70000}"#);
        assert_eq!(form.years, 0);
    }

    #[test]
    fn rejects_oversized_numbers() {
        let form = parse(
            r#"{
                "price": "70000000000000000000000000000",
                "rent": 7e28,
                "closing": 1000000000000000,
                "years": 1e20
            }"#,
        );

        assert_eq!(form.price, Decimal::ZERO);
        assert_eq!(form.rent, Decimal::ZERO);
        assert_eq!(form.closing, Some(super::MAX));
        assert_eq!(form.years, 0);
        assert_eq!(super::MAX, decimal("1000000000000000"));
    }

    #[test]
    fn reads_floats() {
        let form = parse(r#"{"price": 3.5, "rent": "1e3"}"#);

        assert_eq!(form.price, decimal("3.5"));
        assert_eq!(form.rent, decimal("1000"));
    }

    #[test]
    fn reads_text_and_dates() {
        let form = parse(
            r#"{"postal_code": 10115, "city": "  ", "since": "2024-03-01"}"#,
        );

        assert_eq!(form.postal_code.as_deref(), Some("10115"));
        assert_eq!(form.city, Some(None));
        assert_eq!(form.since, Some(date!(2024 - 03 - 01)));

        let form = parse(r#"{"since": "2024-03-01T10:00:00Z"}"#);
        assert_eq!(form.since, Some(date!(2024 - 03 - 01)));
        assert_eq!(form.city, None);

        let form = parse(r#"{"postal_code": [1], "since": "soon"}"#);
        assert_eq!(form.postal_code, None);
        assert_eq!(form.since, None);
    }
}
