//! [`Property`] definitions.

use common::{define_kind, lenient, Date, DateTime};
use derive_more::{AsRef, Display, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing as log;

/// Acquisition-time facts about an investment property.
///
/// [`Property::total_investment()`] is always derived from the current
/// costs and cannot be set on its own.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Street [`Address`] of this [`Property`].
    pub address: Option<Address>,

    /// [`City`] this [`Property`] is located in.
    pub city: Option<City>,

    /// [`PostalCode`] of this [`Property`].
    pub postal_code: Option<PostalCode>,

    /// [`Category`] of this [`Property`].
    pub category: Category,

    /// Purchase price of this [`Property`].
    pub purchase_price: Decimal,

    /// Year this [`Property`] was built.
    pub construction_year: u16,

    /// Total floor area of this [`Property`] in square meters.
    pub floor_area: Decimal,

    /// Lot size of this [`Property`] in square meters.
    pub lot_size: Decimal,

    /// [`Date`] this [`Property`] is (to be) purchased.
    pub purchase_date: Option<Date>,

    /// Renovation costs planned right after the purchase.
    pub renovation_cost: Decimal,

    /// Closing costs of the purchase (notary, transfer tax, broker).
    pub closing_cost: Decimal,

    /// Any other acquisition costs.
    pub other_cost: Decimal,
}

impl Property {
    /// Age, in years, of a freshly created [`Property`] default building.
    pub const DEFAULT_AGE: u16 = 30;

    /// Creates a new [`Property`] with default values, as of `now`.
    #[must_use]
    pub fn new(now: DateTime) -> Self {
        Self {
            address: None,
            city: None,
            postal_code: None,
            category: Category::default(),
            purchase_price: Decimal::ZERO,
            construction_year: u16::try_from(now.year())
                .unwrap_or_default()
                .saturating_sub(Self::DEFAULT_AGE),
            floor_area: Decimal::ZERO,
            lot_size: Decimal::ZERO,
            purchase_date: None,
            renovation_cost: Decimal::ZERO,
            closing_cost: Decimal::ZERO,
            other_cost: Decimal::ZERO,
        }
    }

    /// Returns the total investment into this [`Property`]: its purchase
    /// price plus all the acquisition costs.
    ///
    /// A sum not fitting into a [`Decimal`] is reported as `0`.
    #[must_use]
    pub fn total_investment(&self) -> Decimal {
        [self.renovation_cost, self.closing_cost, self.other_cost]
            .into_iter()
            .try_fold(self.purchase_price, Decimal::checked_add)
            .unwrap_or_else(|| {
                log::warn!("total investment does not fit, reporting `0`");
                Decimal::ZERO
            })
    }

    /// Indicates whether this [`Property`] carries any user input beyond
    /// its defaults.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.address.is_some() || !self.purchase_price.is_zero()
    }

    /// Applies the present [`Fields`] to this [`Property`], leaving the
    /// absent ones untouched.
    pub fn update(&mut self, fields: Fields) {
        let Fields {
            address,
            city,
            postal_code,
            category,
            purchase_price,
            construction_year,
            floor_area,
            lot_size,
            purchase_date,
            renovation_cost,
            closing_cost,
            other_cost,
        } = fields;

        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = city {
            self.city = v;
        }
        if let Some(v) = postal_code {
            self.postal_code = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = purchase_price {
            self.purchase_price = v;
        }
        if let Some(v) = construction_year {
            self.construction_year = v;
        }
        if let Some(v) = floor_area {
            self.floor_area = v;
        }
        if let Some(v) = lot_size {
            self.lot_size = v;
        }
        if let Some(v) = purchase_date {
            self.purchase_date = v;
        }
        if let Some(v) = renovation_cost {
            self.renovation_cost = v;
        }
        if let Some(v) = closing_cost {
            self.closing_cost = v;
        }
        if let Some(v) = other_cost {
            self.other_cost = v;
        }
    }
}

/// Partial set of [`Property`] fields, as submitted by a form.
///
/// Absent fields are [`None`] and left untouched on update. Present numeric
/// fields holding `null`, garbage or negative numbers are read as `0`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Fields {
    /// New [`Address`], if it changes.
    #[serde(deserialize_with = "lenient::optional_text")]
    pub address: Option<Option<Address>>,

    /// New [`City`], if it changes.
    #[serde(deserialize_with = "lenient::optional_text")]
    pub city: Option<Option<City>>,

    /// New [`PostalCode`], if it changes.
    #[serde(deserialize_with = "lenient::optional_text")]
    pub postal_code: Option<Option<PostalCode>>,

    /// New [`Category`], if it changes.
    pub category: Option<Category>,

    /// New purchase price, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub purchase_price: Option<Decimal>,

    /// New construction year, if it changes.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub construction_year: Option<u16>,

    /// New floor area, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub floor_area: Option<Decimal>,

    /// New lot size, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub lot_size: Option<Decimal>,

    /// New purchase [`Date`], if it changes.
    #[serde(deserialize_with = "lenient::optional_date")]
    pub purchase_date: Option<Option<Date>>,

    /// New renovation cost, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub renovation_cost: Option<Decimal>,

    /// New closing cost, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub closing_cost: Option<Decimal>,

    /// New other acquisition cost, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub other_cost: Option<Decimal>,
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Category {
        #[doc = "Apartment in a multi-unit building."]
        Apartment = 1,

        #[doc = "Single-family house."]
        House = 2,

        #[doc = "Multi-family residential building."]
        MultiFamily = 3,

        #[doc = "Commercial property."]
        Commercial = 4,
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Apartment
    }
}

/// Street address of a [`Property`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address
            && !address.is_empty()
            && address.len() <= 1024
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

impl TryFrom<String> for Address {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// City a [`Property`] is located in.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct City(String);

impl City {
    /// Creates a new [`City`] if the given `city` is valid.
    #[must_use]
    pub fn new(city: impl Into<String>) -> Option<Self> {
        let city = city.into();
        Self::check(&city).then_some(Self(city))
    }

    /// Checks whether the given `city` is a valid [`City`].
    fn check(city: impl AsRef<str>) -> bool {
        let city = city.as_ref();
        city.trim() == city && !city.is_empty() && city.len() <= 512
    }

    /// Returns the lookup key of this [`City`] in location-keyed tables.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl FromStr for City {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `City`")
    }
}

impl TryFrom<String> for City {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `City`")
    }
}

/// Postal code of a [`Property`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Creates a new [`PostalCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`PostalCode`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        !code.is_empty()
            && code.len() <= 16
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
            && code.trim() == code
    }
}

impl FromStr for PostalCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PostalCode`")
    }
}

impl TryFrom<String> for PostalCode {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `PostalCode`")
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use super::{Category, Fields, Property};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn property() -> Property {
        // 2024-01-01T00:00:00Z
        Property::new(DateTime::from_unix_timestamp(1_704_067_200).unwrap())
    }

    fn fields(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults() {
        let p = property();

        assert_eq!(p.construction_year, 1994);
        assert_eq!(p.category, Category::Apartment);
        assert_eq!(p.total_investment(), Decimal::ZERO);
        assert!(!p.is_populated());
    }

    #[test]
    fn total_investment_follows_every_cost() {
        let mut p = property();

        p.update(fields(
            r#"{
                "purchasePrice": 450000,
                "renovationCost": "20000",
                "closingCost": 45000.5,
                "otherCost": 1500
            }"#,
        ));
        assert_eq!(p.total_investment(), decimal("516500.5"));

        p.update(fields(r#"{"closingCost": null}"#));
        assert_eq!(p.total_investment(), decimal("471500"));

        p.update(fields(r#"{"purchasePrice": "abc", "otherCost": -10}"#));
        assert_eq!(p.total_investment(), decimal("20000"));
    }

    #[test]
    fn oversized_total_investment_is_zero() {
        let mut p = property();
        p.purchase_price = Decimal::MAX;
        p.closing_cost = Decimal::ONE;

        assert_eq!(p.total_investment(), Decimal::ZERO);

        p.update(fields(
            r#"{"purchasePrice": "70000000000000000000000000000"}"#,
        ));
        assert_eq!(p.purchase_price, Decimal::ZERO);
        assert_eq!(p.total_investment(), Decimal::ONE);
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let mut p = property();
        p.update(fields(
            r#"{
                "address": "Hauptstr. 1",
                "city": "Berlin",
                "postalCode": 10115,
                "category": "MULTI_FAMILY",
                "floorArea": 120,
                "purchaseDate": "2024-05-01"
            }"#,
        ));

        p.update(fields(r#"{"floorArea": 95.5}"#));

        assert_eq!(
            p.address.as_ref().map(ToString::to_string).as_deref(),
            Some("Hauptstr. 1"),
        );
        assert_eq!(
            p.city.as_ref().map(ToString::to_string).as_deref(),
            Some("Berlin"),
        );
        assert_eq!(
            p.postal_code.as_ref().map(ToString::to_string).as_deref(),
            Some("10115"),
        );
        assert_eq!(p.category, Category::MultiFamily);
        assert_eq!(p.floor_area, decimal("95.5"));
        assert!(p.purchase_date.is_some());
        assert!(p.is_populated());

        p.update(fields(r#"{"address": ""}"#));
        assert_eq!(p.address, None);
    }

    #[test]
    fn round_trips_through_json() {
        let mut p = property();
        p.update(fields(
            r#"{"address": "Hauptstr. 1", "purchasePrice": "450000.10"}"#,
        ));

        let json = serde_json::to_string(&p).unwrap();
        let back: Property = serde_json::from_str(&json).unwrap();

        assert_eq!(back, p);
    }
}
