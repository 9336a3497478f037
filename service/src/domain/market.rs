//! Market data supplied by external collaborators.
//!
//! Both [`MarketReport`] and [`RentEstimate`] are plain snapshots: they are
//! fetched first and applied to a scenario as a whole afterwards.

use std::collections::BTreeSet;

use common::{define_kind, lenient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    property::{Category, City, PostalCode},
    unit::{Feature, RentalUnit},
    Property,
};

/// Market valuation of a [`Property`] and local market trends.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketReport {
    /// Estimated market value of the [`Property`].
    #[serde(deserialize_with = "lenient::non_negative")]
    pub estimated_value: Decimal,

    /// Range the market value is expected to fall into.
    pub value_range: ValueRange,

    /// Market price per square meter.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub price_per_area: Decimal,

    /// Monthly rent the whole [`Property`] could bring.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub potential_monthly_rent: Decimal,

    /// Local [`Trends`].
    pub market_trends: Trends,
}

/// Range of a market value.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ValueRange {
    /// Lower bound.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub min: Decimal,

    /// Upper bound.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub max: Decimal,
}

/// Local market trends.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trends {
    /// Expected annual appreciation of property values, in percent.
    #[serde(deserialize_with = "lenient::decimal")]
    pub annual_appreciation: Decimal,

    /// Expected annual rent growth, in percent.
    #[serde(deserialize_with = "lenient::decimal")]
    pub rent_growth: Decimal,

    /// Human-readable summary of the trends.
    pub summary: String,
}

/// Estimated market rent of a [`RentalUnit`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RentEstimate {
    /// Estimated monthly rent.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub estimated_rent: Decimal,

    /// Range the monthly rent is expected to fall into.
    pub rent_range: RentRange,

    /// Monthly rent per square meter.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub rent_per_area: Decimal,

    /// [`Confidence`] of this estimate.
    pub confidence_level: Confidence,

    /// Sources this estimate is based on.
    pub sources: Vec<String>,

    /// Explanation of how this estimate was made.
    pub explanation: String,

    /// Warning about the current rent exceeding a legal limit, if any.
    pub legal_limit_warning: Option<String>,

    /// Legal limit of the monthly rent, if any.
    #[serde(deserialize_with = "lenient::text")]
    pub legal_limit: Option<Decimal>,
}

/// Range of a monthly rent.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RentRange {
    /// Lower bound.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub low: Decimal,

    /// Upper bound.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub high: Decimal,
}

define_kind! {
    #[doc = "Confidence of a [`RentEstimate`]."]
    enum Confidence {
        #[doc = "Rough guess, e.g. from fallback rates."]
        Low = 1,

        #[doc = "Estimate backed by some local data."]
        Medium = 2,

        #[doc = "Estimate backed by representative local data."]
        High = 3,
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Low
    }
}

/// Location and physical facts of a [`Property`] market data is queried
/// for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// [`City`] of the [`Property`].
    pub city: Option<City>,

    /// [`PostalCode`] of the [`Property`].
    pub postal_code: Option<PostalCode>,

    /// [`Category`] of the [`Property`].
    pub category: Category,

    /// Floor area of the [`Property`].
    pub floor_area: Decimal,

    /// Construction year of the [`Property`].
    pub construction_year: u16,
}

impl From<&Property> for Location {
    fn from(p: &Property) -> Self {
        Self {
            city: p.city.clone(),
            postal_code: p.postal_code.clone(),
            category: p.category,
            floor_area: p.floor_area,
            construction_year: p.construction_year,
        }
    }
}

/// [`RentalUnit`] a [`RentEstimate`] is queried for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subject {
    /// [`Location`] of the [`Property`] the [`RentalUnit`] belongs to.
    pub location: Location,

    /// Floor area of the [`RentalUnit`].
    pub area: Decimal,

    /// Number of bedrooms of the [`RentalUnit`].
    pub bedrooms: u8,

    /// [`Feature`]s of the [`RentalUnit`].
    pub features: BTreeSet<Feature>,

    /// Current monthly rent of the [`RentalUnit`].
    pub monthly_rent: Decimal,
}

impl Subject {
    /// Creates a new [`Subject`] out of the provided [`RentalUnit`] of the
    /// provided [`Property`].
    #[must_use]
    pub fn new(property: &Property, unit: &RentalUnit) -> Self {
        Self {
            location: property.into(),
            area: unit.area,
            bedrooms: unit.bedrooms,
            features: unit.features.clone(),
            monthly_rent: unit.monthly_rent,
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Confidence, MarketReport, RentEstimate};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn reads_market_report() {
        let report: MarketReport = serde_json::from_str(
            r#"{
                "estimatedValue": 480000,
                "valueRange": {"min": "450000", "max": 510000},
                "pricePerArea": 5647.06,
                "potentialMonthlyRent": null,
                "marketTrends": {
                    "annualAppreciation": "2.5",
                    "rentGrowth": 1.8,
                    "summary": "Stable demand"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(report.estimated_value, decimal("480000"));
        assert_eq!(report.value_range.min, decimal("450000"));
        assert_eq!(report.potential_monthly_rent, Decimal::ZERO);
        assert_eq!(report.market_trends.annual_appreciation, decimal("2.5"));
        assert_eq!(report.market_trends.rent_growth, decimal("1.8"));
    }

    #[test]
    fn reads_rent_estimate() {
        let estimate: RentEstimate = serde_json::from_str(
            r#"{
                "estimatedRent": 1150,
                "rentRange": {"low": 1050, "high": 1250},
                "rentPerArea": "13.5",
                "confidenceLevel": "HIGH",
                "sources": ["rent index"],
                "explanation": "Based on the local rent index",
                "legalLimit": "1265"
            }"#,
        )
        .unwrap();

        assert_eq!(estimate.estimated_rent, decimal("1150"));
        assert_eq!(estimate.confidence_level, Confidence::High);
        assert_eq!(estimate.legal_limit, Some(decimal("1265")));
        assert_eq!(estimate.legal_limit_warning, None);
    }
}
