//! [`Collaborator`] answering from static in-process tables.

use std::collections::HashMap;

use common::operations::{By, Fetch};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        market::{
            Confidence, Location, RentRange, Subject, Trends, ValueRange,
        },
        MarketReport, RentEstimate, RentRates,
    },
    infra::{collaborator, Collaborator},
};

/// [`Collaborator`] deriving market data from configured per-city tables.
#[derive(Clone, Debug)]
pub struct Tables {
    /// [`RentRates`] used for rent estimation.
    rent_rates: RentRates,

    /// [`MarketData`] by the lowercase name of a city.
    market: HashMap<String, MarketData>,
}

/// Market data of a single city.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct MarketData {
    /// Expected annual appreciation of property values, in percent.
    pub appreciation: Decimal,

    /// Expected annual rent growth, in percent.
    pub rent_growth: Decimal,

    /// Average price per square meter.
    pub price_per_area: Decimal,
}

impl Tables {
    /// Share of an estimate its range spreads around it, in either
    /// direction.
    const SPREAD: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

    /// Share of the local rent rate a rent may exceed it by before hitting
    /// the legal limit.
    const LEGAL_MARGIN: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

    /// Creates new [`Tables`] out of the provided [`RentRates`] and
    /// `(city, data)` pairs. City names are matched case-insensitively.
    #[must_use]
    pub fn new(
        rent_rates: RentRates,
        market: impl IntoIterator<Item = (String, MarketData)>,
    ) -> Self {
        Self {
            rent_rates,
            market: market
                .into_iter()
                .map(|(city, data)| (city.trim().to_lowercase(), data))
                .collect(),
        }
    }

    /// Replaces the [`RentRates`] of these [`Tables`].
    #[must_use]
    pub fn with_rent_rates(mut self, rent_rates: RentRates) -> Self {
        self.rent_rates = rent_rates;
        self
    }
}

impl Default for Tables {
    fn default() -> Self {
        let market = [
            ("berlin", 30, 25, 5200),
            ("munich", 35, 30, 8900),
            ("münchen", 35, 30, 8900),
            ("hamburg", 25, 20, 6000),
            ("frankfurt", 25, 25, 6200),
            ("cologne", 20, 20, 4500),
            ("köln", 20, 20, 4500),
            ("stuttgart", 20, 20, 5400),
            ("düsseldorf", 20, 15, 4800),
            ("leipzig", 40, 30, 3000),
            ("dresden", 30, 25, 3100),
        ];
        Self::new(
            RentRates::default(),
            market.into_iter().map(|(city, a, r, p)| {
                let data = MarketData {
                    appreciation: Decimal::new(a, 1),
                    rent_growth: Decimal::new(r, 1),
                    price_per_area: Decimal::from(p),
                };
                (city.into(), data)
            }),
        )
    }
}

impl Collaborator<Fetch<By<MarketReport, Location>>> for Tables {
    type Ok = MarketReport;
    type Err = Traced<collaborator::Error>;

    async fn execute(
        &self,
        Fetch(by): Fetch<By<MarketReport, Location>>,
    ) -> Result<Self::Ok, Self::Err> {
        let location = by.into_inner();
        let (city, data) = location
            .city
            .as_ref()
            .and_then(|c| Some((c, self.market.get(&c.key())?)))
            .ok_or_else(|| tracerr::new!(collaborator::Error::NotFound))?;

        let estimated_value = whole(data.price_per_area * location.floor_area);
        let spread = whole(estimated_value * Self::SPREAD);
        let report = MarketReport {
            estimated_value,
            value_range: ValueRange {
                min: estimated_value - spread,
                max: estimated_value + spread,
            },
            price_per_area: data.price_per_area,
            potential_monthly_rent: whole(
                self.rent_rates.rate(Some(city)) * location.floor_area,
            ),
            market_trends: Trends {
                annual_appreciation: data.appreciation,
                rent_growth: data.rent_growth,
                summary: format!(
                    "{city}: property values are expected to grow by {}% \
                     and rents by {}% a year",
                    data.appreciation, data.rent_growth,
                ),
            },
        };
        log::debug!(
            %city,
            estimated_value = %report.estimated_value,
            "market report compiled",
        );
        Ok(report)
    }
}

impl Collaborator<Fetch<By<RentEstimate, Subject>>> for Tables {
    type Ok = RentEstimate;
    type Err = Traced<collaborator::Error>;

    async fn execute(
        &self,
        Fetch(by): Fetch<By<RentEstimate, Subject>>,
    ) -> Result<Self::Ok, Self::Err> {
        let subject = by.into_inner();
        if subject.area <= Decimal::ZERO {
            return Err(tracerr::new!(collaborator::Error::NotFound));
        }
        let city = subject.location.city.as_ref();

        let known = self.rent_rates.lookup(city);
        let rent_per_area = known.unwrap_or_else(|| self.rent_rates.rate(None));
        let estimated_rent = whole(rent_per_area * subject.area);
        let spread = whole(estimated_rent * Self::SPREAD);
        let legal_limit = known.map(|rate| {
            (rate * Self::LEGAL_MARGIN * subject.area).round_dp_with_strategy(
                2,
                RoundingStrategy::MidpointAwayFromZero,
            )
        });

        let (confidence_level, sources, explanation) = match (known, city) {
            (Some(_), Some(city)) => (
                if subject.location.postal_code.is_some() {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
                vec![format!("Local rent rates of {city}")],
                format!(
                    "{} m² at the local rate of {rent_per_area} per m²",
                    subject.area,
                ),
            ),
            _ => (
                Confidence::Low,
                vec!["Fallback rent rate".to_owned()],
                format!(
                    "{} m² at the fallback rate of {rent_per_area} per m², \
                     as no local data is known",
                    subject.area,
                ),
            ),
        };
        let legal_limit_warning = legal_limit
            .filter(|limit| subject.monthly_rent > *limit)
            .map(|limit| {
                format!(
                    "Current rent of {} exceeds the legal limit of {limit}",
                    subject.monthly_rent,
                )
            });

        Ok(RentEstimate {
            estimated_rent,
            rent_range: RentRange {
                low: estimated_rent - spread,
                high: estimated_rent + spread,
            },
            rent_per_area,
            confidence_level,
            sources,
            explanation,
            legal_limit_warning,
            legal_limit,
        })
    }
}

/// Rounds the provided amount to whole currency units.
fn whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::operations::{By, Fetch};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            market::{Confidence, Location, Subject},
            property::{Category, City, PostalCode},
            MarketReport, RentEstimate,
        },
        infra::{collaborator, Collaborator as _},
    };

    use super::Tables;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn location(city: &str, postal_code: Option<&str>) -> Location {
        Location {
            city: City::new(city),
            postal_code: postal_code.and_then(PostalCode::new),
            category: Category::Apartment,
            floor_area: decimal("100"),
            construction_year: 1990,
        }
    }

    fn subject(location: Location, rent: &str) -> Subject {
        Subject {
            location,
            area: decimal("80"),
            bedrooms: 2,
            features: BTreeSet::new(),
            monthly_rent: decimal(rent),
        }
    }

    #[tokio::test]
    async fn compiles_market_report() {
        let report = Tables::default()
            .execute(Fetch(By::<MarketReport, _>::new(location(
                "BERLIN", None,
            ))))
            .await
            .unwrap();

        assert_eq!(report.estimated_value, decimal("520000"));
        assert_eq!(report.value_range.min, decimal("468000"));
        assert_eq!(report.value_range.max, decimal("572000"));
        assert_eq!(report.potential_monthly_rent, decimal("1350"));
        assert_eq!(report.market_trends.annual_appreciation, decimal("3"));
        assert_eq!(report.market_trends.rent_growth, decimal("2.5"));
    }

    #[tokio::test]
    async fn unknown_city_has_no_market_report() {
        let err = Tables::default()
            .execute(Fetch(By::<MarketReport, _>::new(location(
                "Atlantis", None,
            ))))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), collaborator::Error::NotFound));
    }

    #[tokio::test]
    async fn estimates_rent_from_local_rates() {
        let tables = Tables::default();

        let estimate = tables
            .execute(Fetch(By::<RentEstimate, _>::new(subject(
                location("Berlin", Some("10115")),
                "1000",
            ))))
            .await
            .unwrap();
        assert_eq!(estimate.estimated_rent, decimal("1080"));
        assert_eq!(estimate.rent_range.low, decimal("972"));
        assert_eq!(estimate.rent_range.high, decimal("1188"));
        assert_eq!(estimate.rent_per_area, decimal("13.5"));
        assert_eq!(estimate.confidence_level, Confidence::High);
        assert_eq!(estimate.legal_limit, Some(decimal("1188")));
        assert_eq!(estimate.legal_limit_warning, None);

        let estimate = tables
            .execute(Fetch(By::<RentEstimate, _>::new(subject(
                location("Berlin", None),
                "1300",
            ))))
            .await
            .unwrap();
        assert_eq!(estimate.confidence_level, Confidence::Medium);
        assert!(estimate.legal_limit_warning.is_some());
    }

    #[tokio::test]
    async fn falls_back_for_unknown_locations() {
        let estimate = Tables::default()
            .execute(Fetch(By::<RentEstimate, _>::new(subject(
                location("Atlantis", None),
                "5000",
            ))))
            .await
            .unwrap();

        assert_eq!(estimate.estimated_rent, decimal("800"));
        assert_eq!(estimate.confidence_level, Confidence::Low);
        assert_eq!(estimate.legal_limit, None);
        assert_eq!(estimate.legal_limit_warning, None);
    }

    #[tokio::test]
    async fn empty_unit_has_no_estimate() {
        let mut s = subject(location("Berlin", None), "0");
        s.area = Decimal::ZERO;

        let err = Tables::default()
            .execute(Fetch(By::<RentEstimate, _>::new(s)))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), collaborator::Error::NotFound));
    }
}
