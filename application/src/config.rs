//! [`Config`]-related definitions.

use std::{collections::HashMap, time};

use common::Currency;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use rust_decimal::Decimal;
use serde::Deserialize;
use service::{
    domain::{analysis, RentRates},
    infra::{collaborator::tables::MarketData, Tables},
};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service configuration.
    pub service: Service,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Currency of every scenario.
    #[default(Currency::Eur)]
    pub currency: Currency,

    /// Default projection assumptions.
    pub assumptions: Assumptions,

    /// Monthly rent per square meter by city, the built-in table if absent.
    pub rent_rates: Option<HashMap<String, Decimal>>,

    /// Monthly rent per square meter of unknown cities.
    #[default(Decimal::TEN)]
    pub fallback_rent_rate: Decimal,

    /// Market data by city, the built-in table if absent.
    pub market: Option<HashMap<String, MarketData>>,

    /// Maximum time a single market data request may take.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub collaborator_timeout: time::Duration,
}

/// Projection assumptions configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Assumptions {
    /// Annual appreciation of property values, in percent.
    #[default(Decimal::from(3))]
    pub appreciation_rate: Decimal,

    /// Annual rent growth, in percent.
    #[default(Decimal::from(2))]
    pub rent_growth: Decimal,

    /// Annual operating expenses growth, in percent.
    #[default(Decimal::from(2))]
    pub expense_growth: Decimal,

    /// Horizons, in years, the return on investment is reported for.
    #[default(vec![5, 10, 30])]
    pub horizons: Vec<u16>,
}

impl From<Assumptions> for analysis::Assumptions {
    fn from(value: Assumptions) -> Self {
        let Assumptions {
            appreciation_rate,
            rent_growth,
            expense_growth,
            horizons,
        } = value;

        Self {
            appreciation_rate,
            rent_growth,
            expense_growth,
            horizons,
        }
    }
}

impl Service {
    /// Returns the [`RentRates`] of this [`Service`] configuration.
    #[must_use]
    pub fn rent_rates(&self) -> RentRates {
        match &self.rent_rates {
            Some(rates) => RentRates::new(
                rates.iter().map(|(city, rate)| (city.clone(), *rate)),
                self.fallback_rent_rate,
            ),
            None => {
                RentRates::default().with_fallback(self.fallback_rent_rate)
            }
        }
    }
}

impl From<&Service> for Tables {
    fn from(value: &Service) -> Self {
        let rates = value.rent_rates();
        match &value.market {
            Some(market) => Self::new(
                rates,
                market.iter().map(|(city, data)| (city.clone(), *data)),
            ),
            None => Self::default().with_rent_rates(rates),
        }
    }
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let rent_rates = value.rent_rates();
        let Service {
            currency,
            assumptions,
            collaborator_timeout,
            ..
        } = value;

        Self {
            currency,
            assumptions: assumptions.into(),
            rent_rates,
            collaborator_timeout,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
