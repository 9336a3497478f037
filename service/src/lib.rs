//! Service contains the investment analysis engine of the application.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;

use std::time::Duration;

use common::Currency;
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::{Collaborator, Database};

use self::domain::{Assumptions, RentRates};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// [`Currency`] of newly created [`Scenario`]s.
    ///
    /// [`Scenario`]: domain::Scenario
    #[default(Currency::Eur)]
    pub currency: Currency,

    /// Default [`Assumptions`] of every projection.
    pub assumptions: Assumptions,

    /// [`RentRates`] default units are seeded with.
    pub rent_rates: RentRates,

    /// Maximum time a single [`Collaborator`] call may take.
    #[default(Duration::from_secs(5))]
    pub collaborator_timeout: Duration,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Col> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Collaborator`] of this [`Service`].
    collaborator: Col,
}

impl<Db, Col> Service<Db, Col> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, collaborator: Col) -> Self {
        Self {
            config,
            database,
            collaborator,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Collaborator`] of this [`Service`].
    #[must_use]
    pub fn collaborator(&self) -> &Col {
        &self.collaborator
    }
}
