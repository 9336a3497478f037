//! Domain definitions.

pub mod analysis;
pub mod budget;
pub mod financing;
pub mod market;
pub mod property;
pub mod scenario;
pub mod unit;

pub use self::{
    analysis::{Analysis, Assumptions},
    budget::Budget,
    financing::{Financing, Loan},
    market::{MarketReport, RentEstimate},
    property::Property,
    scenario::Scenario,
    unit::{RentRates, RentalUnit, Roster},
};
