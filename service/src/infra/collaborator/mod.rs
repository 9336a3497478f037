//! [`Collaborator`]-related implementations.
//!
//! A [`Collaborator`] is an external source of market data. Its results are
//! awaited as a whole and only then applied to a scenario.

pub mod tables;

use std::time::Duration;

use derive_more::{Display, Error as StdError};

pub use self::tables::Tables;

/// External source of market data.
pub use common::Handler as Collaborator;

/// [`Collaborator`] error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// [`Collaborator`] cannot serve requests at the moment.
    #[display("`Collaborator` is unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),

    /// [`Collaborator`] didn't respond in time.
    #[display("`Collaborator` timed out after {_0:?}")]
    TimedOut(#[error(not(source))] Duration),

    /// [`Collaborator`] has no data for the requested location.
    #[display("`Collaborator` has no data for the requested location")]
    NotFound,
}
