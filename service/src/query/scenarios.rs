//! [`Query`] collection related to the multiple [`Scenario`]s.

use common::operations::By;

use crate::domain::scenario;
#[cfg(doc)]
use crate::{domain::Scenario, Query};

use super::DatabaseQuery;

/// Queries [`scenario::Summary`] of every [`Scenario`], the most recently
/// updated first.
pub type List = DatabaseQuery<By<Vec<scenario::Summary>, ()>>;
