//! [`Command`] definition.

pub mod add_unit;
pub mod apply_market_report;
pub mod apply_rent_estimate;
pub mod create_scenario;
pub mod delete_scenario;
pub mod estimate_rent;
pub mod refresh_market_report;
pub mod remove_unit;
pub mod reset_scenario;
pub mod update_budget;
pub mod update_financing;
pub mod update_property;
pub mod update_unit;

use common::{
    operations::{By, Fetch, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{scenario, Scenario},
    infra::{collaborator, database, Collaborator, Database},
    Service,
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_unit::AddUnit, apply_market_report::ApplyMarketReport,
    apply_rent_estimate::ApplyRentEstimate, create_scenario::CreateScenario,
    delete_scenario::DeleteScenario, estimate_rent::EstimateRent,
    refresh_market_report::RefreshMarketReport, remove_unit::RemoveUnit,
    reset_scenario::ResetScenario, update_budget::UpdateBudget,
    update_financing::UpdateFinancing, update_property::UpdateProperty,
    update_unit::UpdateUnit,
};

impl<Db, Col> Service<Db, Col> {
    /// Runs the recompute pipeline of the provided [`Scenario`] and persists
    /// it along with its fresh [`Analysis`].
    ///
    /// [`Analysis`]: crate::domain::Analysis
    async fn persist(
        &self,
        mut scenario: Scenario,
    ) -> Result<Scenario, Traced<database::Error>>
    where
        Db: Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
    {
        let id = scenario.id;
        let analysis = scenario.recompute(
            &self.config().assumptions,
            &self.config().rent_rates,
            DateTime::now(),
        );
        log::debug!(
            scenario = %id,
            complete = analysis.is_complete,
            monthly_cash_flow = %analysis.cash_flow.monthly,
            "scenario recomputed",
        );

        self.database()
            .execute(Update(scenario.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(scenario)
    }

    /// Fetches a `W` by the provided `B` from the [`Collaborator`], waiting
    /// for it no longer than the configured timeout.
    async fn fetch<W, B>(
        &self,
        by: B,
    ) -> Result<W, Traced<collaborator::Error>>
    where
        Col: Collaborator<
            Fetch<By<W, B>>,
            Ok = W,
            Err = Traced<collaborator::Error>,
        >,
    {
        let timeout = self.config().collaborator_timeout;
        tokio::time::timeout(
            timeout,
            self.collaborator().execute(Fetch(By::new(by))),
        )
        .await
        .map_err(|_| {
            log::warn!(?timeout, "`Collaborator` timed out");
            tracerr::new!(collaborator::Error::TimedOut(timeout))
        })?
        .map_err(tracerr::wrap!())
    }
}

/// Error of a [`Command`] modifying an existing [`Scenario`].
#[derive(Debug, Display, Error, From)]
pub enum ModificationError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Scenario`] doesn't exist.
    #[display("`Scenario(id: {_0})` does not exist")]
    #[from(ignore)]
    ScenarioNotExists(#[error(not(source))] scenario::Id),
}
