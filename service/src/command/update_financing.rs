//! [`Command`] for updating a [`Financing`] of a [`Scenario`].

use common::operations::{By, Select, Update};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Financing;
use crate::{
    domain::{financing, scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for updating a [`Financing`] of a [`Scenario`].
///
/// Absent [`financing::Fields`] are left untouched. A down payment amount
/// is converted into a percentage of the current purchase price.
#[derive(Clone, Debug)]
pub struct UpdateFinancing {
    /// ID of the [`Scenario`] which [`Financing`] should be updated.
    pub scenario_id: scenario::Id,

    /// [`financing::Fields`] to update.
    pub update: financing::Fields,
}

impl<Db, Col> Command<UpdateFinancing> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateFinancing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateFinancing {
            scenario_id,
            update,
        } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        scenario.update_financing(update);

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UpdateFinancing`] [`Command`] execution.
pub type ExecutionError = ModificationError;
