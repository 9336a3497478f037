//! [`Command`] for resetting all the inputs of a [`Scenario`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for resetting all the inputs of a [`Scenario`].
///
/// The [`Scenario`] itself is kept, along with its name and description.
#[derive(Clone, Debug)]
pub struct ResetScenario {
    /// ID of the [`Scenario`] to reset.
    pub scenario_id: scenario::Id,
}

impl<Db, Col> Command<ResetScenario> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ResetScenario) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResetScenario { scenario_id } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        scenario.reset(DateTime::now());

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ResetScenario`] [`Command`] execution.
pub type ExecutionError = ModificationError;
