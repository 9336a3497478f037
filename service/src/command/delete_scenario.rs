//! [`Command`] for deleting a [`Scenario`].

use common::operations::{By, Delete, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for deleting a [`Scenario`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteScenario {
    /// ID of the [`Scenario`] to delete.
    pub scenario_id: scenario::Id,
}

impl<Db, Col> Command<DeleteScenario> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Scenario, scenario::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteScenario,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteScenario { scenario_id } = cmd;

        _ = self
            .database()
            .execute(Select(By::<Option<Scenario>, _>::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Delete(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(scenario = %scenario_id, "scenario deleted");
        Ok(())
    }
}

/// Error of [`DeleteScenario`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use crate::command::{fixture, Command as _};

    use super::{DeleteScenario, ExecutionError};

    #[tokio::test]
    async fn deletes_once() {
        let svc = fixture::service();
        let s = fixture::create(&svc, "{}").await;

        svc.execute(DeleteScenario { scenario_id: s.id })
            .await
            .unwrap();
        assert!(fixture::stored(&svc, s.id).await.is_none());

        let err = svc
            .execute(DeleteScenario { scenario_id: s.id })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ScenarioNotExists(_),
        ));
    }
}
