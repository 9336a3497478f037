//! [`Command`] for removing a [`RentalUnit`] from a [`Scenario`].

use common::operations::{By, Select, Update};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::RentalUnit;
use crate::{
    domain::{scenario, unit, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for removing a [`RentalUnit`] from a [`Scenario`].
///
/// Removing the last [`RentalUnit`] never seeds a default one again.
#[derive(Clone, Copy, Debug)]
pub struct RemoveUnit {
    /// ID of the [`Scenario`] the [`RentalUnit`] belongs to.
    pub scenario_id: scenario::Id,

    /// ID of the [`RentalUnit`] to remove.
    pub unit_id: unit::Id,
}

impl<Db, Col> Command<RemoveUnit> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RemoveUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveUnit {
            scenario_id,
            unit_id,
        } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        if scenario.remove_unit(unit_id) {
            log::debug!(scenario = %scenario_id, unit = %unit_id, "removed");
        }

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RemoveUnit`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, Command as _},
        domain::scenario::Stage,
    };

    use super::RemoveUnit;

    #[tokio::test]
    async fn never_reseeds_removed_unit() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{"property": {
                "address": "Hauptstr. 1", "city": "Berlin", "floorArea": 85,
                "purchasePrice": 450000
            }}"#,
        )
        .await;
        assert_eq!(s.units().units().len(), 1);
        assert_eq!(
            s.analysis().unwrap().units.total_rent,
            Decimal::from(1148),
        );

        let s = svc
            .execute(RemoveUnit {
                scenario_id: s.id,
                unit_id: s.units().units()[0].id,
            })
            .await
            .unwrap();

        assert!(s.units().is_empty());
        assert_eq!(s.stage(), Stage::Partial);
        assert_eq!(s.analysis().unwrap().units.total_rent, Decimal::ZERO);
        assert!(fixture::stored(&svc, s.id).await.unwrap().units().is_empty());
    }
}
