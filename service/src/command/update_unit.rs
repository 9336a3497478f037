//! [`Command`] for updating a [`RentalUnit`] of a [`Scenario`].

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

/// [`Command`] for updating a [`RentalUnit`] of a [`Scenario`].
///
/// Absent [`unit::Fields`] are left untouched. Updating a missing
/// [`RentalUnit`] changes nothing.
#[derive(Clone, Debug)]
pub struct UpdateUnit {
    /// ID of the [`Scenario`] the [`RentalUnit`] belongs to.
    pub scenario_id: scenario::Id,

    /// ID of the [`RentalUnit`] to update.
    pub unit_id: unit::Id,

    /// [`unit::Fields`] to update.
    pub update: unit::Fields,
}

impl<Db, Col> Command<UpdateUnit> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUnit {
            scenario_id,
            unit_id,
            update,
        } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        if !scenario.update_unit(unit_id, update) {
            log::debug!(
                scenario = %scenario_id,
                unit = %unit_id,
                "no such unit to update",
            );
        }

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UpdateUnit`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, Command as _},
        domain::unit,
    };

    use super::UpdateUnit;

    #[tokio::test]
    async fn updates_present_fields_only() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"purchasePrice": 450000},
                "units": [{"name": "Ground", "monthlyRent": 1200, "area": 60}]
            }"#,
        )
        .await;
        let id = s.units().units()[0].id;

        let s = svc
            .execute(UpdateUnit {
                scenario_id: s.id,
                unit_id: id,
                update: serde_json::from_str(
                    r#"{"monthlyRent": 1300, "isOccupied": true}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let u = s.units().get(id).unwrap();
        assert_eq!(u.name.to_string(), "Ground");
        assert_eq!(u.area, Decimal::from(60));
        assert!(u.is_occupied);
        assert_eq!(
            s.analysis().unwrap().units.total_rent,
            Decimal::from(1300),
        );
    }

    #[tokio::test]
    async fn ignores_unknown_unit() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{"units": [{"monthlyRent": 1200}]}"#,
        )
        .await;

        let updated = svc
            .execute(UpdateUnit {
                scenario_id: s.id,
                unit_id: unit::Id::new(),
                update: serde_json::from_str(r#"{"monthlyRent": 1}"#)
                    .unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(updated.units(), s.units());
    }
}
