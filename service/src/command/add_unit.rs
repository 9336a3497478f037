//! [`Command`] for adding a new [`RentalUnit`] to a [`Scenario`].

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

/// [`Command`] for adding a new [`RentalUnit`] to a [`Scenario`].
#[derive(Clone, Debug)]
pub struct AddUnit {
    /// ID of the [`Scenario`] the [`RentalUnit`] should be added to.
    pub scenario_id: scenario::Id,

    /// [`unit::Fields`] of the new [`RentalUnit`].
    pub fields: unit::Fields,
}

impl<Db, Col> Command<AddUnit> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = unit::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddUnit {
            scenario_id,
            fields,
        } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        let unit_id = scenario.add_unit(fields);
        log::debug!(scenario = %scenario_id, unit = %unit_id, "unit added");

        _ = self
            .persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(unit_id)
    }
}

/// Error of [`AddUnit`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::command::{fixture, Command as _};

    use super::AddUnit;

    #[tokio::test]
    async fn adds_unit_to_income() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"purchasePrice": 450000},
                "units": [{"monthlyRent": 1200}]
            }"#,
        )
        .await;

        let id = svc
            .execute(AddUnit {
                scenario_id: s.id,
                fields: serde_json::from_str(
                    r#"{"name": "Attic", "monthlyRent": "800", "area": 40}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let s = fixture::stored(&svc, s.id).await.unwrap();
        assert_eq!(s.units().units().len(), 2);
        assert_eq!(s.units().get(id).unwrap().name.to_string(), "Attic");
        let totals = &s.analysis().unwrap().units;
        assert_eq!(totals.total_rent, Decimal::from(2000));
        assert_eq!(totals.total_area, Decimal::from(40));
    }
}
