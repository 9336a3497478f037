//! [`Command`] for updating a [`Budget`] of a [`Scenario`].

use common::operations::{By, Select, Update};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Budget;
use crate::{
    domain::{budget, scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for updating a [`Budget`] of a [`Scenario`].
///
/// Absent [`budget::Fields`] are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateBudget {
    /// ID of the [`Scenario`] which [`Budget`] should be updated.
    pub scenario_id: scenario::Id,

    /// [`budget::Fields`] to update.
    pub update: budget::Fields,
}

impl<Db, Col> Command<UpdateBudget> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateBudget) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBudget {
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

        scenario.update_budget(update);

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UpdateBudget`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::command::{fixture, Command as _};

    use super::UpdateBudget;

    #[tokio::test]
    async fn recomputes_operating_statement() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"purchasePrice": 450000},
                "units": [{"monthlyRent": 2800}]
            }"#,
        )
        .await;

        let s = svc
            .execute(UpdateBudget {
                scenario_id: s.id,
                update: serde_json::from_str(
                    r#"{"propertyTax": 1200, "vacancyRate": "10"}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let statement = &s.analysis().unwrap().budget;
        assert_eq!(statement.operating_expenses, Decimal::from(1200));
        assert_eq!(statement.vacancy_loss, Decimal::from(3360));
        assert_eq!(
            statement.net_operating_income,
            Decimal::from(33_600 - 1200 - 3360),
        );
    }
}
