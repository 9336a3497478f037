//! [`Command`] for updating a [`Property`] of a [`Scenario`].

use common::operations::{By, Select, Update};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::{property, scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for updating a [`Property`] of a [`Scenario`].
///
/// Absent [`property::Fields`] are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Scenario`] which [`Property`] should be updated.
    pub scenario_id: scenario::Id,

    /// [`property::Fields`] to update.
    pub update: property::Fields,
}

impl<Db, Col> Command<UpdateProperty> for Service<Db, Col>
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
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
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

        scenario.update_property(update);

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, Command as _},
        domain::{property, scenario},
    };

    use super::{ExecutionError, UpdateProperty};

    #[tokio::test]
    async fn recomputes_on_price_change() {
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
            .execute(UpdateProperty {
                scenario_id: s.id,
                update: serde_json::from_str::<property::Fields>(
                    r#"{"purchasePrice": "300000", "closingCost": 10000}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let a = s.analysis().unwrap();
        assert_eq!(a.total_investment, Decimal::from(310_000));
        assert_eq!(a.loan.principal, Decimal::from(240_000));
        assert_eq!(
            fixture::stored(&svc, s.id).await.unwrap().analysis(),
            Some(a),
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_scenario() {
        let svc = fixture::service();
        let id = scenario::Id::new();

        let err = svc
            .execute(UpdateProperty {
                scenario_id: id,
                update: property::Fields::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ScenarioNotExists(i) if *i == id,
        ));
    }
}
