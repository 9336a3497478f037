//! [`Command`] for applying a [`RentEstimate`] to a [`RentalUnit`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::RentalUnit;
use crate::{
    domain::{scenario, unit, RentEstimate, Scenario},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for applying a [`RentEstimate`] to a [`RentalUnit`], making
/// its estimated rent the monthly rent of the [`RentalUnit`].
#[derive(Clone, Debug)]
pub struct ApplyRentEstimate {
    /// ID of the [`Scenario`] the [`RentalUnit`] belongs to.
    pub scenario_id: scenario::Id,

    /// ID of the [`RentalUnit`] to apply the [`RentEstimate`] to.
    pub unit_id: unit::Id,

    /// [`RentEstimate`] to apply.
    pub estimate: RentEstimate,
}

impl<Db, Col> Command<ApplyRentEstimate> for Service<Db, Col>
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
        cmd: ApplyRentEstimate,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApplyRentEstimate {
            scenario_id,
            unit_id,
            estimate,
        } = cmd;

        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        if !scenario.apply_rent(unit_id, estimate.estimated_rent) {
            return Err(tracerr::new!(E::UnitNotExists(unit_id)));
        }

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ApplyRentEstimate`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Scenario`] doesn't exist.
    #[display("`Scenario(id: {_0})` does not exist")]
    #[from(ignore)]
    ScenarioNotExists(#[error(not(source))] scenario::Id),

    /// [`RentalUnit`] doesn't exist.
    #[display("`RentalUnit(id: {_0})` does not exist")]
    #[from(ignore)]
    UnitNotExists(#[error(not(source))] unit::Id),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, Command as _, EstimateRent},
        domain::unit,
    };

    use super::{ApplyRentEstimate, ExecutionError};

    #[tokio::test]
    async fn applies_estimated_rent() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"city": "Berlin", "purchasePrice": 450000},
                "units": [{"area": 80, "monthlyRent": 900}]
            }"#,
        )
        .await;
        let id = s.units().units()[0].id;
        let estimate = svc
            .execute(EstimateRent {
                scenario_id: s.id,
                unit_id: id,
            })
            .await
            .unwrap();

        let s = svc
            .execute(ApplyRentEstimate {
                scenario_id: s.id,
                unit_id: id,
                estimate,
            })
            .await
            .unwrap();

        assert_eq!(
            s.units().get(id).unwrap().monthly_rent,
            Decimal::from(1080),
        );
        assert_eq!(
            s.analysis().unwrap().budget.rental_income,
            Decimal::from(12_960),
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_unit() {
        let svc = fixture::service();
        let s = fixture::create(&svc, r#"{"units": [{"area": 80}]}"#).await;

        let err = svc
            .execute(ApplyRentEstimate {
                scenario_id: s.id,
                unit_id: unit::Id::new(),
                estimate: serde_json::from_str(r#"{"estimatedRent": 1}"#)
                    .unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UnitNotExists(_)));
        let stored = fixture::stored(&svc, s.id).await.unwrap();
        assert_eq!(stored.units(), s.units());
    }
}
