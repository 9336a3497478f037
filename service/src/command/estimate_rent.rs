//! [`Command`] for estimating a market rent of a [`RentalUnit`].

use common::operations::{By, Fetch, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::RentalUnit;
use crate::{
    domain::{market::Subject, scenario, unit, RentEstimate, Scenario},
    infra::{collaborator, database, Collaborator, Database},
    Service,
};

use super::Command;

/// [`Command`] for estimating a market rent of a [`RentalUnit`].
///
/// The [`RentEstimate`] is only returned, the [`Scenario`] is left
/// untouched.
#[derive(Clone, Copy, Debug)]
pub struct EstimateRent {
    /// ID of the [`Scenario`] the [`RentalUnit`] belongs to.
    pub scenario_id: scenario::Id,

    /// ID of the [`RentalUnit`] to estimate the rent of.
    pub unit_id: unit::Id,
}

impl<Db, Col> Command<EstimateRent> for Service<Db, Col>
where
    Db: Database<
        Select<By<Option<Scenario>, scenario::Id>>,
        Ok = Option<Scenario>,
        Err = Traced<database::Error>,
    >,
    Col: Collaborator<
        Fetch<By<RentEstimate, Subject>>,
        Ok = RentEstimate,
        Err = Traced<collaborator::Error>,
    >,
{
    type Ok = RentEstimate;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: EstimateRent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EstimateRent {
            scenario_id,
            unit_id,
        } = cmd;

        let scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;
        let unit = scenario
            .units()
            .get(unit_id)
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        let subject = Subject::new(scenario.property(), unit);
        self.fetch::<RentEstimate, _>(subject)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`EstimateRent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Collaborator`] error.
    #[display("`Collaborator` failed: {_0}")]
    Collaborator(collaborator::Error),

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
        command::{fixture, Command as _},
        domain::{market::Confidence, unit},
        infra::collaborator,
    };

    use super::{EstimateRent, ExecutionError};

    #[tokio::test]
    async fn estimates_without_applying() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"city": "Munich", "purchasePrice": 600000},
                "units": [{"area": 50, "monthlyRent": 700}]
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

        assert_eq!(estimate.estimated_rent, Decimal::from(950));
        assert_eq!(estimate.confidence_level, Confidence::Medium);
        let stored = fixture::stored(&svc, s.id).await.unwrap();
        assert_eq!(
            stored.units().get(id).unwrap().monthly_rent,
            Decimal::from(700),
        );
    }

    #[tokio::test]
    async fn reports_missing_data() {
        let svc = fixture::service();
        let s = fixture::create(&svc, r#"{"units": [{"area": 0}]}"#).await;

        let err = svc
            .execute(EstimateRent {
                scenario_id: s.id,
                unit_id: unit::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::UnitNotExists(_)));

        let err = svc
            .execute(EstimateRent {
                scenario_id: s.id,
                unit_id: s.units().units()[0].id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Collaborator(collaborator::Error::NotFound),
        ));
    }
}
