//! [`Command`] for creating a new [`Scenario`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{scenario, Scenario},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Scenario`].
#[derive(Clone, Debug)]
pub struct CreateScenario {
    /// [`scenario::Name`] of a new [`Scenario`].
    pub name: scenario::Name,

    /// [`scenario::Description`] of a new [`Scenario`].
    pub description: scenario::Description,

    /// [`scenario::Input`] document a new [`Scenario`] is built from.
    pub input: scenario::Input,
}

impl<Db, Col> Command<CreateScenario> for Service<Db, Col>
where
    Db: Database<Insert<Scenario>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateScenario,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateScenario {
            name,
            description,
            input,
        } = cmd;

        let now = DateTime::now();
        let mut scenario = Scenario::new(
            name,
            description,
            self.config().currency,
            input,
            now,
        );
        _ = scenario.recompute(
            &self.config().assumptions,
            &self.config().rent_rates,
            now,
        );

        self.database()
            .execute(Insert(scenario.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            scenario = %scenario.id,
            stage = %scenario.stage(),
            "scenario created",
        );
        Ok(scenario)
    }
}

/// Error of [`CreateScenario`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Currency;
    use rust_decimal::Decimal;

    use crate::{command::fixture, domain::scenario::Stage};

    #[tokio::test]
    async fn creates_analyzed_scenario() {
        let svc = fixture::service();

        let s = fixture::create(
            &svc,
            r#"{
                "property": {"address": "Hauptstr. 1", "city": "Berlin",
                             "purchasePrice": 450000, "floorArea": 85},
                "units": [{"monthlyRent": 2800}, {"monthlyRent": "x"}]
            }"#,
        )
        .await;

        assert_eq!(s.stage(), Stage::Analyzed);
        assert_eq!(s.currency, Currency::Eur);
        assert_eq!(s.units().units().len(), 2);
        assert_eq!(
            s.analysis().unwrap().units.total_rent,
            Decimal::from(2800),
        );

        let stored = fixture::stored(&svc, s.id).await.unwrap();
        assert_eq!(stored.stage(), Stage::Analyzed);
        assert_eq!(stored.analysis(), s.analysis());
    }

    #[tokio::test]
    async fn creates_empty_scenario() {
        let svc = fixture::service();

        let s = fixture::create(&svc, "{}").await;

        assert_eq!(s.stage(), Stage::Empty);
        assert!(s.units().is_empty());
        assert!(!s.analysis().unwrap().is_complete);
    }
}
