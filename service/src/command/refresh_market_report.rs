//! [`Command`] for refreshing a [`MarketReport`] of a [`Scenario`].

use common::operations::{By, Fetch, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{market::Location, scenario, MarketReport, Scenario},
    infra::{collaborator, database, Collaborator, Database},
    Service,
};

use super::Command;

/// [`Command`] for refreshing a [`MarketReport`] of a [`Scenario`] from the
/// [`Collaborator`].
///
/// The [`Scenario`] is modified only once the whole [`MarketReport`] has
/// arrived, and is left untouched if fetching it fails.
#[derive(Clone, Copy, Debug)]
pub struct RefreshMarketReport {
    /// ID of the [`Scenario`] to refresh the [`MarketReport`] of.
    pub scenario_id: scenario::Id,
}

impl<Db, Col> Command<RefreshMarketReport> for Service<Db, Col>
where
    Db: Database<
            Select<By<Option<Scenario>, scenario::Id>>,
            Ok = Option<Scenario>,
            Err = Traced<database::Error>,
        > + Database<Update<Scenario>, Ok = (), Err = Traced<database::Error>>,
    Col: Collaborator<
        Fetch<By<MarketReport, Location>>,
        Ok = MarketReport,
        Err = Traced<collaborator::Error>,
    >,
{
    type Ok = Scenario;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RefreshMarketReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefreshMarketReport { scenario_id } = cmd;

        let scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;

        let location = Location::from(scenario.property());
        let report = self
            .fetch::<MarketReport, _>(location)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::debug!(
            scenario = %scenario_id,
            estimated_value = %report.estimated_value,
            "market report fetched",
        );

        // Re-read, as the `Scenario` may have changed while fetching.
        let mut scenario = self
            .database()
            .execute(Select(By::new(scenario_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScenarioNotExists(scenario_id))
            .map_err(tracerr::wrap!())?;
        scenario.apply_market_report(report);

        self.persist(scenario)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RefreshMarketReport`] [`Command`] execution.
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
}

#[cfg(test)]
mod spec {
    use std::{future, time::Duration};

    use common::operations::{By, Fetch};
    use rust_decimal::Decimal;
    use tracerr::Traced;

    use crate::{
        command::{fixture, Command as _, CreateScenario},
        domain::{
            market::Location,
            scenario::{Description, Name, Stage},
            MarketReport,
        },
        infra::{collaborator, Collaborator, Memory},
        Config, Service,
    };

    use super::{ExecutionError, RefreshMarketReport};

    /// [`Collaborator`] never answering.
    #[derive(Clone, Copy, Debug)]
    struct Stalled;

    impl Collaborator<Fetch<By<MarketReport, Location>>> for Stalled {
        type Ok = MarketReport;
        type Err = Traced<collaborator::Error>;

        async fn execute(
            &self,
            _: Fetch<By<MarketReport, Location>>,
        ) -> Result<Self::Ok, Self::Err> {
            future::pending().await
        }
    }

    #[tokio::test]
    async fn applies_fetched_report() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{
                "property": {"city": "Leipzig", "floorArea": 100,
                             "purchasePrice": 300000},
                "units": [{"monthlyRent": 1500}]
            }"#,
        )
        .await;

        let s = svc
            .execute(RefreshMarketReport { scenario_id: s.id })
            .await
            .unwrap();

        let report = s.market().unwrap();
        assert_eq!(report.estimated_value, Decimal::from(300_000));
        let a = s.analysis().unwrap();
        assert_eq!(a.assumptions.appreciation_rate, Decimal::from(4));
        assert_eq!(a.assumptions.rent_growth, Decimal::from(3));
        assert_eq!(s.stage(), Stage::Analyzed);
    }

    #[tokio::test]
    async fn leaves_scenario_untouched_on_failure() {
        let svc = fixture::service();
        let s = fixture::create(
            &svc,
            r#"{"property": {"city": "Atlantis", "purchasePrice": 1}}"#,
        )
        .await;

        let err = svc
            .execute(RefreshMarketReport { scenario_id: s.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Collaborator(collaborator::Error::NotFound),
        ));
        let stored = fixture::stored(&svc, s.id).await.unwrap();
        assert!(stored.market().is_none());
        assert_eq!(stored.updated_at, s.updated_at);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out() {
        let timeout = Duration::from_secs(3);
        let svc = Service::new(
            Config {
                collaborator_timeout: timeout,
                ..Config::default()
            },
            Memory::default(),
            Stalled,
        );
        let s = svc
            .execute(CreateScenario {
                name: Name::new("Test").unwrap(),
                description: Description::default(),
                input: serde_json::from_str(
                    r#"{"property": {"city": "Berlin"}}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(RefreshMarketReport { scenario_id: s.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Collaborator(collaborator::Error::TimedOut(d))
                if *d == timeout,
        ));
    }
}
