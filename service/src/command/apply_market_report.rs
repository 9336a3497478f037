//! [`Command`] for applying an already fetched [`MarketReport`] to a
//! [`Scenario`].

use common::operations::{By, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{scenario, MarketReport, Scenario},
    infra::{database, Database},
    Service,
};

use super::{Command, ModificationError};

/// [`Command`] for applying an already fetched [`MarketReport`] to a
/// [`Scenario`].
///
/// The [`MarketReport`] replaces the previous one as a whole.
#[derive(Clone, Debug)]
pub struct ApplyMarketReport {
    /// ID of the [`Scenario`] the [`MarketReport`] should be applied to.
    pub scenario_id: scenario::Id,

    /// [`MarketReport`] to apply.
    pub report: MarketReport,
}

impl<Db, Col> Command<ApplyMarketReport> for Service<Db, Col>
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
        cmd: ApplyMarketReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApplyMarketReport {
            scenario_id,
            report,
        } = cmd;

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

/// Error of [`ApplyMarketReport`] [`Command`] execution.
pub type ExecutionError = ModificationError;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::command::{fixture, Command as _};

    use super::ApplyMarketReport;

    #[tokio::test]
    async fn overrides_projection_rates() {
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
            .execute(ApplyMarketReport {
                scenario_id: s.id,
                report: serde_json::from_str(
                    r#"{"marketTrends": {
                        "annualAppreciation": 5, "rentGrowth": 0
                    }}"#,
                )
                .unwrap(),
            })
            .await
            .unwrap();

        assert!(s.market().is_some());
        let a = s.analysis().unwrap();
        assert_eq!(a.assumptions.appreciation_rate, Decimal::from(5));
        assert_eq!(a.assumptions.rent_growth, Decimal::ZERO);
        assert_eq!(a.projections[0].property_value, Decimal::from(472_500));
        assert_eq!(
            a.projections[0].annual_rental_income,
            Decimal::from(33_600),
        );
    }
}
