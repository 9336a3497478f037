//! [`Query`] collection related to a single [`Scenario`].

use common::operations::By;

use crate::domain::{scenario, Scenario};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Scenario`] by its [`scenario::Id`].
pub type ById = DatabaseQuery<By<Option<Scenario>, scenario::Id>>;

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Currency, DateTime};

    use crate::{
        domain::{
            scenario::{self, Description, Input, Name},
            Scenario,
        },
        infra::{Memory, Tables},
        Config, Query as _, Service,
    };

    use super::ById;

    #[tokio::test]
    async fn selects_by_id() {
        let svc = Service::new(
            Config::default(),
            Memory::default(),
            Tables::default(),
        );
        let s = Scenario::new(
            Name::new("Stored").unwrap(),
            Description::default(),
            Currency::Usd,
            Input::default(),
            DateTime::now(),
        );
        svc.database().execute(Insert(s.clone())).await.unwrap();

        let found = svc.execute(ById::by(s.id)).await.unwrap().unwrap();
        assert_eq!(found.currency, Currency::Usd);

        assert!(svc
            .execute(ById::by(scenario::Id::new()))
            .await
            .unwrap()
            .is_none());
    }
}
