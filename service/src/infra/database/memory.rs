//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Delete, Insert, Select, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{scenario, Scenario},
    infra::{database, Database},
};

/// [`Database`] keeping [`Scenario`]s in memory of the current process.
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`Scenario`]s.
    scenarios: Arc<RwLock<HashMap<scenario::Id, Scenario>>>,
}

impl Database<Insert<Scenario>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(scenario): Insert<Scenario>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut scenarios = self.scenarios.write().await;
        if scenarios.contains_key(&scenario.id) {
            return Err(tracerr::new!(database::Error::from(
                Error::AlreadyExists(scenario.id),
            )));
        }
        log::trace!(scenario = %scenario.id, "inserted");
        _ = scenarios.insert(scenario.id, scenario);
        Ok(())
    }
}

impl Database<Update<Scenario>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(scenario): Update<Scenario>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut scenarios = self.scenarios.write().await;
        let stored = scenarios.get_mut(&scenario.id).ok_or_else(|| {
            tracerr::new!(database::Error::from(Error::NotExists(scenario.id)))
        })?;
        log::trace!(scenario = %scenario.id, "updated");
        *stored = scenario;
        Ok(())
    }
}

impl Database<Select<By<Option<Scenario>, scenario::Id>>> for Memory {
    type Ok = Option<Scenario>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Scenario>, scenario::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.scenarios.read().await.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Vec<scenario::Summary>, ()>>> for Memory {
    type Ok = Vec<scenario::Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<scenario::Summary>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut summaries = self
            .scenarios
            .read()
            .await
            .values()
            .map(scenario::Summary::from)
            .collect::<Vec<_>>();
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| {
                    AsRef::<str>::as_ref(&a.name)
                        .cmp(AsRef::<str>::as_ref(&b.name))
                })
        });
        Ok(summaries)
    }
}

impl Database<Delete<By<Scenario, scenario::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Scenario, scenario::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        _ = self.scenarios.write().await.remove(&id).ok_or_else(|| {
            tracerr::new!(database::Error::from(Error::NotExists(id)))
        })?;
        log::trace!(scenario = %id, "deleted");
        Ok(())
    }
}

/// [`Memory`] error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// [`Scenario`] with the same ID is stored already.
    #[display("`Scenario(id: {_0})` already exists")]
    AlreadyExists(#[error(not(source))] scenario::Id),

    /// [`Scenario`] is not stored.
    #[display("`Scenario(id: {_0})` does not exist")]
    NotExists(#[error(not(source))] scenario::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select, Update},
        Currency, DateTime,
    };

    use crate::{
        domain::{
            scenario::{self, Description, Input, Name},
            Scenario,
        },
        infra::{database, Database as _},
    };

    use super::{Error, Memory};

    fn scenario(name: &str, secs: i64) -> Scenario {
        Scenario::new(
            Name::new(name).unwrap(),
            Description::default(),
            Currency::Eur,
            Input::default(),
            DateTime::from_unix_timestamp(1_704_067_200 + secs).unwrap(),
        )
    }

    #[tokio::test]
    async fn stores_scenarios() {
        let db = Memory::default();
        let mut s = scenario("First", 0);
        db.execute(Insert(s.clone())).await.unwrap();

        let found = db
            .execute(Select(By::<Option<Scenario>, _>::new(s.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, s.name);

        s.name = Name::new("Renamed").unwrap();
        db.execute(Update(s.clone())).await.unwrap();
        let found = db
            .clone()
            .execute(Select(By::<Option<Scenario>, _>::new(s.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, s.name);

        db.execute(Delete(By::<Scenario, _>::new(s.id))).await.unwrap();
        assert!(db
            .execute(Select(By::<Option<Scenario>, _>::new(s.id)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rejects_unknown_and_duplicate_scenarios() {
        let db = Memory::default();
        let s = scenario("First", 0);

        let err = db.execute(Update(s.clone())).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            database::Error::Memory(Error::NotExists(id)) if *id == s.id,
        ));
        assert!(db
            .execute(Delete(By::<Scenario, _>::new(s.id)))
            .await
            .is_err());

        db.execute(Insert(s.clone())).await.unwrap();
        let err = db.execute(Insert(s.clone())).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            database::Error::Memory(Error::AlreadyExists(_)),
        ));
    }

    #[tokio::test]
    async fn lists_recently_updated_first() {
        let db = Memory::default();
        for (name, secs) in [
            ("Old", 0),
            ("New", 20),
            ("Zed", 30),
            ("Middle", 10),
            ("Alpha", 30),
        ] {
            db.execute(Insert(scenario(name, secs))).await.unwrap();
        }

        let names = db
            .execute(Select(By::<Vec<scenario::Summary>, _>::new(())))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect::<Vec<_>>();

        assert_eq!(names, ["Alpha", "Zed", "New", "Middle", "Old"]);
    }
}
