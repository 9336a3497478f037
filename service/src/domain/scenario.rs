//! [`Scenario`] definitions.

use common::{define_kind, unit, Currency, DateTime, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing as log;
use uuid::Uuid;

use super::{
    analysis::{self, Analysis, Assumptions, Inputs},
    budget, financing,
    market::MarketReport,
    property,
    unit::{self as rental, RentRates},
    Budget, Financing, Property, Roster,
};

/// Investment scenario: a [`Property`] with its units, [`Financing`] and
/// [`Budget`], along with the latest [`Analysis`] of them.
///
/// Inputs are only mutated through the methods of a [`Scenario`], each of
/// them marking the [`Analysis`] as outdated until the next
/// [`Scenario::recompute()`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// ID of this [`Scenario`].
    pub id: Id,

    /// [`Name`] of this [`Scenario`].
    pub name: Name,

    /// [`Description`] of this [`Scenario`].
    pub description: Description,

    /// [`Currency`] all the amounts of this [`Scenario`] are in.
    pub currency: Currency,

    /// Analysed [`Property`].
    property: Property,

    /// [`Roster`] of the units of the [`Property`].
    units: Roster,

    /// [`Financing`] of the purchase.
    financing: Financing,

    /// Operating [`Budget`].
    budget: Budget,

    /// Latest applied [`MarketReport`], if any.
    market: Option<MarketReport>,

    /// Latest [`Analysis`], if any.
    analysis: Option<Analysis>,

    /// Indicator whether any input changed since the latest [`Analysis`].
    #[serde(default)]
    stale: bool,

    /// [`DateTime`] when this [`Scenario`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the inputs of this [`Scenario`] last changed.
    pub updated_at: ModificationDateTime,
}

impl Scenario {
    /// Creates a new [`Scenario`] out of the provided [`Input`] document.
    ///
    /// The returned [`Scenario`] is not analysed yet.
    #[must_use]
    pub fn new(
        name: Name,
        description: Description,
        currency: Currency,
        input: Input,
        now: DateTime,
    ) -> Self {
        let mut this = Self {
            id: Id::new(),
            name,
            description,
            currency,
            property: Property::new(now),
            units: Roster::default(),
            financing: Financing::default(),
            budget: Budget::default(),
            market: None,
            analysis: None,
            stale: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let Input {
            property,
            units,
            financing,
            budget,
            market,
        } = input;
        this.update_property(property);
        for fields in units {
            _ = this.add_unit(fields);
        }
        this.update_financing(financing);
        this.update_budget(budget);
        if let Some(report) = market {
            this.apply_market_report(report);
        }
        this
    }

    /// Returns the [`Property`] of this [`Scenario`].
    #[must_use]
    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Returns the [`Roster`] of this [`Scenario`].
    #[must_use]
    pub fn units(&self) -> &Roster {
        &self.units
    }

    /// Returns the [`Financing`] of this [`Scenario`].
    #[must_use]
    pub fn financing(&self) -> &Financing {
        &self.financing
    }

    /// Returns the [`Budget`] of this [`Scenario`].
    #[must_use]
    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Returns the applied [`MarketReport`] of this [`Scenario`], if any.
    #[must_use]
    pub fn market(&self) -> Option<&MarketReport> {
        self.market.as_ref()
    }

    /// Returns the latest [`Analysis`] of this [`Scenario`], if any.
    ///
    /// It is outdated if the [`Stage`] is not [`Stage::Analyzed`].
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Returns the current [`Stage`] of this [`Scenario`].
    #[must_use]
    pub fn stage(&self) -> Stage {
        if !self.property.is_populated() {
            Stage::Empty
        } else if self.units.is_empty() {
            Stage::Partial
        } else if self.analysis.is_some() && !self.stale {
            Stage::Analyzed
        } else {
            Stage::Ready
        }
    }

    /// Updates the [`Property`] of this [`Scenario`].
    pub fn update_property(&mut self, fields: property::Fields) {
        self.property.update(fields);
        self.stale = true;
    }

    /// Adds a new unit to this [`Scenario`].
    pub fn add_unit(&mut self, fields: rental::Fields) -> rental::Id {
        self.stale = true;
        self.units.add(fields)
    }

    /// Updates the unit with the provided [`rental::Id`].
    ///
    /// Returns `false` if there is no such unit, leaving this [`Scenario`]
    /// untouched.
    pub fn update_unit(
        &mut self,
        id: rental::Id,
        fields: rental::Fields,
    ) -> bool {
        let updated = self.units.update(id, fields);
        self.stale |= updated;
        updated
    }

    /// Removes the unit with the provided [`rental::Id`].
    ///
    /// Returns `false` if there is no such unit.
    pub fn remove_unit(&mut self, id: rental::Id) -> bool {
        let removed = self.units.remove(id);
        self.stale |= removed;
        removed
    }

    /// Sets the monthly rent of the unit with the provided [`rental::Id`].
    ///
    /// Returns `false` if there is no such unit.
    pub fn apply_rent(&mut self, id: rental::Id, rent: Decimal) -> bool {
        let applied = self.units.set_rent(id, rent);
        self.stale |= applied;
        applied
    }

    /// Updates the [`Financing`] of this [`Scenario`].
    pub fn update_financing(&mut self, fields: financing::Fields) {
        self.financing.update(fields, self.property.purchase_price);
        self.stale = true;
    }

    /// Updates the [`Budget`] of this [`Scenario`].
    pub fn update_budget(&mut self, fields: budget::Fields) {
        self.budget.update(fields);
        self.stale = true;
    }

    /// Applies the provided [`MarketReport`] to this [`Scenario`], replacing
    /// the previous one.
    pub fn apply_market_report(&mut self, report: MarketReport) {
        self.market = Some(report);
        self.stale = true;
    }

    /// Resets all the inputs of this [`Scenario`] to their defaults,
    /// discarding the latest [`Analysis`].
    pub fn reset(&mut self, now: DateTime) {
        self.property = Property::new(now);
        self.units = Roster::default();
        self.financing = Financing::default();
        self.budget = Budget::default();
        self.market = None;
        self.analysis = None;
        self.stale = true;
    }

    /// Runs the whole recomputation pipeline of this [`Scenario`]: units are
    /// seeded from the [`Property`] if needed, then the [`Analysis`] is
    /// replaced with a fresh one.
    pub fn recompute(
        &mut self,
        assumptions: &Assumptions,
        rates: &RentRates,
        now: DateTime,
    ) -> &Analysis {
        if let Some(id) = self.units.seed(&self.property, rates) {
            log::debug!(
                scenario = %self.id,
                unit = %id,
                "default unit seeded",
            );
            self.stale = true;
        }

        let analysis = analysis::analyze(
            Inputs {
                property: &self.property,
                roster: &self.units,
                financing: &self.financing,
                budget: &self.budget,
            },
            &assumptions.with_market(self.market.as_ref()),
            now,
        );
        if self.stale {
            self.updated_at = now.coerce();
        }
        self.stale = false;
        self.analysis.insert(analysis)
    }
}

/// Input document a [`Scenario`] is created from.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Input {
    /// [`Property`] fields.
    pub property: property::Fields,

    /// Fields of every unit.
    pub units: Vec<rental::Fields>,

    /// [`Financing`] fields.
    pub financing: financing::Fields,

    /// [`Budget`] fields.
    pub budget: budget::Fields,

    /// Already fetched [`MarketReport`], if any.
    pub market: Option<MarketReport>,
}

/// ID of a [`Scenario`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Scenario`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Free-text description of a [`Scenario`]. May be empty.
#[derive(
    AsRef,
    Clone,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Description(String);

impl Description {
    /// Maximum length of a [`Description`] in bytes.
    pub const MAX_LEN: usize = 4096;

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.len() <= Self::MAX_LEN).then_some(Self(text))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

impl TryFrom<String> for Description {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

define_kind! {
    #[doc = "Stage of a [`Scenario`]."]
    enum Stage {
        #[doc = "Nothing about the [`Property`] is known yet."]
        Empty = 1,

        #[doc = "The [`Property`] is known, but has no units."]
        Partial = 2,

        #[doc = "All the inputs are present, the [`Analysis`] is outdated."]
        Ready = 3,

        #[doc = "The [`Analysis`] reflects the current inputs."]
        Analyzed = 4,
    }
}

/// Short overview of a [`Scenario`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// ID of the [`Scenario`].
    pub id: Id,

    /// [`Name`] of the [`Scenario`].
    pub name: Name,

    /// [`Stage`] of the [`Scenario`].
    pub stage: Stage,

    /// Total investment into the [`Property`].
    pub total_investment: Decimal,

    /// Monthly cash flow of the latest [`Analysis`], if any.
    pub monthly_cash_flow: Option<Decimal>,

    /// [`DateTime`] when the inputs of the [`Scenario`] last changed.
    pub updated_at: ModificationDateTime,
}

impl From<&Scenario> for Summary {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            stage: s.stage(),
            total_investment: s.property.total_investment(),
            monthly_cash_flow: s
                .analysis
                .as_ref()
                .map(|a| a.cash_flow.monthly),
            updated_at: s.updated_at,
        }
    }
}

/// [`DateTime`] when a [`Scenario`] was created.
pub type CreationDateTime = DateTimeOf<(Scenario, unit::Creation)>;

/// [`DateTime`] when a [`Scenario`] was modified.
pub type ModificationDateTime = DateTimeOf<(Scenario, unit::Modification)>;
