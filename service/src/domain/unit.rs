//! [`RentalUnit`] and [`Roster`] definitions.

use std::collections::{BTreeSet, HashMap};

use common::{define_kind, lenient, ratio, Date};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{property::City, Property};

/// Rentable unit of a [`Property`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalUnit {
    /// ID of this [`RentalUnit`].
    pub id: Id,

    /// [`Name`] of this [`RentalUnit`].
    pub name: Name,

    /// Floor area of this [`RentalUnit`] in square meters.
    pub area: Decimal,

    /// Number of bedrooms in this [`RentalUnit`].
    pub bedrooms: u8,

    /// Number of bathrooms in this [`RentalUnit`].
    pub bathrooms: u8,

    /// Monthly rent of this [`RentalUnit`].
    pub monthly_rent: Decimal,

    /// Indicator whether this [`RentalUnit`] is currently rented out.
    pub is_occupied: bool,

    /// [`Tenant`] of this [`RentalUnit`], if any.
    pub tenant: Option<Tenant>,

    /// Free-form notes about this [`RentalUnit`].
    pub notes: String,

    /// [`Feature`]s of this [`RentalUnit`].
    pub features: BTreeSet<Feature>,
}

impl RentalUnit {
    /// Applies the present [`Fields`] to this [`RentalUnit`].
    fn update(&mut self, fields: Fields) {
        let Fields {
            name,
            area,
            bedrooms,
            bathrooms,
            monthly_rent,
            is_occupied,
            tenant,
            notes,
            features,
        } = fields;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = area {
            self.area = v;
        }
        if let Some(v) = bedrooms {
            self.bedrooms = v;
        }
        if let Some(v) = bathrooms {
            self.bathrooms = v;
        }
        if let Some(v) = monthly_rent {
            self.monthly_rent = v;
        }
        if let Some(v) = is_occupied {
            self.is_occupied = v;
        }
        if let Some(v) = tenant {
            self.tenant = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = features {
            self.features = v;
        }
    }
}

/// ID of a [`RentalUnit`].
///
/// Ordered by creation time and never reused after a deletion.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new unique [`Id`] out of the current time and random bits.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Display name of a [`RentalUnit`].
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

    /// Creates the default [`Name`] of the `n`th [`RentalUnit`].
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        Self(format!("Unit {n}"))
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

/// Tenant and lease details of an occupied [`RentalUnit`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tenant {
    /// Name of the tenant.
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,

    /// [`Date`] the lease started.
    #[serde(deserialize_with = "lenient::date")]
    pub lease_start: Option<Date>,

    /// [`Date`] the lease ends, if it is fixed-term.
    #[serde(deserialize_with = "lenient::date")]
    pub lease_end: Option<Date>,

    /// Security deposit held for the lease.
    #[serde(deserialize_with = "lenient::non_negative")]
    pub deposit: Decimal,
}

define_kind! {
    #[doc = "Feature of a [`RentalUnit`]."]
    enum Feature {
        #[doc = "Balcony or terrace."]
        Balcony = 1,

        #[doc = "Private garden."]
        Garden = 2,

        #[doc = "Parking space."]
        Parking = 3,

        #[doc = "Elevator in the building."]
        Elevator = 4,

        #[doc = "Furnished unit."]
        Furnished = 5,

        #[doc = "Modern fitted kitchen."]
        ModernKitchen = 6,

        #[doc = "Floor heating."]
        FloorHeating = 7,

        #[doc = "Air conditioning."]
        AirConditioning = 8,
    }
}

/// Partial set of [`RentalUnit`] fields, as submitted by a form.
///
/// Absent fields are [`None`]: left untouched on update and defaulted on
/// creation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Fields {
    /// New [`Name`], if it changes.
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<Name>,

    /// New floor area, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub area: Option<Decimal>,

    /// New number of bedrooms, if it changes.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub bedrooms: Option<u8>,

    /// New number of bathrooms, if it changes.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub bathrooms: Option<u8>,

    /// New monthly rent, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub monthly_rent: Option<Decimal>,

    /// New occupancy, if it changes.
    pub is_occupied: Option<bool>,

    /// New [`Tenant`], if it changes. `null` removes the current one.
    #[serde(deserialize_with = "present")]
    pub tenant: Option<Option<Tenant>>,

    /// New notes, if they change.
    pub notes: Option<String>,

    /// New set of [`Feature`]s, if it changes.
    #[serde(deserialize_with = "features")]
    pub features: Option<BTreeSet<Feature>>,
}

/// Deserializes a present, possibly `null`, field of a partial update.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(d).map(Some)
}

/// Deserializes a present set of [`Feature`]s, skipping unknown ones.
///
/// Labels are matched case-insensitively, with spaces and hyphens read as
/// underscores. A single label is read as a one-element set.
fn features<'de, D>(d: D) -> Result<Option<BTreeSet<Feature>>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = match Option::<Labels>::deserialize(d)? {
        Some(Labels::Many(labels)) => labels,
        Some(Labels::One(label)) => vec![label],
        None => vec![],
    };
    Ok(Some(
        labels
            .into_iter()
            .filter_map(|Label(l)| {
                l?.replace([' ', '-'], "_").to_uppercase().parse().ok()
            })
            .collect(),
    ))
}

/// [`Feature`] labels of a form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Labels {
    /// List of labels.
    Many(Vec<Label>),

    /// Single label.
    One(Label),
}

/// Single [`Feature`] label of a form, [`None`] if it is not textual.
#[derive(Deserialize)]
#[serde(transparent)]
struct Label(#[serde(deserialize_with = "lenient::text")] Option<String>);

/// Aggregates over all the [`RentalUnit`]s of a [`Roster`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Number of [`RentalUnit`]s.
    pub count: u32,

    /// Total number of bedrooms.
    pub total_bedrooms: u32,

    /// Total number of bathrooms.
    pub total_bathrooms: u32,

    /// Total floor area.
    pub total_area: Decimal,

    /// Total monthly rent.
    pub total_rent: Decimal,

    /// Number of occupied [`RentalUnit`]s.
    pub occupied_count: u32,

    /// Share of occupied [`RentalUnit`]s in percent.
    pub occupancy_rate: Decimal,
}

/// Set of the [`RentalUnit`]s belonging to a [`Property`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// [`RentalUnit`]s in their creation order.
    units: Vec<RentalUnit>,

    /// Indicator whether this [`Roster`] has ever held a [`RentalUnit`].
    ///
    /// A [`Roster`] is seeded with a default [`RentalUnit`] only while this
    /// is `false`, so emptying it never brings the default back.
    ever_populated: bool,
}

impl Roster {
    /// Floor area, in square meters, assumed per bedroom of a seeded
    /// [`RentalUnit`].
    const AREA_PER_BEDROOM: u8 = 30;

    /// Returns all the [`RentalUnit`]s of this [`Roster`].
    #[must_use]
    pub fn units(&self) -> &[RentalUnit] {
        &self.units
    }

    /// Returns the [`RentalUnit`] with the provided [`Id`], if any.
    #[must_use]
    pub fn get(&self, id: Id) -> Option<&RentalUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Indicates whether this [`Roster`] has no [`RentalUnit`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Adds a new [`RentalUnit`] built from the provided [`Fields`].
    pub fn add(&mut self, fields: Fields) -> Id {
        let mut unit = RentalUnit {
            id: Id::new(),
            name: Name::numbered(self.units.len() + 1),
            area: Decimal::ZERO,
            bedrooms: 0,
            bathrooms: 0,
            monthly_rent: Decimal::ZERO,
            is_occupied: false,
            tenant: None,
            notes: String::new(),
            features: BTreeSet::new(),
        };
        unit.update(fields);

        let id = unit.id;
        self.units.push(unit);
        self.ever_populated = true;
        id
    }

    /// Updates the [`RentalUnit`] with the provided [`Id`].
    ///
    /// Returns `false` and does nothing if there is no such [`RentalUnit`].
    pub fn update(&mut self, id: Id, fields: Fields) -> bool {
        self.units
            .iter_mut()
            .find(|u| u.id == id)
            .map(|u| u.update(fields))
            .is_some()
    }

    /// Removes the [`RentalUnit`] with the provided [`Id`].
    ///
    /// Returns `false` if there is no such [`RentalUnit`].
    pub fn remove(&mut self, id: Id) -> bool {
        let len = self.units.len();
        self.units.retain(|u| u.id != id);
        self.units.len() != len
    }

    /// Seeds this [`Roster`] with a default [`RentalUnit`] once the provided
    /// [`Property`] has an address, unless it has ever held any units.
    ///
    /// The rent of the seeded [`RentalUnit`] is estimated from the floor area
    /// of the [`Property`] and the [`RentRates`] of its location.
    pub fn seed(
        &mut self,
        property: &Property,
        rates: &RentRates,
    ) -> Option<Id> {
        if self.ever_populated || property.address.is_none() {
            return None;
        }

        let area = property.floor_area;
        let rent = (area * rates.rate(property.city.as_ref()))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let bedrooms = (area / Decimal::from(Self::AREA_PER_BEDROOM))
            .trunc()
            .to_u8()
            .unwrap_or(u8::MAX)
            .max(1);

        Some(self.add(Fields {
            name: Some(Name::numbered(1)),
            area: Some(area),
            bedrooms: Some(bedrooms),
            bathrooms: Some(1),
            monthly_rent: Some(rent),
            ..Fields::default()
        }))
    }

    /// Sets the monthly rent of the [`RentalUnit`] with the provided [`Id`].
    ///
    /// Returns `false` if there is no such [`RentalUnit`].
    pub fn set_rent(&mut self, id: Id, rent: Decimal) -> bool {
        self.update(
            id,
            Fields {
                monthly_rent: Some(rent.max(Decimal::ZERO)),
                ..Fields::default()
            },
        )
    }

    /// Returns the total monthly rental income of this [`Roster`].
    #[must_use]
    pub fn total_rental_income(&self) -> Decimal {
        self.units.iter().map(|u| u.monthly_rent).sum()
    }

    /// Calculates [`Totals`] of this [`Roster`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        let mut totals = self.units.iter().fold(Totals::default(), |mut t, u| {
            t.count += 1;
            t.total_bedrooms += u32::from(u.bedrooms);
            t.total_bathrooms += u32::from(u.bathrooms);
            t.total_area += u.area;
            t.total_rent += u.monthly_rent;
            t.occupied_count += u32::from(u.is_occupied);
            t
        });
        totals.occupancy_rate = ratio::percent(
            totals.occupied_count.into(),
            totals.count.into(),
        );
        totals
    }
}

/// Monthly rent per square meter, keyed by location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RentRates {
    /// Rates by the lowercase name of a [`City`].
    by_city: HashMap<String, Decimal>,

    /// Rate used for unknown locations.
    fallback: Decimal,
}

impl RentRates {
    /// Creates new [`RentRates`] out of the provided `(city, rate)` pairs and
    /// the `fallback` rate. City names are matched case-insensitively.
    #[must_use]
    pub fn new(
        by_city: impl IntoIterator<Item = (String, Decimal)>,
        fallback: Decimal,
    ) -> Self {
        Self {
            by_city: by_city
                .into_iter()
                .map(|(city, rate)| (city.trim().to_lowercase(), rate))
                .collect(),
            fallback,
        }
    }

    /// Replaces the rate used for unknown locations.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Decimal) -> Self {
        self.fallback = fallback;
        self
    }

    /// Looks up the rate of the provided [`City`], if it is known.
    #[must_use]
    pub fn lookup(&self, city: Option<&City>) -> Option<Decimal> {
        self.by_city.get(&city?.key()).copied()
    }

    /// Returns the rate of the provided [`City`], or the fallback one.
    #[must_use]
    pub fn rate(&self, city: Option<&City>) -> Decimal {
        self.lookup(city).unwrap_or(self.fallback)
    }
}

impl Default for RentRates {
    fn default() -> Self {
        let rates = [
            ("berlin", 1350),
            ("munich", 1900),
            ("münchen", 1900),
            ("hamburg", 1250),
            ("frankfurt", 1450),
            ("cologne", 1200),
            ("köln", 1200),
            ("stuttgart", 1400),
            ("düsseldorf", 1150),
            ("leipzig", 750),
            ("dresden", 750),
        ];
        Self::new(
            rates
                .into_iter()
                .map(|(city, cents)| (city.into(), Decimal::new(cents, 2))),
            Decimal::TEN,
        )
    }
}
