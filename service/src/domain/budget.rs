//! [`Budget`] of operating expenses and taxes.

use common::{lenient, ratio, Percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::financing::Loan;

/// Annual operating expenses and tax profile of a property.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Annual property tax.
    pub property_tax: Decimal,

    /// Annual insurance premium.
    pub insurance: Decimal,

    /// Annual maintenance reserve.
    pub maintenance: Decimal,

    /// Annual property management fee.
    pub management: Decimal,

    /// Annual utilities not passed on to tenants.
    pub utilities: Decimal,

    /// Any other annual operating expenses.
    pub other: Decimal,

    /// Share of the rental income expected to be lost to vacancy.
    pub vacancy_rate: Percent,

    /// Period the building value is depreciated over, in years.
    pub depreciation_years: u16,

    /// Share of the purchase price attributed to the building (as opposed to
    /// the land, which is not depreciated).
    pub building_share: Percent,

    /// Marginal income tax rate.
    pub tax_rate: Percent,

    /// Indicator whether mortgage interest is tax-deductible.
    pub interest_deductible: bool,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            property_tax: Decimal::ZERO,
            insurance: Decimal::ZERO,
            maintenance: Decimal::ZERO,
            management: Decimal::ZERO,
            utilities: Decimal::ZERO,
            other: Decimal::ZERO,
            vacancy_rate: Percent::clamped(Decimal::from(5)),
            depreciation_years: 50,
            building_share: Percent::clamped(Decimal::from(80)),
            tax_rate: Percent::clamped(Decimal::from(30)),
            interest_deductible: true,
        }
    }
}

impl Budget {
    /// Returns the sum of the itemized annual operating expenses, before
    /// vacancy.
    #[must_use]
    pub fn operating_expenses(&self) -> Decimal {
        self.property_tax
            + self.insurance
            + self.maintenance
            + self.management
            + self.utilities
            + self.other
    }

    /// Applies the present [`Fields`] to this [`Budget`].
    pub fn update(&mut self, fields: Fields) {
        let Fields {
            property_tax,
            insurance,
            maintenance,
            management,
            utilities,
            other,
            vacancy_rate,
            depreciation_years,
            building_share,
            tax_rate,
            interest_deductible,
        } = fields;

        for (field, value) in [
            (&mut self.property_tax, property_tax),
            (&mut self.insurance, insurance),
            (&mut self.maintenance, maintenance),
            (&mut self.management, management),
            (&mut self.utilities, utilities),
            (&mut self.other, other),
        ] {
            if let Some(v) = value {
                *field = v;
            }
        }
        for (field, value) in [
            (&mut self.vacancy_rate, vacancy_rate),
            (&mut self.building_share, building_share),
            (&mut self.tax_rate, tax_rate),
        ] {
            if let Some(v) = value {
                *field = v;
            }
        }
        if let Some(v) = depreciation_years {
            self.depreciation_years = v;
        }
        if let Some(v) = interest_deductible {
            self.interest_deductible = v;
        }
    }

    /// Derives the annual [`Statement`] of a property bought for the
    /// `purchase_price`, bringing the `monthly_income` in rent and financed
    /// with the provided [`Loan`].
    #[must_use]
    pub fn recompute(
        &self,
        monthly_income: Decimal,
        purchase_price: Decimal,
        loan: &Loan,
    ) -> Statement {
        let rental_income = monthly_income * Decimal::from(12);
        let operating_expenses = self.operating_expenses();
        let vacancy_loss = self.vacancy_rate.of(rental_income);
        let total_operating_expenses = operating_expenses + vacancy_loss;
        let net_operating_income = rental_income - total_operating_expenses;

        let building_value = self.building_share.of(purchase_price);
        let depreciation = ratio::or_zero(
            building_value,
            self.depreciation_years.into(),
        );
        let deductible_interest = if self.interest_deductible {
            loan.interest_in_year(1)
        } else {
            Decimal::ZERO
        };

        Statement {
            rental_income,
            operating_expenses,
            vacancy_loss,
            total_operating_expenses,
            net_operating_income,
            cap_rate: ratio::percent(net_operating_income, purchase_price),
            building_value,
            depreciation,
            deductible_interest,
            tax_savings: self.tax_rate.of(depreciation + deductible_interest),
        }
    }
}

/// Partial set of [`Budget`] fields, as submitted by a form.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Fields {
    /// New annual property tax, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub property_tax: Option<Decimal>,

    /// New annual insurance premium, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub insurance: Option<Decimal>,

    /// New annual maintenance reserve, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub maintenance: Option<Decimal>,

    /// New annual management fee, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub management: Option<Decimal>,

    /// New annual utilities, if they change.
    #[serde(deserialize_with = "lenient::optional")]
    pub utilities: Option<Decimal>,

    /// New other annual expenses, if they change.
    #[serde(deserialize_with = "lenient::optional")]
    pub other: Option<Decimal>,

    /// New vacancy rate, if it changes.
    #[serde(deserialize_with = "lenient::optional_percent")]
    pub vacancy_rate: Option<Percent>,

    /// New depreciation period, if it changes.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub depreciation_years: Option<u16>,

    /// New building share of the purchase price, if it changes.
    #[serde(deserialize_with = "lenient::optional_percent")]
    pub building_share: Option<Percent>,

    /// New marginal tax rate, if it changes.
    #[serde(deserialize_with = "lenient::optional_percent")]
    pub tax_rate: Option<Percent>,

    /// New interest deductibility, if it changes.
    pub interest_deductible: Option<bool>,
}

/// Annual operating statement derived from a [`Budget`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Gross annual rental income.
    pub rental_income: Decimal,

    /// Itemized annual operating expenses.
    pub operating_expenses: Decimal,

    /// Annual rental income lost to vacancy.
    pub vacancy_loss: Decimal,

    /// Annual operating expenses including the vacancy loss.
    pub total_operating_expenses: Decimal,

    /// Annual net operating income.
    pub net_operating_income: Decimal,

    /// Net operating income as a percentage of the purchase price, `0` if
    /// the price is zero.
    pub cap_rate: Decimal,

    /// Value of the building part of the purchase price.
    pub building_value: Decimal,

    /// Annual depreciation of the building.
    pub depreciation: Decimal,

    /// Mortgage interest of the first year deductible from taxes.
    pub deductible_interest: Decimal,

    /// Annual taxes saved by the depreciation and the deductible interest.
    pub tax_savings: Decimal,
}

impl Statement {
    /// Returns the monthly share of the total operating expenses.
    #[must_use]
    pub fn monthly_operating_expenses(&self) -> Decimal {
        self.total_operating_expenses / Decimal::from(12)
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::domain::Financing;

    use super::{Budget, Fields};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn budget(json: &str) -> Budget {
        let mut b = Budget::default();
        b.update(serde_json::from_str::<Fields>(json).unwrap());
        b
    }

    #[test]
    fn operating_statement() {
        let price = decimal("450000");
        let loan = Financing::default().loan(price, date!(2024 - 01 - 01));
        let b = budget(
            r#"{
                "propertyTax": 1200, "insurance": "600", "maintenance": 2400,
                "management": 1800, "utilities": null, "other": "x",
                "vacancyRate": 5
            }"#,
        );

        let s = b.recompute(decimal("2800"), price, &loan);

        assert_eq!(s.rental_income, decimal("33600"));
        assert_eq!(s.operating_expenses, decimal("6000"));
        assert_eq!(s.vacancy_loss, decimal("1680"));
        assert_eq!(s.total_operating_expenses, decimal("7680"));
        assert_eq!(s.monthly_operating_expenses(), decimal("640"));
        assert_eq!(s.net_operating_income, decimal("25920"));
        assert_eq!(s.cap_rate, decimal("5.76"));
    }

    #[test]
    fn depreciation_and_tax_savings() {
        let price = decimal("450000");
        let loan = Financing::default().loan(price, date!(2024 - 01 - 01));

        let s = Budget::default().recompute(Decimal::ZERO, price, &loan);
        assert_eq!(s.building_value, decimal("360000"));
        assert_eq!(s.depreciation, decimal("7200"));
        assert_eq!(s.deductible_interest, loan.interest_in_year(1));
        assert_eq!(
            s.tax_savings,
            (decimal("7200") + loan.interest_in_year(1)) * decimal("0.3"),
        );

        let s = budget(
            r#"{"interestDeductible": false, "depreciationYears": 0}"#,
        )
        .recompute(Decimal::ZERO, price, &loan);
        assert_eq!(s.depreciation, Decimal::ZERO);
        assert_eq!(s.tax_savings, Decimal::ZERO);
    }

    #[test]
    fn zero_price_has_zero_cap_rate() {
        let loan =
            Financing::default().loan(Decimal::ZERO, date!(2024 - 01 - 01));

        let s =
            Budget::default().recompute(decimal("1000"), Decimal::ZERO, &loan);

        assert_eq!(s.cap_rate, Decimal::ZERO);
        assert_eq!(s.depreciation, Decimal::ZERO);
        assert_eq!(s.tax_savings, Decimal::ZERO);
    }
}
