//! Investment [`Analysis`] of a property.
//!
//! [`analyze()`] is a pure function of its [`Inputs`]: it derives every
//! metric in one pass, reading the [`Loan`] and the budget [`Statement`]
//! only after they have been derived from the very same [`Inputs`].

use common::{ratio, unit, Currency, DateTime, DateTimeOf, Format};
use rust_decimal::{
    prelude::ToPrimitive as _, Decimal, MathematicalOps as _,
};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing as log;

use super::{
    budget::Statement, financing::Loan, market::MarketReport, unit::Totals,
    Budget, Financing, Property, Roster,
};

/// [`DateTime`] an [`Analysis`] was computed at.
pub type ComputationDateTime = DateTimeOf<(Analysis, unit::Computation)>;

/// Projection assumptions of an [`Analysis`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default, rename_all = "camelCase")]
pub struct Assumptions {
    /// Annual appreciation of the property value, in percent.
    #[default(Decimal::from(3))]
    pub appreciation_rate: Decimal,

    /// Annual rent growth, in percent.
    #[default(Decimal::from(2))]
    pub rent_growth: Decimal,

    /// Annual operating expenses growth, in percent.
    #[default(Decimal::from(2))]
    pub expense_growth: Decimal,

    /// Horizons, in years, the return on investment is reported for.
    #[default(vec![5, 10, 30])]
    pub horizons: Vec<u16>,
}

impl Assumptions {
    /// Overrides the appreciation and rent growth of these [`Assumptions`]
    /// with the trends of the provided [`MarketReport`], if any.
    #[must_use]
    pub fn with_market(&self, report: Option<&MarketReport>) -> Self {
        let mut this = self.clone();
        if let Some(report) = report {
            this.appreciation_rate = report.market_trends.annual_appreciation;
            this.rent_growth = report.market_trends.rent_growth;
        }
        this
    }

    /// Returns the longest of the [`Assumptions::horizons`].
    #[must_use]
    pub fn max_horizon(&self) -> u16 {
        self.horizons.iter().copied().max().unwrap_or_default()
    }
}

/// Inputs of an [`Analysis`].
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    /// Analysed [`Property`].
    pub property: &'a Property,

    /// [`Roster`] of the analysed [`Property`].
    pub roster: &'a Roster,

    /// [`Financing`] of the purchase.
    pub financing: &'a Financing,

    /// Operating [`Budget`] of the analysed [`Property`].
    pub budget: &'a Budget,
}

/// Snapshot of all the investment metrics of a property.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Total investment: purchase price plus all acquisition costs.
    pub total_investment: Decimal,

    /// [`Totals`] of the rental units.
    pub units: Totals,

    /// [`Loan`] financing the purchase.
    pub loan: Loan,

    /// Annual operating [`Statement`].
    pub budget: Statement,

    /// [`CashFlow`] of the first year.
    pub cash_flow: CashFlow,

    /// [`Returns`] of the investment.
    pub returns: Returns,

    /// [`Risk`] indicators of the investment.
    pub risk: Risk,

    /// Year-by-year [`Projection`]s up to the longest horizon.
    pub projections: Vec<Projection>,

    /// [`Assumptions`] the [`Projection`]s were made with.
    pub assumptions: Assumptions,

    /// [`DateTime`] this [`Analysis`] was computed at.
    pub last_updated: ComputationDateTime,

    /// Indicator whether this [`Analysis`] is based on a priced property with
    /// rented units rather than on defaults.
    pub is_complete: bool,
}

/// Cash flow after operating expenses and debt service.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    /// Monthly cash flow before taxes.
    pub monthly: Decimal,

    /// Annual cash flow before taxes.
    pub annual: Decimal,

    /// Monthly cash flow including tax savings.
    pub monthly_after_tax: Decimal,

    /// Annual cash flow including tax savings.
    pub annual_after_tax: Decimal,
}

/// Return metrics of an investment.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Returns {
    /// Net operating income as a percentage of the purchase price.
    pub cap_rate: Decimal,

    /// Annual cash flow as a percentage of the cash invested (down payment
    /// and closing costs).
    pub cash_on_cash: Decimal,

    /// Annualized [`Roi`] per horizon.
    pub roi: Vec<Roi>,
}

/// Annualized return on investment over a horizon.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roi {
    /// Horizon in years.
    pub years: u16,

    /// Annualized return, in percent.
    pub annualized: Decimal,
}

/// Risk indicators of an investment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    /// Net operating income divided by the annual debt service.
    pub debt_service_coverage: Decimal,

    /// Vacancy rate, in percent of the rental income, at which the cash flow
    /// reaches zero.
    pub vacancy_break_even: Decimal,

    /// Months of positive cash flow needed to recover the cash invested.
    ///
    /// [`None`] if the cash flow is not positive.
    pub break_even_months: Option<u32>,
}

/// Projected figures of a single year.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// 1-based year.
    pub year: u16,

    /// Property value at the end of the year.
    pub property_value: Decimal,

    /// Property value minus the remaining loan balance.
    pub equity: Decimal,

    /// Gross rental income of the year.
    pub annual_rental_income: Decimal,

    /// Cash flow of the year before taxes.
    pub annual_cash_flow: Decimal,

    /// Loan balance at the end of the year.
    pub loan_balance: Decimal,
}

/// Derives the [`Analysis`] of the provided [`Inputs`] as of `now`.
///
/// The [`Loan`] starts at the financing start date, the purchase date or
/// `now`, whichever is known first.
#[must_use]
pub fn analyze(
    inputs: Inputs<'_>,
    assumptions: &Assumptions,
    now: DateTime,
) -> Analysis {
    let Inputs {
        property,
        roster,
        financing,
        budget,
    } = inputs;
    let price = property.purchase_price;
    let total_investment = property.total_investment();

    let units = roster.totals();
    let income = roster.total_rental_income();
    log::debug!(count = units.count, income = %income, "units recomputed");

    let start = financing
        .start_date
        .or(property.purchase_date)
        .unwrap_or_else(|| now.date());
    let loan = financing.loan(price, start);
    log::debug!(
        principal = %loan.principal,
        payment = %loan.monthly_payment,
        "financing recomputed",
    );

    let statement = budget.recompute(income, price, &loan);
    log::debug!(
        noi = %statement.net_operating_income,
        tax_savings = %statement.tax_savings,
        "budget recomputed",
    );

    let monthly = income
        - statement.monthly_operating_expenses()
        - loan.monthly_payment;
    let annual = monthly * Decimal::from(12);
    let annual_after_tax = annual + statement.tax_savings;
    let cash_flow = CashFlow {
        monthly,
        annual,
        monthly_after_tax: annual_after_tax / Decimal::from(12),
        annual_after_tax,
    };

    let projections = project(
        &statement,
        &loan,
        financing.term_years,
        price,
        assumptions,
    );
    let returns = Returns {
        cap_rate: statement.cap_rate,
        cash_on_cash: ratio::percent(
            annual,
            loan.down_payment + property.closing_cost,
        ),
        roi: assumptions
            .horizons
            .iter()
            .filter(|&&years| years > 0)
            .map(|&years| Roi {
                years,
                annualized: roi(
                    &projections,
                    years,
                    price,
                    loan.down_payment,
                    total_investment,
                ),
            })
            .collect(),
    };

    let annual_debt_service = loan.annual_debt_service();
    let cash_invested = total_investment - loan.principal;
    let risk = Risk {
        debt_service_coverage: ratio::or_zero(
            statement.net_operating_income,
            annual_debt_service,
        ),
        vacancy_break_even: ratio::percent(
            statement.rental_income
                - statement.operating_expenses
                - annual_debt_service,
            statement.rental_income,
        )
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        break_even_months: (monthly > Decimal::ZERO)
            .then(|| (cash_invested.max(Decimal::ZERO) / monthly).ceil())
            .and_then(|m| m.to_u32()),
    };
    log::debug!(
        monthly_cash_flow = %monthly,
        cap_rate = %returns.cap_rate,
        "analysis recomputed",
    );

    Analysis {
        total_investment,
        units,
        loan,
        budget: statement,
        cash_flow,
        returns,
        risk,
        projections,
        assumptions: assumptions.clone(),
        last_updated: now.coerce(),
        is_complete: price > Decimal::ZERO
            && !roster.is_empty()
            && income > Decimal::ZERO,
    }
}

/// Projects the property value, rent, operating expenses and loan balance
/// year by year up to the longest horizon of the [`Assumptions`].
///
/// No debt is serviced after the `term_years` of the [`Loan`].
#[must_use]
pub fn project(
    statement: &Statement,
    loan: &Loan,
    term_years: u16,
    purchase_price: Decimal,
    assumptions: &Assumptions,
) -> Vec<Projection> {
    let appreciation = growth(assumptions.appreciation_rate);
    let rent_growth = growth(assumptions.rent_growth);
    let expense_growth = growth(assumptions.expense_growth);

    let mut value = purchase_price;
    let mut rent = statement.rental_income;
    let mut expenses = statement.total_operating_expenses;

    (1..=assumptions.max_horizon())
        .map(|year| {
            value = bounded("propertyValue", value.checked_mul(appreciation));
            rent = bounded("rentalIncome", rent.checked_mul(rent_growth));
            expenses =
                bounded("expenses", expenses.checked_mul(expense_growth));

            let debt_service = if year <= term_years {
                loan.annual_debt_service()
            } else {
                Decimal::ZERO
            };
            let loan_balance = loan.balance_after_year(year.into());

            Projection {
                year,
                property_value: value,
                equity: bounded("equity", value.checked_sub(loan_balance)),
                annual_rental_income: rent,
                annual_cash_flow: bounded(
                    "annualCashFlow",
                    rent.checked_sub(expenses)
                        .and_then(|v| v.checked_sub(debt_service)),
                ),
                loan_balance,
            }
        })
        .collect()
}

/// Calculates the annualized return on investment over the first `years` of
/// the provided [`Projection`]s.
///
/// The total return (cash flow, appreciation and equity gain) relative to
/// the `investment` is annualized as `(1 + return)^(1 / years) - 1`. This is
/// an approximation rather than a cash-flow-weighted IRR.
///
/// Yields `0` if there is nothing to annualize.
#[must_use]
pub fn roi(
    projections: &[Projection],
    years: u16,
    purchase_price: Decimal,
    down_payment: Decimal,
    investment: Decimal,
) -> Decimal {
    let horizon = &projections[..projections.len().min(years.into())];
    let Some(last) = horizon.last() else {
        return Decimal::ZERO;
    };
    if investment <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let gain = horizon
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p.annual_cash_flow))
        .zip(last.property_value.checked_sub(purchase_price))
        .and_then(|(cash_flow, appreciation)| {
            cash_flow.checked_add(appreciation)
        })
        .zip(last.equity.checked_sub(down_payment))
        .and_then(|(gain, equity_gain)| gain.checked_add(equity_gain));
    let base = bounded(
        "roi",
        gain.and_then(|g| g.checked_div(investment))
            .and_then(|r| r.checked_add(Decimal::ONE)),
    );
    if base <= Decimal::ZERO {
        log::debug!(years, base = %base, "investment is lost, ROI is zero");
        return Decimal::ZERO;
    }

    let annualized = base.checked_powd(Decimal::ONE / Decimal::from(years));
    bounded(
        "roi",
        (finite("roi", annualized) - Decimal::ONE)
            .checked_mul(Decimal::ONE_HUNDRED),
    )
}

/// Returns the growth factor of the provided annual `rate` in percent.
fn growth(rate: Decimal) -> Decimal {
    Decimal::ONE + rate / Decimal::ONE_HUNDRED
}

/// Unwraps the result of a checked computation the inputs may overflow,
/// degrading the `metric` to `0` in that case.
///
/// Compounding keeps a degraded figure at `0`, so it is reported once.
fn bounded(metric: &'static str, value: Option<Decimal>) -> Decimal {
    value.unwrap_or_else(|| {
        log::warn!("`{metric}` does not fit into a number, reporting `0`");
        Decimal::ZERO
    })
}

/// Unwraps the result of a checked computation whose inputs are already
/// guarded, so [`None`] here is a bug.
///
/// Panics in debug builds, and degrades the `metric` to `0` otherwise.
fn finite(metric: &'static str, value: Option<Decimal>) -> Decimal {
    debug_assert!(value.is_some(), "`{metric}` is not a finite number");
    value.unwrap_or_else(|| {
        log::error!("`{metric}` is not a finite number, reporting `0`");
        Decimal::ZERO
    })
}

/// Named metric of an [`Analysis`] along with its display [`Format`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Metric {
    /// Name of this [`Metric`].
    pub name: &'static str,

    /// Value of this [`Metric`], [`None`] if not applicable.
    pub value: Option<Decimal>,

    /// Display [`Format`] of this [`Metric`].
    format: Format,
}

impl Metric {
    /// Returns the display [`Format`] of this [`Metric`].
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Renders the value of this [`Metric`] in the provided [`Currency`].
    #[must_use]
    pub fn render(&self, currency: Currency) -> String {
        self.value.map_or_else(
            || "N/A".to_owned(),
            |v| self.format.render(v, currency),
        )
    }
}

impl Analysis {
    /// Lists the headline [`Metric`]s of this [`Analysis`].
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        use Format as F;

        let metric = |name, value, format| Metric {
            name,
            value: Some(value),
            format,
        };
        let mut metrics = vec![
            metric("totalInvestment", self.total_investment, F::Currency),
            metric("totalArea", self.units.total_area, F::Area),
            metric("occupancyRate", self.units.occupancy_rate, F::Percentage),
            metric("loanAmount", self.loan.principal, F::Currency),
            metric("monthlyPayment", self.loan.monthly_payment, F::Currency),
            metric("totalInterest", self.loan.total_interest, F::Currency),
            metric(
                "netOperatingIncome",
                self.budget.net_operating_income,
                F::Currency,
            ),
            metric("taxSavings", self.budget.tax_savings, F::Currency),
            metric("monthlyCashFlow", self.cash_flow.monthly, F::Currency),
            metric(
                "annualCashFlowAfterTax",
                self.cash_flow.annual_after_tax,
                F::Currency,
            ),
            metric("capRate", self.returns.cap_rate, F::Percentage),
            metric("cashOnCash", self.returns.cash_on_cash, F::Percentage),
            metric(
                "debtServiceCoverage",
                self.risk.debt_service_coverage,
                F::Plain,
            ),
            metric(
                "vacancyBreakEven",
                self.risk.vacancy_break_even,
                F::Percentage,
            ),
            Metric {
                name: "breakEvenMonths",
                value: self.risk.break_even_months.map(Decimal::from),
                format: F::Plain,
            },
        ];
        metrics.extend(self.returns.roi.iter().map(|r| Metric {
            name: "roi",
            value: Some(r.annualized),
            format: F::Percentage,
        }));
        metrics
    }
}
