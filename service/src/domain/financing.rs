//! [`Financing`] and [`Loan`] amortization definitions.

use common::{datetime, lenient, Date, Percent};
use rust_decimal::{Decimal, MathematicalOps as _};
use serde::{Deserialize, Serialize};
use tracing as log;

/// Financing parameters of a purchase.
///
/// The down payment is stored as a percentage of the purchase price, so
/// changing the price re-derives the down payment amount and the [`Loan`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    /// Down payment as a [`Percent`] of the purchase price.
    pub down_payment: Percent,

    /// Annual interest rate.
    pub interest_rate: Percent,

    /// Loan term in years.
    pub term_years: u16,

    /// [`Date`] of the first installment, if known.
    pub start_date: Option<Date>,
}

impl Financing {
    /// Longest supported loan term in years.
    pub const MAX_TERM_YEARS: u16 = 100;

    /// Number of installments of a [`Loan`] in a year.
    pub const PERIODS_PER_YEAR: u32 = 12;

    /// Returns the down payment amount for the provided `purchase_price`.
    #[must_use]
    pub fn down_payment_amount(&self, purchase_price: Decimal) -> Decimal {
        self.down_payment.of(purchase_price)
    }

    /// Sets the down payment as an absolute `amount` of the provided
    /// `purchase_price`, re-deriving the stored percentage.
    ///
    /// The percentage stays unchanged if the `purchase_price` is zero.
    pub fn set_down_payment_amount(
        &mut self,
        amount: Decimal,
        purchase_price: Decimal,
    ) {
        if purchase_price > Decimal::ZERO {
            self.down_payment = Percent::clamped(
                amount / purchase_price * Decimal::ONE_HUNDRED,
            );
        }
    }

    /// Returns the monthly interest rate as a fraction of one.
    #[must_use]
    pub fn monthly_rate(&self) -> Decimal {
        self.interest_rate.fraction() / Decimal::from(Self::PERIODS_PER_YEAR)
    }

    /// Returns the total number of installments.
    #[must_use]
    pub fn periods(&self) -> u32 {
        u32::from(self.term_years) * Self::PERIODS_PER_YEAR
    }

    /// Applies the present [`Fields`] to this [`Financing`].
    ///
    /// A down payment percentage takes precedence over an amount submitted
    /// along with it.
    pub fn update(&mut self, fields: Fields, purchase_price: Decimal) {
        let Fields {
            down_payment_percent,
            down_payment_amount,
            interest_rate,
            term_years,
            start_date,
        } = fields;

        match (down_payment_percent, down_payment_amount) {
            (Some(p), _) => self.down_payment = p,
            (None, Some(amount)) => {
                self.set_down_payment_amount(amount, purchase_price);
            }
            (None, None) => {}
        }
        if let Some(v) = interest_rate {
            self.interest_rate = v;
        }
        if let Some(v) = term_years {
            self.term_years = v.min(Self::MAX_TERM_YEARS);
        }
        if let Some(v) = start_date {
            self.start_date = v;
        }
    }

    /// Derives the [`Loan`] financing the provided `purchase_price`, with
    /// installments starting at the provided `start` [`Date`].
    #[must_use]
    pub fn loan(&self, purchase_price: Decimal, start: Date) -> Loan {
        let down_payment = self.down_payment_amount(purchase_price);
        let principal = purchase_price - down_payment;
        let monthly_rate = self.monthly_rate();
        let periods = self.periods();

        if principal <= Decimal::ZERO || periods == 0 {
            return Loan {
                down_payment,
                principal: principal.max(Decimal::ZERO),
                monthly_rate,
                periods,
                monthly_payment: Decimal::ZERO,
                total_interest: Decimal::ZERO,
                schedule: vec![],
            };
        }

        let monthly_payment = payment(principal, monthly_rate, periods);
        let total_interest = if monthly_rate.is_zero() {
            Decimal::ZERO
        } else {
            monthly_payment * Decimal::from(periods) - principal
        };

        let last = periods.min(Loan::MAX_SCHEDULED_PERIODS);
        let schedule = amortize(principal, monthly_rate, monthly_payment, last)
            .filter(|i| {
                i.period == 1
                    || i.period == last
                    || i.period % Self::PERIODS_PER_YEAR == 0
            })
            .map(|i| Entry::new(i, start))
            .collect();

        Loan {
            down_payment,
            principal,
            monthly_rate,
            periods,
            monthly_payment,
            total_interest,
            schedule,
        }
    }
}

impl Default for Financing {
    fn default() -> Self {
        Self {
            down_payment: Percent::clamped(Decimal::from(20)),
            interest_rate: Percent::clamped(Decimal::new(35, 1)),
            term_years: 30,
            start_date: None,
        }
    }
}

/// Partial set of [`Financing`] fields, as submitted by a form.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Fields {
    /// New down payment percentage, if it changes.
    #[serde(deserialize_with = "lenient::optional_percent")]
    pub down_payment_percent: Option<Percent>,

    /// New absolute down payment amount, if it changes.
    #[serde(deserialize_with = "lenient::optional")]
    pub down_payment_amount: Option<Decimal>,

    /// New annual interest rate, if it changes.
    #[serde(deserialize_with = "lenient::optional_percent")]
    pub interest_rate: Option<Percent>,

    /// New loan term in years, if it changes.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub term_years: Option<u16>,

    /// New start [`Date`] of installments, if it changes.
    #[serde(deserialize_with = "lenient::optional_date")]
    pub start_date: Option<Option<Date>>,
}

/// Amortizing loan derived from a [`Financing`] and a purchase price.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Down payment amount.
    pub down_payment: Decimal,

    /// Loan amount.
    pub principal: Decimal,

    /// Monthly interest rate as a fraction of one.
    pub monthly_rate: Decimal,

    /// Total number of installments.
    pub periods: u32,

    /// Fixed monthly installment.
    pub monthly_payment: Decimal,

    /// Interest paid over the whole term.
    pub total_interest: Decimal,

    /// Yearly amortization schedule: the first installment, every twelfth
    /// one and the last one.
    pub schedule: Vec<Entry>,
}

impl Loan {
    /// Number of installments the [`Loan::schedule`] is walked through at
    /// most.
    pub const MAX_SCHEDULED_PERIODS: u32 = 360;

    /// Returns the amount paid to service this [`Loan`] in a full year.
    #[must_use]
    pub fn annual_debt_service(&self) -> Decimal {
        self.monthly_payment * Decimal::from(Financing::PERIODS_PER_YEAR)
    }

    /// Returns the full monthly ledger of this [`Loan`], unrounded.
    #[must_use]
    pub fn ledger(&self) -> Ledger {
        amortize(
            self.principal,
            self.monthly_rate,
            self.monthly_payment,
            self.periods,
        )
    }

    /// Returns the interest paid in the provided (1-based) `year`.
    #[must_use]
    pub fn interest_in_year(&self, year: u32) -> Decimal {
        let per_year = Financing::PERIODS_PER_YEAR;
        self.ledger()
            .skip(year.saturating_sub(1).saturating_mul(per_year) as usize)
            .take(per_year as usize)
            .map(|i| i.interest)
            .sum()
    }

    /// Returns the remaining balance at the end of the provided `year`.
    ///
    /// Past the last [`Entry`] of the [`Loan::schedule`] its last balance is
    /// returned.
    #[must_use]
    pub fn balance_after_year(&self, year: u32) -> Decimal {
        let idx = usize::try_from(year).unwrap_or(usize::MAX);
        self.schedule
            .get(idx)
            .or(self.schedule.last())
            .map_or(Decimal::ZERO, |e| e.balance)
    }
}

/// Row of a [`Loan::schedule`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// 1-based number of the installment.
    pub period: u32,

    /// [`Date`] the installment is due.
    pub date: Date,

    /// Installment amount.
    pub payment: Decimal,

    /// Interest portion of the installment.
    pub interest: Decimal,

    /// Principal portion of the installment.
    pub principal: Decimal,

    /// Interest paid up to and including this installment.
    pub cumulative_interest: Decimal,

    /// Principal repaid up to and including this installment.
    pub cumulative_principal: Decimal,

    /// Balance remaining after this installment.
    pub balance: Decimal,
}

impl Entry {
    /// Creates a new [`Entry`] out of the provided [`Installment`] of a
    /// [`Loan`] whose first installment is due at `start`.
    fn new(i: Installment, start: Date) -> Self {
        Self {
            period: i.period,
            date: datetime::add_months(start, i.period - 1).unwrap_or(start),
            payment: i.payment,
            interest: i.interest,
            principal: i.principal,
            cumulative_interest: i.cumulative_interest,
            cumulative_principal: i.cumulative_principal,
            balance: i.balance.max(Decimal::ZERO),
        }
    }
}

/// Calculates the fixed monthly installment repaying `principal` at the
/// `monthly_rate` (a fraction of one) in `periods` installments.
///
/// A zero rate repays the `principal` in equal parts.
#[must_use]
pub fn payment(
    principal: Decimal,
    monthly_rate: Decimal,
    periods: u32,
) -> Decimal {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    match (Decimal::ONE + monthly_rate).checked_powu(u64::from(periods)) {
        Some(factor) if factor > Decimal::ONE => {
            principal * (monthly_rate * (factor / (factor - Decimal::ONE)))
        }
        // The growth factor is too large to represent, so the installment
        // converges to the interest on the whole principal.
        _ => principal * monthly_rate,
    }
}

/// Walks `periods` installments of the provided `payment` amortizing the
/// `principal` at the `monthly_rate`.
#[must_use]
pub fn amortize(
    principal: Decimal,
    monthly_rate: Decimal,
    payment: Decimal,
    periods: u32,
) -> Ledger {
    Ledger {
        monthly_rate,
        payment,
        periods,
        current: Installment {
            period: 0,
            payment,
            interest: Decimal::ZERO,
            principal: Decimal::ZERO,
            cumulative_interest: Decimal::ZERO,
            cumulative_principal: Decimal::ZERO,
            balance: principal,
        },
    }
}

/// Single monthly installment of a [`Ledger`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Installment {
    /// 1-based number of this [`Installment`].
    pub period: u32,

    /// Installment amount.
    pub payment: Decimal,

    /// Interest portion.
    pub interest: Decimal,

    /// Principal portion.
    pub principal: Decimal,

    /// Interest paid up to and including this [`Installment`].
    pub cumulative_interest: Decimal,

    /// Principal repaid up to and including this [`Installment`].
    pub cumulative_principal: Decimal,

    /// Balance remaining after this [`Installment`].
    pub balance: Decimal,
}

/// [`Iterator`] over the monthly [`Installment`]s of a [`Loan`].
#[derive(Clone, Debug)]
pub struct Ledger {
    /// Monthly interest rate as a fraction of one.
    monthly_rate: Decimal,

    /// Fixed installment amount.
    payment: Decimal,

    /// Number of installments to walk.
    periods: u32,

    /// Last yielded [`Installment`].
    current: Installment,
}

impl Iterator for Ledger {
    type Item = Installment;

    fn next(&mut self) -> Option<Installment> {
        if self.current.period >= self.periods {
            return None;
        }

        let prev = self.current;
        let interest = prev.balance * self.monthly_rate;
        let principal = self.payment - interest;
        self.current = Installment {
            period: prev.period + 1,
            payment: self.payment,
            interest,
            principal,
            cumulative_interest: prev.cumulative_interest + interest,
            cumulative_principal: prev.cumulative_principal + principal,
            balance: prev.balance - principal,
        };
        log::trace!(
            period = self.current.period,
            interest = %interest,
            balance = %self.current.balance,
            "installment",
        );

        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.periods - self.current.period) as usize;
        (left, Some(left))
    }
}
