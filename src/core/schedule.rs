//! Amortization schedule rules.
//!
//! This module encapsulates the bookkeeping rules the transaction processor
//! applies to a farmer's debt: generating the installment table from loan
//! terms, the pending → paid transition, the early-payoff discount, overdue
//! derivation, and the full recompute of the wallet's debt counters from the
//! installment list. The counters are always recomputed from the schedule
//! rather than patched incrementally, so they cannot drift from it.

use crate::{
    entities::{Farmer, Installment, InstallmentStatus, farmer, installment},
    errors::{Error, Result},
};
use chrono::{Months, NaiveDate};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Share of the outstanding interest forgiven when every pending
/// installment is paid at once. Fixed business rule.
pub const EARLY_PAYOFF_DISCOUNT_RATE: f64 = 0.30;

/// Loan terms an installment schedule is generated from.
#[derive(Debug, Clone, Copy)]
pub struct LoanTerms {
    /// Principal borrowed
    pub original_amount: f64,
    /// Annual interest rate in percent (e.g., 4.0)
    pub interest_rate: f64,
    /// Number of monthly installments
    pub months: u32,
}

impl LoanTerms {
    /// Total owed over the life of the loan: principal plus the flat rate.
    #[must_use]
    pub fn total_debt(&self) -> f64 {
        (self.original_amount * (1.0 + self.interest_rate / 100.0)).round()
    }

    /// Flat monthly payment the schedule is built around.
    #[must_use]
    pub fn monthly_payment(&self) -> f64 {
        (self.total_debt() / f64::from(self.months)).round()
    }
}

/// One row of a generated schedule, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    /// Sequential position, starting at 1
    pub number: i64,
    /// Date the installment falls due
    pub due_date: NaiveDate,
    /// Total amount due: `principal + interest`
    pub amount: f64,
    /// Principal portion
    pub principal: f64,
    /// Interest portion
    pub interest: f64,
}

/// Result of an early-payoff computation over the pending installments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyPayoff {
    /// Face value of all pending installments
    pub total_amount: f64,
    /// Interest portion of the pending installments
    pub total_interest: f64,
    /// Forgiven interest: `round(total_interest × 0.30)`
    pub discount: f64,
    /// What the farmer actually pays: `total_amount − discount`
    pub final_amount: f64,
}

/// Generates the amortization table for the given loan terms.
///
/// Declining-balance split: each month charges interest on the principal
/// still outstanding (`rate / 12`), the rest of the flat payment amortizes
/// principal. The last installment absorbs rounding so the amounts sum
/// exactly to [`LoanTerms::total_debt`]. Due dates fall monthly starting at
/// `first_due`.
#[must_use]
pub fn build_schedule(terms: &LoanTerms, first_due: NaiveDate) -> Vec<ScheduledInstallment> {
    let total_debt = terms.total_debt();
    let payment = terms.monthly_payment();
    let monthly_rate = terms.interest_rate / 100.0 / 12.0;

    let mut rows = Vec::with_capacity(terms.months as usize);
    let mut outstanding = terms.original_amount;

    for k in 0..terms.months {
        let number = i64::from(k) + 1;
        let due_date = first_due
            .checked_add_months(Months::new(k))
            .unwrap_or(first_due);

        let amount = if k + 1 == terms.months {
            // Last installment absorbs the rounding remainder
            total_debt - payment * f64::from(terms.months - 1)
        } else {
            payment
        };
        let interest = (outstanding * monthly_rate).round();
        let principal = amount - interest;
        outstanding -= principal;

        rows.push(ScheduledInstallment {
            number,
            due_date,
            amount,
            principal,
            interest,
        });
    }

    rows
}

/// Computes the early-payoff totals over the pending subset of `installments`.
///
/// Paid installments are ignored; the discount forgives 30% of the pending
/// interest, rounded to whole currency units.
#[must_use]
pub fn compute_early_payoff(installments: &[installment::Model]) -> EarlyPayoff {
    let pending: Vec<&installment::Model> = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Pending)
        .collect();

    let total_amount: f64 = pending.iter().map(|i| i.amount).sum();
    let total_interest: f64 = pending.iter().map(|i| i.interest).sum();
    let discount = (total_interest * EARLY_PAYOFF_DISCOUNT_RATE).round();
    let final_amount = total_amount - discount;

    EarlyPayoff {
        total_amount,
        total_interest,
        discount,
        final_amount,
    }
}

/// Whether an installment is overdue as of `today`.
///
/// Always derived from the due date at read time; never persisted.
#[must_use]
pub fn is_overdue(installment: &installment::Model, today: NaiveDate) -> bool {
    installment.status == InstallmentStatus::Pending && installment.due_date < today
}

/// Marks one installment paid.
///
/// Fails with `InstallmentNotFound` for an unknown (farmer, number) pair and
/// with `AlreadyPaid` if the installment was paid before; the transition is
/// never reversed.
pub async fn mark_paid<C>(
    db: &C,
    farmer_id: &str,
    number: i64,
    paid_date: NaiveDate,
) -> Result<installment::Model>
where
    C: ConnectionTrait,
{
    let found = Installment::find_by_id((farmer_id.to_string(), number))
        .one(db)
        .await?
        .ok_or_else(|| Error::InstallmentNotFound {
            farmer_id: farmer_id.to_string(),
            number,
        })?;

    if found.status == InstallmentStatus::Paid {
        return Err(Error::AlreadyPaid { number });
    }

    let mut active: installment::ActiveModel = found.into();
    active.status = Set(InstallmentStatus::Paid);
    active.paid_date = Set(Some(paid_date));
    active.update(db).await.map_err(Into::into)
}

/// Recomputes a farmer's debt counters from the installment list.
///
/// `paid_amount` and `remaining_amount` are sums of installment face
/// amounts, `remaining_months` counts the pending rows, and
/// `next_payment_date` is the earliest pending due date (None once fully
/// paid). This runs after every installment status change and doubles as
/// the on-demand reconciliation path.
pub async fn recompute_debt_counters<C>(db: &C, farmer_id: &str) -> Result<farmer::Model>
where
    C: ConnectionTrait,
{
    let farmer = Farmer::find_by_id(farmer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::FarmerNotFound {
            id: farmer_id.to_string(),
        })?;

    let installments = Installment::find()
        .filter(installment::Column::FarmerId.eq(farmer_id))
        .order_by_asc(installment::Column::DueDate)
        .all(db)
        .await?;

    let paid_amount: f64 = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid)
        .map(|i| i.amount)
        .sum();
    let pending: Vec<&installment::Model> = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Pending)
        .collect();
    let remaining_amount: f64 = pending.iter().map(|i| i.amount).sum();
    let next_payment_date = pending.iter().map(|i| i.due_date).min();

    // Cast safety: a schedule has at most a few hundred rows.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let remaining_months = pending.len() as i32;

    let mut active: farmer::ActiveModel = farmer.into();
    active.paid_amount = Set(paid_amount);
    active.remaining_amount = Set(remaining_amount);
    active.remaining_months = Set(remaining_months);
    active.next_payment_date = Set(next_payment_date);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_loan_terms_totals() {
        let terms = LoanTerms {
            original_amount: 50000.0,
            interest_rate: 4.0,
            months: 24,
        };

        assert_eq!(terms.total_debt(), 52000.0);
        assert_eq!(terms.monthly_payment(), 2167.0);
    }

    #[test]
    fn test_build_schedule_declining_interest() {
        let terms = LoanTerms {
            original_amount: 50000.0,
            interest_rate: 4.0,
            months: 24,
        };
        let schedule = build_schedule(&terms, ymd(2024, 1, 15));

        assert_eq!(schedule.len(), 24);
        assert_eq!(schedule[0].number, 1);
        assert_eq!(schedule[0].due_date, ymd(2024, 1, 15));
        assert_eq!(schedule[1].due_date, ymd(2024, 2, 15));

        // Declining-balance interest series on 50 000 at 4%/12
        assert_eq!(schedule[0].amount, 2167.0);
        assert_eq!(schedule[0].interest, 167.0);
        assert_eq!(schedule[0].principal, 2000.0);
        assert_eq!(schedule[1].interest, 160.0);
        assert_eq!(schedule[2].interest, 153.0);
    }

    #[test]
    fn test_build_schedule_sums_to_total_debt() {
        let terms = LoanTerms {
            original_amount: 50000.0,
            interest_rate: 4.0,
            months: 24,
        };
        let schedule = build_schedule(&terms, ymd(2024, 1, 15));

        let total: f64 = schedule.iter().map(|i| i.amount).sum();
        assert_eq!(total, terms.total_debt());

        // Every row splits cleanly into principal + interest
        for row in &schedule {
            assert_eq!(row.amount, row.principal + row.interest);
        }
    }

    #[test]
    fn test_build_schedule_crosses_year_boundary() {
        let terms = LoanTerms {
            original_amount: 12000.0,
            interest_rate: 4.0,
            months: 12,
        };
        let schedule = build_schedule(&terms, ymd(2024, 11, 15));

        assert_eq!(schedule[0].due_date, ymd(2024, 11, 15));
        assert_eq!(schedule[2].due_date, ymd(2025, 1, 15));
    }

    #[test]
    fn test_compute_early_payoff_discount() {
        // Two pending installments of 2167 with 167 interest each
        let installments = vec![
            test_installment("f1", 1, ymd(2024, 1, 15), 2167.0, 2000.0, 167.0, false),
            test_installment("f1", 2, ymd(2024, 2, 15), 2167.0, 2000.0, 167.0, false),
        ];

        let payoff = compute_early_payoff(&installments);
        assert_eq!(payoff.total_amount, 4334.0);
        assert_eq!(payoff.total_interest, 334.0);
        assert_eq!(payoff.discount, 100.0); // round(334 × 0.30)
        assert_eq!(payoff.final_amount, 4234.0);
    }

    #[test]
    fn test_compute_early_payoff_ignores_paid() {
        let installments = vec![
            test_installment("f1", 1, ymd(2024, 1, 15), 2167.0, 2000.0, 167.0, true),
            test_installment("f1", 2, ymd(2024, 2, 15), 2167.0, 2007.0, 160.0, false),
        ];

        let payoff = compute_early_payoff(&installments);
        assert_eq!(payoff.total_amount, 2167.0);
        assert_eq!(payoff.total_interest, 160.0);
        assert_eq!(payoff.discount, 48.0); // round(160 × 0.30)
        assert_eq!(payoff.final_amount, 2119.0);
    }

    #[test]
    fn test_compute_early_payoff_empty() {
        let payoff = compute_early_payoff(&[]);
        assert_eq!(payoff.total_amount, 0.0);
        assert_eq!(payoff.discount, 0.0);
        assert_eq!(payoff.final_amount, 0.0);
    }

    #[test]
    fn test_is_overdue_derivation() {
        let pending = test_installment("f1", 1, ymd(2024, 1, 15), 2167.0, 2000.0, 167.0, false);
        let paid = test_installment("f1", 2, ymd(2024, 1, 15), 2167.0, 2000.0, 167.0, true);

        // Past due date and still pending → overdue
        assert!(is_overdue(&pending, ymd(2024, 2, 1)));
        // Due today is not overdue yet
        assert!(!is_overdue(&pending, ymd(2024, 1, 15)));
        // Not due yet
        assert!(!is_overdue(&pending, ymd(2024, 1, 1)));
        // Paid is never overdue, however old
        assert!(!is_overdue(&paid, ymd(2030, 1, 1)));
    }

    #[tokio::test]
    async fn test_mark_paid_transitions_once() -> Result<()> {
        let db = setup_test_db().await?;
        let farmer = create_test_farmer_with_loan(&db, "farmer-1", 1000.0, 3, 0).await?;

        let paid = mark_paid(&db, &farmer.id, 1, ymd(2024, 3, 1)).await?;
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_date, Some(ymd(2024, 3, 1)));

        // Second attempt on the same installment is rejected
        let again = mark_paid(&db, &farmer.id, 1, ymd(2024, 3, 2)).await;
        assert!(matches!(again, Err(Error::AlreadyPaid { number: 1 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_installment() -> Result<()> {
        let db = setup_test_db().await?;
        let farmer = create_test_farmer_with_loan(&db, "farmer-1", 1000.0, 3, 0).await?;

        let result = mark_paid(&db, &farmer.id, 99, ymd(2024, 3, 1)).await;
        assert!(matches!(
            result,
            Err(Error::InstallmentNotFound { number: 99, .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_debt_counters_from_schedule() -> Result<()> {
        let db = setup_test_db().await?;
        let farmer = create_test_farmer_with_loan(&db, "farmer-1", 1000.0, 24, 0).await?;
        assert_eq!(farmer.remaining_months, 24);

        mark_paid(&db, &farmer.id, 1, ymd(2024, 2, 1)).await?;
        let wallet = recompute_debt_counters(&db, &farmer.id).await?;

        assert_eq!(wallet.remaining_months, 23);
        assert_eq!(wallet.paid_amount, 2167.0);
        assert_eq!(wallet.paid_amount + wallet.remaining_amount, wallet.total_debt);
        // Next payment moves to installment #2
        assert_eq!(
            wallet.next_payment_date,
            Some(ymd(2024, 2, 15))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_clears_next_date_when_fully_paid() -> Result<()> {
        let db = setup_test_db().await?;
        let farmer = create_test_farmer_with_loan(&db, "farmer-1", 1000.0, 2, 0).await?;

        mark_paid(&db, &farmer.id, 1, ymd(2024, 2, 1)).await?;
        mark_paid(&db, &farmer.id, 2, ymd(2024, 2, 1)).await?;
        let wallet = recompute_debt_counters(&db, &farmer.id).await?;

        assert_eq!(wallet.remaining_months, 0);
        assert_eq!(wallet.remaining_amount, 0.0);
        assert_eq!(wallet.next_payment_date, None);
        assert_eq!(wallet.paid_amount, wallet.total_debt);

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_unknown_farmer() -> Result<()> {
        let db = setup_test_db().await?;

        let result = recompute_debt_counters(&db, "ghost").await;
        assert!(matches!(result, Err(Error::FarmerNotFound { id: _ })));

        Ok(())
    }
}
