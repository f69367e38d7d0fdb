use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::allocator::allocate_shares;
use crate::domain::{Expense, RecurringTemplate, Roster, SalaryRecord, Snapshot};
use crate::ledger::PerParticipant;
use crate::minimizer::{Transfer, minimize_transfers};
use crate::month::Month;
use crate::salary::SalaryBook;
use crate::selector::{MonthExpense, select};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementResult {
    pub month: Month,
    /// Sum of relevant (shared, splittable) expenses.
    pub total_expense: Decimal,
    pub salaries: PerParticipant,
    pub shares: PerParticipant,
    pub paid: PerParticipant,
    /// `paid - shares`; positive is owed by the group.
    pub balances: PerParticipant,
    /// Shared gift/loan amounts each payer covered alone. Reporting only.
    pub outside_settlement: PerParticipant,
    pub transfers: Vec<Transfer>,
}

impl SettlementResult {
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Computes the settlement for `month`. Pure and deterministic.
pub fn settle(
    month: Month,
    roster: &Roster,
    expenses: &[Expense],
    templates: &[RecurringTemplate],
    salaries: &SalaryRecord,
) -> SettlementResult {
    let selection = select(month, expenses, templates);

    let total_expense: Decimal = selection.relevant.iter().map(|e| e.amount).sum();
    let shares = allocate_shares(&selection.relevant, salaries, roster);
    let paid = aggregate_paid(&selection.relevant, roster);
    let balances = compute_balances(&paid, &shares);
    let transfers = minimize_transfers(&balances);
    let outside_settlement = aggregate_paid(&selection.outside, roster);

    debug!(
        %month,
        %total_expense,
        shares_total = %shares.total(),
        transfers = transfers.len(),
        "settled month"
    );

    SettlementResult {
        month,
        total_expense,
        salaries: PerParticipant::from_fn(roster, |id| salaries.salary_of(id)),
        shares,
        paid,
        balances,
        outside_settlement,
        transfers,
    }
}

/// Settles `month` from a snapshot, resolving salaries with carry-forward.
pub fn settle_snapshot(month: Month, roster: &Roster, snapshot: &Snapshot) -> SettlementResult {
    let salaries = SalaryBook::new(snapshot.salaries.iter().cloned()).resolve(month);
    settle(
        month,
        roster,
        &snapshot.expenses,
        &snapshot.recurring,
        &salaries,
    )
}

/// Sums amounts per payer. Payers outside the roster are skipped.
pub fn aggregate_paid(expenses: &[MonthExpense<'_>], roster: &Roster) -> PerParticipant {
    let mut paid = PerParticipant::zeroed(roster);
    for e in expenses {
        if !paid.add(e.payer, e.amount) {
            warn!(payer = %e.payer, provenance = ?e.provenance, "payer outside roster ignored");
        }
    }
    paid
}

pub fn compute_balances(paid: &PerParticipant, shares: &PerParticipant) -> PerParticipant {
    paid.minus(shares)
}
