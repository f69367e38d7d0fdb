use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Classification, Expense, ParticipantId, RecurringTemplate, Roster, SalaryRecord};
use crate::month::Month;
use crate::selector::{MonthExpense, month_expenses};

pub const DEFAULT_CATEGORY: &str = "Misc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSummary {
    pub participant: ParticipantId,
    pub income: Decimal,
    /// Everything they paid this month that wasn't fronted for someone else.
    pub spent: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    /// All shared spending, gifts and loans included.
    pub shared_total: Decimal,
    pub previous_shared_total: Decimal,
    pub category_totals: Vec<CategoryTotal>,
    pub participants: Vec<ParticipantSummary>,
}

pub fn summarize(
    month: Month,
    expenses: &[Expense],
    templates: &[RecurringTemplate],
    salaries: &SalaryRecord,
    roster: &Roster,
) -> MonthSummary {
    let current = month_expenses(month, expenses, templates);
    let previous = month_expenses(month.previous(), expenses, templates);

    let participants = roster
        .ids()
        .map(|id| {
            let income = salaries.salary_of(id);
            let spent: Decimal = current
                .iter()
                .filter(|e| e.payer == id && e.on_behalf_of.is_none())
                .map(|e| e.amount)
                .sum();
            ParticipantSummary {
                participant: id.clone(),
                income,
                spent,
                savings: income - spent,
            }
        })
        .collect();

    MonthSummary {
        month,
        shared_total: shared_total(&current),
        previous_shared_total: shared_total(&previous),
        category_totals: category_totals(&current),
        participants,
    }
}

fn shared_total(expenses: &[MonthExpense<'_>]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.classification == Classification::Shared)
        .map(|e| e.amount)
        .sum()
}

/// Shared spending per category, largest first; ties by name.
pub fn category_totals(expenses: &[MonthExpense<'_>]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for e in expenses {
        if e.classification != Classification::Shared {
            continue;
        }
        let category = e
            .category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        *totals.entry(category).or_insert(Decimal::ZERO) += e.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    out
}
