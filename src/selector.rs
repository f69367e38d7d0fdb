use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{
    Classification, CustomSplit, Expense, Intent, ParticipantId, Provenance, RecurringTemplate,
    SplitMode,
};
use crate::month::Month;

pub const RECURRING_NOTE_PREFIX: &str = "[Recurring] ";

/// An expense as it counts for one month: either a recorded expense dated in
/// that month or an active recurring template materialized on its first day.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthExpense<'a> {
    pub provenance: Provenance,
    pub date: NaiveDate,
    pub note: Cow<'a, str>,
    pub amount: Decimal,
    pub classification: Classification,
    pub intent: Intent,
    pub payer: &'a ParticipantId,
    pub split_between: Option<&'a [ParticipantId]>,
    /// Already resolved; see [`crate::domain::effective_split_mode`].
    pub split_mode: SplitMode,
    pub custom_split: Option<&'a CustomSplit>,
    pub on_behalf_of: Option<&'a ParticipantId>,
    pub category: Option<&'a str>,
}

impl<'a> MonthExpense<'a> {
    pub fn recorded(expense: &'a Expense) -> Self {
        Self {
            provenance: Provenance::Recorded(expense.id),
            date: expense.date,
            note: Cow::Borrowed(expense.note.as_str()),
            amount: expense.amount,
            classification: expense.classification,
            intent: expense.intent,
            payer: &expense.payer,
            split_between: expense.split_between.as_deref(),
            split_mode: expense.effective_split_mode(),
            custom_split: expense.custom_split.as_ref(),
            on_behalf_of: expense.on_behalf_of.as_ref(),
            category: expense.category.as_deref(),
        }
    }

    pub fn materialized(template: &'a RecurringTemplate, month: Month) -> Self {
        Self {
            provenance: Provenance::Recurring(template.id),
            date: month.first_day(),
            note: Cow::Owned(format!("{RECURRING_NOTE_PREFIX}{}", template.note)),
            amount: template.amount,
            classification: template.classification,
            intent: template.intent,
            payer: &template.payer,
            split_between: template.split_between.as_deref(),
            split_mode: template.effective_split_mode(),
            custom_split: template.custom_split.as_ref(),
            on_behalf_of: template.on_behalf_of.as_ref(),
            category: template.category.as_deref(),
        }
    }

    pub fn enters_settlement(&self) -> bool {
        self.classification == Classification::Shared && self.intent.is_splittable()
    }

    /// Shared, but paid in full by the payer (gift or loan).
    pub fn is_outside_settlement(&self) -> bool {
        self.classification == Classification::Shared && !self.intent.is_splittable()
    }
}

/// Every recorded expense dated in `month` followed by every active template,
/// materialized. Input order is preserved within each group.
pub fn month_expenses<'a>(
    month: Month,
    expenses: &'a [Expense],
    templates: &'a [RecurringTemplate],
) -> Vec<MonthExpense<'a>> {
    let recorded = expenses
        .iter()
        .filter(|e| month.contains(e.date))
        .map(MonthExpense::recorded);
    let virtuals = templates
        .iter()
        .filter(|t| t.active)
        .map(|t| MonthExpense::materialized(t, month));
    recorded.chain(virtuals).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection<'a> {
    /// Shared, splittable expenses: the only input to shares and paid.
    pub relevant: Vec<MonthExpense<'a>>,
    /// Shared gift/loan expenses, kept for reporting only.
    pub outside: Vec<MonthExpense<'a>>,
}

pub fn select<'a>(
    month: Month,
    expenses: &'a [Expense],
    templates: &'a [RecurringTemplate],
) -> Selection<'a> {
    let mut selection = Selection::default();
    for e in month_expenses(month, expenses, templates) {
        if e.enters_settlement() {
            selection.relevant.push(e);
        } else if e.is_outside_settlement() {
            selection.outside.push(e);
        }
    }
    debug!(
        %month,
        relevant = selection.relevant.len(),
        outside = selection.outside.len(),
        "selected expenses"
    );
    selection
}

/// The relevant-expense set for settling `month`.
pub fn select_relevant<'a>(
    month: Month,
    expenses: &'a [Expense],
    templates: &'a [RecurringTemplate],
) -> Vec<MonthExpense<'a>> {
    select(month, expenses, templates).relevant
}
