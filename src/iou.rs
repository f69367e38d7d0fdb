//! Personal IOUs: money one participant fronted for another, tracked apart
//! from the shared settlement.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::domain::{Classification, Expense, ParticipantId, Provenance, RecurringTemplate, Roster};
use crate::minimizer::Transfer;
use crate::month::Month;
use crate::selector::month_expenses;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IouEntry {
    /// Who fronted the money.
    pub creditor: ParticipantId,
    /// Who it was fronted for.
    pub debtor: ParticipantId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub note: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IouReport {
    pub month: Month,
    pub entries: Vec<IouEntry>,
}

impl IouReport {
    pub fn owed_to<'a>(&'a self, id: &'a ParticipantId) -> impl Iterator<Item = &'a IouEntry> {
        self.entries.iter().filter(move |e| &e.creditor == id)
    }

    pub fn owed_by<'a>(&'a self, id: &'a ParticipantId) -> impl Iterator<Item = &'a IouEntry> {
        self.entries.iter().filter(move |e| &e.debtor == id)
    }

    pub fn involving<'a>(&'a self, id: &'a ParticipantId) -> impl Iterator<Item = &'a IouEntry> {
        self.entries
            .iter()
            .filter(move |e| &e.creditor == id || &e.debtor == id)
    }

    /// Nets each pair of participants into at most one payment.
    pub fn net_positions(&self, roster: &Roster) -> Vec<Transfer> {
        let ids: Vec<&ParticipantId> = roster.ids().collect();
        let mut out = Vec::new();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let b_owes_a = self.sum_between(b, a);
                let a_owes_b = self.sum_between(a, b);
                let net = b_owes_a - a_owes_b;
                if net > Decimal::ZERO {
                    out.push(Transfer {
                        from: (*b).clone(),
                        to: (*a).clone(),
                        amount: net,
                    });
                } else if net < Decimal::ZERO {
                    out.push(Transfer {
                        from: (*a).clone(),
                        to: (*b).clone(),
                        amount: -net,
                    });
                }
            }
        }
        out
    }

    fn sum_between(&self, debtor: &ParticipantId, creditor: &ParticipantId) -> Decimal {
        self.entries
            .iter()
            .filter(|e| &e.debtor == debtor && &e.creditor == creditor)
            .map(|e| e.amount)
            .sum()
    }
}

/// Collects the month's IOUs from personal expenses paid on someone else's
/// behalf, including active personal recurring templates.
pub fn compute_ious(
    month: Month,
    expenses: &[Expense],
    templates: &[RecurringTemplate],
    roster: &Roster,
) -> IouReport {
    let mut entries = Vec::new();
    for e in month_expenses(month, expenses, templates) {
        if e.classification != Classification::Personal {
            continue;
        }
        let Some(debtor) = e.on_behalf_of else {
            continue;
        };
        if debtor == e.payer {
            continue;
        }
        if !roster.contains(debtor) || !roster.contains(e.payer) {
            warn!(payer = %e.payer, %debtor, provenance = ?e.provenance, "IOU outside roster ignored");
            continue;
        }
        entries.push(IouEntry {
            creditor: e.payer.clone(),
            debtor: debtor.clone(),
            amount: e.amount,
            date: e.date,
            category: e.category.map(str::to_string),
            note: e.note.into_owned(),
            provenance: e.provenance,
        });
    }
    IouReport { month, entries }
}
