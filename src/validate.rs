//! Boundary checks for caller input.
//!
//! The engine never rejects input; these checks let a caller refuse or flag
//! data that would settle in a surprising way.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{
    Classification, CustomSplit, Expense, Intent, ParticipantId, Provenance, RecurringTemplate,
    Roster, Snapshot, SplitMode, effective_split_mode,
};
use crate::minimizer::SETTLED_TOLERANCE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("amount {0} is negative")]
    NegativeAmount(Decimal),
    #[error("payer '{0}' is not in the roster")]
    UnknownPayer(ParticipantId),
    #[error("split member '{0}' is not in the roster")]
    UnknownMember(ParticipantId),
    #[error("on-behalf-of '{0}' is not in the roster")]
    UnknownDebtor(ParticipantId),
    #[error("split group is empty")]
    EmptyGroup,
    #[error("{0:?} split has no custom split; salary ratio will be used")]
    MissingCustomSplit(SplitMode),
    #[error("custom split names '{0}', who is not in the split group")]
    CustomOutsideGroup(ParticipantId),
    #[error("percentages total {0}, expected 100")]
    PercentageTotal(Decimal),
    #[error("fixed amounts total {total}, expected {expected}")]
    FixedTotal { total: Decimal, expected: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub source: Provenance,
    pub issue: ValidationIssue,
}

struct Terms<'a> {
    amount: Decimal,
    classification: Classification,
    intent: Intent,
    payer: &'a ParticipantId,
    split_between: Option<&'a [ParticipantId]>,
    split_mode: SplitMode,
    custom_split: Option<&'a CustomSplit>,
    on_behalf_of: Option<&'a ParticipantId>,
}

pub fn check_expense(roster: &Roster, expense: &Expense) -> Vec<ValidationIssue> {
    check_terms(
        roster,
        Terms {
            amount: expense.amount,
            classification: expense.classification,
            intent: expense.intent,
            payer: &expense.payer,
            split_between: expense.split_between.as_deref(),
            split_mode: effective_split_mode(expense.intent, expense.split_mode),
            custom_split: expense.custom_split.as_ref(),
            on_behalf_of: expense.on_behalf_of.as_ref(),
        },
    )
}

pub fn check_template(roster: &Roster, template: &RecurringTemplate) -> Vec<ValidationIssue> {
    check_terms(
        roster,
        Terms {
            amount: template.amount,
            classification: template.classification,
            intent: template.intent,
            payer: &template.payer,
            split_between: template.split_between.as_deref(),
            split_mode: effective_split_mode(template.intent, template.split_mode),
            custom_split: template.custom_split.as_ref(),
            on_behalf_of: template.on_behalf_of.as_ref(),
        },
    )
}

/// Runs every check over a snapshot, expenses first, then templates.
pub fn check_snapshot(roster: &Roster, snapshot: &Snapshot) -> Vec<Finding> {
    let expenses = snapshot.expenses.iter().flat_map(|e| {
        check_expense(roster, e).into_iter().map(|issue| Finding {
            source: Provenance::Recorded(e.id),
            issue,
        })
    });
    let templates = snapshot.recurring.iter().flat_map(|t| {
        check_template(roster, t).into_iter().map(|issue| Finding {
            source: Provenance::Recurring(t.id),
            issue,
        })
    });
    expenses.chain(templates).collect()
}

fn check_terms(roster: &Roster, terms: Terms<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if terms.amount < Decimal::ZERO {
        issues.push(ValidationIssue::NegativeAmount(terms.amount));
    }
    if !roster.contains(terms.payer) {
        issues.push(ValidationIssue::UnknownPayer(terms.payer.clone()));
    }
    if let Some(debtor) = terms.on_behalf_of {
        if !roster.contains(debtor) {
            issues.push(ValidationIssue::UnknownDebtor(debtor.clone()));
        }
    }

    if terms.classification != Classification::Shared || !terms.intent.is_splittable() {
        return issues;
    }

    let group: Vec<&ParticipantId> = match terms.split_between {
        Some([]) => {
            issues.push(ValidationIssue::EmptyGroup);
            return issues;
        }
        Some(members) => {
            for m in members.iter().filter(|m| !roster.contains(m)) {
                issues.push(ValidationIssue::UnknownMember(m.clone()));
            }
            members.iter().collect()
        }
        None => roster.ids().collect(),
    };

    if !matches!(terms.split_mode, SplitMode::Percentage | SplitMode::FixedAmount) {
        return issues;
    }
    let Some(custom) = terms.custom_split else {
        issues.push(ValidationIssue::MissingCustomSplit(terms.split_mode));
        return issues;
    };

    for id in custom.keys().filter(|k| !group.contains(k)) {
        issues.push(ValidationIssue::CustomOutsideGroup(id.clone()));
    }

    let total: Decimal = custom.values().copied().sum();
    match terms.split_mode {
        SplitMode::Percentage if (total - Decimal::ONE_HUNDRED).abs() > SETTLED_TOLERANCE => {
            issues.push(ValidationIssue::PercentageTotal(total));
        }
        SplitMode::FixedAmount if (total - terms.amount).abs() > SETTLED_TOLERANCE => {
            issues.push(ValidationIssue::FixedTotal {
                total,
                expected: terms.amount,
            });
        }
        _ => {}
    }

    issues
}
