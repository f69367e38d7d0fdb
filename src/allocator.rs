use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{CustomSplit, ParticipantId, Roster, SalaryRecord, SplitMode};
use crate::ledger::PerParticipant;
use crate::selector::MonthExpense;

/// Accumulates every expense's fair shares into one mapping.
///
/// Never fails: incomplete split data degrades to zero contributions.
pub fn allocate_shares(
    expenses: &[MonthExpense<'_>],
    salaries: &SalaryRecord,
    roster: &Roster,
) -> PerParticipant {
    let mut shares = PerParticipant::zeroed(roster);
    for expense in expenses {
        allocate_into(&mut shares, expense, salaries, roster);
    }
    shares
}

/// Members an expense is split among: its explicit group restricted to the
/// roster (duplicates dropped), or the whole roster when none was given.
pub fn split_group<'a>(expense: &MonthExpense<'a>, roster: &'a Roster) -> Vec<&'a ParticipantId> {
    let explicit = match expense.split_between {
        Some(group) if !group.is_empty() => group,
        _ => return roster.ids().collect(),
    };

    let mut members: Vec<&ParticipantId> = Vec::with_capacity(explicit.len());
    for id in explicit {
        if !roster.contains(id) {
            warn!(participant = %id, provenance = ?expense.provenance, "split member outside roster ignored");
            continue;
        }
        if !members.contains(&id) {
            members.push(id);
        }
    }
    members
}

pub fn allocate_into(
    shares: &mut PerParticipant,
    expense: &MonthExpense<'_>,
    salaries: &SalaryRecord,
    roster: &Roster,
) {
    let group = split_group(expense, roster);
    if group.is_empty() {
        warn!(provenance = ?expense.provenance, "expense has no known split members");
        return;
    }

    let amount = expense.amount;
    match (expense.split_mode, expense.custom_split) {
        (SplitMode::Percentage, Some(custom)) => {
            for id in group {
                let ratio = custom_value(custom, id) / Decimal::ONE_HUNDRED;
                add_portion(shares, expense, id, ratio);
            }
        }
        (SplitMode::FixedAmount, Some(custom)) => {
            for id in group {
                shares.add(id, custom_value(custom, id));
            }
        }
        (SplitMode::Equal, _) => {
            let each = amount / Decimal::from(group.len());
            for id in group {
                shares.add(id, each);
            }
        }
        // Salary ratio, and custom modes that never got a custom split.
        _ => {
            let group_salary: Decimal = group.iter().map(|id| salaries.salary_of(id)).sum();
            if group_salary <= Decimal::ZERO {
                warn!(
                    provenance = ?expense.provenance,
                    %amount,
                    "split group has no salary; expense contributes no shares"
                );
                return;
            }
            for id in group {
                match salaries.salary_of(id).checked_div(group_salary) {
                    Some(ratio) => add_portion(shares, expense, id, ratio),
                    None => warn!(
                        participant = %id,
                        provenance = ?expense.provenance,
                        "salary ratio out of range; share skipped"
                    ),
                }
            }
        }
    }
}

/// Adds `amount * ratio` to a member's share, or nothing if that overflows.
fn add_portion(
    shares: &mut PerParticipant,
    expense: &MonthExpense<'_>,
    id: &ParticipantId,
    ratio: Decimal,
) {
    match expense.amount.checked_mul(ratio) {
        Some(portion) => {
            shares.add(id, portion);
        }
        None => warn!(
            participant = %id,
            provenance = ?expense.provenance,
            amount = %expense.amount,
            %ratio,
            "share overflows; contributes nothing"
        ),
    }
}

fn custom_value(custom: &CustomSplit, id: &ParticipantId) -> Decimal {
    custom.get(id).copied().unwrap_or(Decimal::ZERO)
}
