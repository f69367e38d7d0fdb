use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ParticipantId;
use crate::ledger::PerParticipant;

/// Balances within this distance of zero count as settled (0.01).
pub const SETTLED_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
}

/// Greedy debtor/creditor matching.
///
/// Debtors are taken most-negative first and creditors largest first; equal
/// balances keep roster order. Yields at most `debtors + creditors - 1`
/// transfers, each rounded to cents.
pub fn minimize_transfers(balances: &PerParticipant) -> Vec<Transfer> {
    let mut debtors: Vec<(&ParticipantId, Decimal)> = balances
        .iter()
        .filter(|(_, b)| *b < -SETTLED_TOLERANCE)
        .collect();
    let mut creditors: Vec<(&ParticipantId, Decimal)> = balances
        .iter()
        .filter(|(_, b)| *b > SETTLED_TOLERANCE)
        .collect();

    debtors.sort_by(|a, b| a.1.cmp(&b.1));
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let (debtor, owed) = &mut debtors[i];
        let (creditor, due) = &mut creditors[j];
        let amount = (-*owed).min(*due);

        transfers.push(Transfer {
            from: (*debtor).clone(),
            to: (*creditor).clone(),
            amount: round_cents(amount),
        });

        *owed += amount;
        *due -= amount;
        if owed.abs() < SETTLED_TOLERANCE {
            i += 1;
        }
        if *due < SETTLED_TOLERANCE {
            j += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transfers = transfers.len(),
        "minimized transfers"
    );
    transfers
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
