//! Monthly settlement of shared household expenses.
//!
//! Given a month, the household's expenses, recurring templates and salaries,
//! [`settle`] computes each participant's fair share, what they paid, the
//! resulting balances and the fewest transfers that zero them.

pub mod allocator;
pub mod domain;
pub mod error;
pub mod iou;
pub mod ledger;
pub mod minimizer;
pub mod month;
pub mod salary;
pub mod selector;
pub mod settlement;
pub mod summary;
pub mod validate;

pub use domain::{
    Classification, CustomSplit, Expense, Intent, Participant, ParticipantId, Provenance,
    RecurringTemplate, Roster, SalaryRecord, Snapshot, SplitMode,
};
pub use error::{MonthError, RosterError};
pub use iou::{IouEntry, IouReport, compute_ious};
pub use ledger::PerParticipant;
pub use minimizer::{SETTLED_TOLERANCE, Transfer, minimize_transfers};
pub use month::Month;
pub use salary::SalaryBook;
pub use settlement::{SettlementResult, settle, settle_snapshot};
pub use summary::{MonthSummary, summarize};
pub use validate::{Finding, ValidationIssue, check_snapshot};
