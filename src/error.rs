use thiserror::Error;

use crate::domain::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("Invalid month '{0}'. Expected YYYY-MM")]
    Format(String),
    #[error("Invalid month value {0} (expected 1-12)")]
    OutOfRange(u32),
    #[error("Invalid year {0} (expected 0001-9999)")]
    YearOutOfRange(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("A roster needs at least 2 participants (found {0})")]
    TooSmall(usize),
    #[error("Duplicate participant id: {0}")]
    Duplicate(ParticipantId),
    #[error("Participant ids must not be empty")]
    EmptyId,
}
