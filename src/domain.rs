use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RosterError;
use crate::month::Month;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// The fixed, ordered set of people sharing a household.
///
/// Order is significant: every per-participant mapping iterates in roster
/// order, and ties in the debt minimizer keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Participant>,
}

impl Roster {
    pub fn new(members: Vec<Participant>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(members.len());
        for m in &members {
            if m.id.as_str().trim().is_empty() {
                return Err(RosterError::EmptyId);
            }
            if !seen.insert(m.id.clone()) {
                return Err(RosterError::Duplicate(m.id.clone()));
            }
        }
        if members.len() < 2 {
            return Err(RosterError::TooSmall(members.len()));
        }
        Ok(Self { members })
    }

    pub fn from_ids<I, S>(ids: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ParticipantId>,
    {
        Self::new(ids.into_iter().map(Participant::new).collect())
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.iter().map(|m| &m.id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Shared,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    #[default]
    SplitByPolicy,
    EqualSplit,
    Gift,
    Loan,
}

impl Intent {
    /// Gift and loan payments are borne by the payer alone.
    pub fn is_splittable(self) -> bool {
        matches!(self, Intent::SplitByPolicy | Intent::EqualSplit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMode {
    Equal,
    #[default]
    SalaryRatio,
    Percentage,
    FixedAmount,
}

/// Percentage points (PERCENTAGE) or currency amounts (FIXED_AMOUNT) per participant.
pub type CustomSplit = BTreeMap<ParticipantId, Decimal>;

/// Split mode the allocator actually applies.
///
/// Equal-split intent always divides evenly; otherwise the recorded mode wins,
/// falling back to salary ratio for entries that predate mode tracking.
pub fn effective_split_mode(intent: Intent, recorded: Option<SplitMode>) -> SplitMode {
    if intent == Intent::EqualSplit {
        return SplitMode::Equal;
    }
    recorded.unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub classification: Classification,
    pub payer: ParticipantId,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub split_between: Option<Vec<ParticipantId>>,
    #[serde(default)]
    pub split_mode: Option<SplitMode>,
    #[serde(default)]
    pub custom_split: Option<CustomSplit>,
    #[serde(default)]
    pub on_behalf_of: Option<ParticipantId>,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// A shared expense with default intent and mode, split across everyone.
    pub fn shared(payer: impl Into<ParticipantId>, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            classification: Classification::Shared,
            payer: payer.into(),
            intent: Intent::default(),
            split_between: None,
            split_mode: None,
            custom_split: None,
            on_behalf_of: None,
            category: None,
            date,
            note: String::new(),
            created_at: None,
        }
    }

    pub fn personal(payer: impl Into<ParticipantId>, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            classification: Classification::Personal,
            ..Self::shared(payer, amount, date)
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.split_mode = Some(mode);
        self
    }

    pub fn with_group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ParticipantId>,
    {
        self.split_between = Some(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_custom_split<I, S>(mut self, split: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<ParticipantId>,
    {
        self.custom_split = Some(split.into_iter().map(|(p, v)| (p.into(), v)).collect());
        self
    }

    pub fn on_behalf_of(mut self, debtor: impl Into<ParticipantId>) -> Self {
        self.on_behalf_of = Some(debtor.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn enters_settlement(&self) -> bool {
        self.classification == Classification::Shared && self.intent.is_splittable()
    }

    pub fn effective_split_mode(&self) -> SplitMode {
        effective_split_mode(self.intent, self.split_mode)
    }
}

fn default_active() -> bool {
    true
}

/// A durable expense definition that materializes once per month while active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub amount: Decimal,
    pub classification: Classification,
    pub payer: ParticipantId,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub split_between: Option<Vec<ParticipantId>>,
    #[serde(default)]
    pub split_mode: Option<SplitMode>,
    #[serde(default)]
    pub custom_split: Option<CustomSplit>,
    #[serde(default)]
    pub on_behalf_of: Option<ParticipantId>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl RecurringTemplate {
    pub fn shared(payer: impl Into<ParticipantId>, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            classification: Classification::Shared,
            payer: payer.into(),
            intent: Intent::default(),
            split_between: None,
            split_mode: None,
            custom_split: None,
            on_behalf_of: None,
            category: None,
            note: String::new(),
            active: true,
        }
    }

    pub fn personal(payer: impl Into<ParticipantId>, amount: Decimal) -> Self {
        Self {
            classification: Classification::Personal,
            ..Self::shared(payer, amount)
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.split_mode = Some(mode);
        self
    }

    pub fn with_group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ParticipantId>,
    {
        self.split_between = Some(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_custom_split<I, S>(mut self, split: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<ParticipantId>,
    {
        self.custom_split = Some(split.into_iter().map(|(p, v)| (p.into(), v)).collect());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn on_behalf_of(mut self, debtor: impl Into<ParticipantId>) -> Self {
        self.on_behalf_of = Some(debtor.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn enters_settlement(&self) -> bool {
        self.active && self.classification == Classification::Shared && self.intent.is_splittable()
    }

    pub fn effective_split_mode(&self) -> SplitMode {
        effective_split_mode(self.intent, self.split_mode)
    }
}

/// Monthly incomes. The lock flag is advisory and never consulted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub month: Month,
    #[serde(default)]
    pub salaries: BTreeMap<ParticipantId, Decimal>,
    #[serde(default)]
    pub locked: bool,
}

impl SalaryRecord {
    pub fn empty(month: Month) -> Self {
        Self {
            month,
            salaries: BTreeMap::new(),
            locked: false,
        }
    }

    pub fn with_salary(mut self, id: impl Into<ParticipantId>, amount: Decimal) -> Self {
        self.salaries.insert(id.into(), amount);
        self
    }

    pub fn salary_of(&self, id: &ParticipantId) -> Decimal {
        self.salaries.get(id).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Where a relevant expense came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Provenance {
    Recorded(Uuid),
    Recurring(Uuid),
}

/// Everything the caller hands over in one consistent read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub recurring: Vec<RecurringTemplate>,
    #[serde(default)]
    pub salaries: Vec<SalaryRecord>,
}
