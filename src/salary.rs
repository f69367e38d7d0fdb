use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::SalaryRecord;
use crate::month::Month;

/// Salary records keyed by month.
#[derive(Debug, Clone, Default)]
pub struct SalaryBook {
    records: BTreeMap<Month, SalaryRecord>,
}

impl SalaryBook {
    /// Later records for the same month replace earlier ones.
    pub fn new(records: impl IntoIterator<Item = SalaryRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.month, r)).collect(),
        }
    }

    /// Returns the record for `month`, carrying forward the latest earlier
    /// month's figures (unlocked) when none was entered, or all zeros when
    /// there is no history at all.
    pub fn resolve(&self, month: Month) -> SalaryRecord {
        if let Some(record) = self.records.get(&month) {
            return record.clone();
        }

        match self.records.range(..month).next_back() {
            Some((from, prev)) => {
                debug!(%month, carried_from = %from, "carrying salaries forward");
                SalaryRecord {
                    month,
                    salaries: prev.salaries.clone(),
                    locked: false,
                }
            }
            None => {
                debug!(%month, "no salary history; defaulting to zero");
                SalaryRecord::empty(month)
            }
        }
    }
}
