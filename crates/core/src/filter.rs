//! Narrowing a [`TransactionSet`] down to what the dashboard shows.
//!
//! Every criterion is optional. An empty set-valued criterion places no
//! constraint at all, so the default criteria pass everything through.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::period::DateRange;
use crate::transaction::{Flow, SourceType, Transaction, TransactionKind, TransactionSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub types: BTreeSet<SourceType>,
    pub categories: BTreeSet<String>,
    pub kinds: BTreeSet<TransactionKind>,
    pub flows: BTreeSet<Flow>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

impl FilterCriteria {
    /// Bounds the dates to the last full month before the latest transaction
    /// in `set`. With an empty set the criteria stay unbounded.
    pub fn previous_month(set: &TransactionSet) -> Self {
        let mut criteria = FilterCriteria::default();
        if let Some(latest) = set.last_date() {
            criteria.set_range(DateRange::previous_month(latest));
        }
        criteria
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.date_from = Some(range.start);
        self.date_to = Some(range.end);
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.date_from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&tx.source_type) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&tx.category) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&tx.kind) {
            return false;
        }
        if !self.flows.is_empty() && !self.flows.contains(&tx.flow()) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => tx
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    /// Matching transactions, in the set's order.
    pub fn apply<'a>(&self, set: &'a TransactionSet) -> Vec<&'a Transaction> {
        set.iter().filter(|tx| self.matches(tx)).collect()
    }
}
