use chrono::NaiveDate;
use daric_core::{Money, SourceType, Transaction, TransactionSet};
use std::collections::HashSet;

use crate::categories::{resolve_category, CategoryMap};
use crate::csv::CsvTransaction;

/// Merges parsed statements into one [`TransactionSet`].
///
/// Statements are taken in the order given and rows in file order. A row
/// equal to an earlier one on date, description, amount and source type is
/// dropped, so re-uploading overlapping statement periods does not double
/// count.
pub fn unify<I>(statements: I, categories: Option<&CategoryMap>) -> TransactionSet
where
    I: IntoIterator<Item = Vec<CsvTransaction>>,
{
    let mut seen: HashSet<(NaiveDate, String, Money, SourceType)> = HashSet::new();
    let mut transactions = Vec::new();
    let mut duplicates = 0usize;

    for row in statements.into_iter().flatten() {
        let key = (row.date, row.description.clone(), row.amount, row.source_type);
        if !seen.insert(key) {
            duplicates += 1;
            tracing::debug!(date = %row.date, description = %row.description, "Dropping duplicate row");
            continue;
        }

        let category = resolve_category(&row.description, categories).to_string();
        transactions.push(Transaction {
            date: row.date,
            description: row.description,
            amount: row.amount,
            source_type: row.source_type,
            kind: row.kind,
            category,
        });
    }

    if duplicates > 0 {
        tracing::info!(duplicates, "Collapsed duplicate transactions");
    }

    TransactionSet::new(transactions)
}
