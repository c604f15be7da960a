use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::money::Money;
use super::period::DateRange;

/// Label given to transactions no category mapping claims.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Which statement format a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Account,
    CreditCard,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Account => write!(f, "account"),
            SourceType::CreditCard => write!(f, "credit_card"),
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "account" => Ok(SourceType::Account),
            "credit_card" | "card" => Ok(SourceType::CreditCard),
            other => Err(format!("Unknown source type: '{other}'")),
        }
    }
}

/// What sort of movement a statement line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Transfer,
    Reversal,
    DebitPurchase,
    CreditPurchase,
    Other,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Transfer => write!(f, "transfer"),
            TransactionKind::Reversal => write!(f, "reversal"),
            TransactionKind::DebitPurchase => write!(f, "debit_purchase"),
            TransactionKind::CreditPurchase => write!(f, "credit_purchase"),
            TransactionKind::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "transfer" => Ok(TransactionKind::Transfer),
            "reversal" => Ok(TransactionKind::Reversal),
            "debit_purchase" | "debit" => Ok(TransactionKind::DebitPurchase),
            "credit_purchase" | "credit" => Ok(TransactionKind::CreditPurchase),
            "other" => Ok(TransactionKind::Other),
            other => Err(format!("Unknown transaction kind: '{other}'")),
        }
    }
}

/// Money in or money out, from the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Income,
    Expense,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Income => write!(f, "income"),
            Flow::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(Flow::Income),
            "expense" | "expenses" | "out" => Ok(Flow::Expense),
            other => Err(format!("Unknown flow: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub source_type: SourceType,
    pub kind: TransactionKind,
    pub category: String,
}

impl Transaction {
    /// Zero-amount lines count as expenses, matching how statements list fees.
    pub fn flow(&self) -> Flow {
        if self.amount.is_positive() {
            Flow::Income
        } else {
            Flow::Expense
        }
    }
}

/// Transactions of one session, ascending by date.
///
/// Built once per ingestion and never edited afterwards; same-day entries
/// keep the order they were handed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionSet {
    transactions: Vec<Transaction>,
}

impl TransactionSet {
    pub fn new(mut transactions: Vec<Transaction>) -> Self {
        // `sort_by_key` is stable.
        transactions.sort_by_key(|tx| tx.date);
        Self { transactions }
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.transactions.first().map(|tx| tx.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.transactions.last().map(|tx| tx.date)
    }

    pub fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.first_date()?, self.last_date()?))
    }

    /// Distinct categories, sorted; the option list for a category filter.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.transactions.iter().map(|tx| tx.category.as_str()).collect()
    }

    pub fn kinds(&self) -> BTreeSet<TransactionKind> {
        self.transactions.iter().map(|tx| tx.kind).collect()
    }

    pub fn source_types(&self) -> BTreeSet<SourceType> {
        self.transactions.iter().map(|tx| tx.source_type).collect()
    }
}

impl<'a> IntoIterator for &'a TransactionSet {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(day: u32, description: &str, cents: i64, category: &str) -> Transaction {
        Transaction {
            date: date(2024, 1, day),
            description: description.to_string(),
            amount: Money::from_cents(cents),
            source_type: SourceType::Account,
            kind: TransactionKind::Other,
            category: category.to_string(),
        }
    }

    #[test]
    fn set_sorts_ascending_by_date() {
        let set = TransactionSet::new(vec![
            tx(15, "Rent", -50_000, UNCATEGORIZED),
            tx(1, "Salary", 100_000, UNCATEGORIZED),
        ]);
        let descriptions: Vec<_> = set.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["Salary", "Rent"]);
    }

    #[test]
    fn set_keeps_input_order_on_same_day() {
        let set = TransactionSet::new(vec![
            tx(5, "third", -300, UNCATEGORIZED),
            tx(2, "first", -100, UNCATEGORIZED),
            tx(5, "fourth", -400, UNCATEGORIZED),
            tx(2, "second", -200, UNCATEGORIZED),
        ]);
        let descriptions: Vec<_> = set.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["first", "second", "third", "fourth"]);
    }

    #[test]
    fn set_option_lists() {
        let set = TransactionSet::new(vec![
            tx(3, "Uber", -1_500, "Transport"),
            tx(1, "Bakery", -800, "Food"),
            tx(2, "Cab", -1_200, "Transport"),
        ]);
        assert_eq!(set.categories().into_iter().collect::<Vec<_>>(), ["Food", "Transport"]);
        assert_eq!(set.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(set.last_date(), Some(date(2024, 1, 3)));
        assert_eq!(set.source_types().len(), 1);
    }

    #[test]
    fn empty_set_has_no_range() {
        let set = TransactionSet::default();
        assert!(set.is_empty());
        assert_eq!(set.date_range(), None);
    }

    #[test]
    fn flow_follows_sign() {
        assert_eq!(tx(1, "Salary", 100, UNCATEGORIZED).flow(), Flow::Income);
        assert_eq!(tx(1, "Rent", -100, UNCATEGORIZED).flow(), Flow::Expense);
        assert_eq!(tx(1, "Nothing", 0, UNCATEGORIZED).flow(), Flow::Expense);
    }

    #[test]
    fn flow_parse() {
        assert_eq!("Income".parse::<Flow>(), Ok(Flow::Income));
        assert_eq!("expenses".parse::<Flow>(), Ok(Flow::Expense));
        assert!("sideways".parse::<Flow>().is_err());
        assert_eq!(Flow::Expense.to_string(), "expense");
    }

    #[test]
    fn source_type_parse() {
        assert_eq!("account".parse::<SourceType>(), Ok(SourceType::Account));
        assert_eq!("credit-card".parse::<SourceType>(), Ok(SourceType::CreditCard));
        assert!("savings".parse::<SourceType>().is_err());
    }

    #[test]
    fn kind_parse_round_trips_display() {
        for kind in [
            TransactionKind::Transfer,
            TransactionKind::Reversal,
            TransactionKind::DebitPurchase,
            TransactionKind::CreditPurchase,
            TransactionKind::Other,
        ] {
            assert_eq!(kind.to_string().parse::<TransactionKind>(), Ok(kind));
        }
    }
}
