//! Dashboard metrics over a filtered view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::money::Money;
use crate::period::{DateRange, YearMonth};
use crate::transaction::Transaction;

/// How many entries the top income/expense tables hold unless configured.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
}

impl PeriodTotals {
    fn record(&mut self, amount: Money) {
        if amount.is_positive() {
            self.income += amount;
        } else {
            self.expenses += amount;
        }
        self.net += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub range: DateRange,
    pub totals: PeriodTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub net_amount: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    pub top_incomes: Vec<Transaction>,
    pub top_expenses: Vec<Transaction>,
    /// Only months that have at least one transaction.
    pub monthly_totals: BTreeMap<YearMonth, Money>,
    /// Net per day, only days with a transaction.
    pub daily_totals: BTreeMap<NaiveDate, Money>,
    pub category_totals: BTreeMap<String, Money>,
    /// Net per category within each month.
    pub monthly_category_totals: BTreeMap<YearMonth, BTreeMap<String, Money>>,
    /// Most frequent first; equal counts by name.
    pub category_counts: Vec<CategoryCount>,
    /// Last full month before the latest transaction; `None` for an empty view.
    pub previous_month: Option<MonthComparison>,
}

impl SummaryMetrics {
    pub fn compute<'a, I>(transactions: I, top_n: usize) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let transactions: Vec<&Transaction> = transactions.into_iter().collect();

        let mut totals = PeriodTotals::default();
        let mut monthly_totals: BTreeMap<YearMonth, Money> = BTreeMap::new();
        let mut daily_totals: BTreeMap<NaiveDate, Money> = BTreeMap::new();
        let mut category_totals: BTreeMap<String, Money> = BTreeMap::new();
        let mut monthly_category_totals: BTreeMap<YearMonth, BTreeMap<String, Money>> =
            BTreeMap::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for tx in &transactions {
            totals.record(tx.amount);
            let month = YearMonth::of(tx.date);
            *monthly_totals.entry(month).or_default() += tx.amount;
            *daily_totals.entry(tx.date).or_default() += tx.amount;
            *category_totals.entry(tx.category.clone()).or_default() += tx.amount;
            *monthly_category_totals
                .entry(month)
                .or_default()
                .entry(tx.category.clone())
                .or_default() += tx.amount;
            *counts.entry(tx.category.as_str()).or_default() += 1;
        }

        let mut category_counts: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        category_counts
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        let top_incomes = top_by(&transactions, top_n, Money::is_positive, |a, b| b.cmp(&a));
        let top_expenses = top_by(&transactions, top_n, Money::is_negative, |a, b| a.cmp(&b));

        let previous_month = transactions.iter().map(|tx| tx.date).max().map(|latest| {
            let range = DateRange::previous_month(latest);
            let mut month = PeriodTotals::default();
            for tx in transactions.iter().filter(|tx| range.contains(tx.date)) {
                month.record(tx.amount);
            }
            MonthComparison { range, totals: month }
        });

        SummaryMetrics {
            net_amount: totals.net,
            total_income: totals.income,
            total_expenses: totals.expenses,
            top_incomes,
            top_expenses,
            monthly_totals,
            daily_totals,
            category_totals,
            monthly_category_totals,
            category_counts,
            previous_month,
        }
    }
}

/// Keeps the entries `keep` accepts, ranks them by `by_amount` then most
/// recent date first, and takes `n`. The sort is stable, so full ties stay in
/// input order.
fn top_by(
    transactions: &[&Transaction],
    n: usize,
    keep: fn(Money) -> bool,
    by_amount: fn(Money, Money) -> Ordering,
) -> Vec<Transaction> {
    let mut picked: Vec<&Transaction> = transactions
        .iter()
        .copied()
        .filter(|tx| keep(tx.amount))
        .collect();
    picked.sort_by(|a, b| by_amount(a.amount, b.amount).then_with(|| b.date.cmp(&a.date)));
    picked.into_iter().take(n).cloned().collect()
}
