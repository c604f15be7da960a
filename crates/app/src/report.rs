//! Plain-text rendering of a dashboard view.

use daric_core::{Money, SummaryMetrics, Transaction};
use daric_import::DashboardView;
use std::fmt::{self, Write};

const AMOUNT_WIDTH: usize = 12;

fn amount(money: Money) -> String {
    format!("{:>AMOUNT_WIDTH$}", money.to_string())
}

pub fn write_summary(out: &mut impl Write, view: &DashboardView) -> fmt::Result {
    let summary = &view.summary;
    match (view.transactions.first(), view.transactions.last()) {
        (Some(first), Some(last)) => writeln!(out, "Period: {} to {}", first.date, last.date)?,
        _ => writeln!(out, "Period: no transactions match the current filter")?,
    }
    writeln!(out, "Transactions: {}", view.transactions.len())?;
    writeln!(out)?;
    writeln!(out, "Income    {}", amount(summary.total_income))?;
    writeln!(out, "Expenses  {}", amount(summary.total_expenses))?;
    writeln!(out, "Net       {}", amount(summary.net_amount))?;

    if let Some(previous) = &summary.previous_month {
        writeln!(out)?;
        writeln!(out, "Previous month ({})", previous.range)?;
        writeln!(out, "  Income    {}", amount(previous.totals.income))?;
        writeln!(out, "  Expenses  {}", amount(previous.totals.expenses))?;
        writeln!(out, "  Net       {}", amount(previous.totals.net))?;
    }

    write_ranked(out, "Top incomes", &summary.top_incomes)?;
    write_ranked(out, "Top expenses", &summary.top_expenses)?;

    if !summary.monthly_totals.is_empty() {
        writeln!(out)?;
        writeln!(out, "Monthly totals")?;
        for (month, total) in &summary.monthly_totals {
            writeln!(out, "  {month}  {}", amount(*total))?;
        }
    }
    Ok(())
}

fn write_ranked(out: &mut impl Write, title: &str, transactions: &[Transaction]) -> fmt::Result {
    if transactions.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{title}")?;
    for tx in transactions {
        writeln!(out, "  {}  {}  {}", tx.date, amount(tx.amount), tx.description)?;
    }
    Ok(())
}

pub fn write_transactions(out: &mut impl Write, transactions: &[Transaction]) -> fmt::Result {
    let category_width = transactions
        .iter()
        .map(|tx| tx.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    writeln!(
        out,
        "{:<10}  {:<11}  {:<category_width$}  {:>AMOUNT_WIDTH$}  Description",
        "Date", "Source", "Category", "Amount"
    )?;
    for tx in transactions {
        writeln!(
            out,
            "{:<10}  {:<11}  {:<category_width$}  {}  {}",
            tx.date.to_string(),
            tx.source_type.to_string(),
            tx.category,
            amount(tx.amount),
            tx.description
        )?;
    }
    Ok(())
}

pub fn write_categories(out: &mut impl Write, summary: &SummaryMetrics) -> fmt::Result {
    let width = summary
        .category_counts
        .iter()
        .map(|c| c.category.chars().count())
        .max()
        .unwrap_or(0);

    for entry in &summary.category_counts {
        let total = summary
            .category_totals
            .get(&entry.category)
            .copied()
            .unwrap_or_default();
        writeln!(
            out,
            "{:<width$}  {:>5}  {}",
            entry.category,
            entry.count,
            amount(total)
        )?;
    }
    Ok(())
}
