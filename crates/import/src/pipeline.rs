use daric_core::{FilterCriteria, SourceType, SummaryMetrics, Transaction, TransactionSet, DEFAULT_TOP_N};
use serde::Serialize;

use crate::categories::CategoryMap;
use crate::csv::{parse_statement, CsvTransaction, StatementLayout};
use crate::error::{IngestError, MalformedInputError};
use crate::source::{DataSource, StatementFile};
use crate::unify::unify;

/// Per-format layouts plus view settings for one session.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub account_layout: StatementLayout,
    pub credit_card_layout: StatementLayout,
    pub top_n: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            account_layout: StatementLayout::account(),
            credit_card_layout: StatementLayout::credit_card(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl IngestOptions {
    pub fn layout(&self, source_type: SourceType) -> &StatementLayout {
        match source_type {
            SourceType::Account => &self.account_layout,
            SourceType::CreditCard => &self.credit_card_layout,
        }
    }
}

/// What the presentation layer renders: the rows in view and their metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub transactions: Vec<Transaction>,
    pub summary: SummaryMetrics,
}

/// Parses every file with its format's layout, then unifies. The first
/// malformed file aborts the whole build.
pub fn build_transaction_set(
    files: &[StatementFile],
    categories: Option<&CategoryMap>,
    options: &IngestOptions,
) -> Result<TransactionSet, MalformedInputError> {
    let statements = files
        .iter()
        .map(|file| parse_statement(&file.name, &file.content, options.layout(file.source_type)))
        .collect::<Result<Vec<Vec<CsvTransaction>>, _>>()?;
    let set = unify(statements, categories);
    tracing::info!(files = files.len(), transactions = set.len(), "Built transaction set");
    Ok(set)
}

/// State of one dashboard session: the ingested set and the live filter.
///
/// The host calls [`Session::view`] after every input change. New files go
/// through [`Session::ingest`] or [`Session::refresh`], which rebuild the set
/// from scratch.
#[derive(Debug, Clone)]
pub struct Session {
    transactions: TransactionSet,
    criteria: FilterCriteria,
    top_n: usize,
}

impl Session {
    pub fn ingest(
        files: &[StatementFile],
        categories: Option<&CategoryMap>,
        options: &IngestOptions,
    ) -> Result<Self, IngestError> {
        let transactions = build_transaction_set(files, categories, options)?;
        Ok(Self {
            transactions,
            criteria: FilterCriteria::default(),
            top_n: options.top_n,
        })
    }

    pub fn load(
        source: &dyn DataSource,
        categories: Option<&CategoryMap>,
        options: &IngestOptions,
    ) -> Result<Self, IngestError> {
        let files = source.fetch()?;
        Self::ingest(&files, categories, options)
    }

    /// Re-fetches and replaces the set, keeping the current filter. On error
    /// the session is left as it was.
    pub fn refresh(
        &mut self,
        source: &dyn DataSource,
        categories: Option<&CategoryMap>,
        options: &IngestOptions,
    ) -> Result<(), IngestError> {
        let files = source.fetch()?;
        self.transactions = build_transaction_set(&files, categories, options)?;
        self.top_n = options.top_n;
        Ok(())
    }

    pub fn transactions(&self) -> &TransactionSet {
        &self.transactions
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// Restricts the view to the last full month before the latest transaction.
    pub fn use_previous_month(&mut self) {
        self.criteria = FilterCriteria::previous_month(&self.transactions);
    }

    pub fn view(&self) -> DashboardView {
        let filtered = self.criteria.apply(&self.transactions);
        let summary = SummaryMetrics::compute(filtered.iter().copied(), self.top_n);
        DashboardView {
            transactions: filtered.into_iter().cloned().collect(),
            summary,
        }
    }
}

/// One-shot form of the whole pipeline.
pub fn run_pipeline(
    files: &[StatementFile],
    categories: Option<&CategoryMap>,
    criteria: &FilterCriteria,
    options: &IngestOptions,
) -> Result<DashboardView, IngestError> {
    let mut session = Session::ingest(files, categories, options)?;
    session.set_criteria(criteria.clone());
    Ok(session.view())
}
