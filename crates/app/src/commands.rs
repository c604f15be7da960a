use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use daric_core::{FilterCriteria, Flow, SourceType, TransactionKind, TransactionSet};
use daric_import::{CategoryMap, SampleSource, Session, StatementFile, SAMPLE_CATEGORY_MAP};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{AppConfig, FilterPreset, SourceConfig};
use crate::report;

/// Statement input and filter flags shared by the view commands.
#[derive(Args, Debug, Default, Clone)]
pub struct ViewArgs {
    /// Account statement CSV to load instead of the configured source (repeatable)
    #[arg(long = "account", value_name = "FILE")]
    pub account_files: Vec<PathBuf>,

    /// Credit card statement CSV to load instead of the configured source (repeatable)
    #[arg(long = "credit-card", value_name = "FILE")]
    pub credit_card_files: Vec<PathBuf>,

    /// Use the bundled sample statements
    #[arg(long, conflicts_with_all = ["account_files", "credit_card_files"])]
    pub sample: bool,

    /// JSON map of description to category
    #[arg(long, value_name = "FILE")]
    pub category_map: Option<PathBuf>,

    /// First day to include
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last day to include
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Keep only this statement type: account or credit_card (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<SourceType>,

    /// Keep only this category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Keep only this kind, e.g. transfer or debit_purchase (repeatable)
    #[arg(long = "kind", value_name = "KIND")]
    pub kinds: Vec<TransactionKind>,

    /// Keep only income or expense (repeatable)
    #[arg(long = "flow", value_name = "FLOW")]
    pub flows: Vec<Flow>,

    /// Case-insensitive text the description must contain
    #[arg(long)]
    pub search: Option<String>,

    /// Start from the last full month before the latest transaction
    #[arg(long, conflicts_with = "all")]
    pub previous_month: bool,

    /// Ignore the configured default filter
    #[arg(long)]
    pub all: bool,
}

impl ViewArgs {
    fn has_uploads(&self) -> bool {
        !self.account_files.is_empty() || !self.credit_card_files.is_empty()
    }

    fn uses_sample(&self, config: &AppConfig) -> bool {
        self.sample || (!self.has_uploads() && config.source == SourceConfig::Sample)
    }

    fn uploads(&self) -> Result<Vec<StatementFile>> {
        let tagged = self
            .account_files
            .iter()
            .map(|path| (path, SourceType::Account))
            .chain(self.credit_card_files.iter().map(|path| (path, SourceType::CreditCard)));

        tagged
            .map(|(path, source_type)| {
                let content =
                    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
                Ok::<_, anyhow::Error>(StatementFile::new(path.display().to_string(), source_type, content))
            })
            .collect()
    }

    /// Preset from the flags or the config, then explicit flags on top.
    pub fn criteria(&self, config: &AppConfig, set: &TransactionSet) -> FilterCriteria {
        let previous_month =
            self.previous_month || (!self.all && config.default_filter == FilterPreset::PreviousMonth);
        let mut criteria = if previous_month {
            FilterCriteria::previous_month(set)
        } else {
            FilterCriteria::default()
        };

        if self.from.is_some() {
            criteria.date_from = self.from;
        }
        if self.to.is_some() {
            criteria.date_to = self.to;
        }
        criteria.types.extend(self.types.iter().copied());
        criteria.categories.extend(self.categories.iter().cloned());
        criteria.kinds.extend(self.kinds.iter().copied());
        criteria.flows.extend(self.flows.iter().copied());
        if self.search.is_some() {
            criteria.search = self.search.clone();
        }
        criteria
    }
}

fn load_categories(config: &AppConfig, args: &ViewArgs) -> Result<Option<CategoryMap>> {
    match args.category_map.as_ref().or(config.category_map.as_ref()) {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open category map {}", path.display()))?;
            let map = CategoryMap::from_reader(std::io::BufReader::new(file))
                .with_context(|| format!("Invalid category map {}", path.display()))?;
            tracing::debug!(entries = map.len(), path = %path.display(), "Loaded category map");
            Ok(Some(map))
        }
        None if args.uses_sample(config) => Ok(Some(CategoryMap::from_json(SAMPLE_CATEGORY_MAP)?)),
        None => Ok(None),
    }
}

/// Ingests the statements named by the flags or the config and applies the
/// filter flags.
pub fn open_session(config: &AppConfig, args: &ViewArgs) -> Result<Session> {
    let categories = load_categories(config, args)?;
    let options = config.ingest_options();

    let session = if args.has_uploads() {
        Session::ingest(&args.uploads()?, categories.as_ref(), &options)
    } else if args.sample {
        Session::load(&SampleSource, categories.as_ref(), &options)
    } else {
        Session::load(config.data_source().as_ref(), categories.as_ref(), &options)
    };
    let mut session = session.context("Failed to ingest statements")?;

    let criteria = args.criteria(config, session.transactions());
    tracing::debug!(?criteria, "Applying filter");
    session.set_criteria(criteria);
    Ok(session)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn summary(session: &Session, json: bool) -> Result<()> {
    let view = session.view();
    if json {
        return print_json(&view.summary);
    }
    let mut out = String::new();
    report::write_summary(&mut out, &view)?;
    print!("{out}");
    Ok(())
}

pub fn transactions(session: &Session, limit: Option<usize>, json: bool) -> Result<()> {
    let mut transactions = session.view().transactions;
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }
    if json {
        return print_json(&transactions);
    }
    let mut out = String::new();
    report::write_transactions(&mut out, &transactions)?;
    print!("{out}");
    Ok(())
}

pub fn categories(session: &Session, json: bool) -> Result<()> {
    let summary = session.view().summary;
    if json {
        #[derive(Serialize)]
        struct CategoryRow<'a> {
            category: &'a str,
            count: usize,
            total: daric_core::Money,
        }
        let rows: Vec<CategoryRow> = summary
            .category_counts
            .iter()
            .map(|c| CategoryRow {
                category: &c.category,
                count: c.count,
                total: summary.category_totals.get(&c.category).copied().unwrap_or_default(),
            })
            .collect();
        return print_json(&rows);
    }
    let mut out = String::new();
    report::write_categories(&mut out, &summary)?;
    print!("{out}");
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
