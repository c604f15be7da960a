use chrono::NaiveDate;
use daric_core::{Money, SourceType, TransactionKind};

use crate::error::{FieldError, MalformedInputError};
use crate::util::{eq_ignore_case, normalize_description, starts_with_ignore_case};

/// Where a layout reads the amount from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column.
    Signed(String),
    /// Money out and money in, each unsigned; combined as `credit - debit`.
    Split { debit: String, credit: String },
}

/// Fixed column layout of one statement export format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLayout {
    pub source_type: SourceType,
    pub date_column: String,
    pub description_column: String,
    pub amount: AmountColumns,
    /// Columns that must be present even though no field is read from them.
    pub other_columns: Vec<String>,
    pub date_format: String,
    /// Card exports list charges as positive numbers.
    pub negate_amounts: bool,
    /// Rows with these descriptions are dropped, case-insensitively.
    pub excluded_descriptions: Vec<String>,
    /// First matching description prefix decides the kind.
    pub kind_prefixes: Vec<(String, TransactionKind)>,
    pub default_kind: TransactionKind,
    pub delimiter: u8,
}

impl StatementLayout {
    /// Checking account export: `Data,Valor,Identificador,Descrição`.
    pub fn account() -> Self {
        Self {
            source_type: SourceType::Account,
            date_column: "Data".to_string(),
            description_column: "Descrição".to_string(),
            amount: AmountColumns::Signed("Valor".to_string()),
            other_columns: vec!["Identificador".to_string()],
            date_format: "%d/%m/%Y".to_string(),
            negate_amounts: false,
            excluded_descriptions: vec!["Pagamento de fatura".to_string()],
            kind_prefixes: vec![
                ("Transferência".to_string(), TransactionKind::Transfer),
                ("Estorno".to_string(), TransactionKind::Reversal),
                ("Compra no débito".to_string(), TransactionKind::DebitPurchase),
            ],
            default_kind: TransactionKind::Other,
            delimiter: b',',
        }
    }

    /// Credit card export: `date,title,amount`, older files add `category`.
    pub fn credit_card() -> Self {
        Self {
            source_type: SourceType::CreditCard,
            date_column: "date".to_string(),
            description_column: "title".to_string(),
            amount: AmountColumns::Signed("amount".to_string()),
            other_columns: Vec::new(),
            date_format: "%Y-%m-%d".to_string(),
            negate_amounts: true,
            excluded_descriptions: vec!["Pagamento recebido".to_string()],
            kind_prefixes: Vec::new(),
            default_kind: TransactionKind::CreditPurchase,
            delimiter: b',',
        }
    }

    pub fn for_source(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Account => Self::account(),
            SourceType::CreditCard => Self::credit_card(),
        }
    }

    pub fn with_excluded_descriptions(mut self, excluded: Vec<String>) -> Self {
        self.excluded_descriptions = excluded;
        self
    }

    fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.date_column.as_str(), self.description_column.as_str()];
        match &self.amount {
            AmountColumns::Signed(column) => columns.push(column),
            AmountColumns::Split { debit, credit } => {
                columns.push(debit);
                columns.push(credit);
            }
        }
        columns.extend(self.other_columns.iter().map(String::as_str));
        columns
    }

    fn kind_of(&self, description: &str) -> TransactionKind {
        self.kind_prefixes
            .iter()
            .find(|(prefix, _)| starts_with_ignore_case(description, prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(self.default_kind)
    }

    fn is_excluded(&self, description: &str) -> bool {
        self.excluded_descriptions
            .iter()
            .any(|excluded| eq_ignore_case(description, excluded))
    }
}

/// One statement row, parsed but not yet categorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub source_type: SourceType,
    pub kind: TransactionKind,
}

enum AmountIndex {
    Signed(usize),
    Split { debit: usize, credit: usize },
}

struct ColumnIndex {
    date: usize,
    description: usize,
    amount: AmountIndex,
}

/// Parses one statement file. `file` only labels errors and log lines.
pub fn parse_statement(
    file: &str,
    content: &[u8],
    layout: &StatementLayout,
) -> Result<Vec<CsvTransaction>, MalformedInputError> {
    let text = std::str::from_utf8(content).map_err(|e| MalformedInputError::Encoding {
        file: file.to_string(),
        valid_up_to: e.valid_up_to(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(layout.delimiter)
        .trim(::csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| row_error(file, &e))?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(MalformedInputError::MissingHeader {
            file: file.to_string(),
        });
    }
    let columns = locate_columns(file, &headers, layout)?;

    let mut transactions = Vec::new();
    let mut excluded = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| row_error(file, &e))?;
        let row = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| record.get(idx).unwrap_or_default();
        let invalid = |idx: usize, reason: FieldError| MalformedInputError::InvalidField {
            file: file.to_string(),
            row,
            column: headers.get(idx).unwrap_or_default().to_string(),
            reason,
        };

        let description = normalize_description(field(columns.description));

        let raw_date = field(columns.date);
        let date = NaiveDate::parse_from_str(raw_date, &layout.date_format).map_err(|_| {
            invalid(
                columns.date,
                FieldError::InvalidDate {
                    value: raw_date.to_string(),
                    format: layout.date_format.clone(),
                },
            )
        })?;

        let amount = match columns.amount {
            AmountIndex::Signed(idx) => parse_amount(field(idx)).map_err(|e| invalid(idx, e))?,
            AmountIndex::Split { debit, credit } => {
                let out = parse_optional_amount(field(debit)).map_err(|e| invalid(debit, e))?;
                let inn = parse_optional_amount(field(credit)).map_err(|e| invalid(credit, e))?;
                match (out, inn) {
                    (None, None) => return Err(invalid(debit, FieldError::MissingAmount)),
                    (out, inn) => {
                        inn.unwrap_or_default().abs() - out.unwrap_or_default().abs()
                    }
                }
            }
        };
        let amount = if layout.negate_amounts { -amount } else { amount };

        // Excluded rows must still be well-formed.
        if layout.is_excluded(&description) {
            excluded += 1;
            tracing::debug!(file, row, %description, "Skipping excluded row");
            continue;
        }

        transactions.push(CsvTransaction {
            date,
            kind: layout.kind_of(&description),
            description,
            amount,
            source_type: layout.source_type,
        });
    }

    if transactions.is_empty() && excluded == 0 {
        tracing::warn!(file, "Statement has a header but no transactions");
    }
    tracing::debug!(
        file,
        source_type = %layout.source_type,
        parsed = transactions.len(),
        excluded,
        "Parsed statement"
    );

    Ok(transactions)
}

fn locate_columns(
    file: &str,
    headers: &::csv::StringRecord,
    layout: &StatementLayout,
) -> Result<ColumnIndex, MalformedInputError> {
    let find = |name: &str| headers.iter().position(|h| eq_ignore_case(h, name));

    for column in layout.required_columns() {
        if find(column).is_none() {
            return Err(MalformedInputError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }
    }

    // Presence checked above.
    let index = |name: &str| find(name).unwrap_or_default();
    Ok(ColumnIndex {
        date: index(&layout.date_column),
        description: index(&layout.description_column),
        amount: match &layout.amount {
            AmountColumns::Signed(column) => AmountIndex::Signed(index(column)),
            AmountColumns::Split { debit, credit } => AmountIndex::Split {
                debit: index(debit),
                credit: index(credit),
            },
        },
    })
}

fn parse_amount(s: &str) -> Result<Money, FieldError> {
    s.parse::<Money>().map_err(|reason| FieldError::InvalidAmount {
        value: s.to_string(),
        reason,
    })
}

fn parse_optional_amount(s: &str) -> Result<Option<Money>, FieldError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(s).map(Some)
    }
}

fn row_error(file: &str, e: &::csv::Error) -> MalformedInputError {
    MalformedInputError::InvalidRow {
        file: file.to_string(),
        row: e.position().map(|p| p.line()).unwrap_or_default(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daric_core::ParseMoneyError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── account layout ────────────────────────────────────────────────────────

    #[test]
    fn account_basic() {
        let data = "Data,Valor,Identificador,Descrição\n\
                    01/01/2024,1000.00,a1,Salary\n\
                    15/01/2024,-500.00,a2,Rent\n";
        let txs = parse_statement("nubank.csv", data.as_bytes(), &StatementLayout::account()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].date, date(2024, 1, 1));
        assert_eq!(txs[0].amount, Money::from_cents(100_000));
        assert_eq!(txs[1].description, "Rent");
        assert_eq!(txs[1].amount, Money::from_cents(-50_000));
        assert!(txs.iter().all(|t| t.source_type == SourceType::Account));
    }

    #[test]
    fn account_kinds_from_description_prefix() {
        let data = "Data,Valor,Identificador,Descrição\n\
                    02/01/2024,-20.00,a1,Transferência enviada pelo Pix - Ana\n\
                    03/01/2024,15.00,a2,Estorno - Compra no débito - Loja\n\
                    04/01/2024,-9.90,a3,Compra no débito - Padaria\n\
                    05/01/2024,-3.00,a4,Tarifa\n";
        let kinds: Vec<_> = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                TransactionKind::Transfer,
                TransactionKind::Reversal,
                TransactionKind::DebitPurchase,
                TransactionKind::Other,
            ]
        );
    }

    #[test]
    fn account_drops_bill_payments() {
        let data = "Data,Valor,Identificador,Descrição\n\
                    10/01/2024,-800.00,a1,Pagamento de fatura\n\
                    11/01/2024,-5.00,a2,Coffee\n";
        let txs = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "Coffee");
    }

    #[test]
    fn description_whitespace_is_normalized() {
        let data = "Data,Valor,Identificador,Descrição\n05/01/2024,-54.30,a1,\"  Grocery    Store \"\n";
        let txs = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap();
        assert_eq!(txs[0].description, "Grocery Store");
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let data = "\u{feff}Data,Valor,Identificador,Descrição\n05/01/2024,-1.00,a1,X\n";
        assert!(parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).is_ok());
    }

    // ── credit card layout ────────────────────────────────────────────────────

    #[test]
    fn credit_card_negates_charges() {
        let data = "date,title,amount\n\
                    2024-01-05,Uber,23.50\n\
                    2024-01-06,Refund,-10.00\n\
                    2024-01-07,Pagamento recebido,-500.00\n";
        let txs = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, Money::from_cents(-2_350));
        assert_eq!(txs[1].amount, Money::from_cents(1_000));
        assert!(txs.iter().all(|t| t.kind == TransactionKind::CreditPurchase));
    }

    #[test]
    fn credit_card_with_category_column() {
        let data = "date,category,title,amount\n2024-01-05,transporte,Uber,23.50\n";
        let txs = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap();
        assert_eq!(txs[0].description, "Uber");
        assert_eq!(txs[0].amount, Money::from_cents(-2_350));
    }

    #[test]
    fn header_only_yields_no_rows() {
        let data = "date,title,amount\n";
        let txs = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap();
        assert!(txs.is_empty());
    }

    // ── header errors ─────────────────────────────────────────────────────────

    #[test]
    fn missing_description_column_is_a_header_error() {
        let data = "Data,Valor,Identificador\n01/01/2024,10.00,a1\n";
        let err = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap_err();
        assert!(err.is_header_error());
        assert!(matches!(
            &err,
            MalformedInputError::MissingColumn { column, .. } if column == "Descrição"
        ));
        assert_eq!(err.file(), "a.csv");
    }

    #[test]
    fn card_file_in_account_slot_is_rejected() {
        let data = "date,title,amount\n2024-01-05,Uber,23.50\n";
        let err = parse_statement("card.csv", data.as_bytes(), &StatementLayout::account()).unwrap_err();
        assert!(err.is_header_error());
    }

    #[test]
    fn empty_file_is_a_header_error() {
        let err = parse_statement("empty.csv", b"", &StatementLayout::account()).unwrap_err();
        assert!(matches!(err, MalformedInputError::MissingHeader { .. }));
    }

    #[test]
    fn header_match_ignores_case_and_padding() {
        let data = " DATE , Title ,AMOUNT\n2024-01-05,Uber,23.50\n";
        assert!(parse_statement("c.csv", data.as_bytes(), &StatementLayout::credit_card()).is_ok());
    }

    // ── row errors ────────────────────────────────────────────────────────────

    #[test]
    fn invalid_amount_names_row_and_column() {
        let data = "date,title,amount\n2024-01-05,Uber,23.50\n2024-01-06,Taxi,twelve\n";
        let err = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap_err();
        match err {
            MalformedInputError::InvalidField { file, row, column, reason } => {
                assert_eq!(file, "card.csv");
                assert_eq!(row, 3);
                assert_eq!(column, "amount");
                assert_eq!(
                    reason,
                    FieldError::InvalidAmount {
                        value: "twelve".to_string(),
                        reason: ParseMoneyError::Invalid,
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sub_cent_amount_is_rejected() {
        let data = "date,title,amount\n2024-01-04,Fee,1.004\n2024-01-04,Fee,1.001\n";
        let err = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField {
                row: 2,
                reason: FieldError::InvalidAmount { reason: ParseMoneyError::TooPrecise, .. },
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_amount_is_rejected() {
        let data = "date,title,amount\n\
                    2024-01-04,Big,79228162514264337593543950335\n\
                    2024-01-05,Big,79228162514264337593543950335\n";
        let err = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField {
                row: 2,
                reason: FieldError::InvalidAmount { reason: ParseMoneyError::OutOfRange, .. },
                ..
            }
        ));
    }

    #[test]
    fn excluded_row_with_bad_fields_is_still_an_error() {
        let data = "Data,Valor,Identificador,Descrição\nnot-a-date,abc,a1,Pagamento de fatura\n";
        let err = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField { row: 2, reason: FieldError::InvalidDate { .. }, .. }
        ));

        let data = "Data,Valor,Identificador,Descrição\n10/01/2024,abc,a1,Pagamento de fatura\n";
        let err = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField { row: 2, reason: FieldError::InvalidAmount { .. }, .. }
        ));
    }

    #[test]
    fn date_in_wrong_locale_is_rejected() {
        // Account dates are day-first; ISO dates must not be guessed at.
        let data = "Data,Valor,Identificador,Descrição\n2024-01-05,-1.00,a1,X\n";
        let err = parse_statement("a.csv", data.as_bytes(), &StatementLayout::account()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField { row: 2, reason: FieldError::InvalidDate { .. }, .. }
        ));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let data = "date,title,amount\n2024-01-05,Uber\n";
        let err = parse_statement("card.csv", data.as_bytes(), &StatementLayout::credit_card()).unwrap_err();
        assert!(matches!(err, MalformedInputError::InvalidRow { row: 2, .. }));
    }

    #[test]
    fn non_utf8_content_is_rejected() {
        let err = parse_statement("a.csv", b"Data,Valor\n\xff\xfe", &StatementLayout::account()).unwrap_err();
        assert!(matches!(err, MalformedInputError::Encoding { valid_up_to: 11, .. }));
    }

    // ── debit/credit columns ──────────────────────────────────────────────────

    fn split_layout() -> StatementLayout {
        StatementLayout {
            source_type: SourceType::Account,
            date_column: "date".to_string(),
            description_column: "description".to_string(),
            amount: AmountColumns::Split {
                debit: "debit".to_string(),
                credit: "credit".to_string(),
            },
            other_columns: Vec::new(),
            date_format: "%Y-%m-%d".to_string(),
            negate_amounts: false,
            excluded_descriptions: Vec::new(),
            kind_prefixes: Vec::new(),
            default_kind: TransactionKind::Other,
            delimiter: b',',
        }
    }

    #[test]
    fn split_columns_combine_into_signed_amount() {
        let data = "date,description,debit,credit\n2024-01-15,PAYROLL,,100.00\n2024-01-16,CHARGE,50.00,\n";
        let txs = parse_statement("s.csv", data.as_bytes(), &split_layout()).unwrap();
        assert_eq!(txs[0].amount, Money::from_cents(10_000));
        assert_eq!(txs[1].amount, Money::from_cents(-5_000));
    }

    #[test]
    fn split_columns_both_empty_is_rejected_not_zeroed() {
        let data = "date,description,debit,credit\n2024-01-15,NOTHING,,\n";
        let err = parse_statement("s.csv", data.as_bytes(), &split_layout()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidField { reason: FieldError::MissingAmount, .. }
        ));
    }

    #[test]
    fn excluded_descriptions_are_configurable() {
        let layout = StatementLayout::credit_card().with_excluded_descriptions(vec!["iof".to_string()]);
        let data = "date,title,amount\n2024-01-05,IOF,1.20\n2024-01-05,Pagamento recebido,-9.00\n";
        let txs = parse_statement("c.csv", data.as_bytes(), &layout).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "Pagamento recebido");
    }
}
