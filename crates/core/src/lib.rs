pub mod filter;
pub mod money;
pub mod period;
pub mod summary;
pub mod transaction;

pub use filter::FilterCriteria;
pub use money::{Money, ParseMoneyError};
pub use period::{DateRange, ParseYearMonthError, YearMonth};
pub use summary::{CategoryCount, MonthComparison, PeriodTotals, SummaryMetrics, DEFAULT_TOP_N};
pub use transaction::{Flow, SourceType, Transaction, TransactionKind, TransactionSet, UNCATEGORIZED};
