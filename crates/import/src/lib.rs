pub mod categories;
pub mod csv;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod unify;
pub(crate) mod util;

pub use categories::{resolve_category, CategoryMap};
pub use csv::{parse_statement, AmountColumns, CsvTransaction, StatementLayout};
pub use error::{ConfigError, DataSourceError, DriveError, FieldError, IngestError, MalformedInputError};
pub use pipeline::{build_transaction_set, run_pipeline, DashboardView, IngestOptions, Session};
pub use source::{
    DataSource, DriveClient, DriveSource, LocalFolderSource, RemoteFile, SampleSource, StatementFile,
    SAMPLE_CATEGORY_MAP,
};
pub use unify::unify;
