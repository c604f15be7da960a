//! Where statement files come from.
//!
//! Every source hands back raw [`StatementFile`]s; parsing happens later so
//! that upload, folder and drive input all share one code path.

use daric_core::SourceType;
use std::path::{Path, PathBuf};

use crate::error::{DataSourceError, DriveError};

/// Raw content of one uploaded or fetched statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub name: String,
    pub source_type: SourceType,
    pub content: Vec<u8>,
}

impl StatementFile {
    pub fn new(name: impl Into<String>, source_type: SourceType, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source_type,
            content: content.into(),
        }
    }
}

pub trait DataSource {
    fn fetch(&self) -> Result<Vec<StatementFile>, DataSourceError>;
}

// ── Sample data ───────────────────────────────────────────────────────────────

const SAMPLE_ACCOUNT: &[u8] = include_bytes!("../data/sample_account.csv");
const SAMPLE_CREDIT_CARD: &[u8] = include_bytes!("../data/sample_credit_card.csv");
/// Category map matching the sample statements.
pub const SAMPLE_CATEGORY_MAP: &str = include_str!("../data/category_map.json");

/// Demo statements compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

impl DataSource for SampleSource {
    fn fetch(&self) -> Result<Vec<StatementFile>, DataSourceError> {
        Ok(vec![
            StatementFile::new("sample_account.csv", SourceType::Account, SAMPLE_ACCOUNT),
            StatementFile::new(
                "sample_credit_card.csv",
                SourceType::CreditCard,
                SAMPLE_CREDIT_CARD,
            ),
        ])
    }
}

// ── Local folders ─────────────────────────────────────────────────────────────

/// Every `*.csv` file in one folder per statement format, by file name.
#[derive(Debug, Clone, Default)]
pub struct LocalFolderSource {
    pub account_dir: Option<PathBuf>,
    pub credit_card_dir: Option<PathBuf>,
}

impl LocalFolderSource {
    pub fn new(account_dir: Option<PathBuf>, credit_card_dir: Option<PathBuf>) -> Self {
        Self {
            account_dir,
            credit_card_dir,
        }
    }
}

impl DataSource for LocalFolderSource {
    fn fetch(&self) -> Result<Vec<StatementFile>, DataSourceError> {
        let mut files = Vec::new();
        if let Some(dir) = &self.account_dir {
            files.extend(read_csv_folder(dir, SourceType::Account)?);
        }
        if let Some(dir) = &self.credit_card_dir {
            files.extend(read_csv_folder(dir, SourceType::CreditCard)?);
        }
        Ok(files)
    }
}

fn read_csv_folder(dir: &Path, source_type: SourceType) -> Result<Vec<StatementFile>, DataSourceError> {
    if !dir.is_dir() {
        return Err(DataSourceError::FolderNotFound(dir.to_path_buf()));
    }
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| DataSourceError::Io { path, source }
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read(&path).map_err(io_err(&path))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        files.push(StatementFile::new(name, source_type, content));
    }

    tracing::debug!(dir = %dir.display(), %source_type, files = files.len(), "Read statement folder");
    Ok(files)
}

// ── Cloud drive ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

/// Listing and download calls of a cloud drive. Credentials are the
/// implementor's concern.
pub trait DriveClient {
    /// CSV files directly inside `folder_id`.
    fn list_csv_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError>;
    fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;
}

/// One drive folder per statement format.
pub struct DriveSource<C: DriveClient> {
    client: C,
    account_folder: Option<String>,
    credit_card_folder: Option<String>,
}

impl<C: DriveClient> DriveSource<C> {
    pub fn new(client: C, account_folder: Option<String>, credit_card_folder: Option<String>) -> Self {
        Self {
            client,
            account_folder,
            credit_card_folder,
        }
    }

    fn fetch_folder(
        &self,
        folder_id: &str,
        source_type: SourceType,
    ) -> Result<Vec<StatementFile>, DataSourceError> {
        let listed = self.client.list_csv_files(folder_id)?;
        if listed.is_empty() {
            return Err(DataSourceError::EmptyFolder(folder_id.to_string()));
        }

        let mut files = Vec::with_capacity(listed.len());
        for remote in listed {
            let content = self.client.download(&remote.id)?;
            files.push(StatementFile::new(remote.name, source_type, content));
        }
        tracing::debug!(folder_id, %source_type, files = files.len(), "Downloaded drive folder");
        Ok(files)
    }
}

impl<C: DriveClient> DataSource for DriveSource<C> {
    fn fetch(&self) -> Result<Vec<StatementFile>, DataSourceError> {
        let mut files = Vec::new();
        if let Some(folder) = &self.account_folder {
            files.extend(self.fetch_folder(folder, SourceType::Account)?);
        }
        if let Some(folder) = &self.credit_card_folder {
            files.extend(self.fetch_folder(folder, SourceType::CreditCard)?);
        }
        Ok(files)
    }
}
