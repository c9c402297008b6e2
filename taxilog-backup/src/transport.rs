//! Seams to the outside: where backup bytes and exported workbooks go.
//!
//! The real destinations (the driver's cloud drive and spreadsheet service)
//! live on the app side behind these traits. The local implementations below
//! back the CLI and tests with plain directories while keeping the remote
//! API shapes.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::sheet::Grid;

/// Filename prefix of uploaded backup blobs; retention pruning only ever
/// touches files carrying it.
pub const BACKUP_FILE_PREFIX: &str = "taxilog-backup-";

/// Backup blobs kept per directory unless the caller overrides it.
const DEFAULT_KEEP_BLOBS: usize = 7;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No such spreadsheet: {0}")]
    UnknownSpreadsheet(String),

    #[error("No {tab} tab in spreadsheet {spreadsheet}")]
    UnknownTab { spreadsheet: String, tab: String },
}

/// Identity of an uploaded blob, echoed back for the backup history screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub id: String,
    pub name: String,
}

#[allow(async_fn_in_trait)]
pub trait BlobTransport {
    async fn upload_blob(
        &self,
        name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<BlobHandle, TransportError>;
}

#[allow(async_fn_in_trait)]
pub trait SheetTransport {
    /// Create an empty spreadsheet with the given tab titles and return its id.
    async fn create_spreadsheet(&self, title: &str, tabs: &[&str])
        -> Result<String, TransportError>;

    async fn write_grid(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        grid: &Grid,
    ) -> Result<(), TransportError>;

    async fn read_grid(&self, spreadsheet_id: &str, tab: &str) -> Result<Grid, TransportError>;
}

// ── LocalBlobDir ──

/// [`BlobTransport`] over a directory. Uploads land as files; after each
/// upload the oldest `taxilog-backup-*` files beyond the retention count are
/// pruned, newest first by the date embedded in the name.
pub struct LocalBlobDir {
    root: PathBuf,
    keep: usize,
}

impl LocalBlobDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalBlobDir {
            root: root.into(),
            keep: DEFAULT_KEEP_BLOBS,
        }
    }

    pub fn with_retention(mut self, keep: usize) -> Self {
        self.keep = keep.max(1);
        self
    }

    async fn prune(&self) -> Result<(), TransportError> {
        let mut names: Vec<String> = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(BACKUP_FILE_PREFIX) {
                names.push(name);
            }
        }

        names.sort_by(|a, b| b.cmp(a));
        for old in names.into_iter().skip(self.keep) {
            let _ = fs::remove_file(self.root.join(&old)).await;
            tracing::info!("Removed old backup {}", old);
        }
        Ok(())
    }
}

impl BlobTransport for LocalBlobDir {
    async fn upload_blob(
        &self,
        name: &str,
        _mime_type: &str,
        data: Bytes,
    ) -> Result<BlobHandle, TransportError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        write_atomic(&path, &data).await?;
        tracing::info!("Stored backup {} ({} bytes)", name, data.len());

        if name.starts_with(BACKUP_FILE_PREFIX) {
            self.prune().await?;
        }

        Ok(BlobHandle {
            id: path.to_string_lossy().to_string(),
            name: name.to_string(),
        })
    }
}

// ── LocalSheetDir ──

/// [`SheetTransport`] over a directory: each spreadsheet is a subdirectory,
/// each tab one JSON grid file inside it.
pub struct LocalSheetDir {
    root: PathBuf,
}

impl LocalSheetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalSheetDir { root: root.into() }
    }

    fn sheet_dir(&self, spreadsheet_id: &str) -> PathBuf {
        self.root.join(spreadsheet_id)
    }

    fn tab_file(&self, spreadsheet_id: &str, tab: &str) -> PathBuf {
        self.sheet_dir(spreadsheet_id).join(format!("{tab}.json"))
    }
}

impl SheetTransport for LocalSheetDir {
    async fn create_spreadsheet(
        &self,
        title: &str,
        tabs: &[&str],
    ) -> Result<String, TransportError> {
        let id = format!("{}-{}", slug(title), &Uuid::new_v4().to_string()[..8]);
        let dir = self.sheet_dir(&id);
        fs::create_dir_all(&dir).await?;

        for tab in tabs {
            let empty: Grid = Vec::new();
            write_atomic(&self.tab_file(&id, tab), &serde_json::to_vec(&empty)?).await?;
        }

        tracing::info!("Created spreadsheet {} with {} tabs", id, tabs.len());
        Ok(id)
    }

    async fn write_grid(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        grid: &Grid,
    ) -> Result<(), TransportError> {
        if !fs::try_exists(self.sheet_dir(spreadsheet_id)).await? {
            return Err(TransportError::UnknownSpreadsheet(spreadsheet_id.to_string()));
        }
        let encoded = serde_json::to_vec_pretty(grid)?;
        write_atomic(&self.tab_file(spreadsheet_id, tab), &encoded).await?;
        Ok(())
    }

    async fn read_grid(&self, spreadsheet_id: &str, tab: &str) -> Result<Grid, TransportError> {
        let path = self.tab_file(spreadsheet_id, tab);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::UnknownTab {
                    spreadsheet: spreadsheet_id.to_string(),
                    tab: tab.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Write through a temp file in the same directory, then rename over the
/// target, so readers never observe a half-written file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
    let tmp = path.with_extension("partial");
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
