//! High-level operations: build a payload from the store, move it through a
//! transport, bring it back.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use tracing::info;

use crate::error::{BackupError, Result};
use crate::model::Collection;
use crate::payload::{build_backup_payload, BackupMeta, BackupPayload};
use crate::progress::ProgressSink;
use crate::restore::{restore_payload, RestoreSummary};
use crate::sheet::{decode_workbook, encode_workbook, Grid};
use crate::store::TaxiStore;
use crate::transport::{
    BlobHandle, BlobTransport, SheetTransport, TransportError, BACKUP_FILE_PREFIX,
};

/// MIME type backup blobs are uploaded with.
pub const BACKUP_MIME: &str = "application/json";

/// Dated default filename; one backup slot per day, newer uploads of the
/// same day overwrite.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("{BACKUP_FILE_PREFIX}{}.json", at.format("%Y-%m-%d"))
}

/// Spreadsheet title for an export taken at `at`.
pub fn export_title(at: DateTime<Utc>) -> String {
    format!("Taxilog {}", at.format("%Y-%m-%d"))
}

/// Render a payload as the backup JSON document.
pub fn export_json(payload: &BackupPayload) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(payload)?)
}

/// Parse a backup document leniently: legacy field names and stringly-typed
/// values are accepted, the app marker is not checked here.
pub fn parse_payload(bytes: &[u8]) -> Result<BackupPayload> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Outcome of [`backup_to_blob`], for logs and the history screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub handle: BlobHandle,
    pub records: usize,
    pub bytes: usize,
}

/// Snapshot the store and upload it as one JSON blob.
pub async fn backup_to_blob<S, B>(store: &S, blob: &B) -> Result<BackupReport>
where
    S: TaxiStore,
    B: BlobTransport,
{
    let payload = build_backup_payload(store).await?;
    let encoded = export_json(&payload)?;
    let bytes = encoded.len();
    let name = backup_file_name(payload.meta.created_at);

    let handle = blob.upload_blob(&name, BACKUP_MIME, Bytes::from(encoded)).await?;
    info!(
        "Backup {} uploaded ({} records, {} bytes)",
        handle.name,
        payload.record_count(),
        bytes
    );

    Ok(BackupReport {
        handle,
        records: payload.record_count(),
        bytes,
    })
}

/// Outcome of [`export_to_sheets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetExport {
    pub spreadsheet_id: String,
    pub tabs: usize,
}

/// Snapshot the store and write it out as a dated spreadsheet workbook.
/// Tabs are written one at a time; sheet APIs apply concurrent writes in
/// arbitrary order.
pub async fn export_to_sheets<S, T>(store: &S, sheets: &T) -> Result<SheetExport>
where
    S: TaxiStore,
    T: SheetTransport,
{
    let payload = build_backup_payload(store).await?;
    let tabs = encode_workbook(&payload)?;
    let titles: Vec<&str> = tabs.iter().map(|(name, _)| name.as_str()).collect();

    let spreadsheet_id = sheets
        .create_spreadsheet(&export_title(payload.meta.created_at), &titles)
        .await?;
    for (name, grid) in &tabs {
        sheets.write_grid(&spreadsheet_id, name, grid).await?;
    }

    info!("Exported {} tabs to spreadsheet {}", tabs.len(), spreadsheet_id);
    Ok(SheetExport {
        spreadsheet_id,
        tabs: tabs.len(),
    })
}

/// Parse a backup document and apply it to the store.
pub async fn restore_from_json<S, P>(store: &S, bytes: &[u8], sink: P) -> Result<RestoreSummary>
where
    S: TaxiStore,
    P: ProgressSink,
{
    let payload = parse_payload(bytes)?;
    restore_payload(store, &payload, sink).await
}

/// Read the nine collection tabs of a workbook concurrently, rebuild the
/// payload and apply it to the store. A workbook without one of the tabs is
/// rejected as not being a taxilog export.
pub async fn restore_from_sheets<S, T, P>(
    store: &S,
    sheets: &T,
    spreadsheet_id: &str,
    sink: P,
) -> Result<RestoreSummary>
where
    S: TaxiStore,
    T: SheetTransport,
    P: ProgressSink,
{
    let reads = Collection::ALL
        .iter()
        .map(|collection| sheets.read_grid(spreadsheet_id, collection.tab_name()));
    let grids = try_join_all(reads).await.map_err(|err| match err {
        TransportError::UnknownTab { tab, .. } => BackupError::Validation(format!(
            "Workbook has no {tab} tab; not a taxilog export"
        )),
        other => BackupError::Transport(other),
    })?;

    let tabs: HashMap<String, Grid> = Collection::ALL
        .iter()
        .map(|collection| collection.tab_name().to_string())
        .zip(grids)
        .collect();

    let payload = decode_workbook(&tabs)?;
    restore_payload(store, &payload, sink).await
}

/// What the pre-restore confirmation screen shows: when a backup was written
/// and how much it holds, without touching the store.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupOverview {
    pub meta: BackupMeta,
    pub counts: Vec<(Collection, usize)>,
    pub records: usize,
}

pub fn peek_meta(bytes: &[u8]) -> Result<BackupOverview> {
    let payload = parse_payload(bytes)?;
    let counts = Collection::ALL
        .iter()
        .map(|collection| (*collection, payload.collection_len(*collection)))
        .collect();
    Ok(BackupOverview {
        meta: payload.meta.clone(),
        counts,
        records: payload.record_count(),
    })
}
