//! The backup payload: a complete snapshot of every collection plus the
//! metadata needed to validate it on the way back in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coerce::{lenient_date, lenient_text};
use crate::error::Result;
use crate::model::{
    AppSettings, BreakConfig, Collection, Concept, Expense, ScheduleException, Shift, Supplier,
    Trip, Workshop,
};
use crate::store::{StoreError, TaxiStore};

/// Marker every payload carries in `meta.app`. Restore rejects anything else
/// before touching the store.
pub const BACKUP_APP_MARKER: &str = "taxilog";

// ── BackupMeta ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    #[serde(default, deserialize_with = "lenient_text")]
    pub app: String,
    /// Version of the app that wrote the backup. Carried for diagnostics,
    /// not enforced on restore.
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: String,
    #[serde(alias = "created", default = "Utc::now", deserialize_with = "lenient_date")]
    pub created_at: DateTime<Utc>,
}

impl BackupMeta {
    pub fn current() -> Self {
        BackupMeta {
            app: BACKUP_APP_MARKER.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.app == BACKUP_APP_MARKER
    }
}

// A document with no meta block must not validate, so the fallback marker is
// empty rather than the canonical one.
impl Default for BackupMeta {
    fn default() -> Self {
        BackupMeta {
            app: String::new(),
            version: String::new(),
            created_at: Utc::now(),
        }
    }
}

// ── BackupPayload ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    #[serde(default)]
    pub meta: BackupMeta,
    #[serde(default)]
    pub settings: Option<AppSettings>,
    #[serde(alias = "breakConfig", default)]
    pub break_configuration: Option<BreakConfig>,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub workshops: Vec<Workshop>,
}

impl BackupPayload {
    pub fn empty() -> Self {
        BackupPayload {
            meta: BackupMeta::current(),
            settings: None,
            break_configuration: None,
            exceptions: Vec::new(),
            trips: Vec::new(),
            expenses: Vec::new(),
            shifts: Vec::new(),
            suppliers: Vec::new(),
            concepts: Vec::new(),
            workshops: Vec::new(),
        }
    }

    /// Number of entries a collection contributes; singletons count 0 or 1.
    pub fn collection_len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Settings => usize::from(self.settings.is_some()),
            Collection::BreakConfiguration => usize::from(self.break_configuration.is_some()),
            Collection::Exceptions => self.exceptions.len(),
            Collection::Trips => self.trips.len(),
            Collection::Expenses => self.expenses.len(),
            Collection::Shifts => self.shifts.len(),
            Collection::Suppliers => self.suppliers.len(),
            Collection::Concepts => self.concepts.len(),
            Collection::Workshops => self.workshops.len(),
        }
    }

    pub fn record_count(&self) -> usize {
        Collection::ALL
            .iter()
            .map(|c| self.collection_len(*c))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

/// Snapshot every collection through `store`, reading them concurrently.
///
/// A source that fails with a permission error is logged and replaced by an
/// empty collection, so one revoked grant cannot take the whole backup down.
/// Any other store failure aborts the build.
pub async fn build_backup_payload<S: TaxiStore>(store: &S) -> Result<BackupPayload> {
    let (settings, break_config, exceptions, trips, expenses, shifts, suppliers, concepts, workshops) = tokio::join!(
        store.load_settings(),
        store.load_break_config(),
        store.load_exceptions(),
        store.load_trips(),
        store.load_expenses(),
        store.load_shifts(),
        store.load_suppliers(),
        store.load_concepts(),
        store.load_workshops(),
    );

    Ok(BackupPayload {
        meta: BackupMeta::current(),
        settings: tolerate_singleton(Collection::Settings, settings)?,
        break_configuration: tolerate_singleton(Collection::BreakConfiguration, break_config)?,
        exceptions: tolerate_list(Collection::Exceptions, exceptions)?,
        trips: tolerate_list(Collection::Trips, trips)?,
        expenses: tolerate_list(Collection::Expenses, expenses)?,
        shifts: tolerate_list(Collection::Shifts, shifts)?,
        suppliers: tolerate_list(Collection::Suppliers, suppliers)?,
        concepts: tolerate_list(Collection::Concepts, concepts)?,
        workshops: tolerate_list(Collection::Workshops, workshops)?,
    })
}

fn tolerate_singleton<T>(
    collection: Collection,
    result: std::result::Result<Option<T>, StoreError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_permission_denied() => {
            warn!("{} unreadable, backing up without it: {}", collection, err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn tolerate_list<T>(
    collection: Collection,
    result: std::result::Result<Vec<T>, StoreError>,
) -> Result<Vec<T>> {
    match result {
        Ok(values) => Ok(values),
        Err(err) if err.is_permission_denied() => {
            warn!("{} unreadable, backing up without it: {}", collection, err);
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.replace_settings(&AppSettings::default()).await.unwrap();
        for id in ["t1", "t2", "t3"] {
            let trip: Trip = serde_json::from_value(json!({ "id": id })).unwrap();
            store.upsert_trip(&trip).await.unwrap();
        }
        let expense: Expense = serde_json::from_value(json!({ "id": "e1" })).unwrap();
        store.upsert_expense(&expense).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_build_snapshots_every_collection() {
        let store = seeded_store().await;
        let payload = build_backup_payload(&store).await.unwrap();

        assert!(payload.meta.is_valid());
        assert_eq!(payload.trips.len(), 3);
        assert_eq!(payload.expenses.len(), 1);
        assert_eq!(payload.collection_len(Collection::Settings), 1);
        assert_eq!(payload.record_count(), 5);
    }

    #[tokio::test]
    async fn test_permission_denied_source_is_isolated() {
        let store = seeded_store().await;
        store.deny_reads(Collection::Expenses);

        let payload = build_backup_payload(&store).await.unwrap();
        assert!(payload.expenses.is_empty());
        assert_eq!(payload.trips.len(), 3);
        assert!(payload.settings.is_some());
    }

    #[tokio::test]
    async fn test_non_permission_error_aborts_build() {
        let store = seeded_store().await;
        store.corrupt_reads(Collection::Trips);

        assert!(build_backup_payload(&store).await.is_err());
    }

    #[test]
    fn test_document_without_meta_does_not_validate() {
        let payload: BackupPayload = serde_json::from_value(json!({ "trips": [] })).unwrap();
        assert!(!payload.meta.is_valid());
    }

    #[test]
    fn test_legacy_payload_keys() {
        let payload: BackupPayload = serde_json::from_value(json!({
            "meta": { "app": "taxilog", "version": "0.9.0", "created": "2024-06-01T00:00:00Z" },
            "breakConfig": { "enabled": false }
        }))
        .unwrap();
        assert!(payload.meta.is_valid());
        assert_eq!(payload.break_configuration.map(|c| c.enabled), Some(false));
    }
}
