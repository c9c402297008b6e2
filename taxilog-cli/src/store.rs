//! File-backed [`TaxiStore`]: one JSON document per collection inside the
//! app's data directory, named after the payload key (`trips.json`,
//! `breakConfiguration.json`, ...). Writes go through a temp file and a
//! rename so a crash never leaves a half-written document behind.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use taxilog_backup::model::{
    AppSettings, BreakConfig, Collection, Concept, Expense, ScheduleException, Shift, Supplier,
    Trip, Workshop,
};
use taxilog_backup::store::{StoreError, TaxiStore};

pub struct JsonFileStore {
    root: PathBuf,
}

fn map_io(collection: Collection, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::PermissionDenied {
        StoreError::PermissionDenied { collection }
    } else {
        StoreError::Io(err)
    }
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileStore { root: root.into() }
    }

    fn file(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    async fn read_list<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        match fs::read(self.file(collection)).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|err| StoreError::Corrupt {
                collection,
                detail: err.to_string(),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(map_io(collection, err)),
        }
    }

    async fn read_singleton<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Option<T>, StoreError> {
        match fs::read(self.file(collection)).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|err| StoreError::Corrupt {
                    collection,
                    detail: err.to_string(),
                }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io(collection, err)),
        }
    }

    async fn write_doc<T: Serialize>(
        &self,
        collection: Collection,
        value: &T,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|err| map_io(collection, err))?;
        let path = self.file(collection);
        let partial = path.with_extension("json.partial");
        let encoded = serde_json::to_vec_pretty(value)?;
        fs::write(&partial, &encoded)
            .await
            .map_err(|err| map_io(collection, err))?;
        fs::rename(&partial, &path)
            .await
            .map_err(|err| map_io(collection, err))?;
        Ok(())
    }

    /// Read-modify-rewrite upsert keyed on the record's `id` field.
    async fn upsert_in_list<T: Serialize>(
        &self,
        collection: Collection,
        record: &T,
    ) -> Result<(), StoreError> {
        let mut records: Vec<Value> = self.read_list(collection).await?;
        let incoming = serde_json::to_value(record)?;
        let id = incoming
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            Some(slot) => *slot = incoming,
            None => records.push(incoming),
        }

        self.write_doc(collection, &records).await
    }
}

impl TaxiStore for JsonFileStore {
    async fn load_settings(&self) -> Result<Option<AppSettings>, StoreError> {
        self.read_singleton(Collection::Settings).await
    }

    async fn load_break_config(&self) -> Result<Option<BreakConfig>, StoreError> {
        self.read_singleton(Collection::BreakConfiguration).await
    }

    async fn load_exceptions(&self) -> Result<Vec<ScheduleException>, StoreError> {
        self.read_list(Collection::Exceptions).await
    }

    async fn load_trips(&self) -> Result<Vec<Trip>, StoreError> {
        self.read_list(Collection::Trips).await
    }

    async fn load_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        self.read_list(Collection::Expenses).await
    }

    async fn load_shifts(&self) -> Result<Vec<Shift>, StoreError> {
        self.read_list(Collection::Shifts).await
    }

    async fn load_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        self.read_list(Collection::Suppliers).await
    }

    async fn load_concepts(&self) -> Result<Vec<Concept>, StoreError> {
        self.read_list(Collection::Concepts).await
    }

    async fn load_workshops(&self) -> Result<Vec<Workshop>, StoreError> {
        self.read_list(Collection::Workshops).await
    }

    async fn replace_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        self.write_doc(Collection::Settings, settings).await
    }

    async fn replace_break_config(&self, config: &BreakConfig) -> Result<(), StoreError> {
        self.write_doc(Collection::BreakConfiguration, config).await
    }

    async fn upsert_trip(&self, trip: &Trip) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Trips, trip).await
    }

    async fn upsert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Expenses, expense).await
    }

    async fn upsert_shift(&self, shift: &Shift) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Shifts, shift).await
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Suppliers, supplier).await
    }

    async fn upsert_concept(&self, concept: &Concept) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Concepts, concept).await
    }

    async fn upsert_workshop(&self, workshop: &Workshop) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Workshops, workshop).await
    }

    async fn upsert_exception(&self, exception: &ScheduleException) -> Result<(), StoreError> {
        self.upsert_in_list(Collection::Exceptions, exception).await
    }
}
