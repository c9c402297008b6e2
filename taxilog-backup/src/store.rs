//! Persistence seam between the backup core and whatever holds the app's
//! data. The core only needs bulk reads, singleton replacement and by-id
//! upserts; list CRUD, querying and migrations stay on the app side.

use dashmap::{DashMap, DashSet};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{
    AppSettings, BreakConfig, Collection, Concept, Expense, ScheduleException, Shift, Supplier,
    Trip, Workshop,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Permission denied for {collection}")]
    PermissionDenied { collection: Collection },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt data in {collection}: {detail}")]
    Corrupt { collection: Collection, detail: String },
}

impl StoreError {
    /// Payload building tolerates exactly this class of failure.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }
}

/// Storage operations the backup core relies on. Upserts must be idempotent:
/// writing a record whose id already exists fully overwrites it.
#[allow(async_fn_in_trait)]
pub trait TaxiStore {
    async fn load_settings(&self) -> Result<Option<AppSettings>, StoreError>;
    async fn load_break_config(&self) -> Result<Option<BreakConfig>, StoreError>;
    async fn load_exceptions(&self) -> Result<Vec<ScheduleException>, StoreError>;
    async fn load_trips(&self) -> Result<Vec<Trip>, StoreError>;
    async fn load_expenses(&self) -> Result<Vec<Expense>, StoreError>;
    async fn load_shifts(&self) -> Result<Vec<Shift>, StoreError>;
    async fn load_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    async fn load_concepts(&self) -> Result<Vec<Concept>, StoreError>;
    async fn load_workshops(&self) -> Result<Vec<Workshop>, StoreError>;

    async fn replace_settings(&self, settings: &AppSettings) -> Result<(), StoreError>;
    async fn replace_break_config(&self, config: &BreakConfig) -> Result<(), StoreError>;

    async fn upsert_trip(&self, trip: &Trip) -> Result<(), StoreError>;
    async fn upsert_expense(&self, expense: &Expense) -> Result<(), StoreError>;
    async fn upsert_shift(&self, shift: &Shift) -> Result<(), StoreError>;
    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError>;
    async fn upsert_concept(&self, concept: &Concept) -> Result<(), StoreError>;
    async fn upsert_workshop(&self, workshop: &Workshop) -> Result<(), StoreError>;
    async fn upsert_exception(&self, exception: &ScheduleException) -> Result<(), StoreError>;
}

// ── MemoryStore ──

/// In-memory [`TaxiStore`] used by tests and the demo seeder. Collections can
/// be marked as denied to exercise the permission-failure paths without a
/// real filesystem.
pub struct MemoryStore {
    settings: RwLock<Option<AppSettings>>,
    break_config: RwLock<Option<BreakConfig>>,
    exceptions: DashMap<String, ScheduleException>,
    trips: DashMap<String, Trip>,
    expenses: DashMap<String, Expense>,
    shifts: DashMap<String, Shift>,
    suppliers: DashMap<String, Supplier>,
    concepts: DashMap<String, Concept>,
    workshops: DashMap<String, Workshop>,
    denied_reads: DashSet<Collection>,
    denied_writes: DashSet<Collection>,
    corrupted: DashSet<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            settings: RwLock::new(None),
            break_config: RwLock::new(None),
            exceptions: DashMap::new(),
            trips: DashMap::new(),
            expenses: DashMap::new(),
            shifts: DashMap::new(),
            suppliers: DashMap::new(),
            concepts: DashMap::new(),
            workshops: DashMap::new(),
            denied_reads: DashSet::new(),
            denied_writes: DashSet::new(),
            corrupted: DashSet::new(),
        }
    }

    /// Make every read of `collection` fail with `PermissionDenied`.
    pub fn deny_reads(&self, collection: Collection) {
        self.denied_reads.insert(collection);
    }

    /// Make every write to `collection` fail with `PermissionDenied`.
    pub fn deny_writes(&self, collection: Collection) {
        self.denied_writes.insert(collection);
    }

    /// Make every read of `collection` fail with `Corrupt`, the class of
    /// failure backup building does not tolerate.
    pub fn corrupt_reads(&self, collection: Collection) {
        self.corrupted.insert(collection);
    }

    pub fn allow_all(&self) {
        self.denied_reads.clear();
        self.denied_writes.clear();
        self.corrupted.clear();
    }

    fn check_read(&self, collection: Collection) -> Result<(), StoreError> {
        if self.denied_reads.contains(&collection) {
            return Err(StoreError::PermissionDenied { collection });
        }
        if self.corrupted.contains(&collection) {
            return Err(StoreError::Corrupt {
                collection,
                detail: "simulated unreadable document".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, collection: Collection) -> Result<(), StoreError> {
        if self.denied_writes.contains(&collection) {
            return Err(StoreError::PermissionDenied { collection });
        }
        Ok(())
    }

    // Sorted so exports built from this store are deterministic.
    fn sorted<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
        let mut entries: Vec<(String, T)> = map
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, v)| v).collect()
    }

    pub fn trips(&self) -> Vec<Trip> {
        Self::sorted(&self.trips)
    }

    pub fn expenses(&self) -> Vec<Expense> {
        Self::sorted(&self.expenses)
    }

    pub fn shifts(&self) -> Vec<Shift> {
        Self::sorted(&self.shifts)
    }

    pub fn suppliers(&self) -> Vec<Supplier> {
        Self::sorted(&self.suppliers)
    }

    pub fn concepts(&self) -> Vec<Concept> {
        Self::sorted(&self.concepts)
    }

    pub fn workshops(&self) -> Vec<Workshop> {
        Self::sorted(&self.workshops)
    }

    pub fn exceptions(&self) -> Vec<ScheduleException> {
        Self::sorted(&self.exceptions)
    }

    pub async fn settings(&self) -> Option<AppSettings> {
        self.settings.read().await.clone()
    }

    pub async fn break_config(&self) -> Option<BreakConfig> {
        self.break_config.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxiStore for MemoryStore {
    async fn load_settings(&self) -> Result<Option<AppSettings>, StoreError> {
        self.check_read(Collection::Settings)?;
        Ok(self.settings.read().await.clone())
    }

    async fn load_break_config(&self) -> Result<Option<BreakConfig>, StoreError> {
        self.check_read(Collection::BreakConfiguration)?;
        Ok(self.break_config.read().await.clone())
    }

    async fn load_exceptions(&self) -> Result<Vec<ScheduleException>, StoreError> {
        self.check_read(Collection::Exceptions)?;
        Ok(Self::sorted(&self.exceptions))
    }

    async fn load_trips(&self) -> Result<Vec<Trip>, StoreError> {
        self.check_read(Collection::Trips)?;
        Ok(Self::sorted(&self.trips))
    }

    async fn load_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        self.check_read(Collection::Expenses)?;
        Ok(Self::sorted(&self.expenses))
    }

    async fn load_shifts(&self) -> Result<Vec<Shift>, StoreError> {
        self.check_read(Collection::Shifts)?;
        Ok(Self::sorted(&self.shifts))
    }

    async fn load_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        self.check_read(Collection::Suppliers)?;
        Ok(Self::sorted(&self.suppliers))
    }

    async fn load_concepts(&self) -> Result<Vec<Concept>, StoreError> {
        self.check_read(Collection::Concepts)?;
        Ok(Self::sorted(&self.concepts))
    }

    async fn load_workshops(&self) -> Result<Vec<Workshop>, StoreError> {
        self.check_read(Collection::Workshops)?;
        Ok(Self::sorted(&self.workshops))
    }

    async fn replace_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        self.check_write(Collection::Settings)?;
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }

    async fn replace_break_config(&self, config: &BreakConfig) -> Result<(), StoreError> {
        self.check_write(Collection::BreakConfiguration)?;
        *self.break_config.write().await = Some(config.clone());
        Ok(())
    }

    async fn upsert_trip(&self, trip: &Trip) -> Result<(), StoreError> {
        self.check_write(Collection::Trips)?;
        self.trips.insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    async fn upsert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        self.check_write(Collection::Expenses)?;
        self.expenses.insert(expense.id.clone(), expense.clone());
        Ok(())
    }

    async fn upsert_shift(&self, shift: &Shift) -> Result<(), StoreError> {
        self.check_write(Collection::Shifts)?;
        self.shifts.insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        self.check_write(Collection::Suppliers)?;
        self.suppliers.insert(supplier.id.clone(), supplier.clone());
        Ok(())
    }

    async fn upsert_concept(&self, concept: &Concept) -> Result<(), StoreError> {
        self.check_write(Collection::Concepts)?;
        self.concepts.insert(concept.id.clone(), concept.clone());
        Ok(())
    }

    async fn upsert_workshop(&self, workshop: &Workshop) -> Result<(), StoreError> {
        self.check_write(Collection::Workshops)?;
        self.workshops.insert(workshop.id.clone(), workshop.clone());
        Ok(())
    }

    async fn upsert_exception(&self, exception: &ScheduleException) -> Result<(), StoreError> {
        self.check_write(Collection::Exceptions)?;
        self.exceptions.insert(exception.id.clone(), exception.clone());
        Ok(())
    }
}
