//! Applies a backup payload to the store, collection by collection.

use tracing::{debug, info};

use crate::error::{BackupError, Result};
use crate::model::Collection;
use crate::payload::BackupPayload;
use crate::progress::{ProgressSink, StepProgress};
use crate::store::TaxiStore;

/// Counts shown to the user once a restore completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub trips: usize,
    pub expenses: usize,
    pub shifts: usize,
}

/// Apply `payload` to `store` in the fixed [`Collection::RESTORE_ORDER`].
///
/// The payload's app marker is validated before anything is written. Steps
/// run sequentially and every record is upserted by id, so re-running the
/// same restore converges to the same store state. The first store error
/// aborts the remaining sequence; collections already applied stay applied,
/// leaving the store mixed between generations until a retry succeeds.
///
/// Progress is reported through `sink` at every step boundary and every 10th
/// record, ending with exactly `(100, "done")`.
pub async fn restore_payload<S, P>(
    store: &S,
    payload: &BackupPayload,
    sink: P,
) -> Result<RestoreSummary>
where
    S: TaxiStore,
    P: ProgressSink,
{
    if !payload.meta.is_valid() {
        return Err(BackupError::Validation(format!(
            "Not a taxilog backup (app marker {:?})",
            payload.meta.app
        )));
    }

    info!(
        "Restoring backup written {} ({} records)",
        payload.meta.created_at,
        payload.record_count()
    );

    let mut progress = StepProgress::new(sink, Collection::RESTORE_ORDER.len());

    for collection in Collection::RESTORE_ORDER {
        apply_step(store, payload, collection, &mut progress).await?;
    }

    progress.finish("done");

    Ok(RestoreSummary {
        trips: payload.trips.len(),
        expenses: payload.expenses.len(),
        shifts: payload.shifts.len(),
    })
}

async fn apply_step<S, P>(
    store: &S,
    payload: &BackupPayload,
    collection: Collection,
    progress: &mut StepProgress<P>,
) -> Result<()>
where
    S: TaxiStore,
    P: ProgressSink,
{
    match collection {
        Collection::Settings => match &payload.settings {
            Some(settings) => store.replace_settings(settings).await?,
            None => debug!("Backup carries no settings, keeping current ones"),
        },
        Collection::BreakConfiguration => match &payload.break_configuration {
            Some(config) => store.replace_break_config(config).await?,
            None => debug!("Backup carries no break configuration, keeping current one"),
        },
        Collection::Trips => {
            let count = payload.trips.len();
            for (index, trip) in payload.trips.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_trip(trip).await?;
            }
        }
        Collection::Expenses => {
            let count = payload.expenses.len();
            for (index, expense) in payload.expenses.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_expense(expense).await?;
            }
        }
        Collection::Shifts => {
            let count = payload.shifts.len();
            for (index, shift) in payload.shifts.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_shift(shift).await?;
            }
        }
        Collection::Suppliers => {
            let count = payload.suppliers.len();
            for (index, supplier) in payload.suppliers.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_supplier(supplier).await?;
            }
        }
        Collection::Concepts => {
            let count = payload.concepts.len();
            for (index, concept) in payload.concepts.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_concept(concept).await?;
            }
        }
        Collection::Workshops => {
            let count = payload.workshops.len();
            for (index, workshop) in payload.workshops.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_workshop(workshop).await?;
            }
        }
        Collection::Exceptions => {
            let count = payload.exceptions.len();
            for (index, exception) in payload.exceptions.iter().enumerate() {
                if index % 10 == 0 {
                    progress.item(index, count, &item_message(collection, index, count));
                }
                store.upsert_exception(exception).await?;
            }
        }
    }

    progress.step_done(&format!("Restored {collection}"));
    Ok(())
}

fn item_message(collection: Collection, index: usize, count: usize) -> String {
    format!("Restoring {collection} ({index}/{count})")
}
