//! Domain records carried in a backup payload.

mod catalog;
mod exception;
mod expense;
mod settings;
mod shift;
mod trip;

pub use catalog::{Concept, Supplier, Workshop};
pub use exception::ScheduleException;
pub use expense::{Expense, ServiceLine, VEHICLE_EXPENSE};
pub use settings::{AppSettings, BreakConfig, FiscalData, VehicleInfo};
pub use shift::Shift;
pub use trip::Trip;

use std::fmt;

// ── Collection ──

/// The nine collections a backup snapshots. Settings and break configuration
/// are singletons; the rest are id-keyed record lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Settings,
    BreakConfiguration,
    Exceptions,
    Trips,
    Expenses,
    Shifts,
    Suppliers,
    Concepts,
    Workshops,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Settings,
        Collection::BreakConfiguration,
        Collection::Exceptions,
        Collection::Trips,
        Collection::Expenses,
        Collection::Shifts,
        Collection::Suppliers,
        Collection::Concepts,
        Collection::Workshops,
    ];

    /// Fixed apply order for restores. References between collections are
    /// resolved lazily by the app, so catalogs may land after the expense
    /// records that point at them.
    pub const RESTORE_ORDER: [Collection; 9] = [
        Collection::Settings,
        Collection::BreakConfiguration,
        Collection::Trips,
        Collection::Expenses,
        Collection::Shifts,
        Collection::Suppliers,
        Collection::Concepts,
        Collection::Workshops,
        Collection::Exceptions,
    ];

    /// Key of this collection inside the payload JSON document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Settings => "settings",
            Collection::BreakConfiguration => "breakConfiguration",
            Collection::Exceptions => "exceptions",
            Collection::Trips => "trips",
            Collection::Expenses => "expenses",
            Collection::Shifts => "shifts",
            Collection::Suppliers => "suppliers",
            Collection::Concepts => "concepts",
            Collection::Workshops => "workshops",
        }
    }

    /// Tab title used for this collection in a spreadsheet export.
    pub fn tab_name(&self) -> &'static str {
        match self {
            Collection::Settings => "Settings",
            Collection::BreakConfiguration => "BreakConfiguration",
            Collection::Exceptions => "Exceptions",
            Collection::Trips => "Trips",
            Collection::Expenses => "Expenses",
            Collection::Shifts => "Shifts",
            Collection::Suppliers => "Suppliers",
            Collection::Concepts => "Concepts",
            Collection::Workshops => "Workshops",
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, Collection::Settings | Collection::BreakConfiguration)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_order_covers_every_collection_once() {
        for c in Collection::ALL {
            let hits = Collection::RESTORE_ORDER.iter().filter(|o| **o == c).count();
            assert_eq!(hits, 1, "{c} should appear exactly once");
        }
    }

    #[test]
    fn test_singletons_lead_the_restore_order() {
        assert!(Collection::RESTORE_ORDER[0].is_singleton());
        assert!(Collection::RESTORE_ORDER[1].is_singleton());
        assert!(Collection::RESTORE_ORDER[2..].iter().all(|c| !c.is_singleton()));
    }
}
