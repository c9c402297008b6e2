//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, Utc};
use uuid::Uuid;

use taxilog_backup::model::{
    AppSettings, BreakConfig, Concept, Expense, FiscalData, ScheduleException, ServiceLine, Shift,
    Supplier, Trip, VehicleInfo, Workshop, VEHICLE_EXPENSE,
};
use taxilog_backup::transport::{LocalBlobDir, LocalSheetDir};
use taxilog_backup::{
    backup_to_blob, export_to_sheets, peek_meta, restore_from_json, restore_from_sheets, TaxiStore,
};

use crate::config::Config;
use crate::store::JsonFileStore;

fn log_progress(percent: f64, message: &str) {
    tracing::info!("{:>5.1}% {}", percent, message);
}

/// Snapshot the data directory into a dated JSON backup blob.
pub async fn run_backup(config: &Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.storage.data_dir);
    let blobs =
        LocalBlobDir::new(&config.backup.backup_dir).with_retention(config.backup.keep_backups);

    let report = backup_to_blob(&store, &blobs).await?;
    println!(
        "Backed up {} records to {} ({} bytes)",
        report.records, report.handle.name, report.bytes
    );
    Ok(())
}

/// Export the data directory as a spreadsheet workbook.
pub async fn run_export(config: &Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.storage.data_dir);
    let sheets = LocalSheetDir::new(&config.backup.sheets_dir);

    let export = export_to_sheets(&store, &sheets).await?;
    println!(
        "Exported {} tabs to spreadsheet {}",
        export.tabs, export.spreadsheet_id
    );
    Ok(())
}

/// Restore the data directory from a backup file or an exported spreadsheet.
pub async fn run_restore(
    config: &Config,
    file: Option<PathBuf>,
    sheet: Option<String>,
) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.storage.data_dir);

    let summary = match (file, sheet) {
        (Some(path), None) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            restore_from_json(&store, &bytes, log_progress).await?
        }
        (None, Some(id)) => {
            let sheets = LocalSheetDir::new(&config.backup.sheets_dir);
            restore_from_sheets(&store, &sheets, &id, log_progress).await?
        }
        _ => anyhow::bail!("pass exactly one of --file or --sheet"),
    };

    println!(
        "Restored {} trips, {} expenses, {} shifts",
        summary.trips, summary.expenses, summary.shifts
    );
    Ok(())
}

/// Show what a backup file holds without touching the data directory.
pub async fn run_inspect(path: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let overview = peek_meta(&bytes)?;

    let marker = if overview.meta.is_valid() {
        "ok"
    } else {
        "NOT A TAXILOG BACKUP"
    };
    println!("App:     {} ({})", overview.meta.app, marker);
    println!("Version: {}", overview.meta.version);
    println!("Created: {}", overview.meta.created_at.to_rfc3339());
    println!();
    for (collection, count) in &overview.counts {
        println!("  {:<20} {:>6}", collection, count);
    }
    println!("  {:<20} {:>6}", "total", overview.records);
    Ok(())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fill the data directory with a small demo data set. Records are upserted,
/// so existing data survives with fresh demo records merged in.
pub async fn run_seed(config: &Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.storage.data_dir);
    let now = Utc::now();

    let settings = AppSettings {
        daily_goal: 180.0,
        currency: "EUR".to_string(),
        locale: "es-ES".to_string(),
        license_number: "M-12345".to_string(),
        fiscal_data: FiscalData {
            name: "Antonio García López".to_string(),
            tax_id: "12345678Z".to_string(),
            address: "Calle de Alcalá 210, 3ºB".to_string(),
            city: "Madrid".to_string(),
            postal_code: "28028".to_string(),
        },
        vehicle: VehicleInfo {
            plate: "1234 BCD".to_string(),
            make: "Toyota".to_string(),
            model: "Prius+".to_string(),
            year: 2021.0,
        },
    };
    store.replace_settings(&settings).await?;
    store.replace_break_config(&BreakConfig::default()).await?;

    let shift_id = new_id();
    let shift = Shift {
        id: shift_id.clone(),
        started_at: now - Duration::hours(30),
        ended_at: Some(now - Duration::hours(22)),
        break_minutes: 45.0,
        start_km: 182_340.0,
        end_km: 182_517.0,
        notes: None,
    };
    store.upsert_shift(&shift).await?;

    let trips = [
        Trip {
            id: new_id(),
            date: now - Duration::hours(29),
            taximeter_fare: 14.35,
            charged_amount: 14.35,
            tip: 0.65,
            payment_method: "cash".to_string(),
            trip_type: "street".to_string(),
            origin: Some("Atocha".to_string()),
            destination: Some("Chamartín".to_string()),
            shift_id: Some(shift_id.clone()),
            notes: None,
        },
        Trip {
            id: new_id(),
            date: now - Duration::hours(27),
            taximeter_fare: 32.10,
            charged_amount: 32.10,
            tip: 0.0,
            payment_method: "card".to_string(),
            trip_type: "stand".to_string(),
            origin: Some("Aeropuerto T4".to_string()),
            destination: Some("Plaza de Castilla".to_string()),
            shift_id: Some(shift_id.clone()),
            notes: None,
        },
        Trip {
            id: new_id(),
            date: now - Duration::hours(24),
            taximeter_fare: 18.75,
            charged_amount: 20.00,
            tip: 1.25,
            payment_method: "app".to_string(),
            trip_type: "dispatch".to_string(),
            origin: Some("Gran Vía".to_string()),
            destination: Some("Vallecas".to_string()),
            shift_id: Some(shift_id),
            notes: Some("[urgente] cliente habitual".to_string()),
        },
    ];
    for trip in &trips {
        store.upsert_trip(trip).await?;
    }

    let supplier_id = new_id();
    let workshop_id = new_id();
    let expenses = [
        Expense {
            id: new_id(),
            date: now - Duration::hours(28),
            concept: "Combustible".to_string(),
            expense_type: "fuel".to_string(),
            supplier_id: Some(supplier_id.clone()),
            workshop_id: None,
            base_amount: 49.59,
            tax_rate: 21.0,
            tax_amount: 10.41,
            total_amount: 60.0,
            deductible: true,
            payment_method: "card".to_string(),
            invoice_number: Some("R-2024-5512".to_string()),
            odometer_km: 182_400.0,
            services: Vec::new(),
            notes: None,
        },
        Expense {
            id: new_id(),
            date: now - Duration::days(3),
            concept: "Revisión 180.000 km".to_string(),
            expense_type: VEHICLE_EXPENSE.to_string(),
            supplier_id: None,
            workshop_id: Some(workshop_id.clone()),
            base_amount: 223.14,
            tax_rate: 21.0,
            tax_amount: 46.86,
            total_amount: 270.0,
            deductible: true,
            payment_method: "card".to_string(),
            invoice_number: Some("T-0887".to_string()),
            odometer_km: 182_100.0,
            services: vec![
                ServiceLine {
                    description: "Cambio de aceite y filtro".to_string(),
                    quantity: 1.0,
                    unit_price: 95.0,
                    amount: 95.0,
                },
                ServiceLine {
                    description: "Pastillas de freno delanteras".to_string(),
                    quantity: 2.0,
                    unit_price: 87.5,
                    amount: 175.0,
                },
            ],
            notes: None,
        },
    ];
    for expense in &expenses {
        store.upsert_expense(expense).await?;
    }

    let supplier = Supplier {
        id: supplier_id,
        name: "Repsol Vallecas".to_string(),
        tax_id: Some("A-78099599".to_string()),
        phone: None,
        email: None,
        address: Some("Av. de la Albufera 145".to_string()),
        notes: None,
    };
    store.upsert_supplier(&supplier).await?;

    let concept = Concept {
        id: new_id(),
        name: "Combustible".to_string(),
        category: Some("vehículo".to_string()),
        deductible_pct: 100.0,
        notes: None,
    };
    store.upsert_concept(&concept).await?;

    let workshop = Workshop {
        id: workshop_id,
        name: "Talleres Hermanos Ruiz".to_string(),
        phone: Some("+34 915 55 01 22".to_string()),
        address: None,
        specialty: Some("híbridos".to_string()),
        notes: None,
    };
    store.upsert_workshop(&workshop).await?;

    let exception = ScheduleException {
        id: new_id(),
        date: now - Duration::days(10),
        kind: "holiday".to_string(),
        description: Some("Fiesta de la Almudena".to_string()),
    };
    store.upsert_exception(&exception).await?;

    println!(
        "Seeded demo data into {}",
        config.storage.data_dir.display()
    );
    Ok(())
}
