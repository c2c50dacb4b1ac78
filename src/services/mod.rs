//! Services module
//!
//! Lógica que combina varios repositorios o controllers: dashboard,
//! wizard de viaje e importación de unidades.

pub mod dashboard_service;
pub mod trip_wizard;
pub mod unit_import_service;

pub use dashboard_service::DashboardService;
pub use trip_wizard::{TripActions, TripWizard, WizardOutcome};
pub use unit_import_service::UnitImportService;
