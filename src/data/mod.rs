pub mod config;
pub mod validate;

pub use config::{build_boss, build_fleet, load_config, BossParams, FleetConfig, ShipRow};
pub use validate::{validate_config, ValidationDiagnostic, ValidationReport, ValidationSeverity};
