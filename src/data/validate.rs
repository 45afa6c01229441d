//! Pre-flight validation of fleet configuration. Errors abort before any
//! trial runs; informational diagnostics flag names that will resolve to
//! no-op abilities so typos are visible without being fatal.

use std::collections::HashSet;
use std::fmt;

use crate::combat::fleet::{ShipClass, GRID_SLOTS};
use crate::combat::lieutenants::Lieutenant;
use crate::combat::specials::SpecialAbility;
use crate::data::config::FleetConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == ValidationSeverity::Error)
    }
}

/// Check a loaded config. Fatal: empty fleet, duplicate names, bad classes,
/// slots outside 1–9 or doubly occupied. Informational: lieutenant or ship
/// names that resolve to the no-op ability.
pub fn validate_config(config: &FleetConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.ships.is_empty() {
        report.push(ValidationSeverity::Error, "fleet", "no ships configured");
        return report;
    }

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_positions: HashSet<u8> = HashSet::new();
    for row in &config.ships {
        let name = row.name.trim().to_ascii_lowercase();
        let context = format!("ship '{name}'");

        if name.is_empty() {
            report.push(ValidationSeverity::Error, "fleet", "ship with empty name");
            continue;
        }
        if !seen_names.insert(name.clone()) {
            report.push(ValidationSeverity::Error, context.clone(), "duplicate name");
        }
        if ShipClass::from_name(&row.class).is_none() {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("unknown class '{}'", row.class),
            );
        }
        if !(1..=GRID_SLOTS as u8).contains(&row.position) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("position {} outside 1-{GRID_SLOTS}", row.position),
            );
        } else if !seen_positions.insert(row.position) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("position {} already occupied", row.position),
            );
        }

        let lieutenant = row.lieutenant.trim();
        if !lieutenant.is_empty() && Lieutenant::from_name(lieutenant) == Lieutenant::NoOp {
            report.push(
                ValidationSeverity::Info,
                context.clone(),
                format!("lieutenant '{lieutenant}' is not modelled; it will do nothing"),
            );
        }
        if SpecialAbility::resolve(&name) == SpecialAbility::NoOp {
            report.push(
                ValidationSeverity::Info,
                context,
                "no unique meter effect modelled; special attacks deal plain damage",
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::{BossParams, ShipRow};
    use crate::sim::driver::DriverConfig;

    fn row(name: &str, position: u8) -> ShipRow {
        ShipRow {
            name: name.to_string(),
            class: "ranger".to_string(),
            position,
            attack: 1000.0,
            special_attack: 500.0,
            special_damage: 250.0,
            special_reset: 0.0,
            crit_chance: 5.0,
            crit_damage: 150.0,
            penetration: 10.0,
            hit_rate: 120.0,
            dodge: 40.0,
            block: 30.0,
            damage_up: 0.0,
            special_damage_up: 0.0,
            initial_meter: 0.0,
            lock_rate: 0.0,
            de_accumulate: 0.0,
            de_accumulate_chance: 0.0,
            poison_percent: 0.0,
            lieutenant: String::new(),
        }
    }

    fn config(ships: Vec<ShipRow>) -> FleetConfig {
        FleetConfig {
            sim: DriverConfig::default(),
            boss: BossParams {
                dodge: 0.0,
                block: 0.0,
                hit: 100.0,
                penetration: 0.0,
            },
            ships,
        }
    }

    #[test]
    fn empty_fleet_is_an_error() {
        let report = validate_config(&config(vec![]));
        assert!(report.has_errors());
    }

    #[test]
    fn duplicate_names_and_positions_are_errors() {
        let report = validate_config(&config(vec![
            row("Kerom", 1),
            row("kerom", 2),
            row("Opal", 2),
        ]));
        let errors: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn position_outside_grid_is_an_error() {
        let report = validate_config(&config(vec![row("kerom", 12)]));
        assert!(report.has_errors());
    }

    #[test]
    fn unknown_lieutenant_is_informational_only() {
        let mut bad_lt = row("kerom", 1);
        bad_lt.lieutenant = "mystery officer".to_string();
        let report = validate_config(&config(vec![bad_lt]));
        assert!(!report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Info
                && diag.message.contains("mystery officer")));
    }
}
