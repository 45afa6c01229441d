//! Fleet configuration: serde-backed rows loaded from YAML or JSON.
//!
//! Rates are percentage points (`hit_rate: 150` means 150%); attack values
//! are raw attribute numbers. Ship names are lowercase-normalized on load and
//! drive lieutenant/ability resolution.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::fleet::{BaseStats, Boss, Fleet, Ship, ShipClass};
use crate::combat::lieutenants::Lieutenant;
use crate::sim::driver::DriverConfig;

/// Fixed attack attribute of the summoned unit. At level 100 it always
/// deals this much.
pub const SUMMON_ATTACK: f64 = 225_541.0;

/// Name the summoned unit fights under.
pub const SUMMON_NAME: &str = "duomilian";

/// The ship whose special attack performs the summon.
pub const SUMMONER_NAME: &str = "quasimodo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub sim: DriverConfig,
    pub boss: BossParams,
    pub ships: Vec<ShipRow>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossParams {
    pub dodge: f64,
    pub block: f64,
    pub hit: f64,
    pub penetration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipRow {
    pub name: String,
    pub class: String,
    /// Grid slot 1–9.
    pub position: u8,
    pub attack: f64,
    pub special_attack: f64,
    /// Percent multiplier applied to a special attack (250 = 2.5x).
    pub special_damage: f64,
    /// Meter value the ship rests at after firing its special.
    #[serde(default)]
    pub special_reset: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub penetration: f64,
    pub hit_rate: f64,
    pub dodge: f64,
    pub block: f64,
    #[serde(default)]
    pub damage_up: f64,
    #[serde(default)]
    pub special_damage_up: f64,
    #[serde(default)]
    pub initial_meter: f64,
    #[serde(default)]
    pub lock_rate: f64,
    #[serde(default)]
    pub de_accumulate: f64,
    #[serde(default)]
    pub de_accumulate_chance: f64,
    #[serde(default)]
    pub poison_percent: f64,
    #[serde(default)]
    pub lieutenant: String,
}

impl ShipRow {
    fn base_stats(&self) -> BaseStats {
        BaseStats {
            attack: self.attack,
            special_attack: self.special_attack,
            special_damage: self.special_damage,
            special_reset: self.special_reset,
            crit_chance: self.crit_chance,
            crit_damage: self.crit_damage,
            penetration: self.penetration,
            hit_rate: self.hit_rate,
            dodge: self.dodge,
            block: self.block,
            damage_up: self.damage_up,
            special_damage_up: self.special_damage_up,
            initial_meter: self.initial_meter,
            lock_rate: self.lock_rate,
            de_accumulate: self.de_accumulate,
            de_accumulate_chance: self.de_accumulate_chance,
            poison_percent: self.poison_percent,
        }
    }
}

/// Load a fleet config, picking the parser by file extension
/// (`.yaml`/`.yml` vs `.json`).
pub fn load_config(path: &str) -> Result<FleetConfig, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&raw)
            .map_err(|err| format!("unable to parse yaml '{path}': {err}")),
        "json" => serde_json::from_str(&raw)
            .map_err(|err| format!("unable to parse json '{path}': {err}")),
        other => Err(format!(
            "unsupported config extension '{other}' for '{path}' (expected yaml, yml, or json)"
        )),
    }
}

/// Build the runtime fleet. If the summoner is present, its summonable
/// companion is appended as a dead, unplaced clone with the fixed attack
/// attribute and no lieutenant; it enters play only through the summon.
pub fn build_fleet(config: &FleetConfig) -> Result<Fleet, String> {
    let mut ships = Vec::with_capacity(config.ships.len() + 1);
    for row in &config.ships {
        let class = ShipClass::from_name(&row.class)
            .ok_or_else(|| format!("ship '{}': unknown class '{}'", row.name, row.class))?;
        let lieutenant = Lieutenant::from_name(&row.lieutenant);
        ships.push(Ship::new(
            &row.name,
            class,
            row.position,
            row.base_stats(),
            lieutenant,
        ));
    }
    if let Some(summoner) = ships.iter().position(|ship| ship.name == SUMMONER_NAME) {
        let mut base = ships[summoner].base.clone();
        base.attack = SUMMON_ATTACK;
        base.damage_up = 0.0;
        base.special_damage_up = 0.0;
        base.initial_meter = 0.0;
        let mut summon = Ship::new(SUMMON_NAME, ShipClass::Ranger, 0, base, Lieutenant::NoOp);
        summon.is_summon = true;
        summon.is_dead = true;
        ships.push(summon);
    }
    Ok(Fleet::new(ships))
}

pub fn build_boss(config: &FleetConfig) -> Boss {
    let params = config.boss;
    Boss::new(params.dodge, params.block, params.hit, params.penetration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
boss:
  dodge: 10
  block: 20
  hit: 155
  penetration: 15
ships:
  - name: Quasimodo
    class: Protector
    position: 1
    attack: 1000
    special_attack: 500
    special_damage: 250
    crit_chance: 5
    crit_damage: 150
    penetration: 10
    hit_rate: 120
    dodge: 40
    block: 30
  - name: Violette
    class: Ranger
    position: 5
    attack: 900
    special_attack: 800
    special_damage: 300
    crit_chance: 10
    crit_damage: 200
    penetration: 12
    hit_rate: 130
    dodge: 35
    block: 20
    lieutenant: violette
"#
    }

    #[test]
    fn yaml_round_trips_and_builds_entities() {
        let config: FleetConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.ships.len(), 2);
        let fleet = build_fleet(&config).unwrap();
        // Summoner present: the companion is appended, dead and unplaced.
        assert_eq!(fleet.ships.len(), 3);
        let summon = fleet.summon_index().unwrap();
        assert!(fleet.ships[summon].is_dead);
        assert_eq!(fleet.ships[summon].base.attack, SUMMON_ATTACK);
        assert_eq!(fleet.ships[summon].position, 0);

        let boss = build_boss(&config);
        assert_eq!(boss.hit, 155.0);

        // Names are lowercase-normalized; lieutenants resolve at load.
        assert_eq!(fleet.ships[0].name, "quasimodo");
        assert_eq!(fleet.ships[1].lieutenant, Lieutenant::Violette);
    }

    #[test]
    fn unknown_class_is_a_fatal_error() {
        let mut config: FleetConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.ships[0].class = "battlecruiser".to_string();
        assert!(build_fleet(&config).is_err());
    }

    #[test]
    fn sim_section_defaults_apply() {
        let config: FleetConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.sim.block_retention, 0.5);
        assert!(config.sim.seed.is_none());
    }
}
