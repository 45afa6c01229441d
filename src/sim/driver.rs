//! Trial loop and aggregation.
//!
//! The driver reruns [run_trial] under an iteration cap and a wall-clock
//! budget, folding each record into fixed-size running aggregates so memory
//! stays bounded for arbitrarily large trial counts. The budget is checked
//! only between trials: the last trial is always whole.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::combat::engine::Knobs;
use crate::combat::fleet::{Boss, Fleet};
use crate::combat::rng::{Dice, Rng};
use crate::sim::trial::{run_trial, TrialRecord};

/// Driver controls, usually read from the `sim` section of a config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverConfig {
    pub max_trials: u64,
    /// Global force-up percentage applied to all outgoing ship damage.
    #[serde(default)]
    pub force_up: f64,
    /// Fraction of damage retained through a block.
    #[serde(default = "default_block_retention")]
    pub block_retention: f64,
    /// Wall-clock budget in seconds, checked between trials only.
    #[serde(default = "default_time_budget_secs")]
    pub time_budget_secs: f64,
    /// Fixed RNG seed; omit for an entropy seed.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_block_retention() -> f64 {
    0.5
}

fn default_time_budget_secs() -> f64 {
    150.0
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_trials: 1000,
            force_up: 0.0,
            block_retention: default_block_retention(),
            time_budget_secs: default_time_budget_secs(),
            seed: None,
        }
    }
}

impl DriverConfig {
    pub fn knobs(&self) -> Knobs {
        Knobs {
            force_up: self.force_up,
            block_retention: self.block_retention,
        }
    }
}

/// Running damage statistics: count, sum, extremes. Mean is derived.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DamageAggregate {
    pub trials: u64,
    pub total: f64,
    pub min: f64,
    pub max: f64,
}

impl DamageAggregate {
    pub fn fold(&mut self, damage: f64) {
        if self.trials == 0 {
            self.min = damage;
            self.max = damage;
        } else {
            self.min = self.min.min(damage);
            self.max = self.max.max(damage);
        }
        self.trials += 1;
        self.total += damage;
    }

    pub fn mean(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total / self.trials as f64
        }
    }
}

/// Per-ship totals across all trials.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShipAggregate {
    pub name: String,
    pub shots: u64,
    pub misses: u64,
    pub blocked: u64,
    pub specials: u64,
    pub damage_dealt: f64,
    pub deaths: u64,
    /// Sum of meter values held at death, for the wasted-meter average.
    pub meter_at_death_total: f64,
}

impl ShipAggregate {
    pub fn mean_damage(&self, trials: u64) -> f64 {
        if trials == 0 {
            0.0
        } else {
            self.damage_dealt / trials as f64
        }
    }
}

/// Aggregate simulation output handed to the report writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trials_run: u64,
    pub elapsed_secs: f64,
    pub seed: u64,
    pub boss_damage: DamageAggregate,
    pub times_locked_total: u64,
    pub times_hit_total: u64,
    pub times_countered_total: u64,
    pub special_kills_total: u64,
    pub guard_tripped_trials: u64,
    /// Locked-turns-per-trial → that trial's boss damage, as running
    /// aggregates per bucket.
    pub lock_histogram: BTreeMap<u32, DamageAggregate>,
    pub per_ship: Vec<ShipAggregate>,
}

impl SimulationSummary {
    fn fold(&mut self, record: &TrialRecord) {
        self.trials_run += 1;
        self.boss_damage.fold(record.total_boss_damage);
        self.times_locked_total += u64::from(record.times_locked);
        self.times_hit_total += u64::from(record.times_hit);
        self.times_countered_total += u64::from(record.times_countered);
        self.special_kills_total += u64::from(record.special_kills);
        if record.guard_tripped {
            self.guard_tripped_trials += 1;
        }
        self.lock_histogram
            .entry(record.times_locked)
            .or_default()
            .fold(record.total_boss_damage);
        for (aggregate, stats) in self.per_ship.iter_mut().zip(&record.per_ship) {
            aggregate.shots += u64::from(stats.shots);
            aggregate.misses += u64::from(stats.misses);
            aggregate.blocked += u64::from(stats.blocked);
            aggregate.specials += u64::from(stats.specials);
            aggregate.damage_dealt += stats.damage_dealt;
            if let Some(meter) = stats.meter_at_death {
                aggregate.deaths += 1;
                aggregate.meter_at_death_total += meter;
            }
        }
    }
}

/// Run trials until the cap or the time budget is reached. Configuration
/// errors abort before the first trial; an empty fleet cannot simulate.
pub fn run_simulation(
    fleet: &mut Fleet,
    boss: &mut Boss,
    config: &DriverConfig,
) -> Result<SimulationSummary, String> {
    if fleet.ships.is_empty() {
        return Err("cannot simulate an empty fleet".to_string());
    }
    let seed = config.seed.unwrap_or_else(|| Rng::from_entropy().next_u64());
    let mut rng = Rng::new(seed);
    Ok(run_simulation_with_dice(fleet, boss, config, seed, &mut rng))
}

/// Driver loop with caller-supplied dice. The seed is echoed into the
/// summary for reproducibility.
pub fn run_simulation_with_dice(
    fleet: &mut Fleet,
    boss: &mut Boss,
    config: &DriverConfig,
    seed: u64,
    dice: &mut dyn Dice,
) -> SimulationSummary {
    let knobs = config.knobs();
    let budget = Duration::from_secs_f64(config.time_budget_secs.max(0.0));
    let start = Instant::now();

    let mut summary = SimulationSummary {
        seed,
        per_ship: fleet
            .ships
            .iter()
            .map(|ship| ShipAggregate {
                name: ship.name.clone(),
                ..ShipAggregate::default()
            })
            .collect(),
        ..SimulationSummary::default()
    };

    while summary.trials_run < config.max_trials && start.elapsed() < budget {
        let record = run_trial(fleet, boss, knobs, dice);
        summary.fold(&record);
    }
    summary.elapsed_secs = start.elapsed().as_secs_f64();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::fleet::{BaseStats, Ship, ShipClass};
    use crate::combat::lieutenants::Lieutenant;

    fn small_fleet() -> Fleet {
        let base = BaseStats {
            attack: 1000.0,
            special_attack: 500.0,
            special_damage: 250.0,
            crit_damage: 150.0,
            hit_rate: 100.0,
            ..BaseStats::default()
        };
        Fleet::new(vec![
            Ship::new("a", ShipClass::Ranger, 1, base.clone(), Lieutenant::NoOp),
            Ship::new("b", ShipClass::Striker, 2, base, Lieutenant::NoOp),
        ])
    }

    fn hostile_boss() -> Boss {
        Boss::new(0.0, 0.0, 200.0, 0.0)
    }

    #[test]
    fn empty_fleet_is_a_fatal_configuration_error() {
        let mut fleet = Fleet::default();
        let mut boss = hostile_boss();
        assert!(run_simulation(&mut fleet, &mut boss, &DriverConfig::default()).is_err());
    }

    #[test]
    fn driver_honors_trial_cap() {
        let mut fleet = small_fleet();
        let mut boss = hostile_boss();
        let config = DriverConfig {
            max_trials: 17,
            seed: Some(5),
            ..DriverConfig::default()
        };
        let summary = run_simulation(&mut fleet, &mut boss, &config).unwrap();
        assert_eq!(summary.trials_run, 17);
        assert_eq!(summary.boss_damage.trials, 17);
    }

    #[test]
    fn same_seed_reproduces_the_summary() {
        let config = DriverConfig {
            max_trials: 25,
            seed: Some(99),
            ..DriverConfig::default()
        };
        let mut fleet = small_fleet();
        let mut boss = hostile_boss();
        let first = run_simulation(&mut fleet, &mut boss, &config).unwrap();
        let mut fleet = small_fleet();
        let mut boss = hostile_boss();
        let second = run_simulation(&mut fleet, &mut boss, &config).unwrap();
        assert_eq!(first.boss_damage, second.boss_damage);
        assert_eq!(first.lock_histogram, second.lock_histogram);
    }

    #[test]
    fn lock_histogram_buckets_cover_all_trials() {
        let config = DriverConfig {
            max_trials: 40,
            seed: Some(123),
            ..DriverConfig::default()
        };
        let mut fleet = small_fleet();
        let mut boss = hostile_boss();
        let summary = run_simulation(&mut fleet, &mut boss, &config).unwrap();
        let bucketed: u64 = summary
            .lock_histogram
            .values()
            .map(|aggregate| aggregate.trials)
            .sum();
        assert_eq!(bucketed, summary.trials_run);
    }

    #[test]
    fn damage_aggregate_tracks_extremes_and_mean() {
        let mut aggregate = DamageAggregate::default();
        for damage in [10.0, 30.0, 20.0] {
            aggregate.fold(damage);
        }
        assert_eq!(aggregate.min, 10.0);
        assert_eq!(aggregate.max, 30.0);
        assert_eq!(aggregate.mean(), 20.0);
    }
}
