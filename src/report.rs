//! Report output: the aggregate summary serialized for the consumer, as
//! pretty JSON or a per-ship CSV table, stamped with the generation time.

use std::fs;

use serde::Serialize;

use crate::sim::driver::SimulationSummary;

/// Summary plus generation metadata, the shape handed to external consumers.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub generated_at: String,
    #[serde(flatten)]
    pub summary: &'a SimulationSummary,
}

impl<'a> Report<'a> {
    pub fn new(summary: &'a SimulationSummary) -> Report<'a> {
        Report {
            generated_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
            summary,
        }
    }
}

pub fn to_json(summary: &SimulationSummary) -> Result<String, String> {
    serde_json::to_string_pretty(&Report::new(summary))
        .map_err(|err| format!("failed to serialize report: {err}"))
}

pub fn write_json(summary: &SimulationSummary, path: &str) -> Result<(), String> {
    let payload = to_json(summary)?;
    fs::write(path, payload).map_err(|err| format!("unable to write '{path}': {err}"))
}

/// Per-ship aggregate rows. One line per ship, damage averaged over trials.
pub fn to_csv(summary: &SimulationSummary) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ship",
            "shots",
            "misses",
            "blocked",
            "specials",
            "total_damage",
            "mean_damage_per_trial",
            "deaths",
        ])
        .map_err(|err| format!("csv header: {err}"))?;
    for ship in &summary.per_ship {
        writer
            .write_record([
                ship.name.clone(),
                ship.shots.to_string(),
                ship.misses.to_string(),
                ship.blocked.to_string(),
                ship.specials.to_string(),
                format!("{:.0}", ship.damage_dealt),
                format!("{:.2}", ship.mean_damage(summary.trials_run)),
                ship.deaths.to_string(),
            ])
            .map_err(|err| format!("csv row for '{}': {err}", ship.name))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| format!("csv flush: {err}"))?;
    String::from_utf8(bytes).map_err(|err| format!("csv utf-8: {err}"))
}

pub fn write_csv(summary: &SimulationSummary, path: &str) -> Result<(), String> {
    let payload = to_csv(summary)?;
    fs::write(path, payload).map_err(|err| format!("unable to write '{path}': {err}"))
}

/// Compact terminal table: headline aggregates plus the lock histogram.
pub fn render_table(summary: &SimulationSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "trials\t{}\nseed\t{}\nelapsed_secs\t{:.3}\n",
        summary.trials_run, summary.seed, summary.elapsed_secs
    ));
    out.push_str(&format!(
        "boss_damage_mean\t{:.0}\nboss_damage_min\t{:.0}\nboss_damage_max\t{:.0}\n",
        summary.boss_damage.mean(),
        summary.boss_damage.min,
        summary.boss_damage.max
    ));
    out.push_str(&format!(
        "times_locked\t{}\ntimes_hit\t{}\ntimes_countered\t{}\nspecial_kills\t{}\nguard_tripped\t{}\n",
        summary.times_locked_total,
        summary.times_hit_total,
        summary.times_countered_total,
        summary.special_kills_total,
        summary.guard_tripped_trials
    ));
    out.push_str("locks_per_trial\ttrials\tmean_damage\n");
    for (locks, aggregate) in &summary.lock_histogram {
        out.push_str(&format!(
            "{locks}\t{}\t{:.0}\n",
            aggregate.trials,
            aggregate.mean()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::driver::{DamageAggregate, ShipAggregate};

    fn summary() -> SimulationSummary {
        let mut boss_damage = DamageAggregate::default();
        boss_damage.fold(1000.0);
        boss_damage.fold(3000.0);
        let mut lock_histogram = std::collections::BTreeMap::new();
        lock_histogram.insert(0, boss_damage);
        SimulationSummary {
            trials_run: 2,
            elapsed_secs: 0.5,
            seed: 7,
            boss_damage,
            lock_histogram,
            per_ship: vec![ShipAggregate {
                name: "kerom".to_string(),
                shots: 8,
                damage_dealt: 4000.0,
                ..ShipAggregate::default()
            }],
            ..SimulationSummary::default()
        }
    }

    #[test]
    fn json_report_carries_summary_and_timestamp() {
        let payload = to_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert!(value.get("generated_at").is_some());
        assert_eq!(value["trials_run"], 2);
        assert_eq!(value["per_ship"][0]["name"], "kerom");
    }

    #[test]
    fn csv_has_one_row_per_ship() {
        let payload = to_csv(&summary()).unwrap();
        let lines: Vec<&str> = payload.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("kerom,8,"));
        assert!(lines[1].contains("2000.00")); // 4000 over 2 trials
    }

    #[test]
    fn table_lists_lock_histogram_buckets() {
        let rendered = render_table(&summary());
        assert!(rendered.contains("locks_per_trial"));
        assert!(rendered.contains("0\t2\t2000"));
    }
}
