use std::fmt::Write as _;

use crate::data::config::{build_boss, build_fleet, load_config};
use crate::data::validate::validate_config;
use crate::parallel::{run_seed_sweep_on, WorkerPool};
use crate::report;
use crate::sim::driver::run_simulation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Validate,
    Sweep,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        Some("sweep") => Some(Command::Sweep),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Sweep) => handle_sweep(args),
        None => {
            eprintln!("usage: primus <simulate|validate|sweep>");
            2
        }
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: primus simulate <config.(yaml|json)> [--seed N] [--json out] [--csv out] [--table]");
        return 2;
    };

    let mut config = match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let validation = validate_config(&config);
    for diagnostic in &validation.diagnostics {
        eprintln!("{diagnostic}");
    }
    if validation.has_errors() {
        return 1;
    }

    if let Some(seed) = flag_value(args, "--seed") {
        match seed.parse::<u64>() {
            Ok(seed) => config.sim.seed = Some(seed),
            Err(_) => {
                eprintln!("invalid --seed '{seed}'");
                return 2;
            }
        }
    }

    let mut fleet = match build_fleet(&config) {
        Ok(fleet) => fleet,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let mut boss = build_boss(&config);

    let summary = match run_simulation(&mut fleet, &mut boss, &config.sim) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("simulation error: {err}");
            return 1;
        }
    };

    if let Some(out) = flag_value(args, "--json") {
        if let Err(err) = report::write_json(&summary, out) {
            eprintln!("{err}");
            return 1;
        }
    }
    if let Some(out) = flag_value(args, "--csv") {
        if let Err(err) = report::write_csv(&summary, out) {
            eprintln!("{err}");
            return 1;
        }
    }
    if args.iter().any(|arg| arg == "--table") {
        print!("{}", report::render_table(&summary));
    } else {
        match report::to_json(&summary) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        }
    }
    0
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: primus validate <config.(yaml|json)>");
        return 2;
    };
    let config = match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let report = validate_config(&config);
    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    if report.has_errors() {
        eprintln!("validation failed");
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

fn handle_sweep(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: primus sweep <config.(yaml|json)> <runs> [--seed N] [--workers N]");
        return 2;
    };
    let runs = parse_usize_arg(args.get(3), "runs", 8);
    let base_seed = flag_value(args, "--seed")
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(1);
    let workers = flag_value(args, "--workers")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(0);

    let config = match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let validation = validate_config(&config);
    for diagnostic in &validation.diagnostics {
        eprintln!("{diagnostic}");
    }
    if validation.has_errors() {
        return 1;
    }

    let pool = WorkerPool::with_workers(workers);
    match run_seed_sweep_on(&config, runs, base_seed, &pool) {
        Ok(summaries) => {
            println!("seed\ttrials\tboss_damage_mean\tlocks");
            for summary in &summaries {
                let mut line = String::new();
                let _ = write!(
                    &mut line,
                    "{}\t{}\t{:.0}\t{}",
                    summary.seed,
                    summary.trials_run,
                    summary.boss_damage.mean(),
                    summary.times_locked_total
                );
                println!("{line}");
            }
            0
        }
        Err(err) => {
            eprintln!("sweep error: {err}");
            1
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
