// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod common;

//======================================================================================================================
// Imports
//======================================================================================================================

use self::common::check_invariants;
use ::anyhow::Result;
use ::schedsim::{
    process::parse_workload_file,
    runtime::logging,
    simulation::{
        load_workload,
        referenced_resources,
    },
    workload::{
        format_workload,
        save_workload_file,
        WorkloadGenerator,
        WorkloadKind,
        WorkloadOptions,
    },
    Algorithm,
    Config,
    DeadlockStrategy,
    Fail,
    Process,
    Report,
    Simulation,
};
use ::std::path::PathBuf;

//======================================================================================================================
// Helper Functions
//======================================================================================================================

fn temp_workload_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("schedsim-{}-{}.txt", name, std::process::id()))
}

fn options(seed: u64, kind: WorkloadKind) -> WorkloadOptions {
    WorkloadOptions {
        seed,
        kind,
        ..Default::default()
    }
}

//======================================================================================================================
// Generator
//======================================================================================================================

#[test]
fn generated_workload_depends_only_on_seed() -> Result<()> {
    let first: String = format_workload(&WorkloadGenerator::new(options(42, WorkloadKind::Mixed))?.generate_all());
    let second: String = format_workload(&WorkloadGenerator::new(options(42, WorkloadKind::Mixed))?.generate_all());
    schedsim::ensure_eq!(first, second);

    let other: String = format_workload(&WorkloadGenerator::new(options(43, WorkloadKind::Mixed))?.generate_all());
    schedsim::ensure_neq!(first, other);
    Ok(())
}

#[test]
fn generated_workload_survives_save_and_load() -> Result<()> {
    logging::initialize();
    let path: PathBuf = temp_workload_path("roundtrip");
    let processes: Vec<Process> = WorkloadGenerator::new(options(7, WorkloadKind::Io))?.generate_all();
    save_workload_file(&path, &processes)?;
    let loaded: Vec<Process> = parse_workload_file(&path)?;
    let _ = std::fs::remove_file(&path);

    schedsim::ensure_eq!(loaded.len(), processes.len());
    for (loaded, generated) in loaded.iter().zip(processes.iter()) {
        schedsim::ensure_eq!(loaded.pid(), generated.pid());
        schedsim::ensure_eq!(loaded.arrival_time(), generated.arrival_time());
        schedsim::ensure_eq!(loaded.static_priority(), generated.static_priority());
        schedsim::ensure_eq!(loaded.bursts(), generated.bursts());
        schedsim::ensure_eq!(loaded.period(), generated.period());
        schedsim::ensure_eq!(loaded.deadline(), generated.deadline());
    }
    Ok(())
}

#[test]
fn missing_workload_file_is_an_error() -> Result<()> {
    let path: PathBuf = temp_workload_path("missing");
    schedsim::ensure_eq!(parse_workload_file(&path).map_err(|e| e.errno).err(), Some(libc::ENOENT));
    Ok(())
}

//======================================================================================================================
// Configuration
//======================================================================================================================

#[test]
fn config_drives_a_generated_simulation() -> Result<()> {
    logging::initialize();
    let config: Config = r#"
simulation:
  algorithms: [fcfs, rr, mlfq, edf]
  time_quantum: 3
  context_switch_overhead: 1
sync:
  strategy: avoidance
workload:
  seed: 11
  processes: 6
  kind: cpu-bound
  realtime_processes: 2
"#
    .parse()?;
    let simulation: Simulation = Simulation::from_config(&config)?;
    schedsim::ensure_eq!(
        simulation.algorithms(),
        &[
            Algorithm::Fcfs,
            Algorithm::RoundRobin,
            Algorithm::Mlfq,
            Algorithm::EarliestDeadlineFirst
        ][..]
    );
    schedsim::ensure_eq!(simulation.options().time_quantum, 3);
    schedsim::ensure_eq!(simulation.strategy(), DeadlockStrategy::Avoidance);

    let processes: Vec<Process> = load_workload(&config)?;
    schedsim::ensure_eq!(processes.len(), 8);
    let reports: Vec<Report> = simulation.run_all(&processes)?;
    schedsim::ensure_eq!(reports.len(), 4);
    for report in &reports {
        check_invariants(report)?;
    }
    schedsim::ensure_eq!(reports[0].completed.len(), 6);
    schedsim::ensure_eq!(reports[3].completed.len(), 2);
    Ok(())
}

#[test]
fn config_reads_workload_file() -> Result<()> {
    logging::initialize();
    let path: PathBuf = temp_workload_path("config");
    let processes: Vec<Process> = vec![
        Process::from_pattern(1, 0, 2, "CPU:3,LOCK:R1,CPU:2,UNLOCK:R1", 0, 0),
        Process::from_pattern(2, 1, 1, "LOCK:R1,CPU:2,UNLOCK:R1,IO:4,CPU:1", 0, 0),
    ];
    save_workload_file(&path, &processes)?;

    let config: Config = format!("workload:\n  input: {}\n", path.display()).parse()?;
    let loaded: Result<Vec<Process>, Fail> = load_workload(&config);
    let _ = std::fs::remove_file(&path);
    let loaded: Vec<Process> = loaded?;
    schedsim::ensure_eq!(loaded.len(), 2);

    let simulation: Simulation =
        Simulation::new(config.scheduler_options()?, config.strategy()?, referenced_resources(&loaded))?
            .with_algorithms(vec![Algorithm::StaticPriority]);
    let report: Report = simulation.run(Algorithm::StaticPriority, &loaded)?;
    schedsim::ensure_eq!(report.completed.len(), 2);
    schedsim::ensure_eq!(report.aborted.is_empty(), true);
    check_invariants(&report)
}

#[test]
fn malformed_config_is_rejected() -> Result<()> {
    schedsim::ensure_eq!("- just\n- a list\n".parse::<Config>().is_err(), true);
    let config: Config = "simulation:\n  algorithms: [fcfs, lottery]\n".parse()?;
    schedsim::ensure_eq!(config.algorithms().is_err(), true);
    let config: Config = "simulation:\n  time_quantum: -2\n".parse()?;
    schedsim::ensure_eq!(config.time_quantum().is_err(), true);
    Ok(())
}
