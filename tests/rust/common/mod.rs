// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Helpers shared by the integration tests.

#![allow(dead_code)]

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::schedsim::{
    process::{
        parse_workload,
        Pid,
    },
    runtime::logging,
    scheduler::GanttSegment,
    Algorithm,
    DeadlockStrategy,
    Report,
    ResourceManager,
    Scheduler,
    SchedulerOptions,
};
use ::std::collections::HashMap;

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Runs `algorithm` over a workload written in the workload text format.
pub fn run(algorithm: Algorithm, options: SchedulerOptions, workload: &str) -> Result<Report> {
    run_with_resources(algorithm, options, DeadlockStrategy::default(), &[], workload)
}

/// Runs `algorithm` over a workload with the given resources registered.
pub fn run_with_resources(
    algorithm: Algorithm,
    options: SchedulerOptions,
    strategy: DeadlockStrategy,
    resources: &[&str],
    workload: &str,
) -> Result<Report> {
    logging::initialize();
    let manager: ResourceManager = ResourceManager::with_resources(strategy, resources);
    let scheduler: Scheduler = Scheduler::with_algorithm(algorithm, options, manager, parse_workload(workload))?;
    Ok(scheduler.run())
}

/// Gantt segments as `(pid, start, end)` triples.
pub fn timeline(report: &Report) -> Vec<(u32, usize, usize)> {
    report
        .gantt
        .iter()
        .map(|segment| (segment.pid.get(), segment.start, segment.end))
        .collect()
}

/// Checks the properties every run must satisfy, whatever the algorithm and the workload.
pub fn check_invariants(report: &Report) -> Result<()> {
    let counters = &report.counters;
    if counters.idle_time + counters.busy_time != report.current_time {
        anyhow::bail!(
            "{}: idle ({}) + busy ({}) != simulated time ({})",
            report.algorithm,
            counters.idle_time,
            counters.busy_time,
            report.current_time
        );
    }

    // One process on the CPU at a time, and only while the simulation runs.
    let mut previous_end: usize = 0;
    for segment in &report.gantt {
        if segment.start < previous_end || segment.start >= segment.end || segment.end > report.current_time {
            anyhow::bail!("{}: misplaced segment {}", report.algorithm, segment);
        }
        previous_end = segment.end;
    }
    let gantt_time: usize = report.gantt.iter().map(GanttSegment::len).sum();
    if gantt_time != counters.busy_time {
        anyhow::bail!("{}: gantt covers {} ticks, busy {}", report.algorithm, gantt_time, counters.busy_time);
    }

    let mut cpu_time_by_pid: HashMap<Pid, usize> = HashMap::new();
    for process in &report.completed {
        let completion: usize = match process.completion_time() {
            Some(completion) => completion,
            None => anyhow::bail!("{}: {} completed without a completion time", report.algorithm, process.pid()),
        };
        let turnaround: usize = process.turnaround_time().unwrap_or(0);
        if turnaround != completion - process.arrival_time() || turnaround < process.total_cpu_time() {
            anyhow::bail!("{}: {} has turnaround {}", report.algorithm, process.pid(), turnaround);
        }
        *cpu_time_by_pid.entry(process.pid()).or_insert(0) += process.total_cpu_time();
    }

    // Without leftovers, the CPU time of every pid is exactly what its jobs asked for.
    if report.unfinished.is_empty() && report.aborted.is_empty() {
        for (pid, cpu_time) in cpu_time_by_pid {
            if report.cpu_time_of(pid) != cpu_time {
                anyhow::bail!(
                    "{}: {} ran {} ticks instead of {}",
                    report.algorithm,
                    pid,
                    report.cpu_time_of(pid),
                    cpu_time
                );
            }
        }
    }
    Ok(())
}
