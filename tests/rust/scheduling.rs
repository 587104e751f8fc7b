// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod common;

//======================================================================================================================
// Imports
//======================================================================================================================

use self::common::{
    check_invariants,
    run,
    timeline,
};
use ::anyhow::Result;
use ::schedsim::{
    workload::{
        WorkloadGenerator,
        WorkloadKind,
        WorkloadOptions,
    },
    Algorithm,
    DeadlockStrategy,
    Pid,
    Process,
    Report,
    SchedulerOptions,
    Simulation,
};

//======================================================================================================================
// Basic Policies
//======================================================================================================================

#[test]
fn fcfs_runs_in_arrival_order() -> Result<()> {
    let report: Report = run(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        "1,0,1,\"CPU:5\",0,0\n2,1,1,\"CPU:3\",0,0\n",
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 5), (2, 5, 8)]);
    schedsim::ensure_eq!(report.completed[0].turnaround_time(), Some(5));
    schedsim::ensure_eq!(report.completed[1].wait_time(), 4);
    schedsim::ensure_eq!(report.counters.context_switches, 1);
    check_invariants(&report)
}

#[test]
fn fcfs_never_preempts() -> Result<()> {
    let report: Report = run(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        "1,0,9,\"CPU:10\",0,0\n2,2,0,\"CPU:1\",0,0\n",
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 10), (2, 10, 11)]);
    check_invariants(&report)
}

#[test]
fn round_robin_single_process() -> Result<()> {
    let report: Report = run(Algorithm::RoundRobin, SchedulerOptions::default(), "1,0,1,\"CPU:10\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 4), (1, 4, 8), (1, 8, 10)]);
    schedsim::ensure_eq!(report.current_time, 10);
    schedsim::ensure_eq!(report.counters.idle_time, 0);
    schedsim::ensure_eq!(report.counters.context_switches, 0);
    check_invariants(&report)
}

#[test]
fn round_robin_alternates() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        time_quantum: 2,
        ..Default::default()
    };
    let report: Report = run(Algorithm::RoundRobin, options, "1,0,1,\"CPU:3\",0,0\n2,0,1,\"CPU:3\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 4), (1, 4, 5), (2, 5, 6)]);
    schedsim::ensure_eq!(report.counters.context_switches, 3);
    check_invariants(&report)
}

#[test]
fn shortest_remaining_time_preempts() -> Result<()> {
    let report: Report = run(
        Algorithm::ShortestRemainingTime,
        SchedulerOptions::default(),
        "1,0,1,\"CPU:8\",0,0\n2,1,1,\"CPU:4\",0,0\n3,2,1,\"CPU:2\",0,0\n",
    )?;
    schedsim::ensure_eq!(
        timeline(&report),
        vec![(1, 0, 1), (2, 1, 2), (3, 2, 4), (2, 4, 7), (1, 7, 14)]
    );
    check_invariants(&report)
}

#[test]
fn static_priority_preempts() -> Result<()> {
    let report: Report = run(
        Algorithm::StaticPriority,
        SchedulerOptions::default(),
        "1,0,5,\"CPU:10\",0,0\n2,3,1,\"CPU:2\",0,0\n",
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 3), (2, 3, 5), (1, 5, 12)]);
    schedsim::ensure_eq!(report.completed[0].wait_time(), 2);
    schedsim::ensure_eq!(report.counters.context_switches, 2);
    check_invariants(&report)
}

#[test]
fn aging_lets_waiting_process_through() -> Result<()> {
    let workload: &str = "1,0,1,\"CPU:40\",0,0\n2,0,3,\"CPU:2\",0,0\n";

    let report: Report = run(Algorithm::DynamicPriority, SchedulerOptions::default(), workload)?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 30), (2, 30, 32), (1, 32, 42)]);
    check_invariants(&report)?;

    let report: Report = run(Algorithm::StaticPriority, SchedulerOptions::default(), workload)?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 40), (2, 40, 42)]);
    check_invariants(&report)
}

#[test]
fn mlfq_demotes_and_preempts() -> Result<()> {
    let report: Report = run(Algorithm::Mlfq, SchedulerOptions::default(), "1,0,1,\"CPU:30\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 8), (1, 8, 24), (1, 24, 30)]);

    let report: Report = run(
        Algorithm::Mlfq,
        SchedulerOptions::default(),
        "1,0,1,\"CPU:30\",0,0\n2,10,1,\"CPU:2\",0,0\n",
    )?;
    schedsim::ensure_eq!(
        timeline(&report),
        vec![(1, 0, 8), (1, 8, 10), (2, 10, 12), (1, 12, 28), (1, 28, 32)]
    );
    check_invariants(&report)
}

//======================================================================================================================
// I/O and Overheads
//======================================================================================================================

#[test]
fn io_bursts_free_the_cpu() -> Result<()> {
    let report: Report = run(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        "1,0,1,\"CPU:2,IO:3,CPU:1\",0,0\n2,0,1,\"CPU:4\",0,0\n",
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 6), (1, 6, 7)]);
    schedsim::ensure_eq!(report.completed[0].wait_time(), 1);
    schedsim::ensure_eq!(report.completed[1].wait_time(), 2);
    schedsim::ensure_eq!(report.counters.idle_time, 0);
    check_invariants(&report)
}

#[test]
fn idle_cpu_waits_for_io() -> Result<()> {
    let report: Report = run(Algorithm::RoundRobin, SchedulerOptions::default(), "1,2,1,\"CPU:1,IO:4,CPU:1\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 2, 3), (1, 7, 8)]);
    schedsim::ensure_eq!(report.current_time, 8);
    schedsim::ensure_eq!(report.counters.idle_time, 6);
    check_invariants(&report)
}

#[test]
fn context_switch_overhead_idles_the_cpu() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        context_switch_overhead: 1,
        ..Default::default()
    };
    let report: Report = run(Algorithm::Fcfs, options, "1,0,1,\"CPU:2\",0,0\n2,0,1,\"CPU:2\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 3, 5)]);
    schedsim::ensure_eq!(report.counters.context_switches, 1);
    schedsim::ensure_eq!(report.counters.total_overhead_time, 1);
    schedsim::ensure_eq!(report.counters.idle_time, 1);
    schedsim::ensure_eq!(report.completed[1].wait_time(), 3);
    check_invariants(&report)
}

#[test]
fn overhead_cut_short_by_horizon_counts_elapsed_ticks() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        context_switch_overhead: 3,
        max_time: Some(4),
        ..Default::default()
    };
    let report: Report = run(Algorithm::Fcfs, options, "1,0,1,\"CPU:2\",0,0\n2,0,1,\"CPU:2\",0,0\n")?;
    // The switch to P2 starts at t=2 and only two of its three ticks elapse.
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2)]);
    schedsim::ensure_eq!(report.counters.context_switches, 1);
    schedsim::ensure_eq!(report.counters.total_overhead_time, 2);
    schedsim::ensure_eq!(report.counters.idle_time, 2);
    schedsim::ensure_eq!(report.unfinished.len(), 1);
    check_invariants(&report)
}

#[test]
fn zero_length_bursts_are_skipped() -> Result<()> {
    let report: Report = run(Algorithm::Fcfs, SchedulerOptions::default(), "1,0,1,\"CPU:0,IO:0,CPU:2\",0,0\n")?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2)]);
    check_invariants(&report)
}

#[test]
fn horizon_stops_the_run() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        max_time: Some(10),
        ..Default::default()
    };
    let report: Report = run(Algorithm::Fcfs, options, "1,0,1,\"CPU:100\",0,0\n2,50,1,\"CPU:1\",0,0\n")?;
    schedsim::ensure_eq!(report.current_time, 10);
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 10)]);
    schedsim::ensure_eq!(report.completed.len(), 0);
    schedsim::ensure_eq!(report.unfinished.len(), 1);
    check_invariants(&report)
}

//======================================================================================================================
// Real-Time Policies
//======================================================================================================================

const PERIODIC_SET: &str = "101,0,0,\"CPU:2\",5,5\n102,0,0,\"CPU:4\",7,7\n";

#[test]
fn edf_meets_deadlines_rm_does_not() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        max_time: Some(35),
        periodic: true,
        ..Default::default()
    };

    let edf: Report = run(Algorithm::EarliestDeadlineFirst, options, PERIODIC_SET)?;
    schedsim::ensure_eq!(edf.counters.deadline_misses, 0);
    schedsim::ensure_eq!(edf.completed.len(), 12);
    check_invariants(&edf)?;

    let rm: Report = run(Algorithm::RateMonotonic, options, PERIODIC_SET)?;
    schedsim::ensure_eq!(rm.counters.deadline_misses >= 1, true);
    let first_slow_job: Option<&Process> = rm.completed_process(Pid::new(102), 0);
    schedsim::ensure_eq!(first_slow_job.and_then(Process::completion_time), Some(8));
    check_invariants(&rm)
}

#[test]
fn periodic_jobs_until_horizon() -> Result<()> {
    let options: SchedulerOptions = SchedulerOptions {
        max_time: Some(20),
        periodic: true,
        ..Default::default()
    };
    let report: Report = run(Algorithm::RateMonotonic, options, "101,0,0,\"CPU:1\",5,5\n")?;
    let instances: Vec<usize> = report.completed.iter().map(Process::instance).collect();
    schedsim::ensure_eq!(instances, vec![0, 1, 2, 3]);
    schedsim::ensure_eq!(timeline(&report), vec![(101, 0, 1), (101, 5, 6), (101, 10, 11), (101, 15, 16)]);
    schedsim::ensure_eq!(report.current_time, 16);
    check_invariants(&report)
}

#[test]
fn one_shot_realtime_jobs() -> Result<()> {
    let report: Report = run(Algorithm::EarliestDeadlineFirst, SchedulerOptions::default(), PERIODIC_SET)?;
    schedsim::ensure_eq!(timeline(&report), vec![(101, 0, 2), (102, 2, 6)]);
    schedsim::ensure_eq!(report.counters.deadline_misses, 0);
    check_invariants(&report)
}

//======================================================================================================================
// Generated Workloads
//======================================================================================================================

#[test]
fn every_algorithm_keeps_invariants_on_generated_workloads() -> Result<()> {
    for (seed, kind) in [(1, WorkloadKind::Cpu), (2, WorkloadKind::Mixed), (3, WorkloadKind::Io)] {
        let options: WorkloadOptions = WorkloadOptions {
            seed,
            kind,
            processes: 12,
            ..Default::default()
        };
        let processes: Vec<Process> = WorkloadGenerator::new(options)?.generate_all();
        for overhead in [0, 2] {
            let scheduler_options: SchedulerOptions = SchedulerOptions {
                context_switch_overhead: overhead,
                ..Default::default()
            };
            let simulation: Simulation = Simulation::new(scheduler_options, DeadlockStrategy::Detection, Vec::new())?;
            for report in simulation.run_all(&processes)? {
                check_invariants(&report)?;
                let expected: usize = if report.algorithm.is_realtime() { 4 } else { 12 };
                schedsim::ensure_eq!(report.completed.len(), expected);
                schedsim::ensure_eq!(report.unfinished.len(), 0);
            }
        }
    }
    Ok(())
}
