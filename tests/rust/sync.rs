// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod common;

//======================================================================================================================
// Imports
//======================================================================================================================

use self::common::{
    check_invariants,
    run,
    run_with_resources,
    timeline,
};
use ::anyhow::Result;
use ::schedsim::{
    Algorithm,
    DeadlockStrategy,
    Report,
    SchedulerOptions,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Two processes acquiring A and B in opposite orders.
const CROSSED_LOCKS: &str = r#"
1,0,1,"LOCK:A,CPU:2,LOCK:B,CPU:1,UNLOCK:B,UNLOCK:A",0,0
2,0,2,"LOCK:B,CPU:2,LOCK:A,CPU:1,UNLOCK:A,UNLOCK:B",0,0
"#;

/// Same as above with the urgency of the two processes swapped.
const CROSSED_LOCKS_SWAPPED: &str = r#"
1,0,5,"LOCK:A,CPU:2,LOCK:B,CPU:1,UNLOCK:B,UNLOCK:A",0,0
2,0,1,"LOCK:B,CPU:2,LOCK:A,CPU:1,UNLOCK:A,UNLOCK:B",0,0
"#;

fn pids(processes: &[schedsim::Process]) -> Vec<u32> {
    processes.iter().map(|process| process.pid().get()).collect()
}

//======================================================================================================================
// Mutual Exclusion
//======================================================================================================================

#[test]
fn lock_waiters_are_served_in_fifo_order() -> Result<()> {
    // The most urgent waiter arrives last and still gets the resource last.
    let report: Report = run_with_resources(
        Algorithm::StaticPriority,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["R"],
        r#"
1,0,9,"LOCK:R,CPU:3,UNLOCK:R",0,0
2,1,5,"LOCK:R,CPU:1,UNLOCK:R",0,0
3,2,1,"LOCK:R,CPU:1,UNLOCK:R",0,0
"#,
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 3), (2, 3, 4), (3, 4, 5)]);
    let completions: Vec<Option<usize>> = report.completed.iter().map(|process| process.completion_time()).collect();
    schedsim::ensure_eq!(completions, vec![Some(3), Some(4), Some(5)]);
    check_invariants(&report)
}

#[test]
fn blocked_process_does_not_hold_the_cpu() -> Result<()> {
    let report: Report = run_with_resources(
        Algorithm::RoundRobin,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["R"],
        r#"
1,0,1,"LOCK:R,CPU:6,UNLOCK:R",0,0
2,1,1,"CPU:1,LOCK:R,CPU:1,UNLOCK:R",0,0
"#,
    )?;
    // P2 blocks at t=5 after its first CPU burst, P1 runs alone until it unlocks.
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 4), (2, 4, 5), (1, 5, 7), (2, 7, 8)]);
    check_invariants(&report)
}

#[test]
fn unregistered_resources_are_skipped() -> Result<()> {
    let report: Report = run(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        "1,0,1,\"LOCK:Z,CPU:2,UNLOCK:Z\",0,0\n2,0,1,\"UNLOCK:Y,CPU:1\",0,0\n",
    )?;
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 3)]);
    schedsim::ensure_eq!(report.completed.len(), 2);
    check_invariants(&report)
}

#[test]
fn completion_releases_locks_left_held() -> Result<()> {
    // P1 never unlocks R; its completion at t=2 hands R over to P2.
    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["R"],
        r#"
1,0,1,"LOCK:R,CPU:2",0,0
2,1,1,"LOCK:R,CPU:1,UNLOCK:R",0,0
"#,
    )?;
    schedsim::ensure_eq!(pids(&report.completed), vec![1, 2]);
    schedsim::ensure_eq!(report.unfinished.is_empty(), true);
    schedsim::ensure_eq!(report.completed[0].held_resources().is_empty(), true);
    schedsim::ensure_eq!(report.completed[0].completion_time(), Some(2));
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 3)]);
    check_invariants(&report)
}

#[test]
fn unlock_by_non_owner_is_ignored() -> Result<()> {
    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["R"],
        r#"
1,0,1,"LOCK:R,CPU:2,UNLOCK:R",0,0
2,0,1,"UNLOCK:R,LOCK:R,CPU:1,UNLOCK:R",0,0
"#,
    )?;
    // P2 cannot steal R: it blocks until P1 releases it.
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 3)]);
    schedsim::ensure_eq!(report.completed.len(), 2);
    check_invariants(&report)
}

//======================================================================================================================
// Deadlock Strategies
//======================================================================================================================

#[test]
fn detection_terminates_least_urgent_victim() -> Result<()> {
    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["A", "B"],
        CROSSED_LOCKS,
    )?;
    schedsim::ensure_eq!(pids(&report.completed), vec![1]);
    schedsim::ensure_eq!(pids(&report.aborted), vec![2]);
    schedsim::ensure_eq!(report.aborted[0].held_resources().is_empty(), true);
    schedsim::ensure_eq!(report.aborted[0].completion_time(), None);
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 4), (1, 4, 5)]);

    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Detection,
        &["A", "B"],
        CROSSED_LOCKS_SWAPPED,
    )?;
    schedsim::ensure_eq!(pids(&report.completed), vec![2]);
    schedsim::ensure_eq!(pids(&report.aborted), vec![1]);
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 4), (2, 4, 5)]);
    check_invariants(&report)
}

#[test]
fn prevention_terminates_out_of_order_requester() -> Result<()> {
    for workload in [CROSSED_LOCKS, CROSSED_LOCKS_SWAPPED] {
        let report: Report = run_with_resources(
            Algorithm::Fcfs,
            SchedulerOptions::default(),
            DeadlockStrategy::Prevention,
            &["A", "B"],
            workload,
        )?;
        // P2 asks for A (id 0) while holding B (id 1).
        schedsim::ensure_eq!(pids(&report.completed), vec![1]);
        schedsim::ensure_eq!(pids(&report.aborted), vec![2]);
        schedsim::ensure_eq!(report.completed[0].completion_time(), Some(5));
        check_invariants(&report)?;
    }
    Ok(())
}

#[test]
fn prevention_allows_ordered_acquisition() -> Result<()> {
    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Prevention,
        &["A", "B"],
        r#"
1,0,1,"LOCK:A,LOCK:B,CPU:2,UNLOCK:B,UNLOCK:A",0,0
2,0,1,"LOCK:A,CPU:1,LOCK:B,CPU:1,UNLOCK:B,UNLOCK:A",0,0
"#,
    )?;
    schedsim::ensure_eq!(pids(&report.completed), vec![1, 2]);
    schedsim::ensure_eq!(report.aborted.is_empty(), true);
    check_invariants(&report)
}

#[test]
fn avoidance_denies_cycle_closing_request() -> Result<()> {
    let workload: String = format!("{}3,0,3,\"CPU:3\",0,0\n", CROSSED_LOCKS);
    let report: Report = run_with_resources(
        Algorithm::Fcfs,
        SchedulerOptions::default(),
        DeadlockStrategy::Avoidance,
        &["A", "B"],
        &workload,
    )?;
    // Nobody is terminated; the two lock holders stay parked and the run ends when P3 is done.
    schedsim::ensure_eq!(report.aborted.is_empty(), true);
    schedsim::ensure_eq!(pids(&report.completed), vec![3]);
    schedsim::ensure_eq!(pids(&report.unfinished), vec![1, 2]);
    schedsim::ensure_eq!(timeline(&report), vec![(1, 0, 2), (2, 2, 4), (3, 4, 7)]);
    schedsim::ensure_eq!(report.current_time, 7);
    check_invariants(&report)
}
