// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Ordering policies plugged into the [crate::scheduler::Scheduler].
//!
//! A policy ranks ready processes (lower ranks run first), says whether a better-ranked ready process may preempt
//! the running one, bounds how long a process may run, and gets notified of the lifecycle events it cares about.

//======================================================================================================================
// Exports
//======================================================================================================================

mod fcfs;
mod mlfq;
mod priority;
mod realtime;
mod round_robin;
mod sjf;

pub use self::{
    fcfs::FirstComeFirstServed,
    mlfq::MultilevelFeedbackQueue,
    priority::{
        DynamicPriority,
        StaticPriority,
    },
    realtime::{
        EarliestDeadlineFirst,
        RateMonotonic,
    },
    round_robin::RoundRobin,
    sjf::ShortestRemainingTime,
};

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    runtime::fail::Fail,
    scheduler::SchedulerOptions,
};
use ::std::{
    fmt,
    str::FromStr,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Position of a ready process under a policy. Only `primary` is considered for preemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank {
    pub primary: i64,
    pub secondary: i64,
}

/// Why a process is entering the ready structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyCause {
    Arrival,
    IoCompletion,
    LockGranted,
    /// A CPU burst finished and the next burst is CPU work again.
    BurstCompleted,
    Preempted,
    QuantumExpired,
}

/// The eight supported scheduling algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Fcfs,
    RoundRobin,
    ShortestRemainingTime,
    StaticPriority,
    DynamicPriority,
    Mlfq,
    RateMonotonic,
    EarliestDeadlineFirst,
}

//======================================================================================================================
// Traits
//======================================================================================================================

pub trait SchedulingPolicy {
    fn algorithm(&self) -> Algorithm;

    /// Ranks a ready process. `seq` is its position in enqueue order.
    fn rank(&self, process: &Process, seq: i64) -> Rank;

    /// Whether a ready process with a strictly better primary rank preempts the running one.
    fn is_preemptive(&self) -> bool {
        false
    }

    /// Maximum number of consecutive ticks `process` may run before it goes back to the ready structure.
    fn time_quantum(&self, _process: &Process) -> Option<usize> {
        None
    }

    /// Whether preempted processes go back to the front of the ready structure instead of the back.
    fn requeues_preempted_at_front(&self) -> bool {
        false
    }

    /// Called when a process (or a new job of a periodic process) arrives.
    fn on_admit(&self, _process: &mut Process) {}

    /// Called whenever a process enters the ready structure.
    fn on_ready(&self, _process: &mut Process, _cause: ReadyCause) {}

    /// Called once per tick for every ready process, before preemption and dispatch.
    fn on_tick(&self, _process: &mut Process, _now: usize) {}

    /// Called when a process is given the CPU.
    fn on_dispatch(&self, _process: &mut Process, _now: usize) {}

    /// Called when a process used up its quantum with CPU work left.
    fn on_quantum_elapsed(&self, _process: &mut Process) {}

    /// Called when a process finishes a CPU burst.
    fn on_burst_completed(&self, _process: &mut Process) {}
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Rank {
    pub fn new(primary: i64, secondary: i64) -> Self {
        Self { primary, secondary }
    }
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Fcfs,
        Algorithm::RoundRobin,
        Algorithm::ShortestRemainingTime,
        Algorithm::StaticPriority,
        Algorithm::DynamicPriority,
        Algorithm::Mlfq,
        Algorithm::RateMonotonic,
        Algorithm::EarliestDeadlineFirst,
    ];

    /// Checks if this algorithm schedules real-time (periodic) processes.
    pub fn is_realtime(&self) -> bool {
        matches!(self, Algorithm::RateMonotonic | Algorithm::EarliestDeadlineFirst)
    }

    /// Instantiates the policy for this algorithm.
    pub fn policy(&self, options: &SchedulerOptions) -> Result<Box<dyn SchedulingPolicy>, Fail> {
        let policy: Box<dyn SchedulingPolicy> = match self {
            Algorithm::Fcfs => Box::new(FirstComeFirstServed),
            Algorithm::RoundRobin => Box::new(RoundRobin::new(options.time_quantum)?),
            Algorithm::ShortestRemainingTime => Box::new(ShortestRemainingTime),
            Algorithm::StaticPriority => Box::new(StaticPriority),
            Algorithm::DynamicPriority => Box::new(DynamicPriority::new(options.aging_factor)?),
            Algorithm::Mlfq => Box::new(MultilevelFeedbackQueue::default()),
            Algorithm::RateMonotonic => Box::new(RateMonotonic),
            Algorithm::EarliestDeadlineFirst => Box::new(EarliestDeadlineFirst),
        };
        Ok(policy)
    }
}

/// Key for processes that a policy has no ordering information for; they sort after everyone else.
pub(crate) fn unranked() -> i64 {
    i64::MAX
}

pub(crate) fn to_rank(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn pid_rank(process: &Process) -> i64 {
    i64::from(process.pid().get())
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl FromStr for Algorithm {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "rr" | "round-robin" | "round_robin" => Ok(Algorithm::RoundRobin),
            "sjf" | "srtf" => Ok(Algorithm::ShortestRemainingTime),
            "priority" | "static" | "priority-static" => Ok(Algorithm::StaticPriority),
            "dynamic" | "aging" | "priority-dynamic" => Ok(Algorithm::DynamicPriority),
            "mlfq" => Ok(Algorithm::Mlfq),
            "rm" | "rate-monotonic" => Ok(Algorithm::RateMonotonic),
            "edf" => Ok(Algorithm::EarliestDeadlineFirst),
            _ => {
                let cause: String = format!("unknown scheduling algorithm {:?}", s);
                error!("from_str(): {}", cause);
                Err(Fail::new(libc::EINVAL, &cause))
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::RoundRobin => "RR",
            Algorithm::ShortestRemainingTime => "SJF",
            Algorithm::StaticPriority => "Priority",
            Algorithm::DynamicPriority => "Priority-Aging",
            Algorithm::Mlfq => "MLFQ",
            Algorithm::RateMonotonic => "RM",
            Algorithm::EarliestDeadlineFirst => "EDF",
        };
        write!(f, "{}", name)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
