// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

mod burst;
pub mod parser;
mod table;

pub use self::{
    burst::Burst,
    parser::{
        parse_workload,
        parse_workload_file,
    },
    table::{
        ProcessKey,
        ProcessTable,
    },
};

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Process identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(u32);

/// Lifecycle state of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    /// Blocked on I/O or on a lock.
    Waiting,
    Terminated,
}

/// Process control block: static description of a process plus its mutable runtime state.
#[derive(Clone, Debug)]
pub struct Process {
    pid: Pid,
    arrival_time: usize,
    static_priority: i64,
    pub(crate) dynamic_priority: i64,
    bursts: Vec<Burst>,
    current_burst_index: usize,
    pub(crate) remaining_cpu_time: usize,
    pub(crate) state: ProcessState,
    period: usize,
    deadline: usize,
    pub(crate) absolute_deadline: usize,
    /// Job number of a periodic process. Zero for the first arrival.
    instance: usize,
    /// Feedback level used by the multilevel feedback queue.
    pub(crate) queue_level: usize,
    pub(crate) held_resources: Vec<String>,
    pub(crate) wait_time: usize,
    pub(crate) last_ready_time: usize,
    pub(crate) completion_time: Option<usize>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Pid {
    pub fn new(pid: u32) -> Self {
        Self(pid)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Process {
    /// Creates a process. A positive `period` or `deadline` marks a real-time process.
    pub fn new(pid: Pid, arrival_time: usize, priority: i64, bursts: Vec<Burst>, period: usize, deadline: usize) -> Self {
        let remaining_cpu_time: usize = bursts.first().map(Burst::cpu_time).unwrap_or(0);
        Self {
            pid,
            arrival_time,
            static_priority: priority,
            dynamic_priority: priority,
            bursts,
            current_burst_index: 0,
            remaining_cpu_time,
            state: ProcessState::Ready,
            period,
            deadline,
            absolute_deadline: 0,
            instance: 0,
            queue_level: 0,
            held_resources: Vec::new(),
            wait_time: 0,
            last_ready_time: arrival_time,
            completion_time: None,
        }
    }

    /// Creates a process from a textual burst pattern (see [Burst::parse_pattern]).
    pub fn from_pattern(pid: u32, arrival_time: usize, priority: i64, pattern: &str, period: usize, deadline: usize) -> Self {
        Self::new(Pid::new(pid), arrival_time, priority, Burst::parse_pattern(pattern), period, deadline)
    }

    /// Creates the next job of a periodic process: same pid and bursts, fresh runtime state.
    pub fn next_instance(&self, arrival_time: usize) -> Self {
        let mut job: Process = Process::new(
            self.pid,
            arrival_time,
            self.static_priority,
            self.bursts.clone(),
            self.period,
            self.deadline,
        );
        job.instance = self.instance + 1;
        job
    }

    /// Returns the burst at the cursor, or `None` once the process has no more work.
    pub fn get_current_burst(&self) -> Option<&Burst> {
        self.bursts.get(self.current_burst_index)
    }

    /// Moves the cursor forward, re-initializing the remaining CPU time if the new burst is a CPU burst.
    pub fn advance_to_next_burst(&mut self) {
        if self.current_burst_index < self.bursts.len() {
            self.current_burst_index += 1;
        }
        self.remaining_cpu_time = self.get_current_burst().map(Burst::cpu_time).unwrap_or(0);
    }

    /// Checks if this process has real-time constraints.
    pub fn is_realtime(&self) -> bool {
        self.period > 0 || self.deadline > 0
    }

    /// Sum of all CPU burst durations.
    pub fn total_cpu_time(&self) -> usize {
        self.bursts.iter().map(Burst::cpu_time).sum()
    }

    /// Turnaround time, once the process has completed.
    pub fn turnaround_time(&self) -> Option<usize> {
        self.completion_time.map(|completion| completion - self.arrival_time)
    }

    /// Checks whether a completed real-time process finished after its absolute deadline.
    pub fn missed_deadline(&self) -> bool {
        match self.completion_time {
            Some(completion) => self.deadline > 0 && completion > self.absolute_deadline,
            None => false,
        }
    }

    pub(crate) fn set_static_priority(&mut self, priority: i64) {
        self.static_priority = priority;
        self.dynamic_priority = priority;
    }

    /// Recomputes the absolute deadline from the arrival time of this job.
    pub(crate) fn refresh_absolute_deadline(&mut self) {
        if self.deadline > 0 {
            self.absolute_deadline = self.arrival_time + self.deadline;
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival_time(&self) -> usize {
        self.arrival_time
    }

    pub fn static_priority(&self) -> i64 {
        self.static_priority
    }

    pub fn dynamic_priority(&self) -> i64 {
        self.dynamic_priority
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn current_burst_index(&self) -> usize {
        self.current_burst_index
    }

    pub fn remaining_cpu_time(&self) -> usize {
        self.remaining_cpu_time
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn deadline(&self) -> usize {
        self.deadline
    }

    pub fn absolute_deadline(&self) -> usize {
        self.absolute_deadline
    }

    pub fn instance(&self) -> usize {
        self.instance
    }

    pub fn held_resources(&self) -> &[String] {
        &self.held_resources
    }

    pub fn wait_time(&self) -> usize {
        self.wait_time
    }

    pub fn last_ready_time(&self) -> usize {
        self.last_ready_time
    }

    pub fn completion_time(&self) -> Option<usize> {
        self.completion_time
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            ProcessState::Ready => "Ready",
            ProcessState::Running => "Running",
            ProcessState::Waiting => "Waiting",
            ProcessState::Terminated => "Terminated",
        };
        write!(f, "{}", name)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
