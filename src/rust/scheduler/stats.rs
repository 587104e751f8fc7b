// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        Pid,
        Process,
    },
    scheduler::{
        gantt::GanttSegment,
        policy::Algorithm,
    },
};
use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Event counters maintained by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub context_switches: usize,
    /// Ticks spent switching between processes. These are also counted as idle.
    pub total_overhead_time: usize,
    pub deadline_misses: usize,
    pub idle_time: usize,
    pub busy_time: usize,
}

/// Outcome of one simulation run.
#[derive(Debug)]
pub struct Report {
    pub algorithm: Algorithm,
    /// Processes that ran out of bursts, by pid and job instance.
    pub completed: Vec<Process>,
    /// Processes terminated by the deadlock handling.
    pub aborted: Vec<Process>,
    /// Processes left with work when the run stopped.
    pub unfinished: Vec<Process>,
    pub gantt: Vec<GanttSegment>,
    pub counters: Counters,
    /// Number of ticks simulated.
    pub current_time: usize,
}

/// Aggregate metrics derived from a [Report].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub num_completed: usize,
    pub avg_turnaround_time: f64,
    pub avg_wait_time: f64,
    /// Percentage of ticks the CPU spent executing processes.
    pub cpu_utilization: f64,
    /// Completed processes per tick.
    pub throughput: f64,
    pub context_switches: usize,
    pub deadline_misses: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Report {
    pub fn summary(&self) -> Summary {
        let num_completed: usize = self.completed.len();
        let (turnaround, wait): (usize, usize) = self.completed.iter().fold((0, 0), |(turnaround, wait), process| {
            (
                turnaround + process.turnaround_time().unwrap_or(0),
                wait + process.wait_time(),
            )
        });
        Summary {
            num_completed,
            avg_turnaround_time: ratio(turnaround, num_completed),
            avg_wait_time: ratio(wait, num_completed),
            cpu_utilization: 100.0 * ratio(self.counters.busy_time, self.current_time),
            throughput: ratio(num_completed, self.current_time),
            context_switches: self.counters.context_switches,
            deadline_misses: self.counters.deadline_misses,
        }
    }

    /// Looks up a completed process by pid and job instance.
    pub fn completed_process(&self, pid: Pid, instance: usize) -> Option<&Process> {
        self.completed
            .iter()
            .find(|process| process.pid() == pid && process.instance() == instance)
    }

    /// Total number of ticks `pid` spent on the CPU according to the Gantt chart, over all its jobs.
    pub fn cpu_time_of(&self, pid: Pid) -> usize {
        self.gantt
            .iter()
            .filter(|segment| segment.pid == pid)
            .map(GanttSegment::len)
            .sum()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary: Summary = self.summary();
        writeln!(f, "=== {} ===", self.algorithm)?;
        writeln!(
            f,
            "{:<6} {:>8} {:>6} {:>8} {:>10} {:>11} {:>5}",
            "PID", "Arrival", "Burst", "Finish", "Turnaround", "Waiting", "Job"
        )?;
        for process in &self.completed {
            writeln!(
                f,
                "{:<6} {:>8} {:>6} {:>8} {:>10} {:>11} {:>5}",
                process.pid().to_string(),
                process.arrival_time(),
                process.total_cpu_time(),
                process.completion_time().unwrap_or(0),
                process.turnaround_time().unwrap_or(0),
                process.wait_time(),
                process.instance(),
            )?;
        }
        for process in &self.aborted {
            writeln!(f, "{:<6} aborted", process.pid().to_string())?;
        }
        for process in &self.unfinished {
            writeln!(f, "{:<6} unfinished ({})", process.pid().to_string(), process.state())?;
        }
        let timeline: Vec<String> = self.gantt.iter().map(|segment| segment.to_string()).collect();
        writeln!(f, "Gantt: {}", timeline.join(" "))?;
        write!(f, "{}", summary)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Completed processes:     {}", self.num_completed)?;
        writeln!(f, "Average turnaround time: {:.2}", self.avg_turnaround_time)?;
        writeln!(f, "Average waiting time:    {:.2}", self.avg_wait_time)?;
        writeln!(f, "CPU utilization:         {:.2}%", self.cpu_utilization)?;
        writeln!(f, "Throughput:              {:.4}", self.throughput)?;
        writeln!(f, "Context switches:        {}", self.context_switches)?;
        writeln!(f, "Deadline misses:         {}", self.deadline_misses)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
