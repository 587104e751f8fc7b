// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

mod engine;
pub mod gantt;
pub mod policy;
mod ready;
mod stats;

pub use self::{
    engine::Scheduler,
    gantt::{
        GanttChart,
        GanttSegment,
    },
    ready::{
        ReadyQueue,
        Selection,
    },
    stats::{
        Counters,
        Report,
        Summary,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

pub const DEFAULT_TIME_QUANTUM: usize = 4;
pub const DEFAULT_AGING_FACTOR: usize = 10;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Tunables of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Time slice of round robin, in ticks.
    pub time_quantum: usize,
    /// Ticks of waiting that improve the effective priority by one under dynamic priority scheduling.
    pub aging_factor: usize,
    /// Idle ticks spent switching from one process to another.
    pub context_switch_overhead: usize,
    /// Time horizon. The run stops at this tick, whatever work is left.
    pub max_time: Option<usize>,
    /// Whether periodic processes release a new job every period until the time horizon.
    pub periodic: bool,
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            time_quantum: DEFAULT_TIME_QUANTUM,
            aging_factor: DEFAULT_AGING_FACTOR,
            context_switch_overhead: 0,
            max_time: None,
            periodic: false,
        }
    }
}
