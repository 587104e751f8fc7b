// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    runtime::fail::Fail,
    scheduler::policy::{
        pid_rank,
        to_rank,
        Algorithm,
        Rank,
        ReadyCause,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Preemptive priority scheduling on the static priority (smaller value runs first, ties go to the smaller pid).
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPriority;

/// Preemptive priority scheduling with aging: every `aging_factor` ticks spent in the ready structure improve the
/// effective priority of a process by one.
#[derive(Clone, Copy, Debug)]
pub struct DynamicPriority {
    aging_factor: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl DynamicPriority {
    pub fn new(aging_factor: usize) -> Result<Self, Fail> {
        if aging_factor == 0 {
            let cause: &str = "aging factor must be at least one tick";
            error!("new(): {}", cause);
            return Err(Fail::new(libc::EINVAL, cause));
        }
        Ok(Self { aging_factor })
    }

    pub fn aging_factor(&self) -> usize {
        self.aging_factor
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl SchedulingPolicy for StaticPriority {
    fn algorithm(&self) -> Algorithm {
        Algorithm::StaticPriority
    }

    fn rank(&self, process: &Process, _seq: i64) -> Rank {
        Rank::new(process.static_priority(), pid_rank(process))
    }

    fn is_preemptive(&self) -> bool {
        true
    }
}

impl SchedulingPolicy for DynamicPriority {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DynamicPriority
    }

    fn rank(&self, process: &Process, _seq: i64) -> Rank {
        Rank::new(process.dynamic_priority(), pid_rank(process))
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn on_ready(&self, process: &mut Process, cause: ReadyCause) {
        if matches!(cause, ReadyCause::Arrival | ReadyCause::IoCompletion) {
            process.dynamic_priority = process.static_priority();
        }
    }

    fn on_tick(&self, process: &mut Process, now: usize) {
        let waited: usize = now.saturating_sub(process.last_ready_time());
        let boost: i64 = to_rank(waited / self.aging_factor);
        process.dynamic_priority = process.static_priority().saturating_sub(boost);
    }

    fn on_burst_completed(&self, process: &mut Process) {
        process.dynamic_priority = process.static_priority();
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
