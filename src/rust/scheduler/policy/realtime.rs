// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    scheduler::policy::{
        pid_rank,
        to_rank,
        unranked,
        Algorithm,
        Rank,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Rate monotonic: the shorter the period, the higher the priority. Priorities are fixed at admission.
#[derive(Clone, Copy, Debug, Default)]
pub struct RateMonotonic;

/// Earliest deadline first: the job with the nearest absolute deadline runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct EarliestDeadlineFirst;

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl SchedulingPolicy for RateMonotonic {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RateMonotonic
    }

    fn rank(&self, process: &Process, _seq: i64) -> Rank {
        let primary: i64 = if process.period() > 0 {
            process.static_priority()
        } else {
            unranked()
        };
        Rank::new(primary, pid_rank(process))
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn on_admit(&self, process: &mut Process) {
        if process.period() > 0 {
            process.set_static_priority(to_rank(process.period()));
        }
    }
}

impl SchedulingPolicy for EarliestDeadlineFirst {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EarliestDeadlineFirst
    }

    fn rank(&self, process: &Process, _seq: i64) -> Rank {
        let primary: i64 = if process.deadline() > 0 {
            to_rank(process.absolute_deadline())
        } else {
            unranked()
        };
        Rank::new(primary, pid_rank(process))
    }

    fn is_preemptive(&self) -> bool {
        true
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
