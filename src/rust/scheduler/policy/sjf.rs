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
        Algorithm,
        Rank,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Shortest remaining time first. Ties go to the smaller pid.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortestRemainingTime;

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl SchedulingPolicy for ShortestRemainingTime {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ShortestRemainingTime
    }

    fn rank(&self, process: &Process, _seq: i64) -> Rank {
        Rank::new(to_rank(process.remaining_cpu_time()), pid_rank(process))
    }

    fn is_preemptive(&self) -> bool {
        true
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::ShortestRemainingTime;
    use crate::{
        process::Process,
        scheduler::policy::SchedulingPolicy,
    };
    use ::anyhow::Result;

    #[test]
    fn test_shorter_remaining_time_ranks_first() -> Result<()> {
        let policy: ShortestRemainingTime = ShortestRemainingTime;
        let long: Process = Process::from_pattern(1, 0, 0, "CPU:9", 0, 0);
        let short: Process = Process::from_pattern(2, 0, 0, "CPU:3", 0, 0);
        let tie: Process = Process::from_pattern(3, 0, 0, "CPU:3", 0, 0);

        crate::ensure_eq!(policy.rank(&short, 7) < policy.rank(&long, 0), true);
        crate::ensure_eq!(policy.rank(&short, 7) < policy.rank(&tie, 0), true);
        Ok(())
    }
}
