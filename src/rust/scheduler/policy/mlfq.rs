// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    scheduler::policy::{
        to_rank,
        Algorithm,
        Rank,
        ReadyCause,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Time quanta of the round-robin levels. The level after the last one is first-come first-served.
const DEFAULT_QUANTA: [usize; 2] = [8, 16];

//======================================================================================================================
// Structures
//======================================================================================================================

/// Multi-level feedback queue. Processes enter at level 0 and move down one level each time they use up their
/// quantum. A higher level always preempts a lower one.
#[derive(Clone, Debug)]
pub struct MultilevelFeedbackQueue {
    quanta: Vec<usize>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl MultilevelFeedbackQueue {
    /// Number of levels, including the final first-come first-served level.
    pub fn num_levels(&self) -> usize {
        self.quanta.len() + 1
    }

    fn lowest_level(&self) -> usize {
        self.quanta.len()
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for MultilevelFeedbackQueue {
    fn default() -> Self {
        Self {
            quanta: DEFAULT_QUANTA.to_vec(),
        }
    }
}

impl SchedulingPolicy for MultilevelFeedbackQueue {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Mlfq
    }

    fn rank(&self, process: &Process, seq: i64) -> Rank {
        Rank::new(to_rank(process.queue_level), seq)
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn time_quantum(&self, process: &Process) -> Option<usize> {
        self.quanta.get(process.queue_level).copied()
    }

    fn requeues_preempted_at_front(&self) -> bool {
        true
    }

    fn on_ready(&self, process: &mut Process, cause: ReadyCause) {
        if matches!(cause, ReadyCause::Arrival | ReadyCause::IoCompletion) {
            process.queue_level = 0;
        }
    }

    fn on_quantum_elapsed(&self, process: &mut Process) {
        process.queue_level = (process.queue_level + 1).min(self.lowest_level());
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
