// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    runtime::fail::Fail,
    scheduler::policy::{
        Algorithm,
        Rank,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// First-come first-served with a fixed time slice.
#[derive(Clone, Copy, Debug)]
pub struct RoundRobin {
    quantum: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl RoundRobin {
    pub fn new(quantum: usize) -> Result<Self, Fail> {
        if quantum == 0 {
            let cause: &str = "time quantum must be at least one tick";
            error!("new(): {}", cause);
            return Err(Fail::new(libc::EINVAL, cause));
        }
        Ok(Self { quantum })
    }

    pub fn quantum(&self) -> usize {
        self.quantum
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl SchedulingPolicy for RoundRobin {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RoundRobin
    }

    fn rank(&self, _process: &Process, seq: i64) -> Rank {
        Rank::new(0, seq)
    }

    fn time_quantum(&self, _process: &Process) -> Option<usize> {
        Some(self.quantum)
    }
}
