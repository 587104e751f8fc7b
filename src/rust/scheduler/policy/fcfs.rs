// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    scheduler::policy::{
        Algorithm,
        Rank,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Runs processes to completion of their CPU burst in the order they became ready.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstComeFirstServed;

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl SchedulingPolicy for FirstComeFirstServed {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fcfs
    }

    fn rank(&self, _process: &Process, seq: i64) -> Rank {
        Rank::new(0, seq)
    }
}
