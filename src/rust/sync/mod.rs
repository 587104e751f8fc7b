// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Simulated mutual exclusion.
//!
//! Named resources behave like mutexes with a FIFO wait queue. Ownership is tracked by [crate::process::ProcessKey]
//! in the [ResourceManager] and mirrored by name in each process's list of held resources.

//======================================================================================================================
// Exports
//======================================================================================================================

mod graph;
mod manager;
mod resource;
mod strategy;

pub use self::{
    graph::WaitForGraph,
    manager::{
        LockOutcome,
        ResourceManager,
    },
    resource::Resource,
    strategy::DeadlockStrategy,
};
