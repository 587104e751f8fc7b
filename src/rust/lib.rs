// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Discrete-event simulation of single-CPU scheduling policies with simulated lock contention.
//!
//! A workload of [process::Process] entities is fed to a [scheduler::Scheduler], which advances logical time one
//! tick at a time under one of eight [scheduler::policy::Algorithm]s and resolves `LOCK`/`UNLOCK` bursts through a
//! [sync::ResourceManager] configured with a [sync::DeadlockStrategy].

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

pub mod process;
pub mod runtime;
pub mod scheduler;
pub mod simulation;
pub mod sync;
pub mod workload;

pub use crate::{
    process::{
        Burst,
        Pid,
        Process,
        ProcessState,
    },
    runtime::fail::Fail,
    scheduler::{
        policy::Algorithm,
        Report,
        Scheduler,
        SchedulerOptions,
    },
    simulation::{
        Config,
        Simulation,
    },
    sync::{
        DeadlockStrategy,
        ResourceManager,
    },
};

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr) => ({
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    anyhow::bail!(r#"ensure failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val)
                }
            }
        }
    });
    ($left:expr, $right:expr,) => ({
        $crate::ensure_eq!($left, $right)
    });
}

/// Ensures that two expressions are not equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[macro_export]
macro_rules! ensure_neq {
    ($left:expr, $right:expr) => ({
        match (&$left, &$right) {
            (left_val, right_val) => {
                if *left_val == *right_val {
                    anyhow::bail!(r#"ensure failed: `(left != right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val)
                }
            }
        }
    });
    ($left:expr, $right:expr,) => ({
        $crate::ensure_neq!($left, $right)
    });
}
