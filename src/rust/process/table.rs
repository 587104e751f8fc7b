// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::Process,
    runtime::fail::Fail,
};
use ::slab::Slab;
use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Handle of a process inside a [ProcessTable]. Unlike a [crate::process::Pid], a key is unique per job, so the
/// instances of a periodic process get distinct keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessKey(usize);

/// Storage for every process that takes part in a simulation run.
#[derive(Default)]
pub struct ProcessTable {
    slab: Slab<Process>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ProcessTable {
    /// Inserts a process and returns its key.
    pub fn insert(&mut self, process: Process) -> ProcessKey {
        ProcessKey(self.slab.insert(process))
    }

    pub fn get(&self, key: ProcessKey) -> Option<&Process> {
        self.slab.get(key.0)
    }

    pub fn get_mut(&mut self, key: ProcessKey) -> Option<&mut Process> {
        self.slab.get_mut(key.0)
    }

    /// Looks up a process that must exist.
    pub fn lookup(&self, key: ProcessKey) -> Result<&Process, Fail> {
        match self.slab.get(key.0) {
            Some(process) => Ok(process),
            None => {
                let cause: String = format!("no process with key {}", key);
                error!("lookup(): {}", cause);
                Err(Fail::new(libc::ENOENT, &cause))
            },
        }
    }

    /// Looks up a process that must exist, for mutation.
    pub fn lookup_mut(&mut self, key: ProcessKey) -> Result<&mut Process, Fail> {
        match self.slab.get_mut(key.0) {
            Some(process) => Ok(process),
            None => {
                let cause: String = format!("no process with key {}", key);
                error!("lookup_mut(): {}", cause);
                Err(Fail::new(libc::ENOENT, &cause))
            },
        }
    }

    /// Removes a process from the table.
    pub fn remove(&mut self, key: ProcessKey) -> Option<Process> {
        self.slab.try_remove(key.0)
    }

    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }
}

impl ProcessKey {
    pub fn get(&self) -> usize {
        self.0
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
