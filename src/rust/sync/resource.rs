// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::process::ProcessKey;
use ::std::collections::VecDeque;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Simulated mutex with a FIFO queue of blocked processes.
#[derive(Clone, Debug)]
pub struct Resource {
    name: String,
    /// Position in the global acquisition order (used by deadlock prevention).
    id: usize,
    owner: Option<ProcessKey>,
    waiters: VecDeque<ProcessKey>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Resource {
    pub fn new(name: &str, id: usize) -> Self {
        Self {
            name: name.to_string(),
            id,
            owner: None,
            waiters: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<ProcessKey> {
        self.owner
    }

    pub fn waiters(&self) -> impl Iterator<Item = &ProcessKey> {
        self.waiters.iter()
    }

    pub fn num_waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Grants the resource if it is free. Returns `false` if someone else owns it.
    pub(crate) fn try_acquire(&mut self, key: ProcessKey) -> bool {
        match self.owner {
            None => {
                self.owner = Some(key);
                true
            },
            Some(owner) => owner == key,
        }
    }

    pub(crate) fn enqueue(&mut self, key: ProcessKey) {
        self.waiters.push_back(key);
    }

    /// Releases the resource and hands it to the head of the wait queue, which is returned.
    pub(crate) fn release(&mut self) -> Option<ProcessKey> {
        self.owner = self.waiters.pop_front();
        self.owner
    }

    /// Drops `key` from the wait queue. Returns `true` if it was queued.
    pub(crate) fn remove_waiter(&mut self, key: ProcessKey) -> bool {
        let len: usize = self.waiters.len();
        self.waiters.retain(|waiter| *waiter != key);
        self.waiters.len() != len
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
