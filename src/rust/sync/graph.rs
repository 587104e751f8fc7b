// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Wait-for relation between processes, rebuilt from the resource registry each time it is consulted.
//!
//! A process blocked on a resource waits for the owner of that resource. Since a process blocks on at most one
//! resource at a time, every node has at most one outgoing edge and a cycle is found by walking the chain.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::process::ProcessKey;
use ::std::collections::{
    BTreeMap,
    BTreeSet,
};

//======================================================================================================================
// Structures
//======================================================================================================================

#[derive(Debug, Default)]
pub struct WaitForGraph {
    edges: BTreeMap<ProcessKey, ProcessKey>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl WaitForGraph {
    /// Records that `waiter` is blocked on a resource owned by `holder`.
    pub fn add_edge(&mut self, waiter: ProcessKey, holder: ProcessKey) {
        if waiter != holder {
            self.edges.insert(waiter, holder);
        }
    }

    /// Checks whether following wait-for edges from `from` leads to `to`.
    pub fn reaches(&self, from: ProcessKey, to: ProcessKey) -> bool {
        let mut visited: BTreeSet<ProcessKey> = BTreeSet::new();
        let mut current: ProcessKey = from;
        loop {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                return false;
            }
            match self.edges.get(&current) {
                Some(next) => current = *next,
                None => return false,
            }
        }
    }

    /// Checks whether `requester` blocking on a resource owned by `holder` would close a cycle.
    pub fn would_close_cycle(&self, requester: ProcessKey, holder: ProcessKey) -> bool {
        self.reaches(holder, requester)
    }

    /// Returns the members of the first cycle found, walking from every waiting process in key order.
    pub fn find_cycle(&self) -> Option<Vec<ProcessKey>> {
        let mut visited: BTreeSet<ProcessKey> = BTreeSet::new();
        for start in self.edges.keys() {
            if visited.contains(start) {
                continue;
            }
            let mut path: Vec<ProcessKey> = Vec::new();
            let mut current: ProcessKey = *start;
            loop {
                if let Some(position) = path.iter().position(|node| *node == current) {
                    return Some(path[position..].to_vec());
                }
                if !visited.insert(current) {
                    break;
                }
                path.push(current);
                match self.edges.get(&current) {
                    Some(next) => current = *next,
                    None => break,
                }
            }
        }
        None
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
