// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        Process,
        ProcessKey,
        ProcessTable,
    },
    scheduler::policy::{
        Rank,
        SchedulingPolicy,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

#[derive(Clone, Copy, Debug)]
struct ReadyEntry {
    key: ProcessKey,
    seq: i64,
}

/// Ready processes in enqueue order. Pushing to the front hands out sequence numbers below every existing entry, so
/// policies that order by sequence see front-pushed entries first.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    entries: Vec<ReadyEntry>,
    next_back: i64,
    next_front: i64,
}

/// The entry a policy would run next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub key: ProcessKey,
    pub rank: Rank,
    position: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ReadyQueue {
    pub fn push_back(&mut self, key: ProcessKey) {
        let seq: i64 = self.next_back;
        self.next_back += 1;
        self.entries.push(ReadyEntry { key, seq });
    }

    pub fn push_front(&mut self, key: ProcessKey) {
        self.next_front -= 1;
        let seq: i64 = self.next_front;
        self.entries.push(ReadyEntry { key, seq });
    }

    /// Finds the best-ranked entry under `policy`, breaking ties by sequence number.
    pub fn select(&self, table: &ProcessTable, policy: &dyn SchedulingPolicy) -> Option<Selection> {
        let mut best: Option<(Rank, i64, Selection)> = None;
        for (position, entry) in self.entries.iter().enumerate() {
            let process: &Process = match table.get(entry.key) {
                Some(process) => process,
                None => {
                    warn!("select(): stale ready entry {}", entry.key);
                    continue;
                },
            };
            let rank: Rank = policy.rank(process, entry.seq);
            let better: bool = match &best {
                Some((best_rank, best_seq, _)) => (rank, entry.seq) < (*best_rank, *best_seq),
                None => true,
            };
            if better {
                best = Some((
                    rank,
                    entry.seq,
                    Selection {
                        key: entry.key,
                        rank,
                        position,
                    },
                ));
            }
        }
        best.map(|(_, _, selection)| selection)
    }

    /// Removes the entry designated by a selection made on the current contents of the queue.
    pub fn take(&mut self, selection: Selection) -> ProcessKey {
        self.entries.remove(selection.position).key
    }

    pub fn keys(&self) -> impl Iterator<Item = ProcessKey> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }

    pub fn drain(&mut self) -> Vec<ProcessKey> {
        self.entries.drain(..).map(|entry| entry.key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
