// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        ProcessKey,
        ProcessTable,
    },
    runtime::fail::Fail,
    sync::{
        graph::WaitForGraph,
        resource::Resource,
        strategy::DeadlockStrategy,
    },
};
use ::std::collections::{
    HashMap,
    VecDeque,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Result of a lock request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    /// The requester now owns the resource.
    Granted,
    /// The requester was appended to the wait queue of the resource.
    Blocked,
    /// Avoidance denied the request; the requester is parked until an unlock lets it be re-evaluated.
    Deferred,
    /// Prevention rejected an out-of-order request. Everything the requester held was released, which woke the
    /// listed processes, and the requester must be terminated.
    Aborted { woken: Vec<ProcessKey> },
}

/// Registry of simulated mutexes plus the deadlock policy that governs them.
pub struct ResourceManager {
    strategy: DeadlockStrategy,
    resources: HashMap<String, Resource>,
    /// Requests denied by avoidance, in arrival order.
    deferred: VecDeque<(ProcessKey, String)>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl ResourceManager {
    pub fn new(strategy: DeadlockStrategy) -> Self {
        Self {
            strategy,
            resources: HashMap::new(),
            deferred: VecDeque::new(),
        }
    }

    /// Creates a manager with the given resources already registered.
    pub fn with_resources<S: AsRef<str>>(strategy: DeadlockStrategy, names: &[S]) -> Self {
        let mut manager: ResourceManager = Self::new(strategy);
        manager.initialize_resources(names);
        manager
    }

    /// Replaces the registry with one fresh resource per name. Acquisition ids follow the order of `names`.
    pub fn initialize_resources<S: AsRef<str>>(&mut self, names: &[S]) {
        self.resources.clear();
        self.deferred.clear();
        for name in names {
            let name: &str = name.as_ref();
            if self.resources.contains_key(name) {
                warn!("initialize_resources(): duplicate resource {:?} ignored", name);
                continue;
            }
            let id: usize = self.resources.len();
            debug!("initialize_resources(): created {:?} (id={})", name, id);
            self.resources.insert(name.to_string(), Resource::new(name, id));
        }
    }

    pub fn strategy(&self) -> DeadlockStrategy {
        self.strategy
    }

    pub fn get_resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Names of all registered resources, in acquisition-id order.
    pub fn resource_names(&self) -> Vec<String> {
        let mut resources: Vec<&Resource> = self.resources.values().collect();
        resources.sort_by_key(|resource| resource.id());
        resources.iter().map(|resource| resource.name().to_string()).collect()
    }

    /// Requests `name` on behalf of the process `key`.
    pub fn lock(&mut self, name: &str, key: ProcessKey, table: &mut ProcessTable, now: usize) -> Result<LockOutcome, Fail> {
        let resource: &Resource = self.resource(name)?;
        let pid = table.lookup(key)?.pid();

        if resource.owner() == Some(key) {
            warn!("lock(): [t={}] {} already owns {:?}", now, pid, name);
            return Ok(LockOutcome::Granted);
        }

        if self.strategy == DeadlockStrategy::Prevention {
            let requested: usize = resource.id();
            if let Some(highest) = self.highest_held_id(key, table)? {
                if requested <= highest {
                    warn!(
                        "lock(): [t={}] {} requested {:?} (id={}) while holding id {}, terminating it",
                        now, pid, name, requested, highest
                    );
                    let woken: Vec<ProcessKey> = self.release_all(key, table, now)?;
                    return Ok(LockOutcome::Aborted { woken });
                }
            }
        }

        if !resource.is_locked() {
            self.resource_mut(name)?.try_acquire(key);
            table.lookup_mut(key)?.held_resources.push(name.to_string());
            trace!("lock(): [t={}] {} acquired {:?}", now, pid, name);
            return Ok(LockOutcome::Granted);
        }

        if self.strategy == DeadlockStrategy::Avoidance {
            if let Some(holder) = resource.owner() {
                if self.wait_for_graph().would_close_cycle(key, holder) {
                    debug!("lock(): [t={}] {} denied {:?} (unsafe request deferred)", now, pid, name);
                    self.deferred.push_back((key, name.to_string()));
                    return Ok(LockOutcome::Deferred);
                }
            }
        }

        self.resource_mut(name)?.enqueue(key);
        debug!("lock(): [t={}] {} blocked on {:?}", now, pid, name);
        Ok(LockOutcome::Blocked)
    }

    /// Releases `name` on behalf of the process `key`. If a process was waiting, ownership passes to it and it is
    /// returned so that the caller can make it ready. A release by a process that does not own the resource is
    /// logged and ignored.
    pub fn unlock(
        &mut self,
        name: &str,
        key: ProcessKey,
        table: &mut ProcessTable,
        now: usize,
    ) -> Result<Option<ProcessKey>, Fail> {
        let pid = table.lookup(key)?.pid();
        let resource: &mut Resource = self.resource_mut(name)?;
        if resource.owner() != Some(key) {
            warn!("unlock(): [t={}] {} does not own {:?}", now, pid, name);
            return Ok(None);
        }

        let successor: Option<ProcessKey> = resource.release();
        table.lookup_mut(key)?.held_resources.retain(|held| held != name);
        trace!("unlock(): [t={}] {} released {:?}", now, pid, name);

        if let Some(successor) = successor {
            table.lookup_mut(successor)?.held_resources.push(name.to_string());
            debug!("unlock(): [t={}] {:?} handed over to {}", now, name, table.lookup(successor)?.pid());
        }
        Ok(successor)
    }

    /// Re-evaluates requests deferred by avoidance, in FIFO order. Requests on a free resource are granted and
    /// their processes returned; requests that became safe join the wait queue of their resource.
    pub fn reevaluate_deferred(&mut self, table: &mut ProcessTable, now: usize) -> Result<Vec<ProcessKey>, Fail> {
        let mut granted: Vec<ProcessKey> = Vec::new();
        let pending: VecDeque<(ProcessKey, String)> = std::mem::take(&mut self.deferred);
        for (key, name) in pending {
            let owner: Option<ProcessKey> = self.resource(&name)?.owner();
            match owner {
                None => {
                    self.resource_mut(&name)?.try_acquire(key);
                    table.lookup_mut(key)?.held_resources.push(name.clone());
                    debug!("reevaluate_deferred(): [t={}] granted {:?} to {}", now, name, table.lookup(key)?.pid());
                    granted.push(key);
                },
                Some(holder) if !self.wait_for_graph().would_close_cycle(key, holder) => {
                    debug!("reevaluate_deferred(): [t={}] {} now waits on {:?}", now, table.lookup(key)?.pid(), name);
                    self.resource_mut(&name)?.enqueue(key);
                },
                Some(_) => self.deferred.push_back((key, name)),
            }
        }
        Ok(granted)
    }

    /// Searches the wait-for relation for a cycle and, if there is one, picks the victim: the member with the
    /// largest static priority value (the least urgent), then the largest pid, then the latest key.
    pub fn detect_deadlock(&self, table: &ProcessTable) -> Result<Option<ProcessKey>, Fail> {
        let cycle: Vec<ProcessKey> = match self.wait_for_graph().find_cycle() {
            Some(cycle) => cycle,
            None => return Ok(None),
        };

        let mut victim: Option<(i64, u32, ProcessKey)> = None;
        for key in cycle {
            let process = table.lookup(key)?;
            let candidate: (i64, u32, ProcessKey) = (process.static_priority(), process.pid().get(), key);
            if victim.map_or(true, |current| candidate > current) {
                victim = Some(candidate);
            }
        }
        Ok(victim.map(|(_, _, key)| key))
    }

    /// Forcibly removes the process `key` from every wait structure and releases everything it holds. Returns the
    /// processes that received ownership as a result.
    pub fn release_all(&mut self, key: ProcessKey, table: &mut ProcessTable, now: usize) -> Result<Vec<ProcessKey>, Fail> {
        for resource in self.resources.values_mut() {
            resource.remove_waiter(key);
        }
        self.deferred.retain(|(deferred, _)| *deferred != key);

        let held: Vec<String> = table.lookup(key)?.held_resources.clone();
        let mut woken: Vec<ProcessKey> = Vec::with_capacity(held.len());
        for name in held.iter().rev() {
            if let Some(successor) = self.unlock(name, key, table, now)? {
                woken.push(successor);
            }
        }
        Ok(woken)
    }

    /// Checks whether `key` is queued on some resource or deferred.
    pub fn is_blocked(&self, key: ProcessKey) -> bool {
        self.deferred.iter().any(|(deferred, _)| *deferred == key)
            || self.resources.values().any(|resource| resource.waiters().any(|waiter| *waiter == key))
    }

    /// Number of processes currently queued or deferred.
    pub fn num_blocked(&self) -> usize {
        self.deferred.len() + self.resources.values().map(Resource::num_waiters).sum::<usize>()
    }

    /// Processes still queued or deferred, in key order.
    pub fn blocked(&self) -> Vec<ProcessKey> {
        let mut blocked: Vec<ProcessKey> = self.deferred.iter().map(|(key, _)| *key).collect();
        for resource in self.resources.values() {
            blocked.extend(resource.waiters().copied());
        }
        blocked.sort();
        blocked.dedup();
        blocked
    }

    /// Builds the wait-for relation from the wait queues of the registry. Deferred requests are parked outside of
    /// any queue and do not contribute edges.
    pub fn wait_for_graph(&self) -> WaitForGraph {
        let mut graph: WaitForGraph = WaitForGraph::default();
        for resource in self.resources.values() {
            if let Some(owner) = resource.owner() {
                for waiter in resource.waiters() {
                    graph.add_edge(*waiter, owner);
                }
            }
        }
        graph
    }

    fn highest_held_id(&self, key: ProcessKey, table: &ProcessTable) -> Result<Option<usize>, Fail> {
        let held: &[String] = table.lookup(key)?.held_resources();
        Ok(held
            .iter()
            .filter_map(|name| self.resources.get(name))
            .map(Resource::id)
            .max())
    }

    fn resource(&self, name: &str) -> Result<&Resource, Fail> {
        match self.resources.get(name) {
            Some(resource) => Ok(resource),
            None => {
                let cause: String = format!("resource {:?} is not registered", name);
                warn!("resource(): {}", cause);
                Err(Fail::new(libc::ENOENT, &cause))
            },
        }
    }

    fn resource_mut(&mut self, name: &str) -> Result<&mut Resource, Fail> {
        match self.resources.get_mut(name) {
            Some(resource) => Ok(resource),
            None => {
                let cause: String = format!("resource {:?} is not registered", name);
                warn!("resource_mut(): {}", cause);
                Err(Fail::new(libc::ENOENT, &cause))
            },
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(DeadlockStrategy::default())
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
