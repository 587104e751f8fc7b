// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Discrete-time scheduling engine.
//!
//! Each tick runs, in order: arrivals, I/O completions, aging of ready processes, the preemption check, dispatch
//! and the execution of one unit of CPU work (or an idle tick). Non-CPU bursts never consume CPU time: whenever a
//! process reaches one, it is resolved immediately and the process moves on to its next CPU or I/O burst, blocks on
//! a resource, or terminates.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        Burst,
        Pid,
        Process,
        ProcessKey,
        ProcessState,
        ProcessTable,
    },
    runtime::fail::Fail,
    scheduler::{
        gantt::GanttChart,
        policy::{
            Algorithm,
            Rank,
            ReadyCause,
            SchedulingPolicy,
        },
        ready::{
            ReadyQueue,
            Selection,
        },
        stats::{
            Counters,
            Report,
        },
        SchedulerOptions,
    },
    sync::{
        DeadlockStrategy,
        LockOutcome,
        ResourceManager,
    },
};
use ::std::{
    cmp::Reverse,
    collections::{
        BinaryHeap,
        VecDeque,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Process holding the CPU and the number of ticks it has run since dispatch.
#[derive(Clone, Copy, Debug)]
struct Dispatch {
    key: ProcessKey,
    slice: usize,
}

/// Process chosen for dispatch while the context switch to it is in progress.
#[derive(Clone, Copy, Debug)]
struct PendingSwitch {
    key: ProcessKey,
    remaining: usize,
}

/// Processes whose pending bursts still need to be resolved at the current instant.
type Worklist = VecDeque<(ProcessKey, ReadyCause)>;

pub struct Scheduler {
    policy: Box<dyn SchedulingPolicy>,
    options: SchedulerOptions,
    manager: ResourceManager,
    table: ProcessTable,
    clock: usize,
    /// Processes that have not arrived yet, by arrival time, pid and job instance.
    arrivals: BinaryHeap<Reverse<(usize, Pid, usize, ProcessKey)>>,
    ready: ReadyQueue,
    /// Processes doing I/O, by completion time and pid.
    io_waiting: BinaryHeap<Reverse<(usize, Pid, ProcessKey)>>,
    running: Option<Dispatch>,
    switching: Option<PendingSwitch>,
    last_ran: Option<ProcessKey>,
    gantt: GanttChart,
    counters: Counters,
    completed: Vec<ProcessKey>,
    aborted: Vec<ProcessKey>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Scheduler {
    pub fn new(
        policy: Box<dyn SchedulingPolicy>,
        options: SchedulerOptions,
        manager: ResourceManager,
        processes: Vec<Process>,
    ) -> Self {
        let mut scheduler: Scheduler = Self {
            policy,
            options,
            manager,
            table: ProcessTable::default(),
            clock: 0,
            arrivals: BinaryHeap::new(),
            ready: ReadyQueue::default(),
            io_waiting: BinaryHeap::new(),
            running: None,
            switching: None,
            last_ran: None,
            gantt: GanttChart::default(),
            counters: Counters::default(),
            completed: Vec::new(),
            aborted: Vec::new(),
        };
        for process in processes {
            scheduler.admit_later(process);
        }
        scheduler
    }

    /// Creates a scheduler running the policy of `algorithm`.
    pub fn with_algorithm(
        algorithm: Algorithm,
        options: SchedulerOptions,
        manager: ResourceManager,
        processes: Vec<Process>,
    ) -> Result<Self, Fail> {
        let policy: Box<dyn SchedulingPolicy> = algorithm.policy(&options)?;
        Ok(Self::new(policy, options, manager, processes))
    }

    /// Runs the simulation until no process can make progress or the time horizon is reached.
    pub fn run(mut self) -> Report {
        info!(
            "run(): {} with {} processes ({} strategy)",
            self.policy.algorithm(),
            self.table.len(),
            self.manager.strategy()
        );
        while self.has_work() {
            if let Some(max_time) = self.options.max_time {
                if self.clock >= max_time {
                    info!("run(): time horizon reached at t={}", self.clock);
                    break;
                }
            }
            self.tick();
        }
        if self.manager.num_blocked() > 0 {
            warn!(
                "run(): [t={}] stopped with {} processes blocked on resources",
                self.clock,
                self.manager.num_blocked()
            );
        }
        self.finish()
    }

    /// Checks if some process can still make progress. Processes blocked on a resource cannot on their own.
    fn has_work(&self) -> bool {
        !self.arrivals.is_empty()
            || !self.ready.is_empty()
            || !self.io_waiting.is_empty()
            || self.running.is_some()
            || self.switching.is_some()
    }

    fn tick(&mut self) {
        let now: usize = self.clock;
        self.admit_arrivals(now);
        self.complete_io(now);
        self.age_ready(now);
        self.check_preemption(now);
        self.dispatch(now);
        if self.execute(now) {
            self.counters.busy_time += 1;
        } else {
            self.counters.idle_time += 1;
        }
        self.clock += 1;
    }

    //==================================================================================================================
    // Tick Phases
    //==================================================================================================================

    fn admit_later(&mut self, process: Process) {
        let arrival: (usize, Pid, usize) = (process.arrival_time(), process.pid(), process.instance());
        let key: ProcessKey = self.table.insert(process);
        self.arrivals.push(Reverse((arrival.0, arrival.1, arrival.2, key)));
    }

    fn admit_arrivals(&mut self, now: usize) {
        while let Some(Reverse((arrival, _, _, key))) = self.arrivals.peek().copied() {
            if arrival > now {
                break;
            }
            self.arrivals.pop();

            let next_job: Option<Process> = match self.table.get_mut(key) {
                Some(process) => {
                    process.refresh_absolute_deadline();
                    self.policy.on_admit(process);
                    trace!("admit_arrivals(): [t={}] {} arrived", now, process.pid());
                    Self::next_periodic_job(&self.options, process)
                },
                None => {
                    warn!("admit_arrivals(): stale arrival {}", key);
                    continue;
                },
            };
            if let Some(job) = next_job {
                self.admit_later(job);
            }
            self.settle(key, now, ReadyCause::Arrival);
        }
    }

    /// Builds the next job of a periodic process if it arrives before the time horizon.
    fn next_periodic_job(options: &SchedulerOptions, process: &Process) -> Option<Process> {
        if !options.periodic || process.period() == 0 {
            return None;
        }
        let max_time: usize = options.max_time?;
        let arrival: usize = process.arrival_time() + process.period();
        if arrival < max_time {
            Some(process.next_instance(arrival))
        } else {
            None
        }
    }

    fn complete_io(&mut self, now: usize) {
        while let Some(Reverse((finish, _, key))) = self.io_waiting.peek().copied() {
            if finish > now {
                break;
            }
            self.io_waiting.pop();
            self.settle(key, now, ReadyCause::IoCompletion);
        }
    }

    fn age_ready(&mut self, now: usize) {
        for key in self.ready.keys() {
            if let Some(process) = self.table.get_mut(key) {
                self.policy.on_tick(process, now);
            }
        }
    }

    fn check_preemption(&mut self, now: usize) {
        if !self.policy.is_preemptive() {
            return;
        }
        let dispatch: Dispatch = match self.running {
            Some(dispatch) => dispatch,
            None => return,
        };
        let current: Rank = match self.table.get(dispatch.key) {
            Some(process) => self.policy.rank(process, 0),
            None => return,
        };
        let candidate: Selection = match self.ready.select(&self.table, self.policy.as_ref()) {
            Some(candidate) => candidate,
            None => return,
        };
        if candidate.rank.primary >= current.primary {
            return;
        }

        self.gantt.close(now);
        self.running = None;
        if let Some(process) = self.table.get(dispatch.key) {
            debug!("check_preemption(): [t={}] {} preempted", now, process.pid());
        }
        if let Err(e) = self.make_ready(dispatch.key, now, ReadyCause::Preempted) {
            error!("check_preemption(): {}", e.cause);
        }
    }

    fn dispatch(&mut self, now: usize) {
        if self.running.is_some() {
            return;
        }
        let key: ProcessKey = match self.switching {
            Some(switch) if switch.remaining == 0 => {
                self.switching = None;
                switch.key
            },
            Some(_) => return,
            None => {
                let selection: Selection = match self.ready.select(&self.table, self.policy.as_ref()) {
                    Some(selection) => selection,
                    None => return,
                };
                let key: ProcessKey = self.ready.take(selection);
                if self.last_ran.is_some() && self.last_ran != Some(key) {
                    self.counters.context_switches += 1;
                    let overhead: usize = self.options.context_switch_overhead;
                    if overhead > 0 {
                        trace!("dispatch(): [t={}] switching to {} for {} ticks", now, key, overhead);
                        self.switching = Some(PendingSwitch {
                            key,
                            remaining: overhead,
                        });
                        return;
                    }
                }
                key
            },
        };
        if let Err(e) = self.start(key, now) {
            error!("dispatch(): {}", e.cause);
        }
    }

    fn start(&mut self, key: ProcessKey, now: usize) -> Result<(), Fail> {
        let process: &mut Process = self.table.lookup_mut(key)?;
        process.state = ProcessState::Running;
        process.wait_time += now.saturating_sub(process.last_ready_time);
        self.policy.on_dispatch(process, now);
        trace!("start(): [t={}] {} dispatched", now, process.pid());
        self.gantt.open(process.pid(), now);
        self.running = Some(Dispatch { key, slice: 0 });
        self.last_ran = Some(key);
        Ok(())
    }

    /// Executes one tick. Returns whether the CPU did useful work.
    fn execute(&mut self, now: usize) -> bool {
        if let Some(switch) = self.switching.as_mut() {
            if switch.remaining > 0 {
                switch.remaining -= 1;
                self.counters.total_overhead_time += 1;
            }
            return false;
        }
        let mut dispatch: Dispatch = match self.running {
            Some(dispatch) => dispatch,
            None => return false,
        };
        let process: &mut Process = match self.table.get_mut(dispatch.key) {
            Some(process) => process,
            None => {
                warn!("execute(): stale dispatch {}", dispatch.key);
                self.running = None;
                return false;
            },
        };

        process.remaining_cpu_time = process.remaining_cpu_time.saturating_sub(1);
        dispatch.slice += 1;

        if process.remaining_cpu_time == 0 {
            self.policy.on_burst_completed(process);
            process.advance_to_next_burst();
            self.gantt.close(now + 1);
            self.running = None;
            self.settle(dispatch.key, now + 1, ReadyCause::BurstCompleted);
        } else if self.policy.time_quantum(process).map_or(false, |quantum| dispatch.slice >= quantum) {
            self.policy.on_quantum_elapsed(process);
            self.gantt.close(now + 1);
            self.running = None;
            if let Err(e) = self.make_ready(dispatch.key, now + 1, ReadyCause::QuantumExpired) {
                error!("execute(): {}", e.cause);
            }
        } else {
            self.running = Some(dispatch);
        }
        true
    }

    //==================================================================================================================
    // Burst Resolution
    //==================================================================================================================

    /// Resolves the bursts at the cursor of `key`, and of every process woken up along the way, at instant `now`.
    fn settle(&mut self, key: ProcessKey, now: usize, cause: ReadyCause) {
        let mut worklist: Worklist = VecDeque::new();
        worklist.push_back((key, cause));
        while let Some((key, cause)) = worklist.pop_front() {
            if let Err(e) = self.resolve(key, now, cause, &mut worklist) {
                error!("settle(): {}", e.cause);
            }
        }
    }

    fn resolve(&mut self, key: ProcessKey, now: usize, cause: ReadyCause, worklist: &mut Worklist) -> Result<(), Fail> {
        loop {
            let process: &Process = self.table.lookup(key)?;
            let pid: Pid = process.pid();
            let burst: Option<Burst> = process.get_current_burst().cloned();
            match burst {
                None => return self.terminate(key, now, worklist),
                Some(Burst::Cpu(0)) | Some(Burst::Io(0)) => self.table.lookup_mut(key)?.advance_to_next_burst(),
                Some(Burst::Cpu(_)) => return self.make_ready(key, now, cause),
                Some(Burst::Io(duration)) => return self.start_io(key, now, duration),
                Some(Burst::Lock(name)) => match self.manager.lock(&name, key, &mut self.table, now) {
                    Ok(LockOutcome::Granted) => self.table.lookup_mut(key)?.advance_to_next_burst(),
                    Ok(LockOutcome::Blocked) => {
                        self.table.lookup_mut(key)?.state = ProcessState::Waiting;
                        if self.manager.strategy() == DeadlockStrategy::Detection {
                            self.break_deadlocks(now, worklist)?;
                        }
                        return Ok(());
                    },
                    Ok(LockOutcome::Deferred) => {
                        self.table.lookup_mut(key)?.state = ProcessState::Waiting;
                        return Ok(());
                    },
                    Ok(LockOutcome::Aborted { woken }) => {
                        self.abort(key, now)?;
                        for successor in woken {
                            self.wake(successor, worklist)?;
                        }
                        return Ok(());
                    },
                    Err(e) => {
                        warn!("resolve(): [t={}] {} skips LOCK:{} ({})", now, pid, name, e.cause);
                        self.table.lookup_mut(key)?.advance_to_next_burst();
                    },
                },
                Some(Burst::Unlock(name)) => {
                    match self.manager.unlock(&name, key, &mut self.table, now) {
                        Ok(successor) => {
                            if let Some(successor) = successor {
                                self.wake(successor, worklist)?;
                            }
                            for granted in self.manager.reevaluate_deferred(&mut self.table, now)? {
                                self.wake(granted, worklist)?;
                            }
                        },
                        Err(e) => warn!("resolve(): [t={}] {} skips UNLOCK:{} ({})", now, pid, name, e.cause),
                    }
                    self.table.lookup_mut(key)?.advance_to_next_burst();
                },
            }
        }
    }

    /// Moves a process that just received a resource past its lock request.
    fn wake(&mut self, key: ProcessKey, worklist: &mut Worklist) -> Result<(), Fail> {
        self.table.lookup_mut(key)?.advance_to_next_burst();
        worklist.push_back((key, ReadyCause::LockGranted));
        Ok(())
    }

    /// Terminates deadlock victims until the wait-for relation is acyclic.
    fn break_deadlocks(&mut self, now: usize, worklist: &mut Worklist) -> Result<(), Fail> {
        while let Some(victim) = self.manager.detect_deadlock(&self.table)? {
            warn!(
                "break_deadlocks(): [t={}] deadlock detected, terminating {}",
                now,
                self.table.lookup(victim)?.pid()
            );
            let woken: Vec<ProcessKey> = self.manager.release_all(victim, &mut self.table, now)?;
            self.abort(victim, now)?;
            for successor in woken {
                self.wake(successor, worklist)?;
            }
        }
        Ok(())
    }

    fn make_ready(&mut self, key: ProcessKey, now: usize, cause: ReadyCause) -> Result<(), Fail> {
        let process: &mut Process = self.table.lookup_mut(key)?;
        process.state = ProcessState::Ready;
        process.last_ready_time = now;
        self.policy.on_ready(process, cause);
        if cause == ReadyCause::Preempted && self.policy.requeues_preempted_at_front() {
            self.ready.push_front(key);
        } else {
            self.ready.push_back(key);
        }
        Ok(())
    }

    fn start_io(&mut self, key: ProcessKey, now: usize, duration: usize) -> Result<(), Fail> {
        let process: &mut Process = self.table.lookup_mut(key)?;
        process.state = ProcessState::Waiting;
        process.advance_to_next_burst();
        trace!("start_io(): [t={}] {} waits for I/O until t={}", now, process.pid(), now + duration);
        self.io_waiting.push(Reverse((now + duration, process.pid(), key)));
        Ok(())
    }

    /// Completes a process. Resources it still holds are released and handed to their next waiters.
    fn terminate(&mut self, key: ProcessKey, now: usize, worklist: &mut Worklist) -> Result<(), Fail> {
        let held: &Process = self.table.lookup(key)?;
        if !held.held_resources().is_empty() {
            warn!(
                "terminate(): [t={}] {} completed while holding {:?}",
                now,
                held.pid(),
                held.held_resources()
            );
            for successor in self.manager.release_all(key, &mut self.table, now)? {
                self.wake(successor, worklist)?;
            }
            for granted in self.manager.reevaluate_deferred(&mut self.table, now)? {
                self.wake(granted, worklist)?;
            }
        }

        let process: &mut Process = self.table.lookup_mut(key)?;
        process.state = ProcessState::Terminated;
        process.completion_time = Some(now);
        if process.missed_deadline() {
            warn!(
                "terminate(): [t={}] {} missed its deadline (t={})",
                now,
                process.pid(),
                process.absolute_deadline()
            );
            self.counters.deadline_misses += 1;
        }
        debug!("terminate(): [t={}] {} completed", now, process.pid());
        self.completed.push(key);
        Ok(())
    }

    fn abort(&mut self, key: ProcessKey, now: usize) -> Result<(), Fail> {
        let process: &mut Process = self.table.lookup_mut(key)?;
        process.state = ProcessState::Terminated;
        process.completion_time = None;
        warn!("abort(): [t={}] {} terminated", now, process.pid());
        self.aborted.push(key);
        Ok(())
    }

    //==================================================================================================================
    // Reporting
    //==================================================================================================================

    fn finish(mut self) -> Report {
        self.gantt.close(self.clock);

        let mut leftover: Vec<ProcessKey> = Vec::new();
        leftover.extend(self.running.take().map(|dispatch| dispatch.key));
        leftover.extend(self.switching.take().map(|switch| switch.key));
        leftover.extend(self.ready.drain());
        leftover.extend(self.io_waiting.drain().map(|Reverse((_, _, key))| key));
        leftover.extend(self.manager.blocked());

        let completed: Vec<Process> = Self::collect(&mut self.table, &self.completed);
        let aborted: Vec<Process> = Self::collect(&mut self.table, &self.aborted);
        let unfinished: Vec<Process> = Self::collect(&mut self.table, &leftover);

        info!(
            "finish(): [t={}] {} completed, {} aborted, {} unfinished",
            self.clock,
            completed.len(),
            aborted.len(),
            unfinished.len()
        );
        Report {
            algorithm: self.policy.algorithm(),
            completed,
            aborted,
            unfinished,
            gantt: self.gantt.into_segments(),
            counters: self.counters,
            current_time: self.clock,
        }
    }

    /// Moves the processes behind `keys` out of the table, ordered by pid and job instance.
    fn collect(table: &mut ProcessTable, keys: &[ProcessKey]) -> Vec<Process> {
        let mut processes: Vec<Process> = keys.iter().filter_map(|key| table.remove(*key)).collect();
        processes.sort_by_key(|process| (process.pid(), process.instance()));
        processes
    }
}
