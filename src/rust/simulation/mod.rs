// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Runs a workload under one or more algorithms, each on an independent copy of the processes.

//======================================================================================================================
// Exports
//======================================================================================================================

mod config;

pub use self::config::Config;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        parse_workload_file,
        Burst,
        Process,
    },
    runtime::fail::Fail,
    scheduler::{
        policy::Algorithm,
        Report,
        Scheduler,
        SchedulerOptions,
    },
    sync::{
        DeadlockStrategy,
        ResourceManager,
    },
    workload::WorkloadGenerator,
};
use ::std::path::PathBuf;

//======================================================================================================================
// Structures
//======================================================================================================================

#[derive(Clone, Debug)]
pub struct Simulation {
    algorithms: Vec<Algorithm>,
    options: SchedulerOptions,
    strategy: DeadlockStrategy,
    resources: Vec<String>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Simulation {
    /// Creates a simulation running every algorithm.
    pub fn new(options: SchedulerOptions, strategy: DeadlockStrategy, resources: Vec<String>) -> Result<Self, Fail> {
        if options.periodic && options.max_time.is_none() {
            let cause: &str = "periodic arrivals require a time horizon";
            error!("new(): {}", cause);
            return Err(Fail::new(libc::EINVAL, cause));
        }
        Ok(Self {
            algorithms: Algorithm::ALL.to_vec(),
            options,
            strategy,
            resources,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Fail> {
        let simulation: Simulation = Self::new(config.scheduler_options()?, config.strategy()?, config.resources()?)?;
        Ok(simulation.with_algorithms(config.algorithms()?))
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn strategy(&self) -> DeadlockStrategy {
        self.strategy
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Runs `algorithm` on a copy of the processes it applies to: real-time algorithms only see processes with a
    /// period, the others only see processes without one.
    pub fn run(&self, algorithm: Algorithm, processes: &[Process]) -> Result<Report, Fail> {
        let workload: Vec<Process> = processes
            .iter()
            .filter(|process| (process.period() > 0) == algorithm.is_realtime())
            .cloned()
            .collect();
        if workload.len() < processes.len() {
            debug!(
                "run(): {} skips {} processes",
                algorithm,
                processes.len() - workload.len()
            );
        }
        let manager: ResourceManager = ResourceManager::with_resources(self.strategy, self.resources.as_slice());
        let scheduler: Scheduler = Scheduler::with_algorithm(algorithm, self.options, manager, workload)?;
        Ok(scheduler.run())
    }

    /// Runs every configured algorithm in order.
    pub fn run_all(&self, processes: &[Process]) -> Result<Vec<Report>, Fail> {
        self.algorithms
            .iter()
            .map(|algorithm| self.run(*algorithm, processes))
            .collect()
    }
}

/// Loads the workload named by `config`: the input file if there is one, a random workload otherwise.
pub fn load_workload(config: &Config) -> Result<Vec<Process>, Fail> {
    let input: Option<PathBuf> = config.input()?;
    match input {
        Some(path) => {
            let processes: Vec<Process> = parse_workload_file(&path)?;
            info!("load_workload(): {} processes read from {:?}", processes.len(), path);
            Ok(processes)
        },
        None => {
            let mut generator: WorkloadGenerator = WorkloadGenerator::new(config.workload_options()?)?;
            Ok(generator.generate_all())
        },
    }
}

/// Lists the resources referenced by `LOCK` bursts, in order of first appearance.
pub fn referenced_resources(processes: &[Process]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for process in processes {
        for burst in process.bursts() {
            if let Burst::Lock(name) = burst {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
