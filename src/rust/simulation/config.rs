// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    runtime::fail::Fail,
    scheduler::{
        policy::Algorithm,
        SchedulerOptions,
        DEFAULT_AGING_FACTOR,
        DEFAULT_TIME_QUANTUM,
    },
    sync::DeadlockStrategy,
    workload::{
        WorkloadKind,
        WorkloadOptions,
    },
};
use ::std::{
    fs,
    ops::Index,
    path::PathBuf,
    str::FromStr,
};
use ::yaml_rust::{
    yaml::Hash,
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Scheduling options. These apply to every algorithm of a run.
mod simulation_config {
    pub const SECTION_NAME: &str = "simulation";
    pub const ALGORITHMS: &str = "algorithms";
    pub const TIME_QUANTUM: &str = "time_quantum";
    pub const AGING_FACTOR: &str = "aging_factor";
    pub const CONTEXT_SWITCH_OVERHEAD: &str = "context_switch_overhead";
    pub const MAX_TIME: &str = "max_time";
    pub const PERIODIC: &str = "periodic";
}

// Resource manager options.
mod sync_config {
    pub const SECTION_NAME: &str = "sync";
    pub const STRATEGY: &str = "strategy";
    pub const RESOURCES: &str = "resources";
}

// Workload source. Either an input file or the parameters of the random generator.
mod workload_config {
    pub const SECTION_NAME: &str = "workload";
    pub const INPUT: &str = "input";
    pub const SEED: &str = "seed";
    pub const PROCESSES: &str = "processes";
    pub const MAX_ARRIVAL_TIME: &str = "max_arrival_time";
    pub const MAX_CPU_BURST: &str = "max_cpu_burst";
    pub const MAX_IO_BURST: &str = "max_io_burst";
    pub const MAX_PRIORITY: &str = "max_priority";
    pub const KIND: &str = "kind";
    pub const REALTIME_PROCESSES: &str = "realtime_processes";
    pub const MAX_PERIOD: &str = "max_period";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Simulation configuration. Every section and key is optional.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let config_s: String = match fs::read_to_string(config_path) {
            Ok(config_s) => config_s,
            Err(e) => {
                let cause: String = format!("cannot read configuration file {:?}: {}", config_path, e);
                error!("new(): {}", cause);
                return Err(Fail::new(libc::ENOENT, &cause));
            },
        };
        config_s.parse()
    }

    fn get_simulation_config(&self) -> Result<Option<&Yaml>, Fail> {
        Self::get_optional_subsection(&self.0, simulation_config::SECTION_NAME)
    }

    fn get_sync_config(&self) -> Result<Option<&Yaml>, Fail> {
        Self::get_optional_subsection(&self.0, sync_config::SECTION_NAME)
    }

    fn get_workload_config(&self) -> Result<Option<&Yaml>, Fail> {
        Self::get_optional_subsection(&self.0, workload_config::SECTION_NAME)
    }

    /// Simulation config: Reads the algorithms to run, in order. The environment variable takes a comma-separated
    /// list. Defaults to all of them.
    pub fn algorithms(&self) -> Result<Vec<Algorithm>, Fail> {
        if let Some(list) = Self::get_typed_env_option::<String>(simulation_config::ALGORITHMS)? {
            return list.split(',').map(str::parse).collect();
        }
        match self.get_simulation_config()? {
            Some(section) if Self::has_option(section, simulation_config::ALGORITHMS) => {
                Self::get_str_list_option(section, simulation_config::ALGORITHMS)?
                    .iter()
                    .map(|name| name.parse())
                    .collect()
            },
            _ => Ok(Algorithm::ALL.to_vec()),
        }
    }

    /// Simulation config: Reads the round robin time quantum.
    pub fn time_quantum(&self) -> Result<usize, Fail> {
        Self::get_int_option_or(
            self.get_simulation_config()?,
            simulation_config::TIME_QUANTUM,
            DEFAULT_TIME_QUANTUM,
        )
    }

    /// Simulation config: Reads the aging factor of dynamic priority scheduling.
    pub fn aging_factor(&self) -> Result<usize, Fail> {
        Self::get_int_option_or(
            self.get_simulation_config()?,
            simulation_config::AGING_FACTOR,
            DEFAULT_AGING_FACTOR,
        )
    }

    pub fn context_switch_overhead(&self) -> Result<usize, Fail> {
        Self::get_int_option_or(self.get_simulation_config()?, simulation_config::CONTEXT_SWITCH_OVERHEAD, 0)
    }

    /// Simulation config: Reads the time horizon, if any.
    pub fn max_time(&self) -> Result<Option<usize>, Fail> {
        if let Some(max_time) = Self::get_typed_env_option(simulation_config::MAX_TIME)? {
            return Ok(Some(max_time));
        }
        match self.get_simulation_config()? {
            Some(section) if Self::has_option(section, simulation_config::MAX_TIME) => {
                Ok(Some(Self::get_int_option(section, simulation_config::MAX_TIME)?))
            },
            _ => Ok(None),
        }
    }

    pub fn periodic(&self) -> Result<bool, Fail> {
        if let Some(periodic) = Self::get_typed_env_option(simulation_config::PERIODIC)? {
            return Ok(periodic);
        }
        match self.get_simulation_config()? {
            Some(section) if Self::has_option(section, simulation_config::PERIODIC) => {
                Self::get_bool_option(section, simulation_config::PERIODIC)
            },
            _ => Ok(false),
        }
    }

    /// Simulation config: Reads all scheduling options at once.
    pub fn scheduler_options(&self) -> Result<SchedulerOptions, Fail> {
        Ok(SchedulerOptions {
            time_quantum: self.time_quantum()?,
            aging_factor: self.aging_factor()?,
            context_switch_overhead: self.context_switch_overhead()?,
            max_time: self.max_time()?,
            periodic: self.periodic()?,
        })
    }

    /// Sync config: Reads the deadlock handling strategy.
    pub fn strategy(&self) -> Result<DeadlockStrategy, Fail> {
        if let Some(strategy) = Self::get_typed_env_option::<String>(sync_config::STRATEGY)? {
            return strategy.parse();
        }
        match self.get_sync_config()? {
            Some(section) if Self::has_option(section, sync_config::STRATEGY) => {
                Self::get_typed_str_option(section, sync_config::STRATEGY, |val: &str| val.parse().ok())
            },
            _ => Ok(DeadlockStrategy::default()),
        }
    }

    /// Sync config: Reads the names of the resources to register, in id order. This cannot be passed in as an
    /// environment variable.
    pub fn resources(&self) -> Result<Vec<String>, Fail> {
        match self.get_sync_config()? {
            Some(section) if Self::has_option(section, sync_config::RESOURCES) => {
                Self::get_str_list_option(section, sync_config::RESOURCES)
            },
            _ => Ok(Vec::new()),
        }
    }

    /// Workload config: Reads the path of the workload file, if any.
    pub fn input(&self) -> Result<Option<PathBuf>, Fail> {
        if let Some(input) = Self::get_typed_env_option::<String>(workload_config::INPUT)? {
            return Ok(Some(PathBuf::from(input)));
        }
        match self.get_workload_config()? {
            Some(section) if Self::has_option(section, workload_config::INPUT) => Ok(Some(
                Self::get_typed_str_option(section, workload_config::INPUT, |val: &str| Some(PathBuf::from(val)))?,
            )),
            _ => Ok(None),
        }
    }

    /// Workload config: Reads the parameters of the random generator.
    pub fn workload_options(&self) -> Result<WorkloadOptions, Fail> {
        let section: Option<&Yaml> = self.get_workload_config()?;
        let defaults: WorkloadOptions = WorkloadOptions::default();
        let kind: WorkloadKind = if let Some(kind) = Self::get_typed_env_option::<String>(workload_config::KIND)? {
            kind.parse()?
        } else {
            match section {
                Some(section) if Self::has_option(section, workload_config::KIND) => {
                    Self::get_typed_str_option(section, workload_config::KIND, |val: &str| val.parse().ok())?
                },
                _ => defaults.kind,
            }
        };
        Ok(WorkloadOptions {
            seed: Self::get_int_option_or(section, workload_config::SEED, defaults.seed)?,
            processes: Self::get_int_option_or(section, workload_config::PROCESSES, defaults.processes)?,
            max_arrival_time: Self::get_int_option_or(
                section,
                workload_config::MAX_ARRIVAL_TIME,
                defaults.max_arrival_time,
            )?,
            max_cpu_burst: Self::get_int_option_or(section, workload_config::MAX_CPU_BURST, defaults.max_cpu_burst)?,
            max_io_burst: Self::get_int_option_or(section, workload_config::MAX_IO_BURST, defaults.max_io_burst)?,
            max_priority: Self::get_int_option_or(section, workload_config::MAX_PRIORITY, defaults.max_priority)?,
            kind,
            realtime_processes: Self::get_int_option_or(
                section,
                workload_config::REALTIME_PROCESSES,
                defaults.realtime_processes,
            )?,
            max_period: Self::get_int_option_or(section, workload_config::MAX_PERIOD, defaults.max_period)?,
        })
    }

    //==================================================================================================================
    // Static Functions
    //==================================================================================================================

    /// Like `get_subsection`, but a missing section is not an error.
    fn get_optional_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<Option<&'a Yaml>, Fail> {
        if Self::has_option(yaml, index) {
            Ok(Some(Self::get_subsection(yaml, index)?))
        } else {
            Ok(None)
        }
    }

    /// Similar to `get_typed_option` using `Yaml::as_hash` receiver. This method returns a `&Yaml` instead of
    /// yaml::Hash, and Yaml is more natural for indexing.
    fn get_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        let section: &'a Yaml = Self::get_option(yaml, index)?;
        match section {
            Yaml::Hash(_) => Ok(section),
            _ => {
                let message: String = format!("parameter \"{}\" has unexpected type", index);
                error!("get_subsection(): {}", message);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    fn has_option(yaml: &Yaml, index: &str) -> bool {
        !matches!(yaml.index(index), Yaml::BadValue)
    }

    /// Index `yaml` to find the value at `index`, validating that the index exists.
    fn get_option<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        match yaml.index(index) {
            Yaml::BadValue => {
                let message: String = format!("missing configuration option \"{}\"", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
            value => Ok(value),
        }
    }

    /// Index `yaml` to find the value at `index`, validating that it exists and that the receiver returns Some(_).
    fn get_typed_option<'a, T, Fn>(yaml: &'a Yaml, index: &str, receiver: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&'a Yaml) -> Option<T>,
    {
        let option: &'a Yaml = Self::get_option(yaml, index)?;
        match receiver(option) {
            Some(value) => Ok(value),
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                error!("get_typed_option(): {}", message);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find value at `index`, validating it as a string.
    fn get_typed_str_option<T, Fn>(yaml: &Yaml, index: &str, parser: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&str) -> Option<T>,
    {
        let option: &Yaml = Self::get_option(yaml, index)?;
        if let Some(value) = option.as_str() {
            if let Some(value) = parser(value) {
                return Ok(value);
            }
        }
        let message: String = format!("parameter {} has unexpected type", index);
        error!("get_typed_str_option(): {}", message);
        Err(Fail::new(libc::EINVAL, message.as_str()))
    }

    /// Index `yaml` to find a list of strings at `index`.
    fn get_str_list_option(yaml: &Yaml, index: &str) -> Result<Vec<String>, Fail> {
        let items: &Vec<Yaml> = Self::get_typed_option(yaml, index, |yaml: &Yaml| match yaml {
            Yaml::Array(ref arr) => Some(arr),
            _ => None,
        })?;
        let mut result: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(string) => result.push(string.to_string()),
                None => {
                    let cause: String = format!("non string item in {}", index);
                    error!("get_str_list_option(): {}", cause);
                    return Err(Fail::new(libc::EINVAL, &cause));
                },
            }
        }
        Ok(result)
    }

    /// Get value where the environment value overrides the config file if it exists.
    fn get_typed_env_option<T: FromStr>(index: &str) -> Result<Option<T>, Fail> {
        // Check for the environment variable.
        if let Ok(var) = ::std::env::var(index.to_uppercase()) {
            if let Ok(value) = var.as_str().parse() {
                return Ok(Some(value));
            } else {
                let message: String = format!("parameter {} has unexpected type", index);
                error!("get_typed_env_option(): {}", message);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            }
        }
        Ok(None)
    }

    /// Similar to `get_typed_option` using `Yaml::as_i64` as the receiver, but additionally verifies that the
    /// destination type may hold the i64 value.
    fn get_int_option<T: TryFrom<i64>>(yaml: &Yaml, index: &str) -> Result<T, Fail> {
        let val: i64 = Self::get_typed_option(yaml, index, &Yaml::as_i64)?;
        match T::try_from(val) {
            Ok(val) => Ok(val),
            _ => {
                let message: String = format!("parameter \"{}\" is out of range", index);
                error!("get_int_option(): {}", message);
                Err(Fail::new(libc::ERANGE, message.as_str()))
            },
        }
    }

    /// Reads an integer from the environment first, then from `section`, then falls back to `default`.
    fn get_int_option_or<T: TryFrom<i64> + FromStr>(section: Option<&Yaml>, index: &str, default: T) -> Result<T, Fail> {
        if let Some(value) = Self::get_typed_env_option(index)? {
            return Ok(value);
        }
        match section {
            Some(section) if Self::has_option(section, index) => Self::get_int_option(section, index),
            _ => Ok(default),
        }
    }

    /// Same as `Self::get_typed_option` using `Yaml::as_bool` as the receiver.
    fn get_bool_option(yaml: &Yaml, index: &str) -> Result<bool, Fail> {
        Self::get_typed_option(yaml, index, &Yaml::as_bool)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for Config {
    fn default() -> Self {
        Self(Yaml::Hash(Hash::new()))
    }
}

impl FromStr for Config {
    type Err = Fail;

    /// Parses a configuration from a YAML document. An empty document yields the default configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Vec<Yaml> = match YamlLoader::load_from_str(s) {
            Ok(config) => config,
            Err(e) => {
                let e: Fail = Fail::from(e);
                error!("from_str(): {}", e.cause);
                return Err(e);
            },
        };
        match &config[..] {
            [] => Ok(Self::default()),
            [Yaml::Hash(_)] => Ok(Self(config[0].clone())),
            _ => Err(Fail::new(libc::EINVAL, "Wrong number of config objects")),
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
