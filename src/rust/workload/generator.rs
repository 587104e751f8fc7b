// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        Burst,
        Pid,
        Process,
    },
    runtime::fail::Fail,
};
use ::rand::{
    prelude::SmallRng,
    Rng,
    SeedableRng,
};
use ::std::{
    fmt,
    ops::RangeInclusive,
    str::FromStr,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Maximum number of I/O and CPU burst pairs appended after the first CPU burst.
const MAX_IO_PAIRS: usize = 5;
/// First pid handed out to real-time processes.
const FIRST_REALTIME_PID: u32 = 101;
/// Real-time processes arrive within this many ticks of the start of the run.
const MAX_REALTIME_ARRIVAL: usize = 10;
const MIN_PERIOD: usize = 10;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Shape of the burst patterns drawn for non-real-time processes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkloadKind {
    /// Long CPU bursts, seldom interrupted by short I/O.
    Cpu,
    /// Short CPU bursts between frequent long I/O.
    Io,
    #[default]
    Mixed,
}

/// Parameters of a random workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadOptions {
    pub seed: u64,
    pub processes: usize,
    pub max_arrival_time: usize,
    pub max_cpu_burst: usize,
    pub max_io_burst: usize,
    pub max_priority: i64,
    pub kind: WorkloadKind,
    pub realtime_processes: usize,
    pub max_period: usize,
}

/// Deterministic random workload generator.
pub struct WorkloadGenerator {
    options: WorkloadOptions,
    rng: SmallRng,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl WorkloadKind {
    /// Probability of appending one more I/O and CPU burst pair.
    pub fn io_probability(&self) -> f64 {
        match self {
            WorkloadKind::Cpu => 0.2,
            WorkloadKind::Mixed => 0.5,
            WorkloadKind::Io => 0.8,
        }
    }

    fn cpu_range(&self, max: usize) -> RangeInclusive<usize> {
        match self {
            WorkloadKind::Cpu => upper_half(max),
            WorkloadKind::Io => lower_half(max),
            WorkloadKind::Mixed => 1..=max,
        }
    }

    fn io_range(&self, max: usize) -> RangeInclusive<usize> {
        match self {
            WorkloadKind::Cpu => lower_half(max),
            WorkloadKind::Io => upper_half(max),
            WorkloadKind::Mixed => 1..=max,
        }
    }
}

fn lower_half(max: usize) -> RangeInclusive<usize> {
    1..=(max / 2).max(1)
}

fn upper_half(max: usize) -> RangeInclusive<usize> {
    (max / 2).max(1)..=max
}

impl WorkloadOptions {
    fn validate(&self) -> Result<(), Fail> {
        let bad: Option<&str> = if self.max_cpu_burst == 0 {
            Some("max_cpu_burst")
        } else if self.max_io_burst == 0 {
            Some("max_io_burst")
        } else if self.max_priority < 1 {
            Some("max_priority")
        } else if self.max_period < MIN_PERIOD {
            Some("max_period")
        } else {
            None
        };
        match bad {
            Some(name) => {
                let cause: String = format!("workload parameter {} is out of range", name);
                error!("validate(): {}", cause);
                Err(Fail::new(libc::ERANGE, &cause))
            },
            None => Ok(()),
        }
    }
}

impl WorkloadGenerator {
    pub fn new(options: WorkloadOptions) -> Result<Self, Fail> {
        options.validate()?;
        let rng: SmallRng = SmallRng::seed_from_u64(options.seed);
        Ok(Self { options, rng })
    }

    pub fn options(&self) -> &WorkloadOptions {
        &self.options
    }

    /// Draws the non-real-time processes, with pids `1..=processes`.
    pub fn generate(&mut self) -> Vec<Process> {
        let mut processes: Vec<Process> = Vec::with_capacity(self.options.processes);
        for i in 0..self.options.processes {
            let pid: u32 = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let arrival_time: usize = self.rng.gen_range(0..=self.options.max_arrival_time);
            let priority: i64 = self.rng.gen_range(1..=self.options.max_priority);
            let bursts: Vec<Burst> = self.draw_bursts();
            trace!("generate(): P{} arrives at {} with {}", pid, arrival_time, Burst::format_pattern(&bursts));
            processes.push(Process::new(Pid::new(pid), arrival_time, priority, bursts, 0, 0));
        }
        debug!("generate(): {} processes", processes.len());
        processes
    }

    /// Draws the real-time processes: a single CPU burst, a period and an equal relative deadline each.
    pub fn generate_realtime(&mut self) -> Vec<Process> {
        let mut processes: Vec<Process> = Vec::with_capacity(self.options.realtime_processes);
        for i in 0..self.options.realtime_processes {
            let pid: u32 = FIRST_REALTIME_PID.saturating_add(u32::try_from(i).unwrap_or(u32::MAX));
            let arrival_time: usize = self.rng.gen_range(0..=MAX_REALTIME_ARRIVAL);
            let period: usize = self.rng.gen_range(MIN_PERIOD..=self.options.max_period);
            let cpu: usize = self.rng.gen_range(2..=(period / 3).max(3));
            trace!("generate_realtime(): P{} arrives at {} with period {}", pid, arrival_time, period);
            processes.push(Process::new(
                Pid::new(pid),
                arrival_time,
                0,
                vec![Burst::Cpu(cpu)],
                period,
                period,
            ));
        }
        debug!("generate_realtime(): {} processes", processes.len());
        processes
    }

    /// Draws both the non-real-time and the real-time processes.
    pub fn generate_all(&mut self) -> Vec<Process> {
        let mut processes: Vec<Process> = self.generate();
        processes.extend(self.generate_realtime());
        processes
    }

    fn draw_bursts(&mut self) -> Vec<Burst> {
        let kind: WorkloadKind = self.options.kind;
        let cpu_range: RangeInclusive<usize> = kind.cpu_range(self.options.max_cpu_burst);
        let io_range: RangeInclusive<usize> = kind.io_range(self.options.max_io_burst);

        let mut bursts: Vec<Burst> = vec![Burst::Cpu(self.rng.gen_range(cpu_range.clone()))];
        let mut pairs: usize = 0;
        while pairs < MAX_IO_PAIRS && self.rng.gen_bool(kind.io_probability()) {
            bursts.push(Burst::Io(self.rng.gen_range(io_range.clone())));
            bursts.push(Burst::Cpu(self.rng.gen_range(cpu_range.clone())));
            pairs += 1;
        }
        bursts
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for WorkloadOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            processes: 10,
            max_arrival_time: 50,
            max_cpu_burst: 20,
            max_io_burst: 30,
            max_priority: 5,
            kind: WorkloadKind::Mixed,
            realtime_processes: 4,
            max_period: 50,
        }
    }
}

impl FromStr for WorkloadKind {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" | "cpu-bound" => Ok(WorkloadKind::Cpu),
            "io" | "io-bound" => Ok(WorkloadKind::Io),
            "mixed" => Ok(WorkloadKind::Mixed),
            _ => {
                let cause: String = format!("unknown workload kind {:?}", s);
                error!("from_str(): {}", cause);
                Err(Fail::new(libc::EINVAL, &cause))
            },
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            WorkloadKind::Cpu => "cpu",
            WorkloadKind::Io => "io",
            WorkloadKind::Mixed => "mixed",
        };
        write!(f, "{}", name)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
