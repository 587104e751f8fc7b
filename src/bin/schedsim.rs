// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::clap::{
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use ::schedsim::{
    runtime::logging,
    simulation::{
        self,
        Config,
    },
    workload::{
        self,
        WorkloadGenerator,
        WorkloadOptions,
    },
    Algorithm,
    DeadlockStrategy,
    Process,
    Report,
    SchedulerOptions,
    Simulation,
};
use ::std::path::PathBuf;

//======================================================================================================================
// Program Arguments
//======================================================================================================================

/// Program Arguments
#[derive(Debug, Default)]
pub struct ProgramArguments {
    /// Configuration file.
    config: Option<String>,
    /// Workload file.
    input: Option<PathBuf>,
    /// File where a generated workload is saved.
    save: Option<PathBuf>,
    algorithms: Vec<Algorithm>,
    quantum: Option<usize>,
    aging_factor: Option<usize>,
    overhead: Option<usize>,
    max_time: Option<usize>,
    periodic: bool,
    strategy: Option<DeadlockStrategy>,
    resources: Vec<String>,
    seed: Option<u64>,
    processes: Option<usize>,
}

/// Associate functions for Program Arguments
impl ProgramArguments {
    /// Parses the program arguments from the command line interface.
    pub fn new(app_name: &'static str, app_author: &'static str, app_about: &'static str) -> Result<Self> {
        let matches: ArgMatches = Command::new(app_name)
            .author(app_author)
            .about(app_about)
            .arg(
                Arg::new("config")
                    .long("config")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("FILE")
                    .help("Sets the YAML configuration file"),
            )
            .arg(
                Arg::new("input")
                    .long("input")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("FILE")
                    .help("Reads the workload from a file instead of generating one"),
            )
            .arg(
                Arg::new("save")
                    .long("save")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("FILE")
                    .help("Saves the workload in the input file format"),
            )
            .arg(
                Arg::new("algorithm")
                    .long("algorithm")
                    .value_parser(clap::value_parser!(String))
                    .action(ArgAction::Append)
                    .value_delimiter(',')
                    .required(false)
                    .value_name("NAME")
                    .help("Runs the given algorithms (fcfs, rr, sjf, priority, dynamic, mlfq, rm, edf)"),
            )
            .arg(
                Arg::new("quantum")
                    .long("quantum")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("TICKS")
                    .help("Sets the round robin time quantum"),
            )
            .arg(
                Arg::new("aging-factor")
                    .long("aging-factor")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("TICKS")
                    .help("Sets the aging factor of dynamic priority scheduling"),
            )
            .arg(
                Arg::new("overhead")
                    .long("overhead")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("TICKS")
                    .help("Sets the context switch overhead"),
            )
            .arg(
                Arg::new("max-time")
                    .long("max-time")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("TICKS")
                    .help("Stops the simulation at the given tick"),
            )
            .arg(
                Arg::new("periodic")
                    .long("periodic")
                    .action(ArgAction::SetTrue)
                    .help("Releases a new job of every periodic process each period"),
            )
            .arg(
                Arg::new("strategy")
                    .long("strategy")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("STRATEGY")
                    .help("Sets the deadlock strategy (prevention, avoidance, detection)"),
            )
            .arg(
                Arg::new("resources")
                    .long("resources")
                    .value_parser(clap::value_parser!(String))
                    .action(ArgAction::Append)
                    .value_delimiter(',')
                    .required(false)
                    .value_name("NAME")
                    .help("Registers the given resources, in id order"),
            )
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_parser(clap::value_parser!(u64))
                    .required(false)
                    .value_name("SEED")
                    .help("Seeds the workload generator"),
            )
            .arg(
                Arg::new("processes")
                    .long("processes")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("COUNT")
                    .help("Sets the number of generated processes"),
            )
            .get_matches();

        let mut args: ProgramArguments = ProgramArguments::default();
        args.config = matches.get_one::<String>("config").cloned();
        args.input = matches.get_one::<String>("input").map(PathBuf::from);
        args.save = matches.get_one::<String>("save").map(PathBuf::from);
        if let Some(names) = matches.get_many::<String>("algorithm") {
            for name in names {
                args.algorithms.push(name.parse()?);
            }
        }
        args.quantum = matches.get_one::<usize>("quantum").copied();
        args.aging_factor = matches.get_one::<usize>("aging-factor").copied();
        args.overhead = matches.get_one::<usize>("overhead").copied();
        args.max_time = matches.get_one::<usize>("max-time").copied();
        args.periodic = matches.get_flag("periodic");
        if let Some(strategy) = matches.get_one::<String>("strategy") {
            args.strategy = Some(strategy.parse()?);
        }
        if let Some(names) = matches.get_many::<String>("resources") {
            args.resources = names.cloned().collect();
        }
        args.seed = matches.get_one::<u64>("seed").copied();
        args.processes = matches.get_one::<usize>("processes").copied();

        Ok(args)
    }

    /// Scheduling options from the configuration, overridden by the command line.
    fn scheduler_options(&self, config: &Config) -> Result<SchedulerOptions> {
        let mut options: SchedulerOptions = config.scheduler_options()?;
        options.time_quantum = self.quantum.unwrap_or(options.time_quantum);
        options.aging_factor = self.aging_factor.unwrap_or(options.aging_factor);
        options.context_switch_overhead = self.overhead.unwrap_or(options.context_switch_overhead);
        options.max_time = self.max_time.or(options.max_time);
        options.periodic = self.periodic || options.periodic;
        Ok(options)
    }

    /// Workload from the command line input, the configured input or the generator, in that order.
    fn workload(&self, config: &Config) -> Result<Vec<Process>> {
        if let Some(input) = &self.input {
            return Ok(::schedsim::process::parse_workload_file(input)?);
        }
        if self.seed.is_none() && self.processes.is_none() {
            return Ok(simulation::load_workload(config)?);
        }
        let mut options: WorkloadOptions = config.workload_options()?;
        options.seed = self.seed.unwrap_or(options.seed);
        options.processes = self.processes.unwrap_or(options.processes);
        Ok(WorkloadGenerator::new(options)?.generate_all())
    }
}

//======================================================================================================================
// Main
//======================================================================================================================

fn main() -> Result<()> {
    logging::initialize();

    let args: ProgramArguments = ProgramArguments::new(
        "schedsim",
        "Microsoft Corporation",
        "Simulates CPU scheduling algorithms over a workload of processes.",
    )?;

    let config: Config = match &args.config {
        Some(path) => Config::new(path)?,
        None => Config::default(),
    };

    let processes: Vec<Process> = args.workload(&config)?;
    if processes.is_empty() {
        anyhow::bail!("workload is empty");
    }
    if let Some(path) = &args.save {
        workload::save_workload_file(path, &processes)?;
    }

    let strategy: DeadlockStrategy = match args.strategy {
        Some(strategy) => strategy,
        None => config.strategy()?,
    };
    let mut resources: Vec<String> = if args.resources.is_empty() {
        config.resources()?
    } else {
        args.resources.clone()
    };
    if resources.is_empty() {
        resources = simulation::referenced_resources(&processes);
    }
    let algorithms: Vec<Algorithm> = if args.algorithms.is_empty() {
        config.algorithms()?
    } else {
        args.algorithms.clone()
    };

    let simulation: Simulation =
        Simulation::new(args.scheduler_options(&config)?, strategy, resources)?.with_algorithms(algorithms);
    for algorithm in simulation.algorithms() {
        let report: Report = simulation.run(*algorithm, &processes)?;
        println!("{}", report);
    }

    Ok(())
}
