// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::std::{
    fmt,
    str::FromStr,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// One atomic unit of work in the execution pattern of a process.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Burst {
    /// Compute for the given number of ticks.
    Cpu(usize),
    /// Block on I/O for the given number of ticks.
    Io(usize),
    /// Acquire the named resource.
    Lock(String),
    /// Release the named resource.
    Unlock(String),
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Burst {
    /// Parses a comma-separated burst pattern such as `CPU:5,IO:10,LOCK:R1`. Malformed tokens are logged and
    /// skipped, so the returned pattern holds only the well-formed ones.
    pub fn parse_pattern(pattern: &str) -> Vec<Burst> {
        let mut bursts: Vec<Burst> = Vec::new();
        for token in pattern.split(',') {
            let token: &str = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<Burst>() {
                Ok(burst) => bursts.push(burst),
                Err(e) => warn!("parse_pattern(): skipping burst {:?} ({})", token, e.cause),
            }
        }
        bursts
    }

    /// Formats a burst pattern back into its comma-separated text form.
    pub fn format_pattern(bursts: &[Burst]) -> String {
        bursts.iter().map(Burst::to_string).collect::<Vec<String>>().join(",")
    }

    /// Checks whether this burst is resolved without consuming CPU ticks.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Burst::Lock(_) | Burst::Unlock(_))
    }

    /// Returns the CPU time demanded by this burst.
    pub fn cpu_time(&self) -> usize {
        match self {
            Burst::Cpu(duration) => *duration,
            _ => 0,
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for Burst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Burst::Cpu(duration) => write!(f, "CPU:{}", duration),
            Burst::Io(duration) => write!(f, "IO:{}", duration),
            Burst::Lock(name) => write!(f, "LOCK:{}", name),
            Burst::Unlock(name) => write!(f, "UNLOCK:{}", name),
        }
    }
}

impl FromStr for Burst {
    type Err = Fail;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (command, value): (&str, &str) = match token.split_once(':') {
            Some((command, value)) => (command.trim(), value.trim()),
            None => {
                let cause: String = format!("missing ':' in burst token {:?}", token);
                return Err(Fail::new(libc::EINVAL, &cause));
            },
        };

        match command.to_uppercase().as_str() {
            "CPU" => Ok(Burst::Cpu(value.parse::<usize>()?)),
            "IO" => Ok(Burst::Io(value.parse::<usize>()?)),
            "LOCK" | "UNLOCK" if value.is_empty() => {
                let cause: String = format!("missing resource name in burst token {:?}", token);
                Err(Fail::new(libc::EINVAL, &cause))
            },
            "LOCK" => Ok(Burst::Lock(value.to_string())),
            "UNLOCK" => Ok(Burst::Unlock(value.to_string())),
            _ => {
                let cause: String = format!("unknown burst command {:?}", command);
                Err(Fail::new(libc::EINVAL, &cause))
            },
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
