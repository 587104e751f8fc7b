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

/// Policy applied by the [crate::sync::ResourceManager] to keep or get the simulation out of deadlock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeadlockStrategy {
    /// Resources must be acquired in increasing id order; violators are terminated.
    Prevention,
    /// Contested requests that would close a wait-for cycle are denied and deferred.
    Avoidance,
    /// Requests are granted optimistically; cycles are broken by terminating a victim.
    #[default]
    Detection,
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl FromStr for DeadlockStrategy {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prevention" => Ok(DeadlockStrategy::Prevention),
            "avoidance" => Ok(DeadlockStrategy::Avoidance),
            "detection" => Ok(DeadlockStrategy::Detection),
            _ => {
                let cause: String = format!("unknown deadlock strategy {:?}", s);
                error!("from_str(): {}", cause);
                Err(Fail::new(libc::EINVAL, &cause))
            },
        }
    }
}

impl fmt::Display for DeadlockStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            DeadlockStrategy::Prevention => "prevention",
            DeadlockStrategy::Avoidance => "avoidance",
            DeadlockStrategy::Detection => "detection",
        };
        write!(f, "{}", name)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::DeadlockStrategy;
    use ::anyhow::Result;

    #[test]
    fn test_parse_strategy() -> Result<()> {
        crate::ensure_eq!("prevention".parse::<DeadlockStrategy>()?, DeadlockStrategy::Prevention);
        crate::ensure_eq!(" Avoidance ".parse::<DeadlockStrategy>()?, DeadlockStrategy::Avoidance);
        crate::ensure_eq!("DETECTION".parse::<DeadlockStrategy>()?, DeadlockStrategy::Detection);
        crate::ensure_eq!("ostrich".parse::<DeadlockStrategy>().is_err(), true);
        crate::ensure_eq!(DeadlockStrategy::default(), DeadlockStrategy::Detection);
        Ok(())
    }
}
