// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Error value of the simulator.
//!
//! Codes follow errno conventions: `EINVAL` for malformed input, `ENOENT` for missing files, processes and
//! resources, `ERANGE` for out-of-range parameters and `EIO` for write failures.

//==============================================================================
// Imports
//==============================================================================

use ::libc::{
    c_int,
    EINVAL,
    EIO,
};
use ::std::{
    error,
    fmt,
    io,
    num::ParseIntError,
};

//==============================================================================
// Structures
//==============================================================================

/// Failure
#[derive(Clone, PartialEq, Eq)]
pub struct Fail {
    /// Error code.
    pub errno: c_int,
    /// Cause.
    pub cause: String,
}

//==============================================================================
// Associate Functions
//==============================================================================

impl Fail {
    pub fn new(errno: c_int, cause: &str) -> Self {
        Self {
            errno,
            cause: cause.to_string(),
        }
    }

    /// Prefixes the cause with `context`, keeping the error code.
    pub fn context(self, context: &str) -> Self {
        Self {
            errno: self.errno,
            cause: format!("{}: {}", context, self.cause),
        }
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

impl fmt::Display for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {:?}: {:?}", self.errno, self.cause)
    }
}

impl fmt::Debug for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {:?}: {:?}", self.errno, self.cause)
    }
}

impl error::Error for Fail {}

impl From<io::Error> for Fail {
    fn from(e: io::Error) -> Self {
        Self {
            errno: EIO,
            cause: format!("I/O error: {}", e),
        }
    }
}

/// Numeric fields of workload lines and burst tokens.
impl From<ParseIntError> for Fail {
    fn from(e: ParseIntError) -> Self {
        Self {
            errno: EINVAL,
            cause: format!("invalid integer: {}", e),
        }
    }
}

impl From<::regex::Error> for Fail {
    fn from(e: ::regex::Error) -> Self {
        Self {
            errno: EINVAL,
            cause: format!("invalid pattern: {}", e),
        }
    }
}

impl From<::yaml_rust::ScanError> for Fail {
    fn from(e: ::yaml_rust::ScanError) -> Self {
        Self {
            errno: EINVAL,
            cause: format!("malformed configuration: {}", e),
        }
    }
}

//==============================================================================
// Unit Tests
//==============================================================================
