// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Workload sources and sinks: random generation and serialization back to the workload text format.

//======================================================================================================================
// Exports
//======================================================================================================================

mod generator;

pub use self::generator::{
    WorkloadGenerator,
    WorkloadKind,
    WorkloadOptions,
};

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    process::{
        Burst,
        Process,
    },
    runtime::fail::Fail,
};
use ::std::{
    fmt::Write as _,
    fs,
    path::Path,
};

//======================================================================================================================
// Constants
//======================================================================================================================

const HEADER: &str = "# pid,arrival,priority,\"burst_pattern\",period,deadline\n";

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Writes `processes` in the workload text format understood by [crate::process::parse_workload].
pub fn format_workload(processes: &[Process]) -> String {
    let mut text: String = String::from(HEADER);
    for process in processes {
        // Writing to a String cannot fail.
        let _ = writeln!(
            text,
            "{},{},{},\"{}\",{},{}",
            process.pid().get(),
            process.arrival_time(),
            process.static_priority().max(0),
            Burst::format_pattern(process.bursts()),
            process.period(),
            process.deadline()
        );
    }
    text
}

/// Saves `processes` to a workload file.
pub fn save_workload_file<P: AsRef<Path>>(path: P, processes: &[Process]) -> Result<(), Fail> {
    if let Err(e) = fs::write(path.as_ref(), format_workload(processes)) {
        let cause: String = format!("cannot write workload file {:?}: {}", path.as_ref(), e);
        error!("save_workload_file(): {}", cause);
        return Err(Fail::new(libc::EIO, &cause));
    }
    info!("save_workload_file(): wrote {} processes to {:?}", processes.len(), path.as_ref());
    Ok(())
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
