// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Parser for the line-oriented workload format:
//!
//! ```text
//! # pid,arrival,priority,"burst_pattern",period,deadline
//! 1,0,3,"CPU:5,IO:10,LOCK:R1,CPU:2,UNLOCK:R1",0,0
//! ```

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
use ::regex::Regex;
use ::std::{
    collections::HashSet,
    fs,
    path::Path,
    sync::OnceLock,
};

//======================================================================================================================
// Constants
//======================================================================================================================

const LINE_PATTERN: &str = r#"^(\d+),(\d+),(\d+),"([^"]+)",(\d+),(\d+)$"#;

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Parses every well-formed process line of `text`. Comment lines, blank lines and malformed lines are skipped, and
/// so is any line reusing the pid of an earlier one.
pub fn parse_workload(text: &str) -> Vec<Process> {
    let mut processes: Vec<Process> = Vec::new();
    let mut pids: HashSet<Pid> = HashSet::new();
    for (lineno, line) in text.lines().enumerate() {
        let line: &str = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Ok(process) if !pids.insert(process.pid()) => {
                warn!("parse_workload(): skipping line {} (duplicate pid {})", lineno + 1, process.pid())
            },
            Ok(process) => processes.push(process),
            Err(e) => warn!("parse_workload(): skipping line {} ({})", lineno + 1, e.cause),
        }
    }
    processes
}

/// Reads and parses a workload file.
pub fn parse_workload_file<P: AsRef<Path>>(path: P) -> Result<Vec<Process>, Fail> {
    let text: String = match fs::read_to_string(path.as_ref()) {
        Ok(text) => text,
        Err(e) => {
            let cause: String = format!("cannot read workload file {:?}: {}", path.as_ref(), e);
            error!("parse_workload_file(): {}", cause);
            return Err(Fail::new(libc::ENOENT, &cause));
        },
    };
    Ok(parse_workload(&text))
}

/// Parses a single non-comment line.
fn parse_line(line: &str) -> Result<Process, Fail> {
    let captures: regex::Captures = match line_regex()?.captures(line) {
        Some(captures) => captures,
        None => {
            let cause: String = format!("line does not match the workload format: {:?}", line);
            return Err(Fail::new(libc::EINVAL, &cause));
        },
    };

    let pid: u32 = captures[1].parse()?;
    if pid == 0 {
        return Err(Fail::new(libc::EINVAL, "pid must be positive"));
    }
    let arrival: usize = captures[2].parse()?;
    let priority: i64 = captures[3].parse()?;
    let bursts: Vec<Burst> = Burst::parse_pattern(&captures[4]);
    let period: usize = captures[5].parse()?;
    let deadline: usize = captures[6].parse()?;

    Ok(Process::new(Pid::new(pid), arrival, priority, bursts, period, deadline))
}

fn line_regex() -> Result<&'static Regex, Fail> {
    static LINE_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    match LINE_REGEX.get_or_init(|| Regex::new(LINE_PATTERN)) {
        Ok(regex) => Ok(regex),
        Err(e) => Err(Fail::from(e.clone()).context("workload line")),
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
