// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::process::Pid;
use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A maximal interval `[start, end)` during which one process held the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GanttSegment {
    pub pid: Pid,
    pub start: usize,
    pub end: usize,
}

/// Execution timeline. At most one segment is open at a time.
#[derive(Debug, Default)]
pub struct GanttChart {
    segments: Vec<GanttSegment>,
    open: Option<(Pid, usize)>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl GanttSegment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl GanttChart {
    /// Opens a segment for `pid` at `start`, closing the current one there if needed.
    pub fn open(&mut self, pid: Pid, start: usize) {
        if self.open.is_some() {
            warn!("open(): segment still open at t={}", start);
            self.close(start);
        }
        self.open = Some((pid, start));
    }

    /// Closes the open segment at `end`. Empty segments are dropped.
    pub fn close(&mut self, end: usize) -> Option<GanttSegment> {
        let (pid, start) = self.open.take()?;
        let segment: GanttSegment = GanttSegment { pid, start, end };
        if segment.is_empty() {
            return None;
        }
        self.segments.push(segment);
        Some(segment)
    }

    pub fn into_segments(self) -> Vec<GanttSegment> {
        self.segments
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for GanttSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}-{}]", self.pid, self.start, self.end)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
