#![warn(missing_docs)]
//! Deterministic testing surfaces for the simulator: scripted collaborators,
//! distribution checks and JSON run logs.

mod collaborators;
mod metrics;
mod stats;

use anyhow::Result;
use quarrysim_core::SimTick;
use quarrysim_sim::SimulationMode;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use collaborators::*;
pub use metrics::*;
pub use stats::*;

/// One simulated operation as captured by headless tests.
#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    /// Tick at which the operation ran.
    pub tick: SimTick,
    /// Mode the operation ran in.
    pub mode: SimulationMode,
    /// Zone identifier.
    pub zone: &'a str,
    /// Distinct stacks produced after merging.
    pub stacks: usize,
    /// Total item count across those stacks.
    pub items: u64,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append a record to the log.
    pub fn write(&mut self, record: &RunRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
