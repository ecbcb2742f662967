//! Metrics reports for simulation runs, exported as JSON for CI artifacts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics report written by long-running simulation tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Overall test result
    pub result: TestResult,

    /// Throughput and counters of the simulated run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationMetrics>,

    /// Goodness-of-fit of a sampled distribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionMetrics>,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
}

/// Counters from a batch of simulated operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Operations simulated
    pub operations: u64,
    /// Virtual blocks mined
    pub blocks_mined: u64,
    /// Virtual monsters killed
    pub monsters_killed: u64,
    /// Loot generations
    pub loot_generations: u64,
    /// Items produced across all operations
    pub items_produced: u64,
}

/// Chi-square summary of a categorical sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionMetrics {
    /// Number of draws
    pub samples: u64,
    /// Chi-square statistic
    pub chi_square: f64,
    /// Degrees of freedom
    pub degrees_of_freedom: usize,
    /// Critical value the statistic was compared against
    pub critical_value: f64,
}

/// Builder for [`MetricsReport`]
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a report stamped with the current time
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                simulation: None,
                distribution: None,
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set simulation counters
    pub fn simulation(mut self, metrics: SimulationMetrics) -> Self {
        self.report.simulation = Some(metrics);
        self
    }

    /// Set distribution summary
    pub fn distribution(mut self, metrics: DistributionMetrics) -> Self {
        self.report.distribution = Some(metrics);
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
