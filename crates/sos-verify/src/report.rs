//! Report generation for verification runs

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::VerifyConfig;
use crate::metrics::ErrorMetrics;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Plain text report
    #[default]
    Text,
    /// JSON report
    Json,
}

/// One pass/fail gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyCheck {
    pub name: String,
    pub passed: bool,
    pub description: String,
}

impl VerifyCheck {
    pub fn new(name: impl Into<String>, passed: bool, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            description: description.into(),
        }
    }
}

/// Observed start-to-valid latency range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub expected: usize,
    pub min: usize,
    pub max: usize,
}

/// Result of one verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Report title
    pub title: String,

    /// Configuration the run used
    pub config: VerifyConfig,

    /// Error metrics against the reference
    pub metrics: ErrorMetrics,

    /// Latency seen on the validity pulses
    pub latency: LatencySummary,

    /// Clock cycles simulated
    pub cycles: usize,

    /// Individual gates
    pub checks: Vec<VerifyCheck>,

    /// All gates passed
    pub passed: bool,
}

impl VerifyReport {
    /// Assemble a report and evaluate the gates from `config`
    pub fn new(
        config: VerifyConfig,
        metrics: ErrorMetrics,
        latency: LatencySummary,
        cycles: usize,
    ) -> Self {
        let checks = vec![
            VerifyCheck::new(
                "nmse",
                metrics.nmse_db <= config.max_nmse_db,
                format!(
                    "NMSE {:.2} dB (limit {:.2} dB)",
                    metrics.nmse_db, config.max_nmse_db
                ),
            ),
            VerifyCheck::new(
                "peak_error",
                metrics.peak_error_percent <= config.max_peak_error_percent,
                format!(
                    "peak error {} LSB = {:.4}% (limit {:.4}%)",
                    metrics.peak_error, metrics.peak_error_percent, config.max_peak_error_percent
                ),
            ),
            VerifyCheck::new(
                "latency",
                latency.min == latency.expected && latency.max == latency.expected,
                format!(
                    "latency {}..={} cycles (expected {})",
                    latency.min, latency.max, latency.expected
                ),
            ),
        ];
        let passed = checks.iter().all(|c| c.passed);

        Self {
            title: format!("Looped SOS IIR verification: {}", config.filter),
            config,
            metrics,
            latency,
            cycles,
            checks,
            passed,
        }
    }

    /// Gates that failed
    pub fn failures(&self) -> impl Iterator<Item = &VerifyCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} NMSE={:.2} dB peak={:.4}% latency={} ({} samples)",
            if self.passed { "PASS" } else { "FAIL" },
            self.metrics.nmse_db,
            self.metrics.peak_error_percent,
            self.latency.max,
            self.metrics.samples
        )
    }

    /// Generate report in specified format
    pub fn generate(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => self.to_text(),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Save report to file
    pub fn save<P: AsRef<Path>>(&self, path: P, format: ReportFormat) -> std::io::Result<()> {
        let content = self.generate(format);
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())
    }

    fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.title));
        output.push_str(&format!("{}\n\n", "=".repeat(self.title.len())));

        output.push_str(&format!(
            "Cutoff: {:.1} Hz of {:.1} Hz | Stimulus: {} | Samples: {}\n",
            self.config.cutoff_hz(),
            self.config.sample_rate,
            self.config.stimulus,
            self.metrics.samples
        ));
        output.push_str(&format!(
            "Pacing: {} clocks/sample | Cycles: {}\n\n",
            self.config.clocks_per_sample(),
            self.cycles
        ));

        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            output.push_str(&format!("[{}] {}: {}\n", status, check.name, check.description));
        }

        output.push('\n');
        output.push_str(&format!("Result: {}\n", self.summary()));
        output
    }

    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}
