//! Instrumentation and reporting for benchmark runs.

use crate::config::WorkloadConfig;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::warn;

/// Timing of one insert round trip inside Seed or Create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTiming {
    /// 1-based batch number.
    pub number: u64,
    /// Total batches planned for the phase.
    pub of: u64,
    /// Zero-based record indices covered by the batch.
    pub range: Range<u64>,
    pub rows: u64,
    pub duration: Duration,
}

/// Outcome of a single phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub rows_affected: u64,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseResult {
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows_affected as f64 / secs
        } else {
            0.0
        }
    }

    pub fn is_failed(&self) -> bool { self.error.is_some() }
}

/// Collects phase timings for one run. Phases are sequential, so at most one
/// timer is active at a time.
#[derive(Debug, Default)]
pub struct TimingCollector {
    active: Option<ActiveTimer>,
    results: Vec<PhaseResult>,
}

#[derive(Debug)]
struct ActiveTimer {
    phase: Phase,
    start: Instant,
    batches: Vec<BatchTiming>,
}

impl TimingCollector {
    pub fn new() -> Self { Self::default() }

    /// Starts timing `phase`.
    pub fn mark(&mut self, phase: Phase) {
        if let Some(previous) = self.active.take() {
            warn!("TimingCollector.mark({}): {} was never stopped, discarding it", phase, previous.phase);
        }
        self.active = Some(ActiveTimer { phase, start: Instant::now(), batches: Vec::new() });
    }

    /// Attaches a batch timing to the active phase.
    pub fn record_batch(&mut self, batch: BatchTiming) {
        match self.active.as_mut() {
            Some(timer) => timer.batches.push(batch),
            None => warn!("TimingCollector.record_batch: no active phase"),
        }
    }

    /// Stops timing `phase` and records its result.
    pub fn stop(&mut self, phase: Phase, rows_affected: u64) -> Duration { self.finish_phase(phase, rows_affected, None) }

    /// Stops timing `phase`, recording the time spent up to the failure. Rows
    /// affected are those of the batches that completed before it.
    pub fn fail(&mut self, phase: Phase, error: impl fmt::Display) -> Duration {
        let rows_affected = self.active.as_ref().map(|timer| timer.batches.iter().map(|batch| batch.rows).sum()).unwrap_or(0);
        self.finish_phase(phase, rows_affected, Some(error.to_string()))
    }

    fn finish_phase(&mut self, phase: Phase, rows_affected: u64, error: Option<String>) -> Duration {
        let (duration, batches) = match self.active.take() {
            Some(timer) if timer.phase == phase => (timer.start.elapsed(), timer.batches),
            Some(timer) => {
                warn!("TimingCollector.stop({}): active phase is {}", phase, timer.phase);
                self.active = Some(timer);
                (Duration::ZERO, Vec::new())
            }
            None => {
                warn!("TimingCollector.stop({}): phase was never marked", phase);
                (Duration::ZERO, Vec::new())
            }
        };
        self.results.push(PhaseResult { phase, rows_affected, duration, batches, error });
        duration
    }

    pub fn results(&self) -> &[PhaseResult] { &self.results }

    /// Consumes the collector into a report for `strategy`.
    pub fn report(self, strategy: impl Into<String>, config: WorkloadConfig) -> Report {
        let total = self.results.iter().map(|result| result.duration).sum();
        Report { strategy: strategy.into(), config, phases: self.results, total }
    }
}

/// Timings for a whole run, in phase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub strategy: String,
    pub config: WorkloadConfig,
    pub phases: Vec<PhaseResult>,
    /// Sum of the recorded phase durations. Excludes connection setup.
    pub total: Duration,
}

impl Report {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseResult> { self.phases.iter().find(|result| result.phase == phase) }

    /// True when every phase ran and none failed.
    pub fn is_complete(&self) -> bool { self.phases.len() == Phase::ALL.len() && self.phases.iter().all(|result| !result.is_failed()) }

    fn label(&self, phase: Phase) -> String {
        match phase {
            Phase::Reset => "Reset".to_owned(),
            Phase::Seed => format!("Seed ({})", self.config.initial_count),
            Phase::ReadCount => "Read Count".to_owned(),
            Phase::Update => format!("Update ({})", self.config.update_count),
            Phase::Delete => format!("Delete ({})", self.config.delete_count),
            Phase::Create => format!("Create ({})", self.config.new_count),
            Phase::FinalReadCount => "Final Read".to_owned(),
        }
    }

    /// Renders the summary table.
    pub fn render(&self) -> String { self.to_string() }

    /// Prints the summary table to stdout.
    pub fn print_summary(&self) { println!("\n{}", self.render()); }

    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(70);
        writeln!(f, "{rule}")?;
        writeln!(f, "{} PERFORMANCE SUMMARY", self.strategy.to_uppercase())?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<24} {:>12} {:>14} {:>15}", "Phase", "Rows", "Duration", "Rows/sec")?;
        writeln!(f, "{}", "-".repeat(70))?;
        for result in &self.phases {
            write!(
                f,
                "{:<24} {:>12} {:>13.3}s {:>15.2}",
                self.label(result.phase),
                result.rows_affected,
                result.duration.as_secs_f64(),
                result.ops_per_sec()
            )?;
            match &result.error {
                Some(error) => writeln!(f, "  FAILED: {error}")?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, "{}", "-".repeat(70))?;
        writeln!(f, "{:<24} {:>12} {:>13.3}s", "TOTAL TIME", "", self.total.as_secs_f64())?;
        writeln!(f, "{rule}")
    }
}

/// Several reports side by side, one column per strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    pub reports: Vec<Report>,
}

impl Comparison {
    pub fn new(reports: Vec<Report>) -> Self { Self { reports } }

    pub fn push(&mut self, report: Report) { self.reports.push(report); }

    pub fn render(&self) -> String { self.to_string() }

    pub fn print_summary(&self) { println!("\n{}", self.render()); }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = 16 + 16 * self.reports.len();
        write!(f, "{:<16}", "Phase")?;
        for report in &self.reports {
            write!(f, "{:>16}", report.strategy)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(width))?;

        for phase in Phase::ALL {
            write!(f, "{:<16}", phase.as_str())?;
            for report in &self.reports {
                match report.phase(phase) {
                    Some(result) if result.is_failed() => write!(f, "{:>16}", "failed")?,
                    Some(result) => write!(f, "{:>15.3}s", result.duration.as_secs_f64())?,
                    None => write!(f, "{:>16}", "-")?,
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "{}", "-".repeat(width))?;
        write!(f, "{:<16}", "Total")?;
        for report in &self.reports {
            write!(f, "{:>15.3}s", report.total.as_secs_f64())?;
        }
        writeln!(f)
    }
}
