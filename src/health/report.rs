//! Aggregate results of one pass over the registered checks

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::check::CheckOutcome;

/// Delimiter between summary entries in the status line
pub const SUMMARY_DELIMITER: &str = ", ";

/// Results from running a self-check suite
///
/// Snapshots of this type are published after every completed check, so a
/// report with `finished_at == None` is a partial view of a run in progress.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Identifier of the run that produced this report; `None` before any run
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    /// Set once every check has completed
    pub finished_at: Option<DateTime<Utc>>,
    /// Outcomes in registration order
    pub outcomes: Vec<CheckOutcome>,
    /// `"{name}: {verdict text}"` per outcome, in registration order
    pub summary: Vec<String>,
    /// Errored checks and manual faults, in the order they happened
    pub errors: Vec<String>,
}

impl RunReport {
    pub(crate) fn begin(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: CheckOutcome) {
        self.summary.push(outcome.summary_entry());
        if let Some(entry) = outcome.error_entry() {
            self.errors.push(entry);
        }
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Summary entries joined into one human-readable line
    pub fn status_line(&self) -> String {
        self.summary.join(SUMMARY_DELIMITER)
    }

    /// Returns true once every check of the run has completed
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Number of checks recorded so far
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of `Ok` verdicts
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_ok()).count()
    }

    /// Number of self-reported failures
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_failed()).count()
    }

    /// Number of errored checks
    pub fn errored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_errored()).count()
    }

    /// Returns true if every check reported `Ok`
    pub fn is_healthy(&self) -> bool {
        self.failed() == 0 && self.errored() == 0
    }

    /// 0 = all ok, 1 = any check errored, 2 = failures but no errors
    pub fn exit_code(&self) -> i32 {
        if self.errored() > 0 {
            1
        } else if self.failed() > 0 {
            2
        } else {
            0
        }
    }
}
