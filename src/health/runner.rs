//! Sequential runner for self-checks

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::capability::{Capabilities, MISSING_CAPABILITY};
use super::check::{CheckOutcome, SelfCheck, Verdict};
use super::error::{CheckError, describe_failure};
use super::report::RunReport;
use crate::config::RunnerConfig;

/// Whether a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerState {
    #[default]
    Idle,
    Running,
}

/// Executes registered checks one at a time and publishes report snapshots
///
/// Every completed check is pushed to subscribers before the next one starts.
/// A failing, erroring, panicking or timed-out check never stops the run.
pub struct SelfCheckRunner {
    checks: Vec<Box<dyn SelfCheck>>,
    check_timeout: Option<Duration>,
    capabilities: Arc<Capabilities>,
    report: Arc<watch::Sender<RunReport>>,
    state: Arc<watch::Sender<RunnerState>>,
}

impl SelfCheckRunner {
    /// Creates a runner with no checks and no per-check timeout
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            check_timeout: None,
            capabilities: Arc::new(Capabilities::new()),
            report: Arc::new(watch::Sender::new(RunReport::default())),
            state: Arc::new(watch::Sender::new(RunnerState::Idle)),
        }
    }

    /// Creates a runner using the configured per-check timeout
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new().with_timeout(config.check_timeout())
    }

    /// Bounds each check; a check exceeding it is recorded as errored
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Replaces the capability table the manual fault is raised against
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Arc::new(capabilities);
        self
    }

    /// Adds a check to the end of the list
    pub fn add_check<C: SelfCheck + 'static>(mut self, check: C) -> Self {
        warn_on_suspicious_name(&self.checks, check.name());
        self.checks.push(Box::new(check));
        self
    }

    /// Replaces the check list. The last report is left as is.
    pub fn register_checks(&mut self, checks: Vec<Box<dyn SelfCheck>>) {
        for (i, check) in checks.iter().enumerate() {
            warn_on_suspicious_name(&checks[..i], check.name());
        }
        debug!(count = checks.len(), "Registered checks");
        self.checks = checks;
    }

    /// Names of the registered checks, in run order
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Whether a run is currently in progress
    pub fn state(&self) -> RunnerState {
        *self.state.borrow()
    }

    /// The latest report snapshot
    pub fn report(&self) -> RunReport {
        self.report.borrow().clone()
    }

    /// Push-based view of the report; changes after every check and fault
    pub fn subscribe(&self) -> watch::Receiver<RunReport> {
        self.report.subscribe()
    }

    /// Push-based view of the runner state
    pub fn subscribe_state(&self) -> watch::Receiver<RunnerState> {
        self.state.subscribe()
    }

    /// A handle that can raise the manual fault while a run holds the runner
    pub fn fault_trigger(&self) -> FaultTrigger {
        FaultTrigger {
            capabilities: Arc::clone(&self.capabilities),
            report: Arc::clone(&self.report),
        }
    }

    /// Invokes a capability that does not exist and records the error
    ///
    /// Does not look at or modify the check list or the summary.
    pub fn trigger_manual_fault(&self) {
        self.fault_trigger().trigger();
    }

    /// Runs every registered check in order and returns the final report
    pub async fn run_all(&mut self) -> RunReport {
        let run_id = Uuid::new_v4();
        self.state.send_replace(RunnerState::Running);
        self.report.send_replace(RunReport::begin(run_id));
        info!(%run_id, checks = self.checks.len(), "Starting self-check run");

        for check in &self.checks {
            let outcome = self.execute(check.as_ref()).await;
            match &outcome.verdict {
                Verdict::Ok(text) => {
                    debug!(check = %outcome.name, duration = ?outcome.duration, "{text}")
                }
                Verdict::Failed(text) => {
                    warn!(check = %outcome.name, duration = ?outcome.duration, "{text}")
                }
                Verdict::Errored(text) => {
                    error!(check = %outcome.name, duration = ?outcome.duration, error = %text, "Check errored")
                }
            }
            self.report.send_modify(|report| report.record(outcome));
        }

        self.report.send_modify(RunReport::finish);
        self.state.send_replace(RunnerState::Idle);

        let report = self.report();
        info!(
            %run_id,
            status = %report.status_line(),
            errors = report.errors.len(),
            "Self-check run finished"
        );
        report
    }

    async fn execute(&self, check: &dyn SelfCheck) -> CheckOutcome {
        let start = Instant::now();
        let guarded = AssertUnwindSafe(check.run()).catch_unwind();

        let result = match self.check_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => Ok(Err(CheckError::Timeout(limit))),
            },
            None => guarded.await,
        }
        .unwrap_or_else(|payload| Err(CheckError::from_panic(payload)));

        let verdict = match result {
            Ok(value) => value.into(),
            Err(err) => Verdict::Errored(describe_failure(&err)),
        };

        CheckOutcome::new(check.name(), verdict, start.elapsed())
    }
}

impl Default for SelfCheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_on_suspicious_name(existing: &[Box<dyn SelfCheck>], name: &str) {
    if name.is_empty() || existing.iter().any(|c| c.name() == name) {
        warn!(check = %name, "Check name is empty or duplicated; summary entries may be ambiguous");
    }
}

/// Raises the manual fault against a runner's report
#[derive(Clone)]
pub struct FaultTrigger {
    capabilities: Arc<Capabilities>,
    report: Arc<watch::Sender<RunReport>>,
}

impl FaultTrigger {
    /// Appends `"Test error: {error}"` to the observed error list
    ///
    /// Exactly one entry is appended per call.
    pub fn trigger(&self) {
        let err = match self.capabilities.invoke(MISSING_CAPABILITY) {
            Ok(value) => CheckError::Other(format!(
                "{MISSING_CAPABILITY}() unexpectedly returned {value:?}"
            )),
            Err(err) => err,
        };
        error!(error = %err, "Manual fault triggered");
        let entry = format!("Test error: {}", describe_failure(&err));
        self.report.send_modify(|report| report.errors.push(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::check::{CheckValue, FnCheck};

    #[tokio::test]
    async fn test_empty_runner_finishes() {
        let mut runner = SelfCheckRunner::new();
        let report = runner.run_all().await;
        assert!(report.is_finished());
        assert_eq!(report.status_line(), "");
        assert!(report.errors.is_empty());
        assert_eq!(runner.state(), RunnerState::Idle);
    }

    #[tokio::test]
    async fn test_panicking_check_is_contained() {
        let mut runner = SelfCheckRunner::new()
            .add_check(FnCheck::new("Panics", || async {
                if true {
                    panic!("kaboom");
                }
                Ok(CheckValue::ok("unreachable"))
            }))
            .add_check(FnCheck::new("After", || async { Ok(CheckValue::ok("OK")) }));

        let report = runner.run_all().await;
        assert_eq!(report.status_line(), "Panics: ERROR - panicked: kaboom, After: OK");
        assert_eq!(report.errors, vec!["Panics: ERROR - panicked: kaboom".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_records_error() {
        let mut runner = SelfCheckRunner::new()
            .with_timeout(Some(Duration::from_millis(50)))
            .add_check(FnCheck::new("Slow", || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(CheckValue::ok("OK"))
            }))
            .add_check(FnCheck::new("Fast", || async { Ok(CheckValue::ok("OK")) }));

        let report = runner.run_all().await;
        assert_eq!(report.status_line(), "Slow: ERROR - timed out after 50ms, Fast: OK");
        assert_eq!(report.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_register_checks_replaces_list_and_keeps_report() {
        let mut runner =
            SelfCheckRunner::new().add_check(FnCheck::new("Old", || async { Ok(CheckValue::ok("OK")) }));
        let first = runner.run_all().await;

        runner.register_checks(vec![
            Box::new(FnCheck::new("New", || async { Ok(CheckValue::ok("OK")) })),
            Box::new(FnCheck::new("New", || async { Ok(CheckValue::failed("dup")) })),
        ]);
        assert_eq!(runner.check_names(), vec!["New", "New"]);
        assert_eq!(runner.report().status_line(), first.status_line());

        let second = runner.run_all().await;
        assert_eq!(second.status_line(), "New: OK, New: dup");
        assert_ne!(second.run_id, first.run_id);
    }

    #[test]
    fn test_manual_fault_needs_no_runtime() {
        let runner = SelfCheckRunner::new();
        runner.trigger_manual_fault();
        assert_eq!(
            runner.report().errors,
            vec!["Test error: nonexistent_capability() is not available in this context".to_string()]
        );
    }

    #[test]
    fn test_manual_fault_appends_exactly_one_entry_with_capabilities() {
        let mut caps = Capabilities::new();
        caps.register("echo", || Ok("echo".to_string())).unwrap();
        assert!(caps.register(MISSING_CAPABILITY, || Ok("present".to_string())).is_err());
        let runner = SelfCheckRunner::new().with_capabilities(caps);

        runner.trigger_manual_fault();
        runner.trigger_manual_fault();

        let errors = runner.report().errors;
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.starts_with("Test error: nonexistent_capability()")));
    }

    #[tokio::test]
    async fn test_run_starts_with_fresh_error_list() {
        let mut runner = SelfCheckRunner::new()
            .add_check(FnCheck::new("Fine", || async { Ok(CheckValue::ok("OK")) }));

        runner.trigger_manual_fault();
        assert_eq!(runner.report().errors.len(), 1);

        let report = runner.run_all().await;
        assert!(report.errors.is_empty());
        assert_eq!(report.status_line(), "Fine: OK");
    }
}
