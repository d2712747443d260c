//! Core self-check trait and types

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::error::CheckError;

/// Outcome classification of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Verdict {
    /// The check ran and reported success
    Ok(String),
    /// The check ran to completion but reported a problem itself
    Failed(String),
    /// The check's `run` returned an error, timed out, or panicked
    Errored(String),
}

impl Verdict {
    /// Text shown after `"{name}: "` in the summary
    pub fn text(&self) -> String {
        match self {
            Verdict::Ok(text) | Verdict::Failed(text) => text.clone(),
            Verdict::Errored(text) => format!("ERROR - {text}"),
        }
    }

    /// Returns true for `Ok`
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok(_))
    }

    /// Returns true for a self-reported failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }

    /// Returns true if the check raised, panicked or timed out
    pub fn is_errored(&self) -> bool {
        matches!(self, Verdict::Errored(_))
    }

    /// Returns the verdict kind as a colored label
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            Verdict::Ok(_) => "OK".green().to_string(),
            Verdict::Failed(_) => "FAILED".yellow().to_string(),
            Verdict::Errored(_) => "ERROR".red().to_string(),
        }
    }
}

/// Value produced by a check that completed without raising
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckValue {
    Ok(String),
    Failed(String),
}

impl CheckValue {
    /// Creates a passing value
    pub fn ok(message: impl Into<String>) -> Self {
        CheckValue::Ok(message.into())
    }

    /// Creates a self-reported failure
    pub fn failed(message: impl Into<String>) -> Self {
        CheckValue::Failed(message.into())
    }
}

impl From<CheckValue> for Verdict {
    fn from(value: CheckValue) -> Self {
        match value {
            CheckValue::Ok(text) => Verdict::Ok(text),
            CheckValue::Failed(text) => Verdict::Failed(text),
        }
    }
}

/// What a check's `run` resolves to
pub type CheckResult = Result<CheckValue, CheckError>;

/// Result of executing one check. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Name copied from the check
    pub name: String,
    pub verdict: Verdict,
    /// How long the check took
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl CheckOutcome {
    /// Creates an outcome for the named check
    pub fn new(name: impl Into<String>, verdict: Verdict, duration: Duration) -> Self {
        Self {
            name: name.into(),
            verdict,
            duration,
        }
    }

    /// `"{name}: {verdict text}"`
    pub fn summary_entry(&self) -> String {
        format!("{}: {}", self.name, self.verdict.text())
    }

    /// `"{name}: ERROR - {error}"` for errored checks, `None` otherwise
    pub fn error_entry(&self) -> Option<String> {
        self.verdict
            .is_errored()
            .then(|| self.summary_entry())
    }
}

/// A named diagnostic operation
#[async_trait]
pub trait SelfCheck: Send + Sync {
    /// Name used in the summary and error list
    fn name(&self) -> &str;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&str> {
        None
    }

    /// Perform the check
    async fn run(&self) -> CheckResult;
}

/// A check backed by a closure returning a future
///
/// ```no_run
/// use selfcheck::health::{CheckValue, FnCheck};
///
/// let check = FnCheck::new("Clock", || async { Ok(CheckValue::ok("OK")) });
/// ```
pub struct FnCheck<F> {
    name: String,
    description: Option<String>,
    run: F,
}

impl<F, Fut> FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = CheckResult> + Send + 'static,
{
    /// Wraps `run` as a check called `name`
    pub fn new(name: impl Into<String>, run: F) -> Self {
        Self {
            name: name.into(),
            description: None,
            run,
        }
    }

    /// Sets the description shown alongside the check
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl<F, Fut> SelfCheck for FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = CheckResult> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn run(&self) -> CheckResult {
        (self.run)().await
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
