//! Startup self-check system
//!
//! A fixed, ordered list of named checks is executed one at a time. Each
//! check ends in a [`Verdict`]:
//! - `Ok` / `Failed`: the check completed and reported a result itself
//! - `Errored`: the check returned an error, panicked or timed out
//!
//! The runner folds the outcomes into a [`RunReport`] holding a joined status
//! line and a list of error entries, and pushes a snapshot of it to
//! subscribers after every check.
//!
//! # Example
//!
//! ```no_run
//! use selfcheck::health::{SelfCheckRunner, checks::*};
//!
//! # async fn demo() {
//! let report = SelfCheckRunner::new()
//!     .add_check(StorageCheck::new(MemoryStore::new(), "selfcheck"))
//!     .add_check(JsonRoundTripCheck::new())
//!     .run_all()
//!     .await;
//!
//! println!("{}", report.status_line());
//! # }
//! ```

pub mod capability;
pub mod check;
pub mod checks;
pub mod error;
pub mod report;
pub mod reporter;
pub mod runner;

pub use capability::Capabilities;
pub use check::{CheckOutcome, CheckResult, CheckValue, FnCheck, SelfCheck, Verdict};
pub use error::{CheckError, describe_failure};
pub use report::RunReport;
pub use reporter::{format_json, format_report, print_report};
pub use runner::{FaultTrigger, RunnerState, SelfCheckRunner};

use crate::config::SelfCheckConfig;

/// The startup check set: Storage, Network, JSON, and optionally Build Info
pub fn default_checks(config: &SelfCheckConfig) -> Result<Vec<Box<dyn SelfCheck>>, CheckError> {
    let mut list: Vec<Box<dyn SelfCheck>> = vec![
        Box::new(checks::StorageCheck::new(
            checks::FileStore::from_config(&config.storage),
            config.storage.key.clone(),
        )),
        Box::new(checks::NetworkCheck::from_config(&config.network)?),
        Box::new(checks::JsonRoundTripCheck::new()),
    ];

    if config.runner.include_build_info {
        list.push(Box::new(checks::BuildInfoCheck::new()));
    }

    Ok(list)
}

/// Builds a runner from `config`, registers the default checks, and runs them
pub async fn run_startup_checks(config: &SelfCheckConfig) -> Result<RunReport, CheckError> {
    let mut runner = SelfCheckRunner::from_config(&config.runner);
    runner.register_checks(default_checks(config)?);
    Ok(runner.run_all().await)
}
