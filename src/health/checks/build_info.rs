//! Build information check

use async_trait::async_trait;
use tracing::debug;

use crate::build_info;
use crate::health::check::{CheckResult, CheckValue, SelfCheck};

/// Reports the build metadata baked into the binary
#[derive(Debug, Default)]
pub struct BuildInfoCheck;

impl BuildInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SelfCheck for BuildInfoCheck {
    fn name(&self) -> &str {
        "Build Info"
    }

    fn description(&self) -> Option<&str> {
        Some("Validates build metadata (rustc, target, timestamp)")
    }

    async fn run(&self) -> CheckResult {
        for line in build_info::detail_lines() {
            debug!("{line}");
        }

        if build_info::BUILD_TIMESTAMP.is_empty() || build_info::CARGO_TARGET_TRIPLE.is_empty() {
            return Ok(CheckValue::failed("Build metadata missing"));
        }

        Ok(CheckValue::ok(build_info::version_string()))
    }
}
