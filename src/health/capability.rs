//! Named synchronous operations the runner can invoke directly
//!
//! The manual fault calls a name that is never registered here, which is how
//! it produces a real error without touching the check list.

use std::collections::BTreeMap;

use super::error::CheckError;

type Capability = Box<dyn Fn() -> Result<String, CheckError> + Send + Sync>;

/// Capability name the manual fault invokes; never registered
pub const MISSING_CAPABILITY: &str = "nonexistent_capability";

/// Table of capabilities keyed by name
#[derive(Default)]
pub struct Capabilities {
    entries: BTreeMap<String, Capability>,
}

impl Capabilities {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a capability
    ///
    /// [`MISSING_CAPABILITY`] is reserved and is refused.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), CheckError>
    where
        F: Fn() -> Result<String, CheckError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name == MISSING_CAPABILITY {
            return Err(CheckError::Other(format!("{name} is a reserved capability name")));
        }
        self.entries.insert(name, Box::new(f));
        Ok(())
    }

    /// Returns true if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Calls the named capability, failing if it does not exist
    pub fn invoke(&self, name: &str) -> Result<String, CheckError> {
        let capability = self
            .entries
            .get(name)
            .ok_or_else(|| CheckError::MissingCapability(format!("{name}()")))?;
        capability()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
