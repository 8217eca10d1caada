//! Snapshot schema migrations.
//!
//! A `Migration` upgrades one schema version to the next, in place, on the
//! raw JSON `Value` before it's deserialized into [`crate::state::MaterializedState`].
//! There are no migrations registered yet — this exists so the next schema
//! change has somewhere to land without touching the snapshot format.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than this binary supports (max {1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}

pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

#[derive(Default)]
pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `snapshot["v"]` forward to `target`, applying each registered
    /// migration in sequence. A no-op if already at `target`.
    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut current = snapshot["v"].as_u64().unwrap_or(0) as u32;
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }
        while current < target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == current)
                .ok_or(MigrationError::NoPath(current, target))?;
            step.migrate(&mut snapshot)?;
            current = step.target_version();
            snapshot["v"] = Value::from(current);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
