//! In-memory event log for testing and embedding.

use super::{EventFilters, EventWriter, FileOperation};
use anyhow::{Result, anyhow};
use std::sync::RwLock;

/// Event log that keeps records in memory.
///
/// Same ordering and filtering semantics as [`super::JsonlEventLog`], without persistence.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<FileOperation>>,
}

impl MemoryEventLog {
    /// Creates an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().map_or(0, |events| events.len())
    }

    /// Whether no event was stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventWriter for MemoryEventLog {
    fn write(&self, event: &FileOperation) -> Result<()> {
        self.events
            .write()
            .map_err(|e| anyhow!("Event log lock poisoned: {e}"))?
            .push(event.clone());
        Ok(())
    }

    fn query(&self, filters: &EventFilters) -> Result<Vec<FileOperation>> {
        let matched = self
            .events
            .read()
            .map_err(|e| anyhow!("Event log lock poisoned: {e}"))?
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect();
        Ok(filters.finish(matched))
    }
}
