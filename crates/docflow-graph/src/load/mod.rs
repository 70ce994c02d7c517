//! Load pipelines.
//!
//! Both pipelines run strictly in sequence: each batch is written and awaited
//! before the next one is built. There is no transaction around a whole load,
//! so an interrupted run leaves the batches written so far.

pub mod ocel;
pub mod vbfa;

pub use ocel::load_ocel;
pub use vbfa::load_vbfa;

use tracing::error;

use docflow_core::config::MAX_BATCH_SIZE;
use docflow_core::{DocflowError, ErrorMode, LoadConfig};

use crate::error::{GraphError, GraphResult};

/// Result of a load.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Rows (VBFA) or events + objects + relations (OCEL) read from the source.
    pub rows_read: usize,
    pub links_written: usize,
    pub events_created: usize,
    pub objects_created: usize,
    /// `part_of` edges created; a relation matching duplicated nodes creates several.
    pub memberships_created: usize,
    /// Row and relation errors that were skipped.
    pub skipped: Vec<GraphError>,
}

impl LoadSummary {
    /// Relationships written by this load.
    pub fn relationships_created(&self) -> usize {
        self.links_written + self.memberships_created
    }

    /// Apply the error mode to a recoverable error.
    ///
    /// Fatal errors and every error in fail-fast mode are returned; in skip
    /// mode the error is logged and kept.
    pub(crate) fn reject(&mut self, err: GraphError, mode: ErrorMode) -> GraphResult<()> {
        if err.is_fatal() || mode == ErrorMode::FailFast {
            return Err(err);
        }
        error!(row = ?err.row(), error = %err, "Skipping");
        self.skipped.push(err);
        Ok(())
    }
}

/// Batch size a loader can chunk by. Zero would stall, so it is rejected
/// here as well as in [`LoadConfig::validate`].
pub(crate) fn batch_size(config: &LoadConfig) -> GraphResult<usize> {
    match config.batch_size {
        0 => Err(GraphError::Row(DocflowError::invalid_config(format!(
            "batch size must be between 1 and {}, got 0",
            MAX_BATCH_SIZE
        )))),
        size => Ok(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::DocflowError;

    fn row_error(row: usize) -> GraphError {
        GraphError::Row(DocflowError::MissingField { row, field: "VBELN" })
    }

    #[test]
    fn test_reject_skip_mode_keeps_error() {
        let mut summary = LoadSummary::default();
        summary.reject(row_error(4), ErrorMode::Skip).unwrap();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].row(), Some(4));
    }

    #[test]
    fn test_reject_fail_fast_returns_error() {
        let mut summary = LoadSummary::default();
        let err = summary.reject(row_error(4), ErrorMode::FailFast).unwrap_err();
        assert_eq!(err.row(), Some(4));
        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn test_reject_fatal_ignores_skip_mode() {
        let mut summary = LoadSummary::default();
        let fatal = GraphError::Decode("bad count".to_string());
        assert!(summary.reject(fatal, ErrorMode::Skip).is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = LoadConfig {
            batch_size: 0,
            ..LoadConfig::default()
        };
        assert!(matches!(
            batch_size(&config),
            Err(GraphError::Row(DocflowError::InvalidConfig(_)))
        ));
        assert_eq!(batch_size(&LoadConfig::default()).unwrap(), 500);
    }
}
