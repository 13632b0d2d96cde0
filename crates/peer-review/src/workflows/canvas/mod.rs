//! Canvas peer-review export and roster import.

mod columns;
mod normalizer;
mod parser;
mod roster;

pub use columns::{ColumnDetection, ColumnSchema, ColumnStrategy, CRITERIA_OFFSET};
pub use roster::{Roster, RosterEntry, RosterImportError, RosterImporter};

use crate::workflows::peer_review::domain::Review;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum CanvasImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    NoData,
}

impl std::fmt::Display for CanvasImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasImportError::Io(err) => write!(f, "failed to read Canvas export: {}", err),
            CanvasImportError::Csv(err) => write!(f, "invalid Canvas CSV data: {}", err),
            CanvasImportError::NoData => write!(f, "Canvas export contains no review rows"),
        }
    }
}

impl std::error::Error for CanvasImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CanvasImportError::Io(err) => Some(err),
            CanvasImportError::Csv(err) => Some(err),
            CanvasImportError::NoData => None,
        }
    }
}

impl From<std::io::Error> for CanvasImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CanvasImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Parsed reviews plus the column strategy that located them.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasExport {
    pub reviews: Vec<Review>,
    pub column_strategy: ColumnStrategy,
}

pub struct CanvasImporter;

impl CanvasImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        detection: ColumnDetection,
    ) -> Result<CanvasExport, CanvasImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, detection)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        detection: ColumnDetection,
    ) -> Result<CanvasExport, CanvasImportError> {
        let parsed = parser::parse_export(reader, detection)?;
        if parsed.reviews.is_empty() {
            return Err(CanvasImportError::NoData);
        }

        if detection == ColumnDetection::HeaderMatch
            && parsed.schema.strategy == ColumnStrategy::PositionalFallback
        {
            warn!("expected Canvas headers not found, using positional columns");
        }

        info!(
            rows = parsed.data_rows,
            reviews = parsed.reviews.len(),
            skipped = parsed.data_rows - parsed.reviews.len(),
            strategy = parsed.schema.strategy.label(),
            "Canvas export parsed"
        );

        Ok(CanvasExport {
            reviews: parsed.reviews,
            column_strategy: parsed.schema.strategy,
        })
    }
}
