use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::http::StatusCode;
use serde::Serialize;
use tracing::info;

use super::analysis::{analyze, AnalysisConfig};
use super::domain::{Grader, Student};
use super::flags::{flagged_graders, flagged_students};
use super::inconsistency::Inconsistency;
use super::quality::{KeywordIndex, KeywordVerdicts};
use super::recalculate::GraderScoreChange;
use super::repository::{AnalysisRecord, AnalysisStore, StoreError};
use super::scoring::SchemeKind;
use super::statistics::{ClassStatistics, GroupStatistics};
use crate::workflows::canvas::{
    CanvasImportError, CanvasImporter, ColumnDetection, RosterImportError, RosterImporter,
};

/// Flagged entities, most severe first.
#[derive(Debug, Clone, Serialize)]
pub struct FlagReport {
    pub students: Vec<Student>,
    pub graders: Vec<Grader>,
}

/// Service composing the importer, the scoring pipeline and the store.
///
/// Uploads and keyword re-scoring replace the stored analysis wholesale and
/// are serialized through one operation lock; reads see either the old or the
/// new analysis, never a mix.
pub struct PeerReviewService<S> {
    store: Arc<S>,
    config: AnalysisConfig,
    column_detection: ColumnDetection,
    operation: Mutex<()>,
}

impl<S> PeerReviewService<S>
where
    S: AnalysisStore + 'static,
{
    pub fn new(store: Arc<S>, config: AnalysisConfig, column_detection: ColumnDetection) -> Self {
        Self {
            store,
            config,
            column_detection,
            operation: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.operation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parses and scores a new export, replacing any stored analysis.
    pub fn ingest<R: Read>(
        &self,
        source: &str,
        reader: R,
        scheme: Option<SchemeKind>,
    ) -> Result<AnalysisRecord, PeerReviewServiceError> {
        let export = CanvasImporter::from_reader(reader, self.column_detection)?;

        let mut config = self.config;
        if let Some(scheme) = scheme {
            config.scheme = scheme;
        }
        let analysis = analyze(export.reviews, &config);

        let record = AnalysisRecord {
            source: source.to_string(),
            column_strategy: export.column_strategy,
            analysis,
            last_changes: Vec::new(),
        };

        let _guard = self.exclusive();
        self.store.save(record.clone())?;
        info!(source, "stored new peer review analysis");
        Ok(record)
    }

    pub fn current(&self) -> Result<AnalysisRecord, PeerReviewServiceError> {
        self.store.load()?.ok_or(PeerReviewServiceError::NoAnalysis)
    }

    /// Re-scores every grader with the given keyword overrides and returns
    /// the graders whose score moved.
    pub fn recalculate(
        &self,
        verdicts: KeywordVerdicts,
    ) -> Result<Vec<GraderScoreChange>, PeerReviewServiceError> {
        let _guard = self.exclusive();
        let record = self.current()?;
        let (analysis, changes) = record.analysis.recalculate(verdicts, &self.config);

        self.store.save(AnalysisRecord {
            analysis,
            last_changes: changes.clone(),
            ..record
        })?;
        Ok(changes)
    }

    pub fn flags(&self) -> Result<FlagReport, PeerReviewServiceError> {
        let record = self.current()?;
        let analysis = &record.analysis;
        Ok(FlagReport {
            students: flagged_students(analysis.students.values())
                .into_iter()
                .cloned()
                .collect(),
            graders: flagged_graders(analysis.graders.values())
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    pub fn inconsistencies(&self) -> Result<Vec<Inconsistency>, PeerReviewServiceError> {
        Ok(self.current()?.analysis.inconsistencies())
    }

    pub fn keywords(&self) -> Result<KeywordIndex, PeerReviewServiceError> {
        Ok(self.current()?.analysis.keyword_index())
    }

    pub fn statistics(&self) -> Result<Option<ClassStatistics>, PeerReviewServiceError> {
        Ok(self.current()?.analysis.class_statistics())
    }

    /// Partitions the current analysis by a roster's group set.
    pub fn groups<R: Read>(
        &self,
        roster: R,
        group_set: Option<&str>,
    ) -> Result<Vec<GroupStatistics>, PeerReviewServiceError> {
        let record = self.current()?;
        let roster = RosterImporter::from_reader(roster)?;
        let assignment = roster.assignment(group_set)?;
        Ok(record.analysis.group_statistics(&assignment))
    }
}

/// Error raised by the peer review service.
#[derive(Debug, thiserror::Error)]
pub enum PeerReviewServiceError {
    #[error(transparent)]
    Import(#[from] CanvasImportError),
    #[error(transparent)]
    Roster(#[from] RosterImportError),
    #[error("no peer review analysis has been uploaded")]
    NoAnalysis,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PeerReviewServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Import(_) | Self::Roster(_) => StatusCode::BAD_REQUEST,
            Self::NoAnalysis => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
