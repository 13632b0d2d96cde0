use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::canvas::ColumnDetection;
use crate::workflows::peer_review::domain::{
    CriterionComments, Participant, Review, ReviewId, CRITERIA_COUNT,
};
use crate::workflows::peer_review::repository::{AnalysisRecord, AnalysisStore, StoreError};
use crate::workflows::peer_review::{peer_review_router, AnalysisConfig, PeerReviewService};

pub(super) const HEADER: &str = "Student Name,Review assigned,Review completed,Grade Average,Submission Comments,Criteria 1,Criteria 2,Criteria 3,Criteria 5,Criteria 6,Criteria 7,Criteria 10,Criteria 11,Criteria 8\n";

/// Nine distinct, substantive comments.
pub(super) fn quality_comments() -> CriterionComments {
    CriterionComments::new([
        "Link opens from OneDrive".to_string(),
        "Name and faculty shown".to_string(),
        "Clip runs four minutes".to_string(),
        "Presenter visible throughout".to_string(),
        "Screen capture walkthrough".to_string(),
        "Benefits explained clearly".to_string(),
        "Mentions pricing and offline limits".to_string(),
        "Compares against Canva".to_string(),
        "Audio crisp, video sharp".to_string(),
    ])
}

/// The first `filled` criteria get substantive text, the rest `filler`.
pub(super) fn partial_comments(filled: usize, filler: &str) -> CriterionComments {
    let full = quality_comments();
    let mut slots: [String; CRITERIA_COUNT] = std::array::from_fn(|_| filler.to_string());
    for (index, (_, comment)) in full.iter().enumerate().take(filled) {
        slots[index] = comment.to_string();
    }
    CriterionComments::new(slots)
}

pub(super) fn uniform_comments(text: &str) -> CriterionComments {
    CriterionComments::new(std::array::from_fn(|_| text.to_string()))
}

pub(super) fn review(
    index: usize,
    student: &str,
    grader: &str,
    grade: Option<f64>,
    comments: CriterionComments,
) -> Review {
    let grader = (!grader.is_empty()).then(|| Participant::from_cell(grader));
    Review::new(
        ReviewId::for_row(index),
        Participant::from_cell(student),
        grader,
        grade,
        comments,
    )
}

pub(super) fn analysis_config() -> AnalysisConfig {
    AnalysisConfig::default()
}

/// A small class: three submissions, three graders each assigned two.
pub(super) fn sample_csv() -> String {
    let quality = "Link opens,Name shown,Four minutes,Presenter visible,Screen capture,Benefits clear,Two weaknesses,Similar tools,Sound clear";
    let blank = ",,,,,,,,";
    format!(
        "{HEADER}\
101 Ann Lee,201 Gus Park,10,,,{quality}\n\
101 Ann Lee,202 Hana Ito,11,,,{quality}\n\
102 Ben Ray,202 Hana Ito,4,,,{blank}\n\
102 Ben Ray,203 Ivy Wu,,,,{blank}\n\
103 Cat Diaz,203 Ivy Wu,9,,,{quality}\n\
103 Cat Diaz,201 Gus Park,8,,,good,good,good,good,good,good,good,good,good\n"
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) record: Arc<Mutex<Option<AnalysisRecord>>>,
}

impl AnalysisStore for MemoryStore {
    fn load(&self) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.record.lock().expect("store mutex poisoned").clone())
    }

    fn save(&self, record: AnalysisRecord) -> Result<(), StoreError> {
        *self.record.lock().expect("store mutex poisoned") = Some(record);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl AnalysisStore for UnavailableStore {
    fn load(&self) -> Result<Option<AnalysisRecord>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save(&self, _record: AnalysisRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn build_service() -> (PeerReviewService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service =
        PeerReviewService::new(store.clone(), analysis_config(), ColumnDetection::HeaderMatch);
    (service, store)
}

pub(super) fn loaded_service() -> PeerReviewService<MemoryStore> {
    let (service, _) = build_service();
    service
        .ingest("sample.csv", sample_csv().as_bytes(), None)
        .expect("sample ingests");
    service
}

pub(super) fn router_with_service(service: PeerReviewService<MemoryStore>) -> axum::Router {
    peer_review_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
