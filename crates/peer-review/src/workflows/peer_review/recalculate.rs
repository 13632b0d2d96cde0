use super::aggregate::review_detail;
use super::domain::{round_to, Grader, PeerReviewScore, Review, ReviewId};
use super::flags::grader_flags;
use super::quality::{assess, KeywordVerdicts, QualityPolicy};
use super::scoring::{PenaltyScheme, ScoringScheme};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A grader whose penalty or net score moved during re-scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraderScoreChange {
    pub grader_name: String,
    pub grader_id: String,
    pub full_name: String,
    pub old_penalty: f64,
    pub new_penalty: f64,
    pub old_net_score: f64,
    pub new_net_score: f64,
    pub diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recalculation {
    pub graders: BTreeMap<String, Grader>,
    pub changes: Vec<GraderScoreChange>,
}

/// Re-derives comment quality with the admin keyword overrides and rescores
/// every grader under the penalty scheme. Reads the source reviews, returns
/// fresh grader state and never touches the inputs.
///
/// Graders still carrying a bonus score are compared against a penalty score
/// of their stored details, so the diff only reflects keyword effects.
pub fn recalculate(
    reviews: &[Review],
    graders: &BTreeMap<String, Grader>,
    verdicts: &KeywordVerdicts,
    policy: QualityPolicy,
    expected_load: u32,
) -> Recalculation {
    let by_id: HashMap<&ReviewId, &Review> =
        reviews.iter().map(|review| (&review.id, review)).collect();
    let scheme = PenaltyScheme;
    let mut rescored = BTreeMap::new();
    let mut changes = Vec::new();

    for (name, grader) in graders {
        let baseline = match &grader.peer_review_score {
            PeerReviewScore::Penalty(_) => grader.peer_review_score.clone(),
            PeerReviewScore::Bonus(_) => scheme.score(grader, &grader.details),
        };

        let mut updated = grader.clone();
        for detail in updated.details.iter_mut() {
            match by_id.get(&detail.review_id) {
                Some(review) => {
                    let assessment = assess(review, verdicts, policy);
                    *detail = review_detail(review, detail.grade_given, assessment);
                }
                None => {
                    debug!(grader = %name, review_id = %detail.review_id, "review detail no longer resolvable, keeping stored verdict");
                }
            }
        }

        updated.peer_review_score = scheme.score(&updated, &updated.details);
        updated.flags = grader_flags(&updated, expected_load);

        let old_penalty = baseline.penalty();
        let old_net_score = baseline.net_score();
        let new_penalty = updated.peer_review_score.penalty();
        let new_net_score = updated.peer_review_score.net_score();

        if old_penalty != new_penalty || old_net_score != new_net_score {
            changes.push(GraderScoreChange {
                grader_name: updated.grader_name.clone(),
                grader_id: updated.grader_id.clone(),
                full_name: updated.full_name.clone(),
                old_penalty,
                new_penalty,
                old_net_score,
                new_net_score,
                diff: round_to(new_net_score - old_net_score, 1),
            });
        }

        rescored.insert(name.clone(), updated);
    }

    info!(
        graders = rescored.len(),
        changed = changes.len(),
        approved = verdicts.approved().len(),
        rejected = verdicts.rejected().len(),
        "keyword re-scoring finished"
    );

    Recalculation {
        graders: rescored,
        changes,
    }
}
