use super::{SchemeKind, ScoringScheme};
use crate::workflows::peer_review::domain::{
    round_to, Grader, PeerReviewScore, PenaltyScore, ReviewDetail,
};

/// Flat deduction for each completed review without nine quality comments.
pub const PENALTY_PER_REVIEW: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct PenaltyScheme;

impl ScoringScheme for PenaltyScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Penalty
    }

    fn score(&self, grader: &Grader, details: &[ReviewDetail]) -> PeerReviewScore {
        let earned_score = details.len() as f64;
        let penalized_reviews = details
            .iter()
            .filter(|detail| !detail.has_all_quality)
            .count();
        let penalty = round_to(penalized_reviews as f64 * PENALTY_PER_REVIEW, 1);
        let net_score = round_to(earned_score - penalty, 1).max(0.0);

        PeerReviewScore::Penalty(PenaltyScore {
            full_score: grader.assigned_reviews as f64,
            earned_score,
            penalty,
            net_score,
            penalized_reviews,
        })
    }
}
