use super::{SchemeKind, ScoringScheme};
use crate::workflows::peer_review::domain::{BonusScore, Grader, PeerReviewScore, ReviewDetail};

#[derive(Debug, Clone, Copy, Default)]
pub struct BonusScheme;

impl ScoringScheme for BonusScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Bonus
    }

    fn score(&self, grader: &Grader, details: &[ReviewDetail]) -> PeerReviewScore {
        let assigned = count(grader.assigned_reviews);
        let reviewed_count = count(details.len());
        let complete_count = count(details.iter().filter(|detail| detail.is_complete).count());

        let reviewed_all = assigned > 0 && reviewed_count == assigned;
        let all_complete = reviewed_count > 0 && complete_count == reviewed_count;
        let bonus = u32::from(reviewed_all && all_complete);

        PeerReviewScore::Bonus(BonusScore {
            base_score: reviewed_count,
            bonus,
            net_score: reviewed_count + bonus,
            full_score: if assigned > 0 { assigned + 1 } else { 0 },
            reviewed_count,
            complete_count,
        })
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
