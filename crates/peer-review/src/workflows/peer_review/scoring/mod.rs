//! Work scores for submissions and the versioned peer-review scoring schemes.

mod bonus;
mod penalty;
mod work;

pub use bonus::BonusScheme;
pub use penalty::{PenaltyScheme, PENALTY_PER_REVIEW};
pub use work::{score_work, RELIABLE_MIN_GRADERS, RELIABLE_STD_DEV};

use super::domain::{Grader, PeerReviewScore, ReviewDetail};
use serde::{Deserialize, Serialize};

/// Strategy turning a grader's completed review details into a score.
pub trait ScoringScheme: Send + Sync {
    fn kind(&self) -> SchemeKind;
    fn score(&self, grader: &Grader, details: &[ReviewDetail]) -> PeerReviewScore;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// Scheme A: earned minus a flat per-review penalty.
    Penalty,
    /// Scheme B: base plus completion bonus.
    #[default]
    Bonus,
}

impl SchemeKind {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "penalty" | "a" => Some(Self::Penalty),
            "bonus" | "b" => Some(Self::Bonus),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Penalty => "penalty",
            Self::Bonus => "bonus",
        }
    }

    pub fn scheme(self) -> &'static dyn ScoringScheme {
        match self {
            Self::Penalty => &PenaltyScheme,
            Self::Bonus => &BonusScheme,
        }
    }
}
