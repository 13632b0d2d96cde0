use super::patterns::{is_stopword, token_separator};
use super::KeywordVerdicts;
use crate::workflows::peer_review::domain::Grader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MIN_KEYWORD_CHARS: usize = 3;
const MAX_KEYWORDS_PER_COMMENT: usize = 5;

/// Salient tokens of one comment, for the admin keyword index only.
pub fn extract_keywords(comment: &str) -> Vec<String> {
    let trimmed = comment.trim();
    if trimmed.chars().count() < MIN_KEYWORD_CHARS {
        return Vec::new();
    }

    token_separator()
        .split(trimmed)
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !is_stopword(token))
        .take(MAX_KEYWORDS_PER_COMMENT)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordVerdict {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordUsage {
    pub keyword: String,
    pub count: usize,
    pub graders: Vec<String>,
    pub verdict: Option<KeywordVerdict>,
}

/// Keyword frequency across every grader's completed review details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordIndex {
    pub entries: Vec<KeywordUsage>,
}

impl KeywordIndex {
    pub fn build<'a, I>(graders: I, verdicts: &KeywordVerdicts) -> Self
    where
        I: IntoIterator<Item = &'a Grader>,
    {
        let mut entries: Vec<KeywordUsage> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for grader in graders {
            for detail in &grader.details {
                for keyword in &detail.keywords {
                    let position = *positions.entry(keyword.clone()).or_insert_with(|| {
                        entries.push(KeywordUsage {
                            keyword: keyword.clone(),
                            count: 0,
                            graders: Vec::new(),
                            verdict: verdicts.verdict_for(keyword),
                        });
                        entries.len() - 1
                    });

                    let usage = &mut entries[position];
                    usage.count += 1;
                    if !usage.graders.contains(&grader.grader_name) {
                        usage.graders.push(grader.grader_name.clone());
                    }
                }
            }
        }

        // stable: ties keep first-seen order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries }
    }

    pub fn unverified(&self) -> impl Iterator<Item = &KeywordUsage> {
        self.entries.iter().filter(|usage| usage.verdict.is_none())
    }
}
