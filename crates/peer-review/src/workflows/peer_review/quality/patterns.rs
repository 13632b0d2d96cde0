use regex::{Regex, RegexSet};
use std::collections::HashSet;
use std::sync::OnceLock;

static DASH_RUN: OnceLock<Regex> = OnceLock::new();
static LOW_CONTENT: OnceLock<RegexSet> = OnceLock::new();
static TOKEN_SEPARATOR: OnceLock<Regex> = OnceLock::new();
static STOPWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// `-`, `---`, ...: the export convention for an intentionally blank cell.
pub(crate) fn is_dash_run(trimmed: &str) -> bool {
    DASH_RUN
        .get_or_init(|| Regex::new(r"^-+$").expect("dash pattern compiles"))
        .is_match(trimmed)
}

pub(crate) fn is_low_content(trimmed: &str) -> bool {
    LOW_CONTENT
        .get_or_init(|| {
            const PATTERNS: &[&str] = &[
                r"^-+$",
                r"^\.+$",
                r"^[\p{P}\p{S}\s]+$",
                // English filler
                r"(?i)^ok(ay)?$",
                r"(?i)^n/?a$",
                r"(?i)^none$",
                r"(?i)^good$",
                r"(?i)^yes$",
                r"(?i)^no$",
                r"(?i)^nice$",
                // Thai filler and polite particles
                r"^ไม่มี$",
                r"^ไม่$",
                r"^ดี$",
                r"^ได้$",
                r"^ครับ$",
                r"^ค่ะ$",
                r"^ผ่าน$",
                r"^ใช่$",
                r"^โอเค$",
                r"^เยี่ยม$",
                r"^สุดยอด$",
            ];
            RegexSet::new(PATTERNS).expect("low-content patterns compile")
        })
        .is_match(trimmed)
}

pub(crate) fn token_separator() -> &'static Regex {
    TOKEN_SEPARATOR
        .get_or_init(|| Regex::new(r"[\s\p{P}]+").expect("separator pattern compiles"))
}

pub(crate) fn is_stopword(token: &str) -> bool {
    STOPWORDS
        .get_or_init(|| {
            [
                "ที่", "และ", "ของ", "ใน", "มี", "ได้", "ไม่", "เป็น", "จะ", "ก็", "แต่", "หรือ",
                "ว่า", "ให้", "นี้", "กับ", "จาก", "แล้ว", "ซึ่ง", "อยู่", "คือ", "ไป", "มา", "กัน",
                "ถ้า", "เพราะ", "ครับ", "ค่ะ", "นะ", "จ้า", "the", "and", "for", "with", "this",
                "that", "are", "was", "but", "not", "has", "have", "very",
            ]
            .into_iter()
            .collect()
        })
        .contains(token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_content_covers_fillers_and_punctuation() {
        for filler in ["ok", "OK", "none", "Yes", "no", "ครับ", "ค่ะ", "...", "!!", "?!"] {
            assert!(is_low_content(filler), "{filler} should be low content");
        }
        for content in ["okay but the audio drops", "no audio after 2:10", "ชัดเจนดี"] {
            assert!(!is_low_content(content), "{content} should not be low content");
        }
    }

    #[test]
    fn dash_run_requires_only_dashes() {
        assert!(is_dash_run("-"));
        assert!(is_dash_run("---"));
        assert!(!is_dash_run("-ok-"));
        assert!(!is_dash_run(""));
    }
}
