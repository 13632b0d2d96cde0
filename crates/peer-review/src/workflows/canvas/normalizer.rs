/// Strips byte-order and zero-width marks that spreadsheet exports leave on
/// header cells.
pub(crate) fn clean_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Blank or unparseable cells mean "no grade". Zero is a real grade.
pub(crate) fn parse_grade(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|grade| grade.is_finite())
}

pub(crate) fn is_blank_row<'a, I>(cells: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    cells.into_iter().all(|cell| cell.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_header_removes_bom_and_padding() {
        assert_eq!(clean_header("\u{feff} Student Name "), "Student Name");
        assert_eq!(clean_header("Review\u{200b} assigned"), "Review assigned");
    }

    #[test]
    fn grades_distinguish_zero_from_blank() {
        assert_eq!(parse_grade(" 0 "), Some(0.0));
        assert_eq!(parse_grade("10.5"), Some(10.5));
        assert_eq!(parse_grade(""), None);
        assert_eq!(parse_grade("   "), None);
        assert_eq!(parse_grade("n/a"), None);
        assert_eq!(parse_grade("inf"), None);
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(is_blank_row(["", "  ", "\t"]));
        assert!(!is_blank_row(["", "x"]));
    }
}
