use regex::Regex;
use std::sync::LazyLock;

/// Only the first few lines of a page are considered.
pub const MAX_LINE_INDEX: usize = 5;

const MIN_LEN: usize = 5;
const MAX_LEN: usize = 100;

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("numbered item pattern"));

static UPPERCASE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[А-ЯЁA-Z]").expect("uppercase start pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    pub text: String,
    pub page: u32,
}

/// Scan every page (1-based, in order) and collect lines that look like headings.
///
/// Candidates keep page order, then line order within a page. Repeated headings
/// are reported every time they occur.
pub fn find_headings<S: AsRef<str>>(page_texts: &[S]) -> Vec<HeadingCandidate> {
    let mut headings = Vec::new();

    for (page_idx, page_text) in page_texts.iter().enumerate() {
        let page = (page_idx + 1) as u32;

        for (line_idx, line) in page_text.as_ref().split('\n').enumerate() {
            if line_idx >= MAX_LINE_INDEX {
                break;
            }

            let line = line.trim();
            if is_heading(line) {
                headings.push(HeadingCandidate {
                    text: line.to_string(),
                    page,
                });
            }
        }
    }

    headings
}

/// Line-level predicate, position on the page aside. Expects a trimmed line.
pub fn is_heading(line: &str) -> bool {
    let len = line.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return false;
    }

    // purely numeric, e.g. page numbers
    if line.chars().all(char::is_numeric) {
        return false;
    }

    // "1. Something" style list items
    if NUMBERED_ITEM.is_match(line) {
        return false;
    }

    if !UPPERCASE_START.is_match(line) {
        return false;
    }

    if line.chars().any(char::is_lowercase) {
        return false;
    }

    line.split_whitespace().count() >= 2
}
