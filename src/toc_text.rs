use crate::headings::HeadingCandidate;

/// Headings longer than this are cut before padding.
pub const MAX_TITLE_CHARS: usize = 70;

/// Column the dot leader pads to; the page number follows after one space.
pub const LEADER_WIDTH: usize = 75;

/// Format detected headings as dot-leadered lines joined with `\n`.
pub fn format_toc(headings: &[HeadingCandidate]) -> String {
    headings
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_line(heading: &HeadingCandidate) -> String {
    let collapsed = heading.text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut line: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();

    let width = line.chars().count();
    if width < LEADER_WIDTH {
        line.push_str(&".".repeat(LEADER_WIDTH - width));
    }

    format!("{} {}", line, heading.page)
}
