//! Section parser for model replies.
//!
//! A single-pass line scanner with an explicit section cursor. The model
//! is asked for three labeled sections; this parser recovers them from the
//! free-text reply without assuming any particular markdown dialect.

use super::Notes;

/// Parser cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Summary,
    Notes,
    Takeaways,
}

/// Parse a model reply into named sections.
///
/// Heading detection, per line (trimmed, lowercased): starts with
/// "summary" switches to Summary, capturing same-line text after a colon;
/// starts with "notes" switches to Notes; contains "takeaway" switches to
/// Takeaways. Other lines accumulate under the current section, with
/// leading bullet markers stripped for list sections. Lines before the
/// first recognized heading are discarded. When headings repeat or arrive
/// out of order, the last heading wins.
///
/// Returns `Notes::Unparsed` with the raw reply when no heading is found.
pub fn parse_reply(reply: &str) -> Notes {
    let mut section = Section::None;
    let mut summary_parts: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    let mut takeaways: Vec<String> = Vec::new();

    for raw_line in reply.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();

        if lower.starts_with("summary") {
            section = Section::Summary;
            if let Some((_, rest)) = line.split_once(':') {
                let rest = rest.trim();
                if !rest.is_empty() {
                    summary_parts.push(rest.to_string());
                }
            }
            continue;
        }

        if lower.starts_with("notes") {
            section = Section::Notes;
            continue;
        }

        if lower.contains("takeaway") {
            section = Section::Takeaways;
            continue;
        }

        match section {
            // Preamble before the first heading is dropped
            Section::None => {}
            Section::Summary => summary_parts.push(line.to_string()),
            Section::Notes => {
                let item = strip_bullet(line);
                if !item.is_empty() {
                    notes.push(item);
                }
            }
            Section::Takeaways => {
                let item = strip_bullet(line);
                if !item.is_empty() {
                    takeaways.push(item);
                }
            }
        }
    }

    if section == Section::None {
        return Notes::Unparsed(reply.to_string());
    }

    Notes::Structured {
        summary: summary_parts.join(" "),
        notes,
        takeaways,
    }
}

/// Strip leading bullet markers from a list line.
fn strip_bullet(line: &str) -> String {
    line.trim_start_matches(|c: char| {
        c == '-' || c == '•' || c == '*' || c == '.' || c == ' ' || c.is_ascii_digit()
    })
    .trim()
    .to_string()
}
