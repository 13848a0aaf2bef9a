//! Header scanning: split a markdown document into ordered header records.

use std::collections::HashMap;

use crate::types::HeaderRecord;

/// Deepest header level recorded; longer marker runs are clamped to it.
pub const MAX_HEADER_LEVEL: u8 = 6;

/// How many following lines feed a header's preview.
const PREVIEW_LINES: usize = 3;

/// Preview length limit in characters.
const PREVIEW_CHARS: usize = 120;

/// Scan raw markdown text and return its headers in document order.
///
/// A header is any line whose first non-blank character is `#`. Empty header
/// text still yields a record; deciding whether it names anything is the
/// keyword extractor's job.
pub fn scan_headers(text: &str) -> Vec<HeaderRecord> {
    let lines = split_lines_with_offsets(text);
    let mut headers = Vec::new();
    let mut seen_anchors: HashMap<String, u32> = HashMap::new();

    for (index, line) in lines.iter().enumerate() {
        let Some((level, header_text)) = parse_header_line(line.content) else {
            continue;
        };
        let line_number = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
        let anchor = unique_anchor(header_text, line_number, &mut seen_anchors);
        let following = lines.get(index.saturating_add(1)..).unwrap_or_default();

        headers.push(HeaderRecord {
            anchor,
            level,
            line: line_number,
            offset: line.end,
            preview: build_preview(following),
            text: header_text.to_string(),
        });
    }

    return headers;
}

/// True if the line is a markdown header line.
pub fn is_header_line(line: &str) -> bool {
    return line.trim_start().starts_with('#');
}

/// A line of the source, without its terminator.
struct SourceLine<'a> {
    /// Line text without `\n` or `\r\n`.
    content: &'a str,
    /// Byte offset just past the line terminator.
    end: usize,
}

/// Split text into lines, remembering where each one ends in the source.
fn split_lines_with_offsets(text: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut end = 0_usize;
    for raw in text.split_inclusive('\n') {
        end = end.saturating_add(raw.len());
        let content = raw.strip_suffix('\n').unwrap_or(raw);
        let content = content.strip_suffix('\r').unwrap_or(content);
        lines.push(SourceLine { content, end });
    }
    return lines;
}

/// Parse `### Title` into `(level, "Title")`.
fn parse_header_line(line: &str) -> Option<(u8, &str)> {
    let stripped = line.trim_start();
    let rest = stripped.trim_start_matches('#');
    let markers = stripped.len().saturating_sub(rest.len());
    if markers == 0 {
        return None;
    }
    let level = u8::try_from(markers).unwrap_or(u8::MAX).min(MAX_HEADER_LEVEL);
    return Some((level, rest.trim()));
}

/// Slug of the header, suffixed `-1`, `-2`, … when the document already used it.
/// Headers without any alphanumeric text fall back to `line-<n>`.
fn unique_anchor(text: &str, line: u32, seen: &mut HashMap<String, u32>) -> String {
    let mut slug = slugify(text);
    if slug.is_empty() {
        slug = format!("line-{line}");
    }
    let count = seen.entry(slug.clone()).or_insert(0);
    let anchor = if *count == 0 { slug } else { format!("{slug}-{count}") };
    *count = count.saturating_add(1);
    return anchor;
}

/// Convert heading text to a URL-compatible slug.
/// Lowercase, spaces/non-alphanumeric to hyphens, collapse runs, trim edges.
fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut result = String::with_capacity(lowered.len());
    let mut prev_hyphen = true; // Start true to trim leading hyphens.

    for c in lowered.chars() {
        if c.is_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
            continue;
        }
        if prev_hyphen {
            continue;
        }
        result.push('-');
        prev_hyphen = true;
    }

    if result.ends_with('-') {
        result.pop();
    }
    return result;
}

/// Join the next few lines into a short single-line preview.
fn build_preview(following: &[SourceLine<'_>]) -> String {
    let joined = following
        .iter()
        .take(PREVIEW_LINES)
        .map(|l| return l.content.trim())
        .collect::<Vec<_>>()
        .join(" ");
    return joined.chars().take(PREVIEW_CHARS).collect();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::indexing_slicing, reason = "test code")]
mod tests {
    use super::*;

    #[test]
    fn finds_headers_in_order_with_levels() {
        let text = "# World\nintro\n## Dragon!\nbig\n### Sword/s\n";
        let headers = scan_headers(text);
        let summary: Vec<(u8, &str)> = headers.iter().map(|h| (h.level, h.text.as_str())).collect();
        assert_eq!(summary, vec![(1, "World"), (2, "Dragon!"), (3, "Sword/s")]);
    }

    #[test]
    fn offset_points_just_past_the_header_line() {
        let text = "intro\n## Dragon!\nThe beast sleeps.";
        let headers = scan_headers(text);
        assert_eq!(headers[0].line, 2);
        assert_eq!(&text[headers[0].offset..], "The beast sleeps.");
    }

    #[test]
    fn crlf_lines_are_handled() {
        let text = "# Keep!\r\nbody\r\n";
        let headers = scan_headers(text);
        assert_eq!(headers[0].text, "Keep!");
        assert_eq!(&text[headers[0].offset..], "body\r\n");
    }

    #[test]
    fn level_is_clamped() {
        let headers = scan_headers("######### Deep");
        assert_eq!(headers[0].level, MAX_HEADER_LEVEL);
        assert_eq!(headers[0].text, "Deep");
    }

    #[test]
    fn empty_header_still_produces_a_record() {
        let headers = scan_headers("text\n##   \nmore");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].text, "");
        assert_eq!(headers[0].anchor, "line-2");
    }

    #[test]
    fn indented_headers_count() {
        let headers = scan_headers("   ## Indented*");
        assert_eq!(headers[0].level, 2);
        assert_eq!(headers[0].text, "Indented*");
    }

    #[test]
    fn duplicate_anchors_are_numbered() {
        let headers = scan_headers("# Notes\n# Notes\n# Notes!");
        let anchors: Vec<&str> = headers.iter().map(|h| h.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn preview_joins_following_lines() {
        let headers = scan_headers("# Keep\n  first  \nsecond\nthird\nfourth");
        assert_eq!(headers[0].preview, "first second third");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("  Hello   World  "), "hello-world");
        assert_eq!(slugify("Sword/s"), "sword-s");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn header_line_detection() {
        assert!(is_header_line("# Title"));
        assert!(is_header_line("  ##"));
        assert!(!is_header_line("plain # text"));
    }
}
