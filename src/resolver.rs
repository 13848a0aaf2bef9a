//! Link resolution: find indexed keywords in body text.
//!
//! Scanning is left to right. At every word start the longest keyword that
//! matches and ends on a word boundary wins; scanning resumes after it, so
//! spans never overlap.

use crate::index::{KeywordEntry, KeywordIndex};
use crate::keywords::CaseMode;
use crate::scanner;
use crate::types::{Document, MatchSpan, Resolution};

/// Resolve every keyword occurrence in `text`.
/// Ranges are byte offsets into `text`, ascending and disjoint.
pub fn resolve(text: &str, index: &KeywordIndex) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    resolve_into(text, 0, index, &mut spans);
    return spans;
}

/// Resolve the body of a document, skipping header lines.
/// Ranges are byte offsets into `document.text`.
pub fn resolve_document(document: &Document, index: &KeywordIndex) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    let mut line_start = 0_usize;

    for line in document.text.split_inclusive('\n') {
        if !scanner::is_header_line(line) {
            resolve_into(line, line_start, index, &mut spans);
        }
        line_start = line_start.saturating_add(line.len());
    }

    return spans;
}

/// Scan `text`, pushing spans shifted by `base`.
fn resolve_into(text: &str, base: usize, index: &KeywordIndex, spans: &mut Vec<MatchSpan>) {
    let mut pos = 0_usize;
    let mut prev: Option<char> = None;

    while let Some(c) = text.get(pos..).and_then(|rest| return rest.chars().next()) {
        let at_word_start = !prev.is_some_and(is_word_char);
        if at_word_start && let Some((end, entry)) = longest_match_at(text, pos, c, index) {
            spans.push(MatchSpan {
                keyword: entry.keyword.clone(),
                range: base.saturating_add(pos)..base.saturating_add(end),
                resolution: resolution_for(entry),
            });
            prev = text.get(..end).and_then(|claimed| return claimed.chars().next_back());
            pos = end;
            continue;
        }
        prev = Some(c);
        pos = pos.saturating_add(c.len_utf8());
    }
}

/// Longest keyword matching at byte `pos` whose end falls on a word boundary.
/// Returns the end offset and the entry.
fn longest_match_at<'a>(
    text: &str,
    pos: usize,
    first: char,
    index: &'a KeywordIndex,
) -> Option<(usize, &'a KeywordEntry)> {
    let rest = text.get(pos..)?;
    let case = index.case();

    for entry in index.candidates_starting_with(case.fold(first)) {
        let Some(len) = matched_len(rest, &entry.keyword, case) else {
            continue;
        };
        let next = rest.get(len..).and_then(|after| return after.chars().next());
        if next.is_some_and(is_word_char) {
            continue;
        }
        return Some((pos.saturating_add(len), entry));
    }

    return None;
}

/// Byte length of the prefix of `text` equal to `keyword` under `case`.
fn matched_len(text: &str, keyword: &str, case: CaseMode) -> Option<usize> {
    let mut chars = text.char_indices();
    for expected in keyword.chars() {
        let (_, actual) = chars.next()?;
        if case.fold(actual) != expected {
            return None;
        }
    }
    return Some(chars.next().map_or(text.len(), |(offset, _)| return offset));
}

/// One target is a direct link; several are left for the user to pick.
fn resolution_for(entry: &KeywordEntry) -> Resolution {
    return match entry.targets.as_slice() {
        [only] => Resolution::Unique(only.clone()),
        targets => Resolution::Ambiguous(targets.to_vec()),
    };
}

/// Letters, digits and `_` glue words together.
fn is_word_char(c: char) -> bool {
    return c.is_alphanumeric() || c == '_';
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::indexing_slicing, reason = "test code")]
mod tests {
    use super::*;
    use crate::keywords::KeywordRules;
    use crate::types::RootKind;

    fn index_of(headers: &str, case: CaseMode) -> KeywordIndex {
        let doc = Document::new(RootKind::World, "glossary.md", headers);
        KeywordIndex::build([&doc], &KeywordRules::default(), case)
    }

    fn matched<'a>(text: &'a str, spans: &[MatchSpan]) -> Vec<&'a str> {
        spans.iter().map(|s| &text[s.range.clone()]).collect()
    }

    #[test]
    fn longest_keyword_wins_at_the_same_start() {
        let index = index_of("# Dragon!\n# Dragon Lord!\n", CaseMode::Insensitive);
        let text = "the Dragon Lord awakens";
        let spans = resolve(text, &index);
        assert_eq!(spans.len(), 1);
        assert_eq!(matched(text, &spans), vec!["Dragon Lord"]);
        assert_eq!(spans[0].keyword, "dragon lord");
    }

    #[test]
    fn spans_never_overlap_and_are_ordered() {
        let index = index_of("# Dragon!\n# Dragon Lord!\n# Lord Keep*\n", CaseMode::Insensitive);
        let text = "Dragon Lord Keep and a dragon";
        let spans = resolve(text, &index);
        assert_eq!(matched(text, &spans), vec!["Dragon Lord", "dragon"]);
        for pair in spans.windows(2) {
            assert!(pair[0].range.end <= pair[1].range.start);
        }
    }

    #[test]
    fn word_boundaries_are_respected() {
        let index = index_of("# Elf!\n", CaseMode::Insensitive);
        let text = "Elfin shelf elf_kin (elf).";
        assert_eq!(matched(text, &resolve(text, &index)), vec!["elf"]);
    }

    #[test]
    fn falls_back_to_shorter_keyword_when_longer_breaks_a_word() {
        let index = index_of("# Dragon!\n# Dragon L!\n", CaseMode::Insensitive);
        let text = "Dragon Lord";
        assert_eq!(matched(text, &resolve(text, &index)), vec!["Dragon"]);
    }

    #[test]
    fn case_sensitive_mode_matches_exactly() {
        let index = index_of("# Dragon!\n", CaseMode::Sensitive);
        let text = "dragon Dragon DRAGON";
        let spans = resolve(text, &index);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 7..13);
    }

    #[test]
    fn plural_spelling_links_to_same_section() {
        let index = index_of("# Sword/s\n", CaseMode::Insensitive);
        let text = "two swords and a sword";
        let spans = resolve(text, &index);
        assert_eq!(matched(text, &spans), vec!["swords", "sword"]);
        assert_eq!(spans[0].jump(), spans[1].jump());
    }

    #[test]
    fn slash_joined_header_matches_spaced_prose() {
        let index = index_of("# Blade/Sword\n", CaseMode::Insensitive);
        let text = "she drew the blade sword";
        assert_eq!(matched(text, &resolve(text, &index)), vec!["blade sword"]);
    }

    #[test]
    fn ambiguous_keyword_carries_all_candidates() {
        let world = Document::new(RootKind::World, "a.md", "# Oracle!\n");
        let campaign = Document::new(RootKind::Campaign, "b.md", "# Oracle*\n");
        let index = KeywordIndex::build([&world, &campaign], &KeywordRules::default(), CaseMode::Insensitive);
        let spans = resolve("ask the oracle", &index);
        let Resolution::Ambiguous(candidates) = &spans[0].resolution else {
            panic!("expected ambiguous resolution");
        };
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].document.root, RootKind::World);
    }

    #[test]
    fn multibyte_text_keeps_byte_ranges_valid() {
        let index = index_of("# Ærendil!\n", CaseMode::Insensitive);
        let text = "Über ærendil - ÆRENDIL";
        let spans = resolve(text, &index);
        assert_eq!(matched(text, &spans), vec!["ærendil", "ÆRENDIL"]);
    }

    #[test]
    fn document_resolution_skips_headers_and_offsets_from_document_start() {
        let doc = Document::new(
            RootKind::World,
            "beasts.md",
            "# Dragon!\nA dragon sleeps.\n## Dragon Lair\nThe dragon wakes.\n",
        );
        let index = KeywordIndex::build([&doc], &KeywordRules::default(), CaseMode::Insensitive);
        let spans = resolve_document(&doc, &index);
        assert_eq!(matched(&doc.text, &spans), vec!["dragon", "dragon"]);
        assert_eq!(spans[0].range.start, 12);
    }

    #[test]
    fn empty_index_resolves_nothing() {
        let index = index_of("# Plain Title\n", CaseMode::Insensitive);
        assert!(resolve("Plain Title", &index).is_empty());
    }
}
