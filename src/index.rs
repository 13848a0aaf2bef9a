//! Keyword index: keyword → ordered set of link targets.
//!
//! Building happens in an [`IndexBuilder`], the single writer. `finish` hands back
//! an immutable [`KeywordIndex`] that any number of readers can share.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use crate::keywords::{CaseMode, KeywordRules};
use crate::scanner;
use crate::types::{Document, IndexedHeader, LinkTarget};

/// One keyword and every section it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordEntry {
    /// First-seen spelling, for display.
    pub display: String,
    /// Normalized lookup key.
    pub keyword: String,
    /// Targets in first-seen order. More than one means the keyword is ambiguous.
    pub targets: Vec<LinkTarget>,
}

impl KeywordEntry {
    /// True when more than one section carries this keyword.
    pub fn is_ambiguous(&self) -> bool {
        return self.targets.len() > 1;
    }
}

/// Mutable working state of one build. Dropping it abandons the build
/// without exposing anything.
#[derive(Debug)]
pub struct IndexBuilder {
    /// Normalization applied to every key.
    case: CaseMode,
    /// Documents fed so far.
    documents: usize,
    /// Entries in first-insertion order.
    entries: Vec<KeywordEntry>,
    /// Every header seen, in scan order.
    headers: Vec<IndexedHeader>,
    /// Normalized keyword → position in `entries`.
    positions: HashMap<String, usize>,
}

impl IndexBuilder {
    /// Start an empty build. The case mode is fixed for the whole build.
    pub fn new(case: CaseMode) -> Self {
        return Self {
            case,
            documents: 0,
            entries: Vec::new(),
            headers: Vec::new(),
            positions: HashMap::new(),
        };
    }

    /// Insert a target for a keyword. Existing targets are never replaced;
    /// re-adding an identical target is a no-op. Empty keywords are ignored.
    pub fn add(&mut self, keyword: &str, target: LinkTarget) {
        let normalized = self.case.normalize(keyword);
        if normalized.is_empty() {
            return;
        }

        if let Some(entry) = self.positions.get(&normalized).and_then(|&pos| return self.entries.get_mut(pos)) {
            if !entry.targets.contains(&target) {
                entry.targets.push(target);
            }
            return;
        }

        self.positions.insert(normalized.clone(), self.entries.len());
        self.entries.push(KeywordEntry {
            display: keyword.to_string(),
            keyword: normalized,
            targets: vec![target],
        });
    }

    /// Scan one document's headers and index every qualifying one.
    pub fn add_document(&mut self, document: &Document, rules: &KeywordRules) {
        let id = document.id();
        let headers = scanner::scan_headers(&document.text);
        let mut produced = 0_usize;

        for header in &headers {
            let target = LinkTarget {
                anchor: header.anchor.clone(),
                document: id.clone(),
                header: rules.display_text(&header.text),
                line: header.line,
                offset: header.offset,
            };
            // Keep the author's spelling for display; `add` applies the index case mode.
            let keywords = rules.extract(&header.text, CaseMode::Sensitive);
            for keyword in &keywords {
                self.add(keyword, target.clone());
            }
            produced = produced.saturating_add(keywords.len());
            self.headers.push(IndexedHeader {
                display: target.header.clone(),
                preview: header.preview.clone(),
                qualified: !keywords.is_empty(),
                target,
            });
        }

        self.documents = self.documents.saturating_add(1);
        tracing::debug!(document = %id, headers = headers.len(), keywords = produced, "indexed document");
    }

    /// Freeze the build into a read-only index.
    pub fn finish(self) -> KeywordIndex {
        let mut by_first_char: HashMap<char, Vec<usize>> = HashMap::new();
        for (pos, entry) in self.entries.iter().enumerate() {
            if let Some(first) = entry.keyword.chars().next() {
                by_first_char.entry(first).or_default().push(pos);
            }
        }
        for bucket in by_first_char.values_mut() {
            // Stable sort: equal lengths keep insertion order.
            bucket.sort_by_key(|&pos| {
                let len = self.entries.get(pos).map_or(0, |e| return e.keyword.chars().count());
                return Reverse(len);
            });
        }

        let index = KeywordIndex {
            by_first_char,
            case: self.case,
            documents: self.documents,
            entries: self.entries,
            headers: self.headers,
            positions: self.positions,
        };
        tracing::info!(
            documents = index.documents,
            headers = index.headers.len(),
            keywords = index.entries.len(),
            ambiguous = index.ambiguous().count(),
            "keyword index built"
        );
        return index;
    }
}

/// Read-only keyword index for one load of the world and campaign roots.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    /// First folded character → entry positions, longest keyword first.
    by_first_char: HashMap<char, Vec<usize>>,
    /// Normalization used for keys and queries.
    case: CaseMode,
    /// Number of documents scanned.
    documents: usize,
    /// Entries in first-insertion order.
    entries: Vec<KeywordEntry>,
    /// Every header seen, in scan order.
    headers: Vec<IndexedHeader>,
    /// Normalized keyword → position in `entries`.
    positions: HashMap<String, usize>,
}

impl KeywordIndex {
    /// Build an index from scratch over `documents`, in iteration order.
    pub fn build<'a>(
        documents: impl IntoIterator<Item = &'a Document>,
        rules: &KeywordRules,
        case: CaseMode,
    ) -> Self {
        let mut builder = IndexBuilder::new(case);
        for document in documents {
            builder.add_document(document, rules);
        }
        return builder.finish();
    }

    /// Keywords carrying more than one target.
    pub fn ambiguous(&self) -> impl Iterator<Item = &KeywordEntry> {
        return self.entries.iter().filter(|e| return e.is_ambiguous());
    }

    /// Case mode fixed at build time.
    pub const fn case(&self) -> CaseMode {
        return self.case;
    }

    /// Number of documents the index was built from.
    pub const fn document_count(&self) -> usize {
        return self.documents;
    }

    /// Entry for a keyword, normalizing the query first.
    pub fn entry(&self, keyword: &str) -> Option<&KeywordEntry> {
        let normalized = self.case.normalize(keyword.trim());
        return self.positions.get(&normalized).and_then(|&pos| return self.entries.get(pos));
    }

    /// Entry at a position of `keywords()`.
    pub(crate) fn entry_at(&self, pos: usize) -> Option<&KeywordEntry> {
        return self.entries.get(pos);
    }

    /// Every header seen during the build, in scan order.
    pub fn headers(&self) -> &[IndexedHeader] {
        return &self.headers;
    }

    /// True when no keyword was indexed.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// All entries in first-insertion order.
    pub fn keywords(&self) -> impl Iterator<Item = &KeywordEntry> {
        return self.entries.iter();
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Targets for a keyword in first-seen order; empty when the keyword is absent.
    pub fn lookup(&self, keyword: &str) -> &[LinkTarget] {
        return self.entry(keyword).map(|e| return e.targets.as_slice()).unwrap_or_default();
    }

    /// Entries whose normalized keyword starts with `first`, longest first.
    pub(crate) fn candidates_starting_with(&self, first: char) -> impl Iterator<Item = &KeywordEntry> {
        return self
            .by_first_char
            .get(&first)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|&pos| return self.entries.get(pos));
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::indexing_slicing, reason = "test code")]
mod tests {
    use super::*;
    use crate::types::RootKind;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(RootKind::World, "beasts.md", "# Beasts\n## Dragon!\nScaly.\n## Sword/s\n"),
            Document::new(RootKind::Campaign, "npcs.md", "# NPCs\n## *Dragon*\nA nickname.\n"),
        ]
    }

    fn build(case: CaseMode) -> KeywordIndex {
        KeywordIndex::build(&docs(), &KeywordRules::default(), case)
    }

    #[test]
    fn keyword_from_two_documents_keeps_both_targets_in_order() {
        let index = build(CaseMode::Insensitive);
        let targets = index.lookup("Dragon");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].document.root, RootKind::World);
        assert_eq!(targets[1].document.root, RootKind::Campaign);
        assert_eq!(index.ambiguous().count(), 1);
    }

    #[test]
    fn plural_forms_share_one_anchor() {
        let index = build(CaseMode::Insensitive);
        let singular = index.lookup("sword");
        let plural = index.lookup("SWORDS");
        assert_eq!(singular.len(), 1);
        assert_eq!(singular, plural);
        assert_eq!(singular[0].anchor, "sword-s");
        assert_eq!(singular[0].header, "Sword");
    }

    #[test]
    fn plain_headers_are_not_keywords_but_are_remembered() {
        let index = build(CaseMode::Insensitive);
        assert!(index.lookup("Beasts").is_empty());
        let beasts = index.headers().iter().find(|h| h.display == "Beasts").unwrap();
        assert!(!beasts.qualified);
    }

    #[test]
    fn sensitive_mode_keeps_case_distinct() {
        let index = build(CaseMode::Sensitive);
        assert_eq!(index.lookup("Dragon").len(), 2);
        assert!(index.lookup("dragon").is_empty());
    }

    #[test]
    fn missing_keyword_is_empty_not_an_error() {
        assert!(build(CaseMode::Insensitive).lookup("Lich").is_empty());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let first: Vec<KeywordEntry> = build(CaseMode::Insensitive).keywords().cloned().collect();
        let second: Vec<KeywordEntry> = build(CaseMode::Insensitive).keywords().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn display_keeps_first_spelling() {
        let index = build(CaseMode::Insensitive);
        let entry = index.entry("DRAGON").unwrap();
        assert_eq!(entry.keyword, "dragon");
        assert_eq!(entry.display, "Dragon");
    }

    #[test]
    fn identical_target_is_not_duplicated() {
        let mut builder = IndexBuilder::new(CaseMode::Insensitive);
        let target = build(CaseMode::Insensitive).lookup("sword")[0].clone();
        builder.add("Sword", target.clone());
        builder.add("sword", target);
        builder.add("", build(CaseMode::Insensitive).lookup("sword")[0].clone());
        let index = builder.finish();
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("Sword").len(), 1);
    }

    #[test]
    fn candidates_are_longest_first() {
        let doc = Document::new(RootKind::World, "a.md", "# Dragon!\n# Dragon Lord!\n# Drake!\n");
        let index = KeywordIndex::build([&doc], &KeywordRules::default(), CaseMode::Insensitive);
        let order: Vec<&str> = index.candidates_starting_with('d').map(|e| e.keyword.as_str()).collect();
        assert_eq!(order, vec!["dragon lord", "dragon", "drake"]);
    }
}
