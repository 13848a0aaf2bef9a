//! Substring search over keywords and header text.
//!
//! Ranking: exact matches, then prefix matches, then interior matches. Within a
//! class shorter text ranks first, and remaining ties keep index order
//! (keywords before plain headers, scan order within each).

use serde::Serialize;

use crate::index::{KeywordEntry, KeywordIndex};
use crate::types::{IndexedHeader, LinkTarget};

/// How a candidate contains the query. Variant order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    /// Candidate equals the query.
    Exact,
    /// Candidate starts with the query.
    Prefix,
    /// Query occurs somewhere after the first character.
    Interior,
}

/// What a hit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    /// A keyword entry; may carry several targets.
    Keyword,
    /// A header that produced no keyword.
    Header,
}

/// One search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    /// Rank class of the match.
    pub class: MatchClass,
    /// Keyword or plain header.
    pub kind: HitKind,
    /// Text shown to the user.
    pub label: &'a str,
    /// Section body preview; empty for keyword hits.
    pub preview: &'a str,
    /// Where the hit navigates. Several entries mean an ambiguous keyword.
    pub targets: &'a [LinkTarget],
}

/// Lazily yields ranked hits. Ranking is decided up front from cheap keys;
/// hits are only materialized as the consumer pulls them.
#[derive(Debug)]
pub struct Search<'a> {
    /// Index the hits borrow from.
    index: &'a KeywordIndex,
    /// Remaining ranked candidates.
    ranked: std::vec::IntoIter<Ranked>,
}

impl<'a> Iterator for Search<'a> {
    type Item = SearchHit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ranked = self.ranked.next()?;
        let index: &'a KeywordIndex = self.index;
        return match ranked.source {
            Source::Header(pos) => index.headers().get(pos).map(|header| return header_hit(ranked.class, header)),
            Source::Keyword(pos) => index.entry_at(pos).map(|entry| return keyword_hit(ranked.class, entry)),
        };
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return self.ranked.size_hint();
    }
}

/// Sort key for one matching candidate.
#[derive(Debug)]
struct Ranked {
    /// Rank class.
    class: MatchClass,
    /// Candidate length in characters.
    len: usize,
    /// Where the candidate lives in the index.
    source: Source,
}

/// Candidate position inside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    /// Position in `KeywordIndex::keywords()`.
    Keyword(usize),
    /// Position in `KeywordIndex::headers()`.
    Header(usize),
}

/// Search the index for `query` using the index's case mode.
/// A blank query matches nothing.
pub fn search<'a>(query: &str, index: &'a KeywordIndex) -> Search<'a> {
    let case = index.case();
    let needle = case.normalize(query.trim());
    let mut ranked: Vec<Ranked> = Vec::new();

    if !needle.is_empty() {
        for (pos, entry) in index.keywords().enumerate() {
            if let Some(class) = classify(&entry.keyword, &needle) {
                ranked.push(Ranked {
                    class,
                    len: entry.keyword.chars().count(),
                    source: Source::Keyword(pos),
                });
            }
        }
        for (pos, header) in index.headers().iter().enumerate() {
            if header.qualified {
                continue;
            }
            let text = case.normalize(&header.display);
            if let Some(class) = classify(&text, &needle) {
                ranked.push(Ranked {
                    class,
                    len: text.chars().count(),
                    source: Source::Header(pos),
                });
            }
        }
    }

    ranked.sort_by_key(|r| return (r.class, r.len, r.source));
    tracing::debug!(query, hits = ranked.len(), "search ranked");

    return Search {
        index,
        ranked: ranked.into_iter(),
    };
}

/// Classify how `text` contains `needle`, if it does.
fn classify(text: &str, needle: &str) -> Option<MatchClass> {
    if text == needle {
        return Some(MatchClass::Exact);
    }
    if text.starts_with(needle) {
        return Some(MatchClass::Prefix);
    }
    if text.contains(needle) {
        return Some(MatchClass::Interior);
    }
    return None;
}

/// Materialize a keyword hit.
fn keyword_hit(class: MatchClass, entry: &KeywordEntry) -> SearchHit<'_> {
    return SearchHit {
        class,
        kind: HitKind::Keyword,
        label: &entry.display,
        preview: "",
        targets: &entry.targets,
    };
}

/// Materialize a plain header hit.
fn header_hit(class: MatchClass, header: &IndexedHeader) -> SearchHit<'_> {
    return SearchHit {
        class,
        kind: HitKind::Header,
        label: &header.display,
        preview: &header.preview,
        targets: std::slice::from_ref(&header.target),
    };
}
