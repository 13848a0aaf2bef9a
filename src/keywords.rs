//! Keyword extraction: which headers name a glossary entry, and under what keywords.
//!
//! A header qualifies only when its text carries a recognized symbol (`!`, `*`, `/`
//! by default) or a plural marker such as `Sword/s`. Plain prose headers like
//! "Chapter One" never produce keywords.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Symbols that mark a header as a keyword entry unless configured otherwise.
pub const DEFAULT_SYMBOLS: &[char] = &['!', '*', '/'];

/// Plural suffixes recognized after the separator unless configured otherwise.
pub const DEFAULT_PLURAL_SUFFIXES: &[&str] = &["s", "es"];

/// Separates a base word from its plural suffix (`Sword/s`) or from a synonym.
const SEPARATOR: char = '/';

/// How keywords and queries are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    /// Fold every character to lowercase before comparing.
    #[default]
    Insensitive,
    /// Compare characters exactly as written.
    Sensitive,
}

impl CaseMode {
    /// Map the config's `case_sensitive` flag to a mode.
    pub const fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            return Self::Sensitive;
        }
        return Self::Insensitive;
    }

    /// Fold one character. Always yields exactly one character so that folded
    /// text and source text advance in lockstep during matching.
    pub fn fold(self, c: char) -> char {
        return match self {
            Self::Insensitive => c.to_lowercase().next().unwrap_or(c),
            Self::Sensitive => c,
        };
    }

    /// Normalize a whole string with `fold`.
    pub fn normalize(self, text: &str) -> String {
        return text.chars().map(|c| return self.fold(c)).collect();
    }
}

/// The configurable symbol and suffix table driving extraction.
#[derive(Debug, Clone)]
pub struct KeywordRules {
    /// Matches `<base>/<suffix>`; `None` when no suffixes are configured.
    plural: Option<Regex>,
    /// Emit each `/`-separated part as its own keyword.
    split_synonyms: bool,
    /// Characters whose presence qualifies a header.
    symbols: Vec<char>,
}

impl Default for KeywordRules {
    /// `!`, `*`, `/` with the `s` and `es` plural suffixes.
    ///
    /// # Panics
    ///
    /// Panics if the built-in plural pattern is invalid (compile-time invariant).
    #[allow(clippy::expect_used, reason = "built-in table always compiles")]
    fn default() -> Self {
        let suffixes: Vec<String> = DEFAULT_PLURAL_SUFFIXES.iter().map(ToString::to_string).collect();
        return Self::new(DEFAULT_SYMBOLS.to_vec(), &suffixes, false).expect("valid default keyword rules");
    }
}

impl KeywordRules {
    /// Build a rule table.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRule` if a symbol is alphanumeric or whitespace,
    /// or if a suffix is empty or contains anything but letters.
    pub fn new(symbols: Vec<char>, plural_suffixes: &[String], split_synonyms: bool) -> Result<Self, Error> {
        if let Some(bad) = symbols.iter().find(|c| return c.is_alphanumeric() || c.is_whitespace()) {
            return Err(Error::InvalidRule {
                reason: format!("symbol `{bad}` must be punctuation"),
            });
        }
        if let Some(bad) = plural_suffixes.iter().find(|s| return s.is_empty() || !s.chars().all(char::is_alphabetic)) {
            return Err(Error::InvalidRule {
                reason: format!("plural suffix `{bad}` must be one or more letters"),
            });
        }

        let plural = if plural_suffixes.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = plural_suffixes.iter().map(|s| return regex::escape(s)).collect();
            let pattern = format!(
                r"^(?P<base>[^{SEPARATOR}]*[^{SEPARATOR}\s])\s*{SEPARATOR}\s*(?P<suffix>(?i:{}))$",
                alternatives.join("|")
            );
            Some(Regex::new(&pattern)?)
        };

        return Ok(Self {
            plural,
            split_synonyms,
            symbols,
        });
    }

    /// Header text as a reader sees it: symbols stripped, plural marker
    /// collapsed to the base word. Non-qualifying headers are only trimmed.
    pub fn display_text(&self, header: &str) -> String {
        let unmarked = self.strip_markers(header);
        if let Some((base, _)) = self.match_plural(&unmarked) {
            return base;
        }
        if !self.qualifies(header) {
            return header.trim().to_string();
        }
        if self.split_synonyms && unmarked.contains(SEPARATOR) {
            return unmarked
                .split(SEPARATOR)
                .map(collapse_whitespace)
                .find(|p| return !p.is_empty())
                .unwrap_or_default();
        }
        return collapse_whitespace(&self.strip_symbols(header));
    }

    /// Keywords named by a header, normalized for `case`, in emission order
    /// without duplicates. Empty for non-qualifying headers.
    pub fn extract(&self, header: &str, case: CaseMode) -> Vec<String> {
        let mut raw: Vec<String> = Vec::new();
        let unmarked = self.strip_markers(header);

        if let Some((base, suffix)) = self.match_plural(&unmarked) {
            raw.push(format!("{base}{suffix}"));
            raw.insert(0, base);
        } else if self.has_symbol(header) {
            if self.split_synonyms && unmarked.contains(SEPARATOR) {
                raw.extend(unmarked.split(SEPARATOR).map(collapse_whitespace));
            } else {
                raw.push(collapse_whitespace(&self.strip_symbols(header)));
            }
        }

        let mut keywords: Vec<String> = Vec::with_capacity(raw.len());
        for keyword in raw.into_iter().filter(|k| return !k.is_empty()) {
            let normalized = case.normalize(&keyword);
            if !keywords.contains(&normalized) {
                keywords.push(normalized);
            }
        }
        return keywords;
    }

    /// Whether a header would produce keywords at all.
    pub fn qualifies(&self, header: &str) -> bool {
        return self.has_symbol(header) || self.match_plural(&self.strip_markers(header)).is_some();
    }

    /// True if any recognized symbol occurs in the text.
    fn has_symbol(&self, text: &str) -> bool {
        return text.chars().any(|c| return self.symbols.contains(&c));
    }

    /// Split `<base>/<suffix>` into its parts, base trimmed, suffix as written.
    fn match_plural(&self, text: &str) -> Option<(String, String)> {
        let caps = self.plural.as_ref()?.captures(text)?;
        let base = collapse_whitespace(caps.name("base")?.as_str());
        let suffix = caps.name("suffix")?.as_str().to_string();
        if base.is_empty() {
            return None;
        }
        return Some((base, suffix));
    }

    /// Remove recognized symbols other than the separator, then trim.
    fn strip_markers(&self, text: &str) -> String {
        let kept: String = text
            .chars()
            .filter(|c| return *c == SEPARATOR || !self.symbols.contains(c))
            .collect();
        return collapse_whitespace(&kept);
    }

    /// Replace every recognized symbol and the separator with a space, so
    /// `Blade/Sword` keeps two words. Callers collapse the whitespace.
    fn strip_symbols(&self, text: &str) -> String {
        return text
            .chars()
            .map(|c| {
                if c == SEPARATOR || self.symbols.contains(&c) {
                    return ' ';
                }
                return c;
            })
            .collect();
    }
}

/// Trim and squeeze internal whitespace runs to a single space.
fn collapse_whitespace(text: &str) -> String {
    return text.split_whitespace().collect::<Vec<_>>().join(" ");
}
