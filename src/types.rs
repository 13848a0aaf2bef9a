/// Core domain types for lorelink documents, headers, targets, and matches.
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Stable identity of a loaded document: which root it came from and its
/// path relative to that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId {
    /// Path relative to the root directory.
    pub path: PathBuf,
    /// Root set the document belongs to.
    pub root: RootKind,
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.root, self.path.display());
    }
}

/// A markdown file as supplied by the directory loader.
/// Immutable once loaded; a reload replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the root directory.
    pub path: PathBuf,
    /// Root set the document belongs to.
    pub root: RootKind,
    /// Raw file contents.
    pub text: String,
}

impl Document {
    /// Build a document from its parts.
    pub fn new(root: RootKind, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        return Self {
            path: path.into(),
            root,
            text: text.into(),
        };
    }

    /// The `(root, path)` identity of this document.
    pub fn id(&self) -> DocumentId {
        return DocumentId {
            path: self.path.clone(),
            root: self.root,
        };
    }

    /// True when this document lives at `path` under `root`.
    pub fn is_at(&self, root: RootKind, path: &Path) -> bool {
        return self.root == root && self.path == path;
    }
}

/// One markdown header line. Created by the header scanner, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    /// Section identifier, unique within the document.
    pub anchor: String,
    /// Nesting level, `1..=MAX_HEADER_LEVEL`.
    pub level: u8,
    /// One-based line number of the header.
    pub line: u32,
    /// Byte offset immediately after the header line.
    pub offset: usize,
    /// First few lines of the section body, for result listings.
    pub preview: String,
    /// Header text with the `#` markers removed and whitespace trimmed.
    pub text: String,
}

/// A header retained in the index for text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedHeader {
    /// Visible header text (symbols stripped).
    pub display: String,
    /// First few lines of the section body.
    pub preview: String,
    /// Whether the header produced at least one keyword.
    pub qualified: bool,
    /// Where the header lives.
    pub target: LinkTarget,
}

/// Navigation value for the presentation layer: open `document`, then scroll
/// to `offset` (or `anchor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jump {
    /// Section identifier to scroll to.
    pub anchor: String,
    /// Document to open.
    pub document: DocumentId,
    /// One-based header line.
    pub line: u32,
    /// Byte offset just past the header line.
    pub offset: usize,
}

/// A place a keyword navigates to: a document section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkTarget {
    /// Section identifier within the document.
    pub anchor: String,
    /// Document containing the section.
    pub document: DocumentId,
    /// Visible header text of the section.
    pub header: String,
    /// One-based header line.
    pub line: u32,
    /// Byte offset just past the header line.
    pub offset: usize,
}

impl LinkTarget {
    /// Pure click-to-jump mapping.
    pub fn jump(&self) -> Jump {
        return Jump {
            anchor: self.anchor.clone(),
            document: self.document.clone(),
            line: self.line,
            offset: self.offset,
        };
    }
}

/// An occurrence of an indexed keyword inside resolved text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    /// Normalized keyword that matched.
    pub keyword: String,
    /// Byte range of the occurrence in the resolved text.
    pub range: Range<usize>,
    /// Single target, or the candidates the user has to pick from.
    pub resolution: Resolution,
}

impl MatchSpan {
    /// Every target this span may lead to, in index order.
    pub fn candidates(&self) -> &[LinkTarget] {
        return match &self.resolution {
            Resolution::Ambiguous(targets) => targets,
            Resolution::Unique(target) => std::slice::from_ref(target),
        };
    }

    /// Jump for an unambiguous span. Ambiguous spans return `None`; the
    /// caller must ask the user to choose among `candidates()`.
    pub fn jump(&self) -> Option<Jump> {
        return match &self.resolution {
            Resolution::Ambiguous(_) => None,
            Resolution::Unique(target) => Some(target.jump()),
        };
    }
}

/// Outcome of resolving a keyword occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "targets", rename_all = "snake_case")]
pub enum Resolution {
    /// Several sections share the keyword; the choice is deferred.
    Ambiguous(Vec<LinkTarget>),
    /// Exactly one section carries the keyword.
    Unique(LinkTarget),
}

/// Which logical document set a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    /// Setting material shared across campaigns.
    World,
    /// Notes for one running campaign.
    Campaign,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            RootKind::Campaign => f.write_str("campaign"),
            RootKind::World => f.write_str("world"),
        };
    }
}
