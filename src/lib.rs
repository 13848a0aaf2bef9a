//! Keyword cross-references for markdown worldbuilding notes.
//!
//! Headers marked with a symbol (`## Dragon!`, `## *Ember Keep*`) or a plural
//! marker (`## Sword/s`) become keywords. Mentions of those keywords in body
//! text resolve to the section that defines them.
//!
//! The pipeline, leaves first:
//!
//! - [`scanner`] splits a document into header records.
//! - [`keywords`] decides which headers qualify and what they are called.
//! - [`index`] maps each keyword to its ordered set of targets.
//! - [`resolver`] finds keyword mentions in text.
//! - [`search`] ranks keywords and headers for a query.
//! - [`catalog`] ties them together behind a rebuildable snapshot.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod keywords;
pub mod loader;
pub mod resolver;
pub mod scanner;
pub mod search;
pub mod types;

pub use catalog::Catalog;
pub use error::Error;
pub use index::{IndexBuilder, KeywordEntry, KeywordIndex};
pub use keywords::{CaseMode, KeywordRules};
pub use types::{Document, DocumentId, HeaderRecord, Jump, LinkTarget, MatchSpan, Resolution, RootKind};
