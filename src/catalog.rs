//! Catalog: the loaded world and campaign documents plus the current index.
//!
//! A rebuild runs to completion on a private builder and only then replaces the
//! shared snapshot. Readers that cloned the previous `Arc` keep using it
//! undisturbed; nobody ever sees a half-built index.

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::index::KeywordIndex;
use crate::keywords::{CaseMode, KeywordRules};
use crate::loader;
use crate::resolver;
use crate::search::{self, Search};
use crate::types::{Document, LinkTarget, MatchSpan, RootKind};

/// Owner of the document sets and the published index snapshot.
#[derive(Debug)]
pub struct Catalog {
    /// Campaign documents, sorted by path.
    campaign: Vec<Document>,
    /// Case mode used by the next rebuild.
    case: CaseMode,
    /// Published snapshot; `None` until the first rebuild.
    current: Option<Arc<KeywordIndex>>,
    /// Keyword extraction table.
    rules: KeywordRules,
    /// World documents, sorted by path.
    world: Vec<Document>,
}

impl Catalog {
    /// Empty catalog with no index built yet.
    pub fn new(rules: KeywordRules, case: CaseMode) -> Self {
        return Self {
            campaign: Vec::new(),
            case,
            current: None,
            rules,
            world: Vec::new(),
        };
    }

    /// Case mode the next rebuild will use.
    pub const fn case(&self) -> CaseMode {
        return self.case;
    }

    /// Look up a loaded document.
    pub fn document(&self, root: RootKind, path: &Path) -> Option<&Document> {
        return self.documents().find(|d| return d.is_at(root, path));
    }

    /// All loaded documents, world first.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        return self.world.iter().chain(self.campaign.iter());
    }

    /// The current index.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild.
    pub fn index(&self) -> Result<&KeywordIndex, Error> {
        return self.current.as_deref().ok_or(Error::IndexUnavailable);
    }

    /// Load one root from disk, then rebuild. When loading fails the catalog
    /// and its published index are left exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns loader errors (`RootNotFound`, `RootNotDirectory`, `Io`).
    pub fn load_root(&mut self, kind: RootKind, dir: &Path) -> Result<Arc<KeywordIndex>, Error> {
        let documents = loader::load_root(dir, kind)?;
        return Ok(self.reload_root(kind, documents));
    }

    /// Targets for a keyword; empty when the keyword is absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild.
    pub fn lookup(&self, keyword: &str) -> Result<&[LinkTarget], Error> {
        return Ok(self.index()?.lookup(keyword));
    }

    /// Rebuild the index from every loaded document and publish it.
    pub fn rebuild(&mut self) -> Arc<KeywordIndex> {
        let index = Arc::new(KeywordIndex::build(self.documents(), &self.rules, self.case));
        self.current = Some(Arc::clone(&index));
        return index;
    }

    /// Replace one root's documents and rebuild.
    pub fn reload_root(&mut self, kind: RootKind, documents: Vec<Document>) -> Arc<KeywordIndex> {
        self.replace_root(kind, documents);
        return self.rebuild();
    }

    /// Replace one root's documents without rebuilding. The published index
    /// keeps describing the old documents until the next `rebuild`.
    pub fn replace_root(&mut self, kind: RootKind, mut documents: Vec<Document>) {
        documents.retain(|d| return d.root == kind);
        documents.sort_by(|a, b| return a.path.cmp(&b.path));
        tracing::debug!(root = %kind, documents = documents.len(), "root replaced");
        match kind {
            RootKind::Campaign => self.campaign = documents,
            RootKind::World => self.world = documents,
        }
    }

    /// Resolve keyword links in arbitrary text.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild.
    pub fn resolve(&self, body: &str) -> Result<Vec<MatchSpan>, Error> {
        return Ok(resolver::resolve(body, self.index()?));
    }

    /// Resolve keyword links in a loaded document's body.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild, or
    /// `Error::DocumentNotFound` if the document is not loaded.
    pub fn resolve_document(&self, root: RootKind, path: &Path) -> Result<Vec<MatchSpan>, Error> {
        let index = self.index()?;
        let document = self.document(root, path).ok_or_else(|| {
            return Error::DocumentNotFound {
                path: path.to_path_buf(),
                root,
            };
        })?;
        return Ok(resolver::resolve_document(document, index));
    }

    /// Search keywords and header text.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild.
    pub fn search(&self, query: &str) -> Result<Search<'_>, Error> {
        return Ok(search::search(query, self.index()?));
    }

    /// Switch case sensitivity. Keys were normalized at build time, so this
    /// always rebuilds.
    pub fn set_case(&mut self, case: CaseMode) -> Arc<KeywordIndex> {
        self.case = case;
        return self.rebuild();
    }

    /// A shareable handle to the current index.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexUnavailable` before the first rebuild.
    pub fn snapshot(&self) -> Result<Arc<KeywordIndex>, Error> {
        return self.current.clone().ok_or(Error::IndexUnavailable);
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::indexing_slicing, reason = "test code")]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(KeywordRules::default(), CaseMode::Insensitive)
    }

    fn world_docs() -> Vec<Document> {
        vec![
            Document::new(RootKind::World, "beasts.md", "# Dragon!\nScales.\n# Dragon Lord!\nA title.\n"),
            Document::new(RootKind::World, "places.md", "# Ember Keep*\nThe Dragon Lord rules here.\n"),
        ]
    }

    #[test]
    fn reads_before_rebuild_are_unavailable() {
        let catalog = catalog();
        assert!(matches!(catalog.resolve("Dragon"), Err(Error::IndexUnavailable)));
        assert!(matches!(catalog.search("dra"), Err(Error::IndexUnavailable)));
        assert!(matches!(catalog.lookup("dragon"), Err(Error::IndexUnavailable)));
        assert!(matches!(catalog.snapshot(), Err(Error::IndexUnavailable)));
    }

    #[test]
    fn empty_rebuild_is_available_but_empty() {
        let mut catalog = catalog();
        catalog.rebuild();
        assert!(catalog.resolve("Dragon").unwrap().is_empty());
        assert_eq!(catalog.search("dra").unwrap().count(), 0);
    }

    #[test]
    fn resolves_documents_after_rebuild() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        let spans = catalog.resolve_document(RootKind::World, Path::new("places.md")).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].keyword, "dragon lord");
    }

    #[test]
    fn unknown_document_is_reported() {
        let mut catalog = catalog();
        catalog.rebuild();
        let err = catalog.resolve_document(RootKind::Campaign, Path::new("nope.md")).unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { .. }));
    }

    #[test]
    fn old_snapshot_survives_a_rebuild() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        let before = catalog.snapshot().unwrap();
        catalog.reload_root(RootKind::World, Vec::new());
        assert_eq!(before.lookup("dragon").len(), 1);
        assert!(catalog.lookup("dragon").unwrap().is_empty());
    }

    #[test]
    fn roots_reload_independently() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        catalog.reload_root(
            RootKind::Campaign,
            vec![Document::new(RootKind::Campaign, "npcs.md", "# Dragon*\nAn alias.\n")],
        );
        let targets = catalog.lookup("Dragon").unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].document.root, RootKind::World);
        assert_eq!(targets[1].document.root, RootKind::Campaign);

        catalog.reload_root(RootKind::Campaign, Vec::new());
        assert_eq!(catalog.lookup("Dragon").unwrap().len(), 1);
    }

    #[test]
    fn switching_case_rebuilds() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        assert_eq!(catalog.lookup("dragon").unwrap().len(), 1);
        catalog.set_case(CaseMode::Sensitive);
        assert!(catalog.lookup("dragon").unwrap().is_empty());
        assert_eq!(catalog.lookup("Dragon").unwrap().len(), 1);
    }

    #[test]
    fn failed_load_keeps_previous_index() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        let missing = Path::new("/definitely/not/a/lorelink/root");
        assert!(catalog.load_root(RootKind::World, missing).is_err());
        assert_eq!(catalog.lookup("dragon").unwrap().len(), 1);
    }

    #[test]
    fn snapshot_is_shareable_across_threads() {
        let mut catalog = catalog();
        catalog.reload_root(RootKind::World, world_docs());
        let snapshot = catalog.snapshot().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&snapshot);
                std::thread::spawn(move || resolver::resolve("the Dragon Lord", &index).len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
