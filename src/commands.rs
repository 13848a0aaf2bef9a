//! CLI commands for lorelink: init, index, lookup, links, search, headers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Error;
use crate::types::{LinkTarget, MatchSpan, Resolution, RootKind};

/// Exit code when a lookup or search finds nothing.
const NO_RESULTS: u8 = 1;

/// Load every configured root into a fresh catalog and build the index.
///
/// # Errors
///
/// Returns `Error::NoRootsConfigured` when neither root is set, plus any
/// rule or loader error.
pub fn open_catalog(config: &Config) -> Result<Catalog, Error> {
    if config.world_dir.is_none() && config.campaign_dir.is_none() {
        return Err(Error::NoRootsConfigured);
    }

    let mut catalog = Catalog::new(config.rules()?, config.case_mode());
    let roots = [
        (RootKind::World, config.world_dir.as_deref()),
        (RootKind::Campaign, config.campaign_dir.as_deref()),
    ];
    for (kind, dir) in roots {
        if let Some(dir) = dir {
            let documents = crate::loader::load_root(dir, kind)?;
            catalog.replace_root(kind, documents);
        }
    }
    catalog.rebuild();

    return Ok(catalog);
}

/// Print every scanned header with its location.
///
/// # Errors
///
/// Returns `Error::IndexUnavailable` if the catalog was never built.
pub fn headers(catalog: &Catalog) -> Result<ExitCode, Error> {
    let index = catalog.index()?;
    for header in index.headers() {
        let marker = if header.qualified { "*" } else { " " };
        println!("{marker} {}:{}  {}", header.target.document, header.target.line, header.display);
    }
    return Ok(ExitCode::SUCCESS);
}

/// List every keyword and where it points.
///
/// # Errors
///
/// Returns `Error::IndexUnavailable` if the catalog was never built.
pub fn index(catalog: &Catalog, json: bool) -> Result<ExitCode, Error> {
    let index = catalog.index()?;

    if json {
        let entries: Vec<_> = index.keywords().collect();
        print_json(&entries);
        return Ok(ExitCode::SUCCESS);
    }

    for entry in index.keywords() {
        let flag = if entry.is_ambiguous() { "  (ambiguous)" } else { "" };
        println!("{}{flag}", entry.display);
        for target in &entry.targets {
            println!("    {}", describe_target(target));
        }
    }

    let ambiguous = index.ambiguous().count();
    println!();
    println!(
        "{} keywords from {} documents, {ambiguous} ambiguous",
        index.len(),
        index.document_count()
    );
    return Ok(ExitCode::SUCCESS);
}

/// Write the effective configuration to `path`.
///
/// # Errors
///
/// Returns `Error::TomlSer` or `Error::Io` if the file cannot be written.
pub fn init(config: &Config, path: &Path) -> Result<ExitCode, Error> {
    config.save(path)?;
    println!("Wrote {}", path.display());
    return Ok(ExitCode::SUCCESS);
}

/// Resolve the links inside one document.
///
/// `reference` is `world:path`, `campaign:path`, or a bare path looked up in
/// the world root first, then the campaign root.
///
/// # Errors
///
/// Returns `Error::DocumentNotFound` if no loaded document matches.
pub fn links(catalog: &Catalog, reference: &str, json: bool) -> Result<ExitCode, Error> {
    let (root, path) = locate_document(catalog, reference)?;
    let spans = catalog.resolve_document(root, &path)?;
    let Some(document) = catalog.document(root, &path) else {
        return Err(Error::DocumentNotFound { path, root });
    };

    let rows: Vec<LinkRow<'_>> = spans.iter().map(|span| return LinkRow::new(&document.text, span)).collect();
    if json {
        print_json(&rows);
        return Ok(ExitCode::SUCCESS);
    }

    for row in &rows {
        let targets: Vec<String> = row.span.candidates().iter().map(describe_target).collect();
        match &row.span.resolution {
            Resolution::Ambiguous(_) => {
                println!("{}:{}  {}  -> one of:", row.line, row.column, row.text);
                for target in targets {
                    println!("    {target}");
                }
            },
            Resolution::Unique(_) => {
                println!("{}:{}  {}  -> {}", row.line, row.column, row.text, targets.join(""));
            },
        }
    }
    eprintln!("{} links in {root}:{}", rows.len(), path.display());
    return Ok(ExitCode::SUCCESS);
}

/// Print the targets of one keyword.
///
/// # Errors
///
/// Returns `Error::IndexUnavailable` if the catalog was never built.
pub fn lookup(catalog: &Catalog, keyword: &str) -> Result<ExitCode, Error> {
    let targets = catalog.lookup(keyword)?;
    if targets.is_empty() {
        eprintln!("No keyword `{keyword}`.");
        return Ok(ExitCode::from(NO_RESULTS));
    }
    for target in targets {
        println!("{}", describe_target(target));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Search keywords and headers, printing the best `limit` hits.
///
/// # Errors
///
/// Returns `Error::IndexUnavailable` if the catalog was never built.
pub fn search(catalog: &Catalog, query: &str, limit: usize, json: bool) -> Result<ExitCode, Error> {
    let hits: Vec<_> = catalog.search(query)?.take(limit).collect();
    if hits.is_empty() {
        eprintln!("No matches for `{query}`.");
        return Ok(ExitCode::from(NO_RESULTS));
    }

    if json {
        print_json(&hits);
        return Ok(ExitCode::SUCCESS);
    }

    for hit in &hits {
        let places: Vec<String> = hit.targets.iter().map(describe_target).collect();
        println!("{}  [{}]", hit.label, places.join(", "));
        if !hit.preview.is_empty() {
            println!("    {}", hit.preview);
        }
    }
    return Ok(ExitCode::SUCCESS);
}

/// One resolved link, positioned for humans.
#[derive(Serialize)]
struct LinkRow<'a> {
    /// One-based column, in characters.
    column: usize,
    /// One-based line.
    line: usize,
    /// The matched span and its targets.
    span: &'a MatchSpan,
    /// Matched text as written in the document.
    text: &'a str,
}

impl<'a> LinkRow<'a> {
    /// Locate `span` inside `text`.
    fn new(text: &'a str, span: &'a MatchSpan) -> Self {
        let before = text.get(..span.range.start).unwrap_or_default();
        let line_start = before.rfind('\n').map_or(0, |i| return i.saturating_add(1));
        let column = before.get(line_start..).unwrap_or_default().chars().count().saturating_add(1);
        let line = before.matches('\n').count().saturating_add(1);
        return Self {
            column,
            line,
            span,
            text: text.get(span.range.clone()).unwrap_or_default(),
        };
    }
}

/// `world:beasts.md#dragon (line 3)`.
fn describe_target(target: &LinkTarget) -> String {
    return format!("{}#{} (line {})", target.document, target.anchor, target.line);
}

/// Split an optional `world:`/`campaign:` prefix and find the document.
///
/// # Errors
///
/// Returns `Error::DocumentNotFound` if neither root holds the path.
fn locate_document(catalog: &Catalog, reference: &str) -> Result<(RootKind, PathBuf), Error> {
    let (roots, raw_path): (&[RootKind], &str) = if let Some(rest) = reference.strip_prefix("world:") {
        (&[RootKind::World][..], rest)
    } else if let Some(rest) = reference.strip_prefix("campaign:") {
        (&[RootKind::Campaign][..], rest)
    } else {
        (&[RootKind::World, RootKind::Campaign][..], reference)
    };

    let path = PathBuf::from(raw_path);
    for &root in roots {
        if catalog.document(root, &path).is_some() {
            return Ok((root, path));
        }
    }

    let root = roots.first().copied().unwrap_or(RootKind::World);
    return Err(Error::DocumentNotFound { path, root });
}

/// Pretty-print any serializable value as JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) {
    // serde_json::to_string_pretty won't fail on these structures.
    let json = serde_json::to_string_pretty(value).unwrap_or_default();
    println!("{json}");
}
