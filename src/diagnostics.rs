use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::RootKind;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DocumentNotFound { root, path } => render_document_not_found(*root, path),
        Error::IndexUnavailable => render_index_unavailable(),
        Error::InvalidRule { reason } => render_invalid_rule(reason),
        Error::NoRootsConfigured => render_no_roots(),
        Error::RootNotDirectory { kind, path } => render_bad_root(*kind, path, "is not a directory"),
        Error::RootNotFound { kind, path } => render_bad_root(*kind, path, "does not exist"),
        _ => render_generic(e),
    };
}

/// Variants that need no fix-up advice beyond the message itself.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Create one with:

    lorelink --config {} --world path/to/world init
", path.display(), path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::TomlSer(e) => format!("\
# Error: TOML Serialization

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_bad_root(kind: RootKind, path: &Path, problem: &str) -> String {
    return format!("\
# Error: Bad {kind} Root

`{}` {problem}.

## Fix

Point `{kind}_dir` in `{CONFIG_FILE}` at a folder of markdown notes, or pass:

    lorelink --{kind} path/to/{kind} index
", path.display());
}

fn render_document_not_found(root: RootKind, path: &Path) -> String {
    return format!("\
# Error: Document Not Loaded

`{root}:{}` is not part of the loaded notes.

## Fix

Paths are relative to the {root} root. Files starting with `_` and files
without a `.md` extension are never loaded.
", path.display());
}

fn render_index_unavailable() -> String {
    return "\
# Error: Index Unavailable

No documents have been indexed yet, so there is nothing to link or search.

## Fix

Load a root first, for example:

    lorelink --world path/to/world index
"
    .to_string();
}

fn render_invalid_rule(reason: &str) -> String {
    return format!("\
# Error: Invalid Keyword Rule

{reason}

## Fix

Check the `[keywords]` table in `{CONFIG_FILE}`:

    [keywords]
    symbols = [\"!\", \"*\", \"/\"]
    plural_suffixes = [\"s\", \"es\"]
");
}

fn render_no_roots() -> String {
    return format!("\
# Error: No Roots Configured

Neither a world nor a campaign directory is set.

## Fix

Pass `--world` and/or `--campaign`, or save them to `{CONFIG_FILE}`:

    lorelink --world path/to/world --campaign path/to/campaign init
");
}
