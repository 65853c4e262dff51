//! Content directory scanning.
//!
//! Builds the nested tree the store consumes from a directory of markdown
//! files, so a site can be kept on disk instead of in a JSON document.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Root page
//! ├── index.md                     # Frontmatter for the root (optional)
//! ├── pagetree.toml                # Store config (ignored by the scan)
//! ├── 010-Docs/                    # Page with children
//! │   ├── index.md                 # +++ template = "section" +++
//! │   ├── 010-Introduction.md      # Leaf page (redirect target of Docs)
//! │   ├── 020-Getting-Started.md
//! │   └── drafts.md                # Unnumbered = hidden
//! ├── 020-Blog/
//! │   ├── 010-First-Post.md
//! │   └── 020-Second-Post.md
//! └── 030-About.md
//! ```
//!
//! ## Frontmatter
//!
//! A markdown file may open with a TOML block between `+++` lines. Its keys
//! become the page's frontmatter, except `id`, which becomes the page id.
//! A directory's frontmatter lives in its `index.md`.
//!
//! ```text
//! +++
//! id = "docs"
//! template = "section"
//! +++
//! # Documentation
//! ```
//!
//! ## Naming
//!
//! Entries follow the [`crate::naming`] convention: numbered entries appear
//! in navigation in prefix order, unnumbered entries get `hidden = true`
//! unless their frontmatter sets `hidden` itself.

use crate::config::CONFIG_FILE;
use crate::naming::{parse_entry_name, sort_key};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Frontmatter error in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unterminated frontmatter block in {0}")]
    Unterminated(PathBuf),
    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),
}

const INDEX_FILE: &str = "index.md";

/// Scan `root` into a nested tree with a single root page.
pub fn scan(root: &Path) -> Result<Vec<Value>, ScanError> {
    let name = root
        .file_name()
        .map(|n| parse_entry_name(&n.to_string_lossy()).name)
        .unwrap_or_default();
    let node = scan_directory(root, root, name, false)?;
    Ok(vec![node])
}

fn scan_directory(
    path: &Path,
    root: &Path,
    name: String,
    hidden: bool,
) -> Result<Value, ScanError> {
    let index = path.join(INDEX_FILE);
    let frontmatter = if index.is_file() {
        read_frontmatter(&index)?
    } else {
        Map::new()
    };

    let mut children = Vec::new();
    for entry in collect_entries(path)? {
        let stem = entry_stem(&entry);
        let parsed = parse_entry_name(&stem);
        let hidden = !parsed.is_numbered();
        if entry.is_dir() {
            children.push(scan_directory(&entry, root, parsed.name, hidden)?);
        } else {
            let frontmatter = read_frontmatter(&entry)?;
            children.push(page_node(&entry, root, parsed.name, hidden, frontmatter));
        }
    }

    let mut node = page_node(path, root, name, hidden, frontmatter);
    if !children.is_empty()
        && let Value::Object(map) = &mut node
    {
        map.insert("children".into(), Value::Array(children));
    }
    Ok(node)
}

fn page_node(
    path: &Path,
    root: &Path,
    name: String,
    hidden: bool,
    mut frontmatter: Map<String, Value>,
) -> Value {
    let mut node = Map::new();
    if let Some(id) = frontmatter.remove("id") {
        node.insert("id".into(), id);
    }
    if hidden && !frontmatter.contains_key("hidden") {
        frontmatter.insert("hidden".into(), Value::Bool(true));
    }
    let source = path
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    debug!(%source, %name, hidden, "scanned entry");

    node.insert("name".into(), Value::String(name));
    node.insert("source".into(), Value::String(source));
    node.insert("frontmatter".into(), Value::Object(frontmatter));
    Value::Object(node)
}

/// Subdirectories and markdown pages of `path`, in sibling order.
fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if name.starts_with('.') || name == CONFIG_FILE || name == INDEX_FILE {
                return false;
            }
            if p.is_dir() {
                return !is_symlink(p);
            }
            is_markdown(p)
        })
        .collect();

    entries.sort_by_key(|p| sort_key(&entry_stem(p)));
    Ok(entries)
}

/// Symlinked directories are skipped so a link back up the tree cannot
/// recurse forever.
fn is_symlink(path: &Path) -> bool {
    let linked = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    if linked {
        debug!(path = %path.display(), "skipping symlinked directory");
    }
    linked
}

fn is_markdown(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

fn entry_stem(path: &Path) -> String {
    let stem = if path.is_dir() {
        path.file_name()
    } else {
        path.file_stem()
    };
    stem.map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Parse the `+++` TOML block at the top of a markdown file.
///
/// Returns an empty map when the file has no block.
fn read_frontmatter(path: &Path) -> Result<Map<String, Value>, ScanError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("+++") {
        return Ok(Map::new());
    }

    let mut block = Vec::new();
    for line in lines {
        if line.trim_end() == "+++" {
            let table: toml::Table =
                toml::from_str(&block.join("\n")).map_err(|source| ScanError::Frontmatter {
                    path: path.to_path_buf(),
                    source,
                })?;
            return match serde_json::to_value(table)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            };
        }
        block.push(line);
    }
    Err(ScanError::Unterminated(path.to_path_buf()))
}
