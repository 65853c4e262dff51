//! Shared test utilities for the pagetree test suite.
//!
//! Provides fixture loading, panicking lookups, and navigation tree
//! assertions that work with [`Site`] and [`NodeRef`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = fixture_site();
//! let guide = node(&site, "guide");
//! assert_eq!(guide.to().as_deref(), Some("/Docs/Getting_Started/"));
//!
//! assert_nav_shape(&site, &[
//!     ("Docs", &["Getting Started"]),
//!     ("Blog", &["First Post", "Second Post"]),
//!     ("About", &[]),
//! ]);
//! ```

use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

use crate::flatten::{FlatJsonTree, Flattener};
use crate::navigation::{NodeRef, Site};

// =========================================================================
// Fixture setup
// =========================================================================

/// The nested tree in `fixtures/tree.json`.
pub fn load_fixture_tree() -> Vec<Value> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/tree.json");
    let content = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// The fixture tree flattened and built without validation.
pub fn fixture_site() -> Site {
    Site::build(FlatJsonTree.flatten(load_fixture_tree())).unwrap()
}

/// Copy `fixtures/content/` to a temp directory and return it.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by id. Panics if not found.
pub fn node<'a>(site: &'a Site, id: &str) -> NodeRef<'a> {
    site.get(id).unwrap_or_else(|| {
        let ids: Vec<&str> = site.nodes().map(|n| n.id()).collect();
        panic!("page '{id}' not found. Available: {ids:?}")
    })
}

/// Find a page by name. Panics if not found.
pub fn named<'a>(site: &'a Site, name: &str) -> NodeRef<'a> {
    site.nodes()
        .find(|n| n.name() == Some(name))
        .unwrap_or_else(|| {
            let names: Vec<Option<&str>> = site.nodes().map(|n| n.name()).collect();
            panic!("page named '{name}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

pub fn id_list<'a>(nodes: &[NodeRef<'a>]) -> Vec<&'a str> {
    nodes.iter().map(|n| n.id()).collect()
}

pub fn name_list<'a>(nodes: &[NodeRef<'a>]) -> Vec<&'a str> {
    nodes.iter().map(|n| n.name().unwrap_or("")).collect()
}

// =========================================================================
// Navigation helpers
// =========================================================================

/// Assert the navigation below the first root matches an expected shape.
///
/// Each entry is `(name, child names)`. Use `&[]` for leaves.
pub fn assert_nav_shape(site: &Site, expected: &[(&str, &[&str])]) {
    let root = site.roots()[0];
    let top = root.nav_children();
    let expected_names: Vec<&str> = expected.iter().map(|(n, _)| *n).collect();
    assert_eq!(name_list(&top), expected_names, "top-level navigation mismatch");

    for ((name, children), actual) in expected.iter().zip(&top) {
        assert_eq!(
            name_list(&actual.nav_children()),
            children.to_vec(),
            "navigation children of '{name}' mismatch"
        );
    }
}
