//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Navigation
//! 001 Home → /
//!     001 Docs → /Docs/
//!         --- Introduction → /Docs/ (redirect)
//!         001 Getting Started → /Docs/Getting_Started/
//!     002 Blog → /Blog/
//!
//! Hidden
//!     Drafts → /Docs/
//!
//! Unreachable
//!     (unnamed) [orphan]
//! ```
//!
//! Indices are 1-based positions in the navigation sibling list. Redirect
//! pages have no position of their own and are marked `---`.
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` for testability and has a
//! `print_*` wrapper that writes to stdout.

use crate::navigation::{NodeRef, Site};
use crate::store::ReplaceOutcome;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_name<'a>(node: &NodeRef<'a>) -> &'a str {
    match node.name() {
        Some(name) if !name.is_empty() => name,
        _ => "(unnamed)",
    }
}

fn nav_line(node: &NodeRef<'_>, depth: usize) -> String {
    let to = node.to().unwrap_or_default();
    match node.nav_index() {
        Some(i) => format!(
            "{}{} {} → {}",
            indent(depth),
            format_index(i + 1),
            display_name(node),
            to
        ),
        None => format!("{}--- {} → {} (redirect)", indent(depth), display_name(node), to),
    }
}

fn format_subtree(node: NodeRef<'_>, depth: usize, lines: &mut Vec<String>) {
    lines.push(nav_line(&node, depth));
    for child in node.children().into_iter().filter(|c| c.is_visible()) {
        format_subtree(child, depth + 1, lines);
    }
}

/// Navigation tree, then hidden and unreachable pages.
pub fn format_nav(site: &Site) -> Vec<String> {
    let mut lines = vec!["Navigation".to_string()];
    for root in site.roots().into_iter().filter(|r| r.is_visible()) {
        format_subtree(root, 0, &mut lines);
    }

    let hidden: Vec<NodeRef<'_>> = site
        .nodes()
        .filter(|n| n.page().frontmatter.hidden && n.path().is_some())
        .collect();
    if !hidden.is_empty() {
        lines.push(String::new());
        lines.push("Hidden".to_string());
        for node in &hidden {
            lines.push(format!(
                "{}{} → {}",
                indent(1),
                display_name(node),
                node.to().unwrap_or_default()
            ));
        }
    }

    let unreachable: Vec<NodeRef<'_>> = site.nodes().filter(|n| n.path().is_none()).collect();
    if !unreachable.is_empty() {
        lines.push(String::new());
        lines.push("Unreachable".to_string());
        for node in &unreachable {
            lines.push(format!("{}{} [{}]", indent(1), display_name(node), node.id()));
        }
    }
    lines
}

pub fn print_nav(site: &Site) {
    for line in format_nav(site) {
        println!("{}", line);
    }
}

/// One-line summary of a tree replacement.
pub fn format_outcome(outcome: ReplaceOutcome) -> String {
    match outcome {
        ReplaceOutcome::Published { nodes: 1 } => "Published 1 node".to_string(),
        ReplaceOutcome::Published { nodes } => format!("Published {} nodes", nodes),
        ReplaceOutcome::Reset => "Validation failed: tree reset to placeholder".to_string(),
        ReplaceOutcome::Superseded => "Superseded by a newer tree".to_string(),
    }
}

pub fn print_outcome(outcome: ReplaceOutcome) {
    println!("{}", format_outcome(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn nav_lists_visible_tree_with_targets() {
        let lines = format_nav(&fixture_site());
        assert_eq!(
            lines[..9],
            [
                "Navigation",
                "001 Home → /",
                "    001 Docs → /Docs/",
                "        --- Introduction → /Docs/ (redirect)",
                "        001 Getting Started → /Docs/Getting_Started/",
                "    002 Blog → /Blog/",
                "        001 First Post → /Blog/First_Post/",
                "        002 Second Post → /Blog/Second_Post/",
                "    003 About → /About/",
            ]
        );
    }

    #[test]
    fn nav_lists_hidden_pages_with_parent_target() {
        let lines = format_nav(&fixture_site());
        let at = lines.iter().position(|l| l == "Hidden").unwrap();
        assert_eq!(lines[at + 1], "    Drafts → /Docs/");
    }

    #[test]
    fn nav_lists_unreachable_pages_by_id() {
        let lines = format_nav(&fixture_site());
        let at = lines.iter().position(|l| l == "Unreachable").unwrap();
        assert_eq!(lines[at + 1..], ["    (unnamed) [orphan]", "    Lost [lost]"]);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            format_outcome(ReplaceOutcome::Published { nodes: 1 }),
            "Published 1 node"
        );
        assert_eq!(
            format_outcome(ReplaceOutcome::Published { nodes: 4 }),
            "Published 4 nodes"
        );
        assert!(format_outcome(ReplaceOutcome::Reset).contains("placeholder"));
    }

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(7), "007");
        assert_eq!(format_index(1234), "1234");
    }
}
