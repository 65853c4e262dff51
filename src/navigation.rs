//! Navigation derived from the flat node list.
//!
//! A [`Site`] owns the validated pages and their [`Structure`]. Every derived
//! field is a method on [`NodeRef`], computed from that structure on each
//! call, so a value can never go stale relative to the tree it came from.
//!
//! ## Raw and navigation views
//!
//! | Raw          | Navigation       | Meaning                                  |
//! |--------------|------------------|------------------------------------------|
//! | `children`   | `nav_children`   | direct descendants                       |
//! | `siblings`   | `nav_siblings`   | sibling group, self included             |
//! | `branch`     | `nav_branch`     | ancestors from the root down to self     |
//! | `parent`     | `nav_parent`     | entry above self in the branch           |
//! | `index`      | `nav_index`      | position of self in the sibling group    |
//! |              | `nav_prev/next`  | neighbours in `nav_siblings`             |
//!
//! Navigation views keep only pages that are visible (not `hidden`, and with
//! a path) and are not redirect pages.
//!
//! ## Paths and targets
//!
//! A page's `path` joins the names of its branch below the root with `/`,
//! spaces becoming underscores. Any unnamed page in that chain leaves the
//! path undefined, which also makes the page invisible.
//!
//! A **redirect page** is the first visible page of a sibling group whose
//! nearest visible ancestor carries a `template`. It does not own a URL:
//! its `to` resolves to the nearest page in its branch that does.
//!
//! ```text
//! Home                 to = "/"
//! └── Docs  template   to = "/Docs/"
//!     ├── Intro        to = "/Docs/"               (redirect)
//!     └── Guide        to = "/Docs/Guide/"
//! ```

use crate::flatten::{FlatTree, Links, Structure};
use crate::types::Page;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("node {index} does not match the page shape: {source}")]
    Shape {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate page id '{0}'")]
    DuplicateId(String),
    #[error("structure describes {links} nodes but the list has {nodes}")]
    Mismatch { nodes: usize, links: usize },
}

/// Validated pages with their structure and id lookup.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pages: Vec<Page>,
    structure: Structure,
    kv: HashMap<String, usize>,
}

impl Site {
    /// Type the validated records and index them by id.
    pub fn build(flat: FlatTree) -> Result<Self, BuildError> {
        let FlatTree { nodes, structure } = flat;
        if nodes.len() != structure.len() {
            return Err(BuildError::Mismatch {
                nodes: nodes.len(),
                links: structure.len(),
            });
        }
        let pages = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                serde_json::from_value::<Page>(node)
                    .map_err(|source| BuildError::Shape { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut kv = HashMap::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            if kv.insert(page.id.clone(), i).is_some() {
                return Err(BuildError::DuplicateId(page.id.clone()));
            }
        }
        Ok(Self {
            pages,
            structure,
            kv,
        })
    }

    /// The single empty page published after a failed validation.
    pub(crate) fn placeholder() -> Self {
        Self {
            pages: vec![Page::default()],
            structure: Structure {
                links: vec![Links::default()],
                roots: vec![0],
            },
            kv: HashMap::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Id to list position.
    pub fn kv_nodes(&self) -> &HashMap<String, usize> {
        &self.kv
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<NodeRef<'_>> {
        self.kv.get(id).map(|&position| NodeRef {
            site: self,
            position,
        })
    }

    /// Every page in list order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.pages.len()).map(move |position| NodeRef {
            site: self,
            position,
        })
    }

    pub fn roots(&self) -> Vec<NodeRef<'_>> {
        self.wrap(&self.structure.roots)
    }

    /// Pages surfaced to consumers, with the same filter as `nav_children`.
    pub fn visible_nodes(&self) -> Vec<NodeRef<'_>> {
        filter_visible(self.nodes(), true)
    }

    /// One [`NavEntry`] per page, in list order.
    pub fn manifest(&self) -> Vec<NavEntry> {
        self.nodes().map(NavEntry::from).collect()
    }

    fn wrap(&self, positions: &[usize]) -> Vec<NodeRef<'_>> {
        positions
            .iter()
            .map(|&position| NodeRef {
                site: self,
                position,
            })
            .collect()
    }
}

/// Keep visible pages, optionally dropping redirect pages too.
pub fn filter_visible<'a>(
    nodes: impl IntoIterator<Item = NodeRef<'a>>,
    exclude_redirects: bool,
) -> Vec<NodeRef<'a>> {
    nodes
        .into_iter()
        .filter(|n| n.is_visible() && !(exclude_redirects && n.is_redirect()))
        .collect()
}

/// Exactly one leading and one trailing slash: `"guide"` → `"/guide/"`,
/// `""` → `"/"`.
pub fn normalize_to(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// A page together with the site it belongs to.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    site: &'a Site,
    position: usize,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.site, other.site) && self.position == other.position
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("position", &self.position)
            .field("id", &self.id())
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn page(&self) -> &'a Page {
        &self.site.pages[self.position]
    }

    pub fn id(&self) -> &'a str {
        &self.page().id
    }

    pub fn name(&self) -> Option<&'a str> {
        self.page().name.as_deref()
    }

    // -------------------------------------------------------------------------
    // Raw structure
    // -------------------------------------------------------------------------

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.site.structure.parent(self.position).map(|position| NodeRef {
            site: self.site,
            position,
        })
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.site.wrap(self.site.structure.children(self.position))
    }

    pub fn siblings(&self) -> Vec<NodeRef<'a>> {
        self.site.wrap(self.site.structure.siblings(self.position))
    }

    pub fn branch(&self) -> Vec<NodeRef<'a>> {
        self.site.wrap(&self.site.structure.branch(self.position))
    }

    pub fn index(&self) -> usize {
        self.site.structure.links[self.position].index
    }

    // -------------------------------------------------------------------------
    // Derived fields
    // -------------------------------------------------------------------------

    pub fn path(&self) -> Option<String> {
        let branch = self.site.structure.branch(self.position);
        let names = branch[1..]
            .iter()
            .map(|&i| self.site.pages[i].segment())
            .collect::<Option<Vec<_>>>()?;
        Some(names.join("/").replace(' ', "_"))
    }

    /// Not hidden, and has a path.
    pub fn is_visible(&self) -> bool {
        !self.page().frontmatter.hidden && self.path().is_some()
    }

    pub fn is_redirect(&self) -> bool {
        let branch = self.branch();
        let ancestors = &branch[..branch.len() - 1];
        let Some(anchor) = ancestors.iter().rev().find(|n| n.is_visible()) else {
            return false;
        };
        anchor.page().frontmatter.has_template()
            && self.siblings().into_iter().find(|n| n.is_visible()) == Some(*self)
    }

    pub fn nav_children(&self) -> Vec<NodeRef<'a>> {
        filter_visible(self.children(), true)
    }

    pub fn nav_siblings(&self) -> Vec<NodeRef<'a>> {
        filter_visible(self.siblings(), true)
    }

    pub fn nav_branch(&self) -> Vec<NodeRef<'a>> {
        filter_visible(self.branch(), true)
    }

    /// `None` when self is not in its own `nav_siblings` (hidden, pathless,
    /// or a redirect page).
    pub fn nav_index(&self) -> Option<usize> {
        self.nav_position().1
    }

    pub fn nav_next(&self) -> Option<NodeRef<'a>> {
        let (siblings, index) = self.nav_position();
        siblings.get(index? + 1).copied()
    }

    pub fn nav_prev(&self) -> Option<NodeRef<'a>> {
        let (siblings, index) = self.nav_position();
        siblings.get(index?.checked_sub(1)?).copied()
    }

    pub fn nav_parent(&self) -> Option<NodeRef<'a>> {
        let branch = self.nav_branch();
        branch.len().checked_sub(2).map(|i| branch[i])
    }

    /// Normalized URL this page is reached at.
    ///
    /// Resolves through `nav_branch`, which holds no hidden or redirect
    /// pages, so its deepest entry is the nearest page that owns a URL.
    /// A hidden page therefore resolves to its nearest visible ancestor.
    pub fn to(&self) -> Option<String> {
        self.path()?;
        let target = self.nav_branch().last().copied().unwrap_or(*self);
        target.path().map(|p| normalize_to(&p))
    }

    fn nav_position(&self) -> (Vec<NodeRef<'a>>, Option<usize>) {
        let siblings = self.nav_siblings();
        let index = siblings.iter().position(|n| n.id() == self.id());
        debug_assert!(
            index.is_some() || !self.is_visible() || self.is_redirect(),
            "visible page '{}' is missing from its own sibling list",
            self.id()
        );
        (siblings, index)
    }
}

/// Serializable snapshot of one page's derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub visible: bool,
    pub redirect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    pub branch: Vec<String>,
}

impl From<NodeRef<'_>> for NavEntry {
    fn from(node: NodeRef<'_>) -> Self {
        NavEntry {
            id: node.id().to_string(),
            name: node.name().map(str::to_string),
            path: node.path(),
            to: node.to(),
            visible: node.is_visible(),
            redirect: node.is_redirect(),
            index: node.nav_index(),
            parent: node.nav_parent().map(id_of),
            prev: node.nav_prev().map(id_of),
            next: node.nav_next().map(id_of),
            children: ids(node.nav_children()),
            branch: ids(node.nav_branch()),
        }
    }
}

fn id_of(node: NodeRef<'_>) -> String {
    node.id().to_string()
}

fn ids(nodes: Vec<NodeRef<'_>>) -> Vec<String> {
    nodes.into_iter().map(id_of).collect()
}
