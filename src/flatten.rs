//! Conversion between the nested tree and the flat node list.
//!
//! The nested form is what hosts edit: an ordered array of JSON objects whose
//! `children` arrays hold their descendants. The flat form is a pre-order
//! list of records (with `children` removed) plus a [`Structure`] describing
//! how the records link together by position.
//!
//! ```text
//! [{ name: "Home", children: [          nodes[0] Home     parent None
//!     { name: "Docs", children: [        nodes[1] Docs     parent 0
//!         { name: "Guide" } ] },         nodes[2] Guide    parent 1
//!     { name: "About" } ] }]             nodes[3] About    parent 0
//! ```

use serde_json::Value;

/// Position of one record in the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Links {
    pub parent: Option<usize>,
    /// Direct descendants in order.
    pub children: Vec<usize>,
    /// Position among siblings.
    pub index: usize,
}

/// Structural links for a flat list, addressed by list position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub links: Vec<Links>,
    /// Top-level nodes in order.
    pub roots: Vec<usize>,
}

impl Structure {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.links[node].parent
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.links[node].children
    }

    /// Ordered sibling group, including `node` itself.
    pub fn siblings(&self, node: usize) -> &[usize] {
        match self.links[node].parent {
            Some(parent) => &self.links[parent].children,
            None => &self.roots,
        }
    }

    /// Ancestor chain from the root down to `node`, inclusive.
    pub fn branch(&self, node: usize) -> Vec<usize> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.links[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }
}

/// Flat records plus their structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTree {
    pub nodes: Vec<Value>,
    pub structure: Structure,
}

/// Turns a nested tree into a [`FlatTree`].
pub trait Flattener {
    fn flatten(&self, tree: Vec<Value>) -> FlatTree;
}

/// Pre-order flattener over `children` arrays.
///
/// Values that are not objects, and `children` keys that are not arrays,
/// are passed through untouched for the validation gate to judge.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatJsonTree;

impl Flattener for FlatJsonTree {
    fn flatten(&self, tree: Vec<Value>) -> FlatTree {
        let mut flat = FlatTree::default();
        for (index, node) in tree.into_iter().enumerate() {
            let i = push_node(&mut flat, node, None, index);
            flat.structure.roots.push(i);
        }
        flat
    }
}

fn push_node(flat: &mut FlatTree, mut node: Value, parent: Option<usize>, index: usize) -> usize {
    let children = match &mut node {
        Value::Object(map) if matches!(map.get("children"), Some(Value::Array(_))) => {
            match map.remove("children") {
                Some(Value::Array(children)) => children,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    };

    let i = flat.nodes.len();
    flat.nodes.push(node);
    flat.structure.links.push(Links {
        parent,
        children: Vec::with_capacity(children.len()),
        index,
    });

    for (k, child) in children.into_iter().enumerate() {
        let c = push_node(flat, child, Some(i), k);
        flat.structure.links[i].children.push(c);
    }
    i
}

/// Rebuild the nested tree from flat records.
///
/// Nodes with descendants get a `children` array; leaves get none.
pub fn unflatten(nodes: &[Value], structure: &Structure) -> Vec<Value> {
    structure
        .roots
        .iter()
        .map(|&root| nest(nodes, structure, root))
        .collect()
}

fn nest(nodes: &[Value], structure: &Structure, node: usize) -> Value {
    let mut value = nodes[node].clone();
    let children = structure.children(node);
    if !children.is_empty()
        && let Value::Object(map) = &mut value
    {
        let nested = children
            .iter()
            .map(|&c| nest(nodes, structure, c))
            .collect();
        map.insert("children".to_string(), Value::Array(nested));
    }
    value
}
