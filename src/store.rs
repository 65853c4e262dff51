//! The store: one content tree and the views derived from it.
//!
//! Every replacement of the tree runs the same pipeline, and nothing is
//! published until all of it has succeeded:
//!
//! ```text
//! replace_tree(tree)
//!   └─ begin_replace   flatten, stamp a new revision      → Pending
//!      └─ validate     defaults, coercion, schema check   → Validated
//!         └─ commit    revision still latest?  no  → Superseded
//!                      valid + ids unique?     no  → Reset to [{}]
//!                      publish tree, nodes, kv, navigation → Published
//! ```
//!
//! Hosts that validate on another thread or behind an async boundary call
//! the three steps themselves. A tree that arrives while an older one is
//! still validating gets a newer revision, and the older result is dropped
//! at commit time.
//!
//! A failed validation never publishes partial data: the tree becomes a
//! single empty placeholder and navigation is unavailable until the next
//! successful replacement.

use crate::config::StoreConfig;
use crate::flatten::{FlatJsonTree, FlatTree, Flattener, unflatten};
use crate::navigation::{NodeRef, Site};
use crate::schema::SchemaId;
use crate::types::{Credential, Page};
use crate::validate::{SchemaError, SchemaValidator, Validator};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What a replacement did to the published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Published { nodes: usize },
    /// Validation failed; the placeholder is published.
    Reset,
    /// A newer replacement started first; nothing changed.
    Superseded,
}

/// A flattened tree waiting for validation.
#[derive(Debug)]
pub struct Pending {
    revision: u64,
    flat: FlatTree,
}

impl Pending {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Run the node-list schema over the flat records.
    pub fn validate(self, validator: &dyn Validator) -> Validated {
        let Pending { revision, mut flat } = self;
        let mut list = Value::Array(std::mem::take(&mut flat.nodes));
        let valid = validator.validate(SchemaId::Nodes, &mut list);
        match list {
            Value::Array(nodes) => flat.nodes = nodes,
            // A validator that swaps the list for something else has failed it.
            _ => {
                return Validated {
                    revision,
                    flat,
                    valid: false,
                };
            }
        }
        Validated {
            revision,
            flat,
            valid,
        }
    }
}

/// A flattened tree with its validation verdict.
#[derive(Debug)]
pub struct Validated {
    revision: u64,
    flat: FlatTree,
    valid: bool,
}

impl Validated {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

pub struct Store {
    flattener: Box<dyn Flattener>,
    validator: Box<dyn Validator>,
    tree: Vec<Value>,
    site: Site,
    reset: bool,
    revision: u64,
}

impl Store {
    /// An empty store. Nothing is flattened or validated until the first
    /// replacement.
    pub fn new(flattener: Box<dyn Flattener>, validator: Box<dyn Validator>) -> Self {
        Self {
            flattener,
            validator,
            tree: Vec::new(),
            site: Site::default(),
            reset: false,
            revision: 0,
        }
    }

    /// Store with the built-in flattener and a schema validator set up from
    /// `config`.
    pub fn from_config(config: &StoreConfig) -> Result<Self, SchemaError> {
        let validator = SchemaValidator::new(config.validation, Box::new(config.ids.generator()))?;
        Ok(Self::new(Box::new(FlatJsonTree), Box::new(validator)))
    }

    /// Replace the whole tree and run the pipeline to completion.
    pub fn replace_tree(&mut self, tree: Vec<Value>) -> ReplaceOutcome {
        let pending = self.begin_replace(tree);
        let validated = pending.validate(self.validator.as_ref());
        self.commit(validated)
    }

    /// Flatten `tree` and stamp it as the latest revision.
    pub fn begin_replace(&mut self, tree: Vec<Value>) -> Pending {
        self.revision += 1;
        Pending {
            revision: self.revision,
            flat: self.flattener.flatten(tree),
        }
    }

    /// Publish a validated tree if no newer replacement has begun.
    pub fn commit(&mut self, validated: Validated) -> ReplaceOutcome {
        let Validated {
            revision,
            flat,
            valid,
        } = validated;
        if revision != self.revision {
            debug!(revision, latest = self.revision, "discarding superseded tree");
            return ReplaceOutcome::Superseded;
        }
        if !valid {
            warn!(revision, "node list failed validation, resetting to placeholder");
            self.reset();
            return ReplaceOutcome::Reset;
        }

        let tree = unflatten(&flat.nodes, &flat.structure);
        match Site::build(flat) {
            Ok(site) => {
                let nodes = site.len();
                debug!(revision, nodes, "published node list");
                self.tree = tree;
                self.site = site;
                self.reset = false;
                ReplaceOutcome::Published { nodes }
            }
            Err(e) => {
                warn!(revision, error = %e, "node list rejected, resetting to placeholder");
                self.reset();
                ReplaceOutcome::Reset
            }
        }
    }

    fn reset(&mut self) {
        self.tree = vec![Value::Object(Map::new())];
        self.site = Site::placeholder();
        self.reset = true;
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    /// Latest revision handed out by [`Store::begin_replace`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while the placeholder is published.
    pub fn is_reset(&self) -> bool {
        self.reset
    }

    /// The published nested tree, with generated ids filled in.
    pub fn tree(&self) -> &[Value] {
        &self.tree
    }

    /// The published flat node list.
    pub fn nodes(&self) -> &[Page] {
        self.site.pages()
    }

    pub fn kv_nodes(&self) -> &HashMap<String, usize> {
        self.site.kv_nodes()
    }

    /// Derived navigation, unavailable while the placeholder is published.
    pub fn navigation(&self) -> Option<&Site> {
        (!self.reset).then_some(&self.site)
    }

    pub fn get(&self, id: &str) -> Option<NodeRef<'_>> {
        self.navigation()?.get(id)
    }

    pub fn visible_nodes(&self) -> Vec<NodeRef<'_>> {
        self.navigation()
            .map(Site::visible_nodes)
            .unwrap_or_default()
    }

    /// Validate and type a credential object handed in by the host.
    pub fn check_credential(&self, value: &mut Value) -> Option<Credential> {
        if !self.validator.validate(SchemaId::Credential, value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::ids::SequentialIds;
    use crate::test_helpers::*;
    use serde_json::json;

    fn store() -> Store {
        let validator =
            SchemaValidator::new(ValidationConfig::default(), Box::new(SequentialIds::new("gen")))
                .unwrap();
        Store::new(Box::new(FlatJsonTree), Box::new(validator))
    }

    fn tree(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            other => vec![other],
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = store();
        assert!(store.nodes().is_empty());
        assert!(store.tree().is_empty());
        assert!(store.navigation().is_some());
        assert!(!store.is_reset());
    }

    #[test]
    fn replace_publishes_nodes_and_lookup() {
        let mut store = store();
        let outcome = store.replace_tree(load_fixture_tree());
        assert_eq!(outcome, ReplaceOutcome::Published { nodes: 11 });
        assert_eq!(store.nodes().len(), 11);
        assert_eq!(store.kv_nodes()["guide"], 3);
        assert_eq!(store.get("guide").unwrap().path().as_deref(), Some("Docs/Getting_Started"));
    }

    #[test]
    fn visible_nodes_skip_hidden_pathless_and_redirects() {
        let mut store = store();
        store.replace_tree(load_fixture_tree());
        assert_eq!(
            id_list(&store.visible_nodes()),
            ["home", "docs", "guide", "blog", "first", "second", "about"]
        );
    }

    #[test]
    fn generated_ids_flow_back_into_tree() {
        let mut store = store();
        store.replace_tree(tree(json!([{ "name": "Home", "children": [{ "name": "A" }] }])));
        assert_eq!(store.tree()[0]["id"], "gen-1");
        assert_eq!(store.tree()[0]["children"][0]["id"], "gen-2");
        assert_eq!(store.nodes()[1].id, "gen-2");
    }

    #[test]
    fn resubmitting_published_tree_changes_nothing() {
        let mut store = store();
        store.replace_tree(tree(json!([{ "name": "Home", "children": [{ "name": "A" }] }])));
        let published = store.tree().to_vec();
        let manifest = store.navigation().unwrap().manifest();

        store.replace_tree(published.clone());
        assert_eq!(store.tree(), published.as_slice());
        assert_eq!(store.navigation().unwrap().manifest(), manifest);
    }

    #[test]
    fn invalid_tree_resets_to_placeholder() {
        let mut store = store();
        store.replace_tree(load_fixture_tree());
        let outcome = store.replace_tree(tree(json!([{ "id": "a", "frontmatter": "oops" }])));
        assert_eq!(outcome, ReplaceOutcome::Reset);
        assert!(store.is_reset());
        assert_eq!(store.tree(), [json!({})].as_slice());
        assert_eq!(serde_json::to_value(store.nodes()).unwrap(), json!([{}]));
        assert!(store.navigation().is_none());
        assert!(store.visible_nodes().is_empty());
        assert!(store.kv_nodes().is_empty());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn non_object_node_resets() {
        let mut store = store();
        assert_eq!(store.replace_tree(vec![json!("page")]), ReplaceOutcome::Reset);
    }

    #[test]
    fn duplicate_ids_reset() {
        let mut store = store();
        let outcome = store.replace_tree(tree(json!([{ "id": "x" }, { "id": "x" }])));
        assert_eq!(outcome, ReplaceOutcome::Reset);
    }

    #[test]
    fn valid_tree_after_reset_recovers() {
        let mut store = store();
        store.replace_tree(vec![json!(1)]);
        assert!(store.is_reset());
        store.replace_tree(load_fixture_tree());
        assert!(!store.is_reset());
        assert!(store.navigation().is_some());
    }

    #[test]
    fn older_validation_is_discarded() {
        let mut store = store();
        let first = store.begin_replace(tree(json!([{ "id": "old" }])));
        let second = store.begin_replace(tree(json!([{ "id": "new" }])));

        let second = second.validate(store.validator());
        assert_eq!(store.commit(second), ReplaceOutcome::Published { nodes: 1 });

        let first = first.validate(store.validator());
        assert_eq!(store.commit(first), ReplaceOutcome::Superseded);
        assert_eq!(store.nodes()[0].id, "new");
    }

    #[test]
    fn stale_result_cannot_publish_before_newer_one() {
        let mut store = store();
        let first = store.begin_replace(tree(json!([{ "id": "old" }])));
        let second = store.begin_replace(tree(json!([{ "id": "new" }])));
        assert_eq!(first.revision() + 1, second.revision());

        let first = first.validate(store.validator());
        assert_eq!(store.commit(first), ReplaceOutcome::Superseded);
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn superseded_invalid_tree_does_not_reset() {
        let mut store = store();
        let bad = store.begin_replace(vec![json!(1)]);
        let good = store.begin_replace(tree(json!([{ "id": "ok" }])));
        let bad = bad.validate(store.validator());
        assert!(!bad.is_valid());
        assert_eq!(store.commit(bad), ReplaceOutcome::Superseded);
        let good = good.validate(store.validator());
        store.commit(good);
        assert!(!store.is_reset());
    }

    #[test]
    fn check_credential_fills_nulls() {
        let store = store();
        let mut value = json!({ "Bucket": "site", "extra": 1 });
        let cred = store.check_credential(&mut value).unwrap();
        assert_eq!(cred.bucket.as_deref(), Some("site"));
        assert_eq!(cred.region, None);
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn check_credential_rejects_wrong_shape() {
        let store = store();
        assert!(store.check_credential(&mut json!({ "region": [1] })).is_none());
    }
}
