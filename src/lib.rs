//! # pagetree
//!
//! Keeps a content tree for a site and derives, for every page, where it sits
//! in the navigation: parent, children, siblings, position, neighbours,
//! ancestor chain, canonical path, and the URL it is reached at once section
//! redirects are applied.
//!
//! # Architecture: Replace, Validate, Derive
//!
//! The tree is only ever replaced wholesale. Each replacement runs one
//! pipeline, and nothing is published until it has succeeded:
//!
//! ```text
//! 1. Flatten   nested tree  →  flat records + structure   (flatten)
//! 2. Validate  records      →  defaulted, coerced records (validate)
//! 3. Build     records      →  typed pages + id lookup    (navigation)
//! 4. Publish   tree, nodes, kv_nodes, visible nodes       (store)
//! ```
//!
//! A list that fails validation is never partially accepted: the store
//! publishes a single empty placeholder instead.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | The store facade: replacement pipeline, published views, revisions |
//! | [`navigation`] | Derived fields on [`navigation::NodeRef`]: filtered views, `path`, `to` |
//! | [`validate`] | `jsonschema` compilation plus in-place defaulting, coercion, stripping |
//! | [`schema`] | `nodes`, `page`, and `credential` JSON Schema documents |
//! | [`flatten`] | Nested tree ⇄ flat records plus structural links |
//! | [`ids`] | Generated ids for pages that arrive without one |
//! | [`types`] | Shared records (`Page`, `Frontmatter`, `Credential`) |
//! | [`config`] | `pagetree.toml` loading and validation |
//! | [`scan`] | Builds a tree from a content directory of markdown files |
//! | [`naming`] | `NNN-name` ordering convention used by the scanner |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Derived Fields Are Functions, Not Properties
//!
//! Navigation is computed from the flat structure on every call through a
//! borrowed [`navigation::NodeRef`]. Nothing is attached to page records, so
//! the same record can be reused across rebuilds without stale links.
//!
//! ## Collaborators Are Injected
//!
//! Flattening, validation, and id generation sit behind the
//! [`flatten::Flattener`], [`validate::Validator`], and [`ids::IdGenerator`]
//! traits. A [`store::Store`] owns its collaborators, so independent stores
//! (and tests) never share state.
//!
//! ## Latest Replacement Wins
//!
//! Every replacement is stamped with a revision. A validation result that
//! arrives after a newer replacement has begun is discarded at commit time.

pub mod config;
pub mod flatten;
pub mod ids;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod scan;
pub mod schema;
pub mod store;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
