//! JSON Schema documents for the node list and credentials.
//!
//! Pure data: nothing here validates anything. [`crate::validate`] compiles
//! the [`registry`] once and runs it.
//!
//! ```text
//! nodes       array of → page
//! page        open object { id: string = <slug>, name?: string,
//!                           frontmatter: object = {} { hidden: boolean = false,
//!                                                      template?: string, .. }, .. }
//! credential  closed object { accessKeyId, Bucket, endpoint, region,
//!                             secretAccessKey: string | null = null }
//! ```
//!
//! Besides the standard keywords the documents carry `dynamicDefaults`, a
//! map of property name to generator. The only generator is `"slug"`, a
//! fresh page id. Compilers that do not know the keyword ignore it.

use serde_json::{Value, json};
use std::fmt;

pub const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Generator name for page ids in `dynamicDefaults`.
pub const SLUG: &str = "slug";

/// Identifier of a registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    Nodes,
    Page,
    Credential,
}

impl SchemaId {
    pub const ALL: [SchemaId; 3] = [SchemaId::Nodes, SchemaId::Page, SchemaId::Credential];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaId::Nodes => "nodes",
            SchemaId::Page => "page",
            SchemaId::Credential => "credential",
        }
    }

    /// The document's `$id`.
    pub fn uri(self) -> String {
        format!("urn:pagetree:{}", self.as_str())
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered schema document.
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: SchemaId,
    pub document: Value,
}

impl Schema {
    /// Wrap `body` as a top-level document with `$schema` and `$id`.
    pub fn new(id: SchemaId, body: Value) -> Self {
        let mut document = json!({ "$schema": DRAFT, "$id": id.uri() });
        if let (Value::Object(doc), Value::Object(body)) = (&mut document, body) {
            doc.extend(body);
        }
        Self { id, document }
    }
}

fn page_body() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "frontmatter": {
                "type": "object",
                "default": {},
                "properties": {
                    "hidden": { "type": "boolean", "default": false },
                    "template": { "type": "string" }
                }
            }
        },
        "dynamicDefaults": { "id": SLUG }
    })
}

fn page() -> Schema {
    Schema::new(SchemaId::Page, page_body())
}

fn nodes() -> Schema {
    Schema::new(
        SchemaId::Nodes,
        json!({
            "type": "array",
            "items": { "$ref": "#/$defs/page" },
            "$defs": { "page": page_body() }
        }),
    )
}

fn credential() -> Schema {
    let field = json!({ "type": ["string", "null"], "default": null });
    Schema::new(
        SchemaId::Credential,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "accessKeyId": field,
                "Bucket": field,
                "endpoint": field,
                "region": field,
                "secretAccessKey": field
            }
        }),
    )
}

/// Every schema the store knows about, in [`SchemaId::ALL`] order.
pub fn registry() -> Vec<Schema> {
    vec![nodes(), page(), credential()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(id: SchemaId) -> Schema {
        registry().into_iter().find(|s| s.id == id).unwrap()
    }

    #[test]
    fn registry_covers_every_id() {
        let ids: Vec<SchemaId> = registry().iter().map(|s| s.id).collect();
        assert_eq!(ids, SchemaId::ALL);
    }

    #[test]
    fn documents_carry_draft_and_id() {
        for schema in registry() {
            assert_eq!(schema.document["$schema"], DRAFT);
            assert_eq!(schema.document["$id"], schema.id.uri());
        }
    }

    #[test]
    fn every_document_compiles() {
        for schema in registry() {
            assert!(
                jsonschema::validator_for(&schema.document).is_ok(),
                "{} does not compile",
                schema.id
            );
        }
    }

    #[test]
    fn page_is_open_and_credential_closed() {
        assert!(find(SchemaId::Page).document.get("additionalProperties").is_none());
        assert_eq!(
            find(SchemaId::Credential).document["additionalProperties"],
            false
        );
    }

    #[test]
    fn page_id_defaults_to_slug() {
        assert_eq!(find(SchemaId::Page).document["dynamicDefaults"]["id"], SLUG);
        assert_eq!(
            find(SchemaId::Nodes).document["$defs"]["page"]["dynamicDefaults"]["id"],
            SLUG
        );
    }
}
