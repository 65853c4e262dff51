//! Validation gate for candidate node lists and credentials.
//!
//! Each document in [`crate::schema::registry`] is compiled once with
//! `jsonschema`. Validating a candidate first prepares it in place by
//! walking the same document:
//!
//! 1. **Coercion**: scalars of the wrong type are converted where the
//!    conversion is lossless enough (`"true"` → `true`, `3` → `"3"`).
//! 2. **Defaults**: absent properties with a `default` are filled in, and
//!    `dynamicDefaults` fields get a fresh page id that no other record in
//!    the list already uses.
//! 3. **Stripping**: undeclared properties are removed where
//!    `additionalProperties` is `false`.
//!
//! The prepared value is then checked against the compiled schema. Running
//! the gate over an already-validated value changes nothing. A failed check
//! makes [`Validator::validate`] return `false`; the instance path of the
//! first error is logged at `debug`.

use crate::config::ValidationConfig;
use crate::ids::IdGenerator;
use crate::schema::{SLUG, Schema, SchemaId, registry};
use jsonschema::Draft;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Generator draws before a colliding id is extended with a counter.
const ID_ATTEMPTS: usize = 16;

const MAX_REF_DEPTH: usize = 8;

#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("schema '{schema}' does not compile: {message}")]
    Invalid { schema: SchemaId, message: String },
    #[error("schema id '{0}' is registered twice")]
    DuplicateId(SchemaId),
}

pub trait Validator {
    fn validate(&self, schema: SchemaId, value: &mut Value) -> bool;
}

struct Compiled {
    id: SchemaId,
    document: Value,
    validator: jsonschema::Validator,
}

pub struct SchemaValidator {
    schemas: Vec<Compiled>,
    options: ValidationConfig,
    ids: Box<dyn IdGenerator>,
}

impl SchemaValidator {
    pub fn new(options: ValidationConfig, ids: Box<dyn IdGenerator>) -> Result<Self, SchemaError> {
        Self::with_registry(&registry(), options, ids)
    }

    pub fn with_registry(
        schemas: &[Schema],
        options: ValidationConfig,
        ids: Box<dyn IdGenerator>,
    ) -> Result<Self, SchemaError> {
        let mut compiled: Vec<Compiled> = Vec::with_capacity(schemas.len());
        for schema in schemas {
            if compiled.iter().any(|c| c.id == schema.id) {
                return Err(SchemaError::DuplicateId(schema.id));
            }
            let validator = jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&schema.document)
                .map_err(|e| SchemaError::Invalid {
                    schema: schema.id,
                    message: e.to_string(),
                })?;
            compiled.push(Compiled {
                id: schema.id,
                document: schema.document.clone(),
                validator,
            });
        }
        Ok(Self {
            schemas: compiled,
            options,
            ids,
        })
    }

    fn prepare(&self, root: &Value, schema: &Value, value: &mut Value, taken: &mut HashSet<String>) {
        let schema = resolve(root, schema);
        if self.options.coerce_types {
            coerce(schema, value);
        }
        match value {
            Value::Array(items) => {
                let Some(item_schema) = schema.get("items").map(|s| resolve(root, s)) else {
                    return;
                };
                seed_taken(item_schema, items, taken);
                for item in items.iter_mut() {
                    self.prepare(root, item_schema, item, taken);
                }
            }
            Value::Object(map) => self.prepare_object(root, schema, map, taken),
            _ => {}
        }
    }

    fn prepare_object(
        &self,
        root: &Value,
        schema: &Value,
        map: &mut Map<String, Value>,
        taken: &mut HashSet<String>,
    ) {
        let properties = schema.get("properties").and_then(Value::as_object);
        if self.options.use_defaults {
            for (name, prop) in properties.into_iter().flatten() {
                if !map.contains_key(name)
                    && let Some(default) = resolve(root, prop).get("default")
                {
                    map.insert(name.clone(), default.clone());
                }
            }
            for name in dynamic_fields(schema) {
                if !map.contains_key(name) {
                    map.insert(name.to_string(), Value::String(self.fresh_id(taken)));
                }
            }
        }
        for (name, prop) in properties.into_iter().flatten() {
            if let Some(v) = map.get_mut(name) {
                self.prepare(root, prop, v, taken);
            }
        }
        if self.options.remove_additional
            && schema.get("additionalProperties") == Some(&Value::Bool(false))
        {
            map.retain(|key, _| properties.is_some_and(|p| p.contains_key(key)));
        }
    }

    /// A generated id not yet used in the list being validated.
    fn fresh_id(&self, taken: &mut HashSet<String>) -> String {
        for _ in 0..ID_ATTEMPTS {
            let id = self.ids.generate();
            if taken.insert(id.clone()) {
                return id;
            }
        }
        let base = self.ids.generate();
        let mut n = 2u64;
        loop {
            let id = format!("{base}-{n}");
            if taken.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, schema: SchemaId, value: &mut Value) -> bool {
        let Some(compiled) = self.schemas.iter().find(|c| c.id == schema) else {
            debug!(%schema, "schema is not registered");
            return false;
        };
        let mut taken = HashSet::new();
        self.prepare(&compiled.document, &compiled.document, value, &mut taken);

        match compiled.validator.iter_errors(value).next() {
            None => true,
            Some(error) => {
                debug!(%schema, pointer = %error.instance_path, %error, "validation failed");
                false
            }
        }
    }
}

/// Follow local `#/...` references.
fn resolve<'a>(root: &'a Value, mut schema: &'a Value) -> &'a Value {
    for _ in 0..MAX_REF_DEPTH {
        let Some(target) = schema
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
            .and_then(|pointer| root.pointer(pointer))
        else {
            break;
        };
        schema = target;
    }
    schema
}

fn dynamic_fields(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .get("dynamicDefaults")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter(|(_, generator)| generator.as_str() == Some(SLUG))
        .map(|(name, _)| name.as_str())
}

/// Record ids the items already carry so generated ones avoid them.
fn seed_taken(item_schema: &Value, items: &[Value], taken: &mut HashSet<String>) {
    for name in dynamic_fields(item_schema) {
        for item in items {
            match item.get(name) {
                Some(Value::String(s)) => {
                    taken.insert(s.clone());
                }
                Some(v @ (Value::Number(_) | Value::Bool(_))) => {
                    taken.insert(v.to_string());
                }
                _ => {}
            }
        }
    }
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn has_type(ty: &str, value: &Value) -> bool {
    match ty {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        _ => false,
    }
}

fn coerce_to(ty: &str, value: &Value) -> Option<Value> {
    match (ty, value) {
        ("string", Value::Null) => Some(Value::String(String::new())),
        ("string", Value::Number(n)) => Some(Value::String(n.to_string())),
        ("string", Value::Bool(b)) => Some(Value::String(b.to_string())),
        ("boolean", Value::Null) => Some(Value::Bool(false)),
        ("boolean", Value::String(s)) if s == "true" => Some(Value::Bool(true)),
        ("boolean", Value::String(s)) if s == "false" => Some(Value::Bool(false)),
        ("boolean", Value::Number(n)) if n.as_f64() == Some(1.0) => Some(Value::Bool(true)),
        ("boolean", Value::Number(n)) if n.as_f64() == Some(0.0) => Some(Value::Bool(false)),
        ("null", Value::String(s)) if s.is_empty() => Some(Value::Null),
        ("null", Value::Bool(false)) => Some(Value::Null),
        ("null", Value::Number(n)) if n.as_f64() == Some(0.0) => Some(Value::Null),
        _ => None,
    }
}

/// Convert `value` to the first declared type that accepts it.
fn coerce(schema: &Value, value: &mut Value) {
    let types = declared_types(schema);
    if types.is_empty() || types.iter().any(|t| has_type(t, value)) {
        return;
    }
    if let Some(coerced) = types.iter().find_map(|t| coerce_to(t, value)) {
        *value = coerced;
    }
}
