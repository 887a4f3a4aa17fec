//! Schema descriptors: wire-schema generation and response validation.
//!
//! A [`SchemaDescriptor`] knows two things: how to describe itself to the API as a
//! JSON schema, and how to turn the untyped `data` the API returns into a checked
//! value. Two implementations ship with the SDK:
//!
//! - [`TypedSchema`] for any Rust type deriving `schemars::JsonSchema` and
//!   `serde::Deserialize`.
//! - [`RawSchema`] for a JSON Schema document built at runtime.
//!
//! # Example
//!
//! ```rust
//! use bitbuffet::{SchemaDescriptor, TypedSchema};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Article {
//!     title: String,
//!     author: Option<String>,
//! }
//!
//! let wire = TypedSchema::<Article>::new().to_wire_schema().unwrap();
//! assert!(wire["properties"]["title"].is_object());
//! ```

use crate::error::{Error, Result, Violation};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, RwLock};

/// A declarative description of the expected output shape.
pub trait SchemaDescriptor: Send + Sync {
    /// The value produced by a successful validation.
    type Output;

    /// Serialize this descriptor to the JSON schema sent as `json_schema`.
    fn to_wire_schema(&self) -> Result<Value>;

    /// Validate raw response data, returning every violation on failure.
    fn validate(&self, raw: Value) -> std::result::Result<Self::Output, Vec<Violation>>;
}

impl<S: SchemaDescriptor + ?Sized> SchemaDescriptor for &S {
    type Output = S::Output;

    fn to_wire_schema(&self) -> Result<Value> {
        (**self).to_wire_schema()
    }

    fn validate(&self, raw: Value) -> std::result::Result<Self::Output, Vec<Violation>> {
        (**self).validate(raw)
    }
}

/// Placeholder schema type for calls that never carry a schema.
///
/// Uninhabited: it only exists so [`ExtractArgs::config`](crate::ExtractArgs::config)
/// has a concrete type parameter.
#[derive(Debug, Clone, Copy)]
pub enum NoSchema {}

impl SchemaDescriptor for NoSchema {
    type Output = Value;

    fn to_wire_schema(&self) -> Result<Value> {
        match *self {}
    }

    fn validate(&self, _raw: Value) -> std::result::Result<Value, Vec<Violation>> {
        match *self {}
    }
}

/// Schema derived from a Rust type.
///
/// The wire form is generated with `schemars`, with every `$ref` inlined. Response
/// data is first checked against the full schema so all violations are reported
/// together, then deserialized into `T`. The compiled validator is built once per
/// type and shared.
///
/// Values are not coerced: a number sent as a string (`"count": "120"`) is a
/// violation, not a `u32`. Use a custom `Deserialize` impl on `T` if lax input
/// is expected.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + 'static,
{
    /// Create a descriptor for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn root_schema() -> Result<Value> {
        serde_json::to_value(schema_for!(T)).map_err(|e| {
            Error::InvalidSchema(format!(
                "schema for {} could not be serialized: {}",
                T::schema_name(),
                e
            ))
        })
    }

    fn validator() -> Result<Arc<jsonschema::Validator>> {
        let key = TypeId::of::<T>();
        let cached = validator_cache()
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).cloned());
        if let Some(validator) = cached {
            return Ok(validator);
        }

        let schema = Self::root_schema()?;
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::InvalidSchema(format!("schema could not be compiled: {e}")))?;

        let mut cache = validator_cache()
            .write()
            .map_err(|_| Error::InvalidSchema("validator cache poisoned".into()))?;
        Ok(cache.entry(key).or_insert_with(|| Arc::new(validator)).clone())
    }
}

type ValidatorCache = RwLock<HashMap<TypeId, Arc<jsonschema::Validator>>>;

fn validator_cache() -> &'static ValidatorCache {
    static CACHE: OnceLock<ValidatorCache> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

impl<T> Default for TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Copy for TypedSchema<T> {}

impl<T: JsonSchema> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedSchema").field(&T::schema_name()).finish()
    }
}

impl<T> SchemaDescriptor for TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + 'static,
{
    type Output = T;

    fn to_wire_schema(&self) -> Result<Value> {
        Ok(to_wire_form(Self::root_schema()?))
    }

    fn validate(&self, raw: Value) -> std::result::Result<T, Vec<Violation>> {
        let validator = Self::validator().map_err(|e| vec![Violation::new("", e.to_string())])?;

        let violations = collect_violations(&validator, &raw);
        if !violations.is_empty() {
            return Err(violations);
        }

        serde_json::from_value(raw).map_err(|e| vec![Violation::new("", e.to_string())])
    }
}

/// Schema supplied as a JSON Schema document.
///
/// The document is compiled once at construction; validation returns the data
/// unchanged when it conforms.
pub struct RawSchema {
    schema: Value,
    validator: jsonschema::Validator,
}

impl RawSchema {
    /// Compile a JSON Schema document.
    pub fn new(schema: Value) -> Result<Self> {
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        Ok(Self { schema, validator })
    }

    /// The document as supplied.
    pub fn as_value(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for RawSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl SchemaDescriptor for RawSchema {
    type Output = Value;

    fn to_wire_schema(&self) -> Result<Value> {
        Ok(to_wire_form(self.schema.clone()))
    }

    fn validate(&self, raw: Value) -> std::result::Result<Value, Vec<Violation>> {
        let violations = collect_violations(&self.validator, &raw);
        if violations.is_empty() {
            Ok(raw)
        } else {
            Err(violations)
        }
    }
}

fn collect_violations(validator: &jsonschema::Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|error| Violation::new(error.instance_path.to_string(), error.to_string()))
        .collect()
}

/// Inline every local `$ref` and drop the definitions section.
///
/// Recursive types cannot be fully inlined; their `$ref`s are left in place and the
/// definitions are kept so the document stays resolvable.
fn to_wire_form(mut schema: Value) -> Value {
    let definitions = match &schema {
        Value::Object(map) => map
            .get("definitions")
            .or_else(|| map.get("$defs"))
            .cloned(),
        _ => None,
    };

    let Some(defs) = definitions else {
        return schema;
    };

    let mut expanding = Vec::new();
    let complete = inline_refs(&mut schema, &defs, &mut expanding);

    if complete {
        if let Value::Object(map) = &mut schema {
            map.remove("definitions");
            map.remove("$defs");
        }
    }

    schema
}

/// Returns false if a recursive reference had to be left unresolved.
fn inline_refs(value: &mut Value, definitions: &Value, expanding: &mut Vec<String>) -> bool {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                let name = ref_path
                    .strip_prefix("#/definitions/")
                    .or_else(|| ref_path.strip_prefix("#/$defs/"))
                    .map(str::to_string);

                if let Some(name) = name {
                    if expanding.contains(&name) {
                        return false;
                    }
                    if let Some(def) = definitions.get(&name) {
                        *value = def.clone();
                        expanding.push(name);
                        let complete = inline_refs(value, definitions, expanding);
                        expanding.pop();
                        return complete;
                    }
                }
            }

            // Definitions are inlined at their use sites, not in place.
            let mut complete = true;
            for (key, v) in map.iter_mut() {
                if key == "definitions" || key == "$defs" {
                    continue;
                }
                complete &= inline_refs(v, definitions, expanding);
            }
            complete
        }
        Value::Array(items) => {
            let mut complete = true;
            for item in items.iter_mut() {
                complete &= inline_refs(item, definitions, expanding);
            }
            complete
        }
        _ => true,
    }
}
