//! Resource-scoped handles and their declarative configuration.
//!
//! A [`ResourceHandle`] is the explicit replacement for unknown-method
//! dispatch: the client factory hands one out per resource name, and the
//! handle exposes query construction, point lookups, and CRUD. Configuration
//! is an explicit value passed to the factory; nothing is stored globally.

use crate::protocol::{Error, Result};
use crate::query::QueryBuilder;
use crate::transport::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
enum Relationship {
    HasMany { relation: String, fields: Vec<String> },
    BelongsTo { relation: String, fields: Vec<String> },
}

/// Declarative per-resource configuration: the attribute list the `"*"`
/// projection sentinel expands to, plus relationship declarations applied to
/// every freshly constructed builder in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceConfig {
    attributes: Vec<String>,
    relationships: Vec<Relationship>,
}

impl ResourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the resource's full attribute list.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Registers a has-many relation, embedded as a sub-select.
    pub fn has_many(mut self, relation: &str, fields: &[&str]) -> Self {
        self.relationships.push(Relationship::HasMany {
            relation: relation.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Registers a belongs-to relation, embedded as dotted cross-object
    /// fields.
    pub fn belongs_to(mut self, relation: &str, fields: &[&str]) -> Self {
        self.relationships.push(Relationship::BelongsTo {
            relation: relation.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }
}

/// Capability bound to one named remote collection.
#[derive(Clone)]
pub struct ResourceHandle {
    transport: Arc<dyn Transport>,
    name: String,
    config: ResourceConfig,
}

impl ResourceHandle {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        name: impl Into<String>,
        config: ResourceConfig,
    ) -> Self {
        Self {
            transport,
            name: name.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn attribute_list(&self) -> &[String] {
        &self.config.attributes
    }

    /// Fresh builder with every declared relationship applied, in
    /// registration order. Relationships are re-applied on every
    /// construction, never cached across builders.
    pub fn query(&self) -> QueryBuilder {
        let mut builder = QueryBuilder::new(self.clone());
        for relationship in &self.config.relationships {
            match relationship {
                Relationship::HasMany { relation, fields } => {
                    builder.apply_has_many(relation, fields)
                }
                Relationship::BelongsTo { relation, fields } => {
                    builder.apply_belongs_to(relation, fields)
                }
            }
        }
        builder
    }

    /// Point lookup by Id.
    pub fn find(&self, id: &str) -> Result<Value> {
        self.transport.find(&self.name, id, None)
    }

    /// Point lookup by an arbitrary (typically external-id) field.
    pub fn find_by(&self, field: &str, value: &str) -> Result<Value> {
        self.transport.find(&self.name, value, Some(field))
    }

    /// Resource metadata.
    pub fn describe(&self) -> Result<Value> {
        self.transport.describe(Some(&self.name))
    }

    /// Creates a record, returning its new Id; propagates every failure.
    pub fn create(&self, attrs: &Value) -> Result<String> {
        self.transport.create(&self.name, attrs)
    }

    /// Tolerant create: remote failures are logged and degrade to `None`;
    /// local errors still propagate.
    pub fn try_create(&self, attrs: &Value) -> Result<Option<String>> {
        soften(self.create(attrs).map(Some), None)
    }

    /// Updates a record; `attrs` must carry the `Id` field. A missing Id is
    /// rejected before any request is issued.
    pub fn update(&self, attrs: &Value) -> Result<()> {
        let id = attrs
            .get("Id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField("Id".to_string()))?
            .to_string();
        let mut body = attrs.clone();
        if let Some(object) = body.as_object_mut() {
            object.remove("Id");
        }
        self.transport.update(&self.name, &id, &body)
    }

    pub fn try_update(&self, attrs: &Value) -> Result<bool> {
        soften(self.update(attrs).map(|_| true), false)
    }

    /// Creates or updates on an external-id field; `attrs` must carry that
    /// field as a string, number, or boolean. Returns the new Id when a
    /// record was created.
    pub fn upsert(&self, field: &str, attrs: &Value) -> Result<Option<String>> {
        let external_id = attrs
            .get(field)
            .and_then(scalar_text)
            .ok_or_else(|| Error::MissingField(field.to_string()))?;
        let mut body = attrs.clone();
        if let Some(object) = body.as_object_mut() {
            object.remove(field);
        }
        self.transport.upsert(&self.name, field, &external_id, &body)
    }

    pub fn try_upsert(&self, field: &str, attrs: &Value) -> Result<Option<String>> {
        soften(self.upsert(field, attrs), None)
    }

    /// Deletes a record by Id; propagates every failure.
    pub fn destroy(&self, id: &str) -> Result<()> {
        self.transport.destroy(&self.name, id)
    }

    pub fn try_destroy(&self, id: &str) -> Result<bool> {
        soften(self.destroy(id).map(|_| true), false)
    }

    /// Dynamic-dispatch surface: known operation names execute directly,
    /// `find_by_<field>` is recognized by pattern, and anything else falls
    /// through to a fresh builder's fallback.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        match name {
            "find" => {
                let id = string_arg(name, args)?;
                self.find(&id)
            }
            "describe" => self.describe(),
            "create" => {
                let attrs = attrs_arg(name, args, 0)?;
                self.create(attrs).map(Value::String)
            }
            "try_create" => {
                let attrs = attrs_arg(name, args, 0)?;
                Ok(option_value(self.try_create(attrs)?))
            }
            "update" => {
                let attrs = attrs_arg(name, args, 0)?;
                self.update(attrs).map(|_| Value::Bool(true))
            }
            "try_update" => {
                let attrs = attrs_arg(name, args, 0)?;
                self.try_update(attrs).map(Value::Bool)
            }
            "upsert" => {
                let field = string_arg(name, args)?;
                let attrs = attrs_arg(name, args, 1)?;
                Ok(option_value(self.upsert(&field, attrs)?))
            }
            "try_upsert" => {
                let field = string_arg(name, args)?;
                let attrs = attrs_arg(name, args, 1)?;
                Ok(option_value(self.try_upsert(&field, attrs)?))
            }
            "destroy" => {
                let id = string_arg(name, args)?;
                self.destroy(&id).map(|_| Value::Bool(true))
            }
            "try_destroy" => {
                let id = string_arg(name, args)?;
                self.try_destroy(&id).map(Value::Bool)
            }
            _ => self.query().invoke(name, args),
        }
    }
}

/// Scalar rendered as the path segment it becomes on the wire.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn option_value(id: Option<String>) -> Value {
    id.map(Value::String).unwrap_or(Value::Null)
}

/// Remote failures degrade tolerant CRUD variants to their fallback value;
/// everything else propagates.
fn soften<T>(outcome: Result<T>, fallback: T) -> Result<T> {
    match outcome {
        Err(err) if err.is_remote() => {
            warn!(error = %err, "remote operation failed");
            Ok(fallback)
        }
        other => other,
    }
}

fn string_arg(name: &str, args: &[Value]) -> Result<String> {
    args.first()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Protocol(format!("{} expects a string argument", name)))
}

fn attrs_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index)
        .filter(|value| value.is_object())
        .ok_or_else(|| Error::Protocol(format!("{} expects an attributes object", name)))
}
