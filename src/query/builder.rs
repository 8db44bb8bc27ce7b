//! Lazy, fluent query construction.
//!
//! Chainable calls mutate the owned [`Criteria`] and hand the builder back;
//! nothing touches the network until a terminal call compiles the accumulated
//! state and executes it through the transport.

use crate::client::{Records, ResourceHandle};
use crate::protocol::{Error, Result};
use crate::query::compiler;
use crate::query::criteria::Criteria;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Outcome of asking a builder to materialize.
#[derive(Debug)]
pub enum Materialized {
    /// No fetch intent was ever expressed; the untouched builder is handed
    /// back and no request was issued.
    Pending(QueryBuilder),
    /// The compiled query was executed.
    Records(Records),
}

/// Fluent, lazily-evaluated query over one resource.
pub struct QueryBuilder {
    handle: ResourceHandle,
    criteria: Criteria,
    fetch_intent: bool,
}

impl QueryBuilder {
    pub(crate) fn new(handle: ResourceHandle) -> Self {
        Self {
            handle,
            criteria: Criteria::new(),
            fetch_intent: false,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Appends fields to the projection. The `"*"` sentinel expands to the
    /// resource's declared attribute list.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_intent = true;
        for field in fields {
            let field = field.into();
            if field == "*" {
                let declared: Vec<String> = self.handle.attribute_list().to_vec();
                for attr in declared {
                    self.criteria.push_field(attr);
                }
            } else {
                self.criteria.push_field(field);
            }
        }
        self
    }

    /// Marks fetch intent without touching the projection.
    pub fn all(mut self) -> Self {
        self.fetch_intent = true;
        self
    }

    /// Merges an equality condition; calling again with the same key
    /// overwrites the earlier value in place.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fetch_intent = true;
        self.criteria.set_condition(key, value.into());
        self
    }

    /// Appends a raw WHERE fragment verbatim; empty fragments are ignored.
    pub fn filter_raw(mut self, clause: &str) -> Self {
        self.fetch_intent = true;
        self.criteria.push_raw_condition(clause);
        self
    }

    /// Appends ordering fields; direction annotations go in the field text
    /// (`"Name DESC"`).
    pub fn order<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_intent = true;
        for field in fields {
            self.criteria.push_order(field.into());
        }
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.fetch_intent = true;
        self.criteria.nulls_last = true;
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.fetch_intent = true;
        self.criteria.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.fetch_intent = true;
        self.criteria.offset = Some(n);
        self
    }

    /// Embeds a has-many relation as a sub-select; exact duplicates are
    /// ignored.
    pub fn with_many(mut self, relation: &str, fields: &[&str]) -> Self {
        self.fetch_intent = true;
        self.apply_has_many(relation, fields);
        self
    }

    /// Embeds a belongs-to relation as dotted cross-object fields.
    pub fn with_one(mut self, relation: &str, fields: &[&str]) -> Self {
        self.fetch_intent = true;
        self.apply_belongs_to(relation, fields);
        self
    }

    // Declarative relationship bindings use these on every fresh builder.
    // They do not set fetch intent: an otherwise untouched builder stays
    // pending even when its resource declares relationships.
    pub(crate) fn apply_has_many<S: AsRef<str>>(&mut self, relation: &str, fields: &[S]) {
        self.criteria.push_has_many(compiler::sub_select(relation, fields));
    }

    pub(crate) fn apply_belongs_to<S: AsRef<str>>(&mut self, relation: &str, fields: &[S]) {
        for field in fields {
            self.criteria
                .push_belongs_to(format!("{}.{}", relation, field.as_ref()));
        }
    }

    /// Compiles the current state without executing it.
    pub fn to_soql(&self) -> String {
        compiler::compile(&self.criteria, self.handle.name())
    }

    /// Point lookup by Id; bypasses query compilation entirely.
    pub fn find(&self, id: &str) -> Result<Value> {
        self.handle.find(id)
    }

    /// Point lookup by an arbitrary field; bypasses query compilation.
    pub fn find_by(&self, field: &str, value: &str) -> Result<Value> {
        self.handle.find_by(field, value)
    }

    fn run(&self) -> Result<Records> {
        let soql = self.to_soql();
        debug!(resource = self.handle.name(), soql = %soql, "executing query");
        Ok(Records::new(self.handle.transport().query(&soql)?))
    }

    /// Compiles and executes, unless no fetch intent was ever expressed, in
    /// which case the builder is handed back untouched with no request
    /// issued.
    pub fn materialize(self) -> Result<Materialized> {
        if !self.fetch_intent {
            return Ok(Materialized::Pending(self));
        }
        Ok(Materialized::Records(self.run()?))
    }

    /// Intent-forcing materialization, equivalent to `all().materialize()`.
    pub fn records(self) -> Result<Records> {
        self.all().run()
    }

    /// Executes and returns the first record, `None` when nothing matched.
    pub fn first(&self) -> Result<Option<Value>> {
        Ok(self.run()?.into_iter().next())
    }

    /// With no equality conditions this is a no-op. Otherwise the first
    /// matching record is returned if one exists; failing that, a record is
    /// created from the equality conditions and re-fetched by its new Id.
    pub fn first_or_create(&self) -> Result<Option<Value>> {
        if !self.criteria.has_conditions() {
            return Ok(None);
        }
        if let Some(existing) = self.first()? {
            return Ok(Some(existing));
        }
        let attrs = Value::Object(self.criteria.conditions_object());
        let id = self.handle.transport().create(self.handle.name(), &attrs)?;
        Ok(Some(self.handle.find(&id)?))
    }

    /// Compiles, executes, and streams each record to `visit`. A builder
    /// with no fetch intent visits nothing and issues no request.
    pub fn each<F>(self, mut visit: F) -> Result<usize>
    where
        F: FnMut(&Value),
    {
        match self.materialize()? {
            Materialized::Pending(_) => Ok(0),
            Materialized::Records(records) => {
                let mut seen = 0;
                for record in records.iter() {
                    visit(record);
                    seen += 1;
                }
                Ok(seen)
            }
        }
    }

    /// Dynamic-dispatch fallback for call names the builder does not define.
    ///
    /// `find_by_<field>` routes to [`QueryBuilder::find_by`]. Any other name
    /// materializes the query and is retried against the record sequence,
    /// where unrecognized names surface as [`Error::UnknownOperation`] rather
    /// than silently succeeding.
    pub fn invoke(self, name: &str, args: &[Value]) -> Result<Value> {
        if let Some(field) = name.strip_prefix("find_by_") {
            let value = args.first().and_then(Value::as_str).ok_or_else(|| {
                Error::Protocol(format!("{} expects one string argument", name))
            })?;
            return self.find_by(field, value);
        }
        self.run()?.invoke(name, args)
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_soql())
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("resource", &self.handle.name())
            .field("criteria", &self.criteria)
            .field("fetch_intent", &self.fetch_intent)
            .finish()
    }
}
