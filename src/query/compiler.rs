//! Compiles accumulated criteria into a single query string.
//!
//! The compiler never parses or validates what it produces; it concatenates
//! pre-composed fragments and leaves rejection of malformed queries to the
//! remote service.

use super::criteria::Criteria;
use serde_json::Value;

/// Projection used when the caller selected nothing.
const DEFAULT_FIELDS: [&str; 2] = ["Id", "Name"];

/// Renders `criteria` against `resource` as one SOQL statement.
///
/// Pure: unchanged input state always yields byte-identical output. Clause
/// order is fixed: SELECT, FROM, WHERE, ORDER BY, NULLS LAST, LIMIT, OFFSET.
pub fn compile(criteria: &Criteria, resource: &str) -> String {
    let mut clauses = vec![
        format!("SELECT {}", select_list(criteria)),
        format!("FROM {}", resource),
    ];
    if let Some(filter) = where_clause(criteria) {
        clauses.push(format!("WHERE {}", filter));
    }
    if !criteria.order.is_empty() {
        clauses.push(format!("ORDER BY {}", criteria.order.join(",")));
    }
    if criteria.nulls_last {
        clauses.push("NULLS LAST".to_string());
    }
    if let Some(limit) = criteria.limit {
        clauses.push(format!("LIMIT {}", limit));
    }
    if let Some(offset) = criteria.offset {
        clauses.push(format!("OFFSET {}", offset));
    }
    clauses.join(" ")
}

/// `(SELECT <fields> FROM <relation>)` sub-select fragment.
pub(crate) fn sub_select<S: AsRef<str>>(relation: &str, fields: &[S]) -> String {
    let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    format!("(SELECT {} FROM {})", fields.join(","), relation)
}

/// Selected fields (or the default projection) deduplicated in insertion
/// order, then belongs-to fields, then has-many sub-selects.
fn select_list(criteria: &Criteria) -> String {
    let mut list: Vec<String> = Vec::new();
    if criteria.fields.is_empty() {
        for field in DEFAULT_FIELDS {
            push_unique(&mut list, field);
        }
    } else {
        for field in &criteria.fields {
            push_unique(&mut list, field);
        }
    }
    for fragment in &criteria.belongs_to {
        push_unique(&mut list, fragment);
    }
    for fragment in &criteria.has_many {
        push_unique(&mut list, fragment);
    }
    list.join(",")
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Raw fragments first, then key/value equalities, all `" AND "`-joined.
fn where_clause(criteria: &Criteria) -> Option<String> {
    let mut parts: Vec<String> = criteria.raw_conditions.clone();
    for (key, value) in &criteria.conditions {
        parts.push(format!("{} = {}", key, literal(value)));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

/// Renders a filter value as a query-language literal. Strings are
/// single-quoted with backslash escaping; numbers, booleans and null render
/// bare.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{}'", escape(text)),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "NULL".to_string(),
        other => format!("'{}'", escape(&other.to_string())),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}
