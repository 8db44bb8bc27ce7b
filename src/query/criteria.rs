use serde_json::Value;

/// Mutable query state collected across chained builder calls.
///
/// One `Criteria` is created per builder and never shared or cached across
/// builders. The compiler reads it without mutating, so a terminal call can
/// recompile from current state any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub(crate) fields: Vec<String>,
    pub(crate) has_many: Vec<String>,
    pub(crate) belongs_to: Vec<String>,
    pub(crate) raw_conditions: Vec<String>,
    pub(crate) conditions: Vec<(String, Value)>,
    pub(crate) order: Vec<String>,
    pub(crate) nulls_last: bool,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_field(&mut self, field: impl Into<String>) {
        self.fields.push(field.into());
    }

    /// Sub-select fragments are de-duplicated by exact string match.
    pub(crate) fn push_has_many(&mut self, fragment: String) {
        if !self.has_many.contains(&fragment) {
            self.has_many.push(fragment);
        }
    }

    /// Dotted cross-object fields, de-duplicated by exact string match.
    pub(crate) fn push_belongs_to(&mut self, fragment: String) {
        if !self.belongs_to.contains(&fragment) {
            self.belongs_to.push(fragment);
        }
    }

    /// Empty fragments are dropped.
    pub(crate) fn push_raw_condition(&mut self, clause: &str) {
        if !clause.is_empty() {
            self.raw_conditions.push(clause.to_string());
        }
    }

    /// Insertion-ordered, last write per key wins.
    pub(crate) fn set_condition(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.conditions.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.conditions.push((key, value)),
        }
    }

    pub(crate) fn push_order(&mut self, field: impl Into<String>) {
        self.order.push(field.into());
    }

    pub(crate) fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Equality conditions as a JSON object, in insertion order.
    pub(crate) fn conditions_object(&self) -> serde_json::Map<String, Value> {
        self.conditions.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn has_many_fragments_dedup_by_exact_match() {
        let mut criteria = Criteria::new();
        criteria.push_has_many("(SELECT Id,Email FROM Contacts)".to_string());
        criteria.push_has_many("(SELECT Id,Email FROM Contacts)".to_string());
        criteria.push_has_many("(SELECT Id FROM Contacts)".to_string());
        assert_eq!(criteria.has_many.len(), 2);
    }

    #[test]
    fn belongs_to_fragments_dedup_by_exact_match() {
        let mut criteria = Criteria::new();
        criteria.push_belongs_to("Owner.Email".to_string());
        criteria.push_belongs_to("Owner.Email".to_string());
        assert_eq!(criteria.belongs_to, vec!["Owner.Email".to_string()]);
    }

    #[test]
    fn condition_keys_overwrite_in_place() {
        let mut criteria = Criteria::new();
        criteria.set_condition("Industry", json!("Tech"));
        criteria.set_condition("Status", json!("Open"));
        criteria.set_condition("Industry", json!("Retail"));
        assert_eq!(
            criteria.conditions,
            vec![
                ("Industry".to_string(), json!("Retail")),
                ("Status".to_string(), json!("Open")),
            ]
        );
    }

    #[test]
    fn empty_raw_conditions_are_ignored() {
        let mut criteria = Criteria::new();
        criteria.push_raw_condition("");
        criteria.push_raw_condition("Amount > 100");
        assert_eq!(criteria.raw_conditions, vec!["Amount > 100".to_string()]);
    }
}
