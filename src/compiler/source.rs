use super::match_result::{GroupMatch, MatchResult};
use crate::types::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Named values handed to generation.
pub trait ValueSource {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> ValueSource for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<S: BuildHasher> ValueSource for hashbrown::HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Group descriptors as produced by a match are unwrapped to their value.
impl ValueSource for BTreeMap<String, GroupMatch> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|g| &g.value)
    }
}

impl ValueSource for MatchResult {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl ValueSource for [(&str, Value)] {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(key, _)| *key == name).map(|(_, v)| v)
    }
}

impl<const N: usize> ValueSource for [(&str, Value); N] {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.as_slice().lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConstraintArgs;

    #[test]
    fn descriptor_maps_unwrap_values() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "id".to_string(),
            GroupMatch {
                value: Value::Int(7),
                type_name: "int".into(),
                constraints: ConstraintArgs::new(),
            },
        );
        assert_eq!(groups.lookup("id"), Some(&Value::Int(7)));
        assert_eq!(groups.lookup("missing"), None);
    }

    #[test]
    fn pair_arrays_find_by_name() {
        let values = [("a", Value::Int(1)), ("b", Value::from("x"))];
        assert_eq!(values.lookup("b"), Some(&Value::from("x")));
    }
}
