//! Last-writer-wins property register
//!
//! Each field keeps the value of the write with the strictly greatest
//! timestamp seen so far. A write whose timestamp is equal to or older
//! than the stored one is dropped, so on a tie the incumbent value stays.

use crate::core::types::{MergeOutcome, PropertyValue, Timestamp};
use std::collections::BTreeMap;

/// Field name to timestamped value map owned by one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyRegister {
    fields: BTreeMap<String, PropertyValue>,
}

impl PropertyRegister {
    /// Create an empty register
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a single write. This is the only path that mutates a register.
    pub fn apply(&mut self, timestamp: Timestamp, field: &str, value: &str) -> MergeOutcome {
        match self.fields.get_mut(field) {
            Some(current) if current.last_updated >= timestamp => MergeOutcome::Unchanged,
            Some(current) => {
                current.value.clear();
                current.value.push_str(value);
                current.last_updated = timestamp;
                MergeOutcome::Changed
            }
            None => {
                self.fields
                    .insert(field.to_string(), PropertyValue::new(value, timestamp));
                MergeOutcome::Changed
            }
        }
    }

    /// Offer every field of an update, returning the accepted subset
    pub fn apply_all<'a, I>(&mut self, timestamp: Timestamp, values: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        values
            .into_iter()
            .filter(|(field, value)| self.apply(timestamp, field, value).is_changed())
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }

    /// Stored value and timestamp for a field
    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.fields.get(field)
    }

    /// Stored value for a field
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|p| p.value.as_str())
    }

    /// Number of fields ever written
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has been written
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain field to value view, dropping timestamps
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_write_lands() {
        let mut register = PropertyRegister::new();
        assert_eq!(register.apply(1, "x", "v1"), MergeOutcome::Changed);
        assert_eq!(register.get("x"), Some(&PropertyValue::new("v1", 1)));
    }

    #[test]
    fn test_first_write_lands_for_any_timestamp() {
        let mut register = PropertyRegister::new();
        assert!(register.apply(Timestamp::MIN, "low", "a").is_changed());
        assert!(register.apply(0, "zero", "b").is_changed());
        assert!(register.apply(-5, "negative", "c").is_changed());
        assert_eq!(register.len(), 3);
    }

    #[test]
    fn test_equal_timestamp_keeps_incumbent() {
        let mut register = PropertyRegister::new();
        register.apply(1, "x", "v1");
        assert_eq!(register.apply(1, "x", "v2"), MergeOutcome::Unchanged);
        assert_eq!(register.value("x"), Some("v1"));
    }

    #[test]
    fn test_older_timestamp_is_dropped() {
        let mut register = PropertyRegister::new();
        register.apply(5, "x", "v2");
        assert_eq!(register.apply(1, "x", "v3"), MergeOutcome::Unchanged);
        assert_eq!(register.get("x"), Some(&PropertyValue::new("v2", 5)));
    }

    #[test]
    fn test_newer_timestamp_overwrites() {
        let mut register = PropertyRegister::new();
        register.apply(1, "x", "old");
        assert_eq!(register.apply(2, "x", "new"), MergeOutcome::Changed);
        assert_eq!(register.get("x"), Some(&PropertyValue::new("new", 2)));
    }

    #[test]
    fn test_apply_all_returns_only_accepted_fields() {
        let mut register = PropertyRegister::new();
        register.apply(10, "kept", "incumbent");

        let update: BTreeMap<String, String> = [("kept", "loser"), ("fresh", "winner")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let accepted = register.apply_all(10, &update);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted.get("fresh").map(String::as_str), Some("winner"));
        assert_eq!(register.value("kept"), Some("incumbent"));
    }

    /// Writes with distinct timestamps, paired with a permutation of themselves
    fn arb_writes_and_permutation(
    ) -> impl Strategy<Value = (Vec<(Timestamp, String)>, Vec<(Timestamp, String)>)> {
        prop::collection::hash_set(-1000i64..1000, 1..32).prop_flat_map(|timestamps| {
            let writes: Vec<(Timestamp, String)> = timestamps
                .into_iter()
                .map(|t| (t, format!("v{}", t)))
                .collect();
            (Just(writes.clone()), Just(writes).prop_shuffle())
        })
    }

    proptest! {
        /// Stored timestamp never decreases and the stored value always
        /// belongs to the first write carrying the greatest timestamp.
        #[test]
        fn prop_monotonic_register(writes in prop::collection::vec((-50i64..50, "[a-z]{1,4}"), 1..64)) {
            let mut register = PropertyRegister::new();
            let mut last_seen: Option<Timestamp> = None;

            for (timestamp, value) in &writes {
                register.apply(*timestamp, "field", value);
                let stored = register.get("field").unwrap();
                if let Some(prev) = last_seen {
                    prop_assert!(stored.last_updated >= prev);
                }
                last_seen = Some(stored.last_updated);
            }

            let max = writes.iter().map(|(t, _)| *t).max().unwrap();
            let winner = writes.iter().find(|(t, _)| *t == max).unwrap();
            prop_assert_eq!(register.get("field").unwrap(), &PropertyValue::new(winner.1.clone(), max));
        }

        /// Any permutation of writes with distinct timestamps ends in the same register.
        #[test]
        fn prop_order_independent((writes, shuffled) in arb_writes_and_permutation()) {
            let mut forward = PropertyRegister::new();
            for (t, v) in &writes {
                forward.apply(*t, "f", v);
            }

            let mut reordered = PropertyRegister::new();
            for (t, v) in &shuffled {
                reordered.apply(*t, "f", v);
            }

            prop_assert_eq!(forward, reordered);
        }
    }
}
