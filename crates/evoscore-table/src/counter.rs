use std::collections::{BTreeMap, btree_map};

use crate::Value;

/// An ordered multiset of output values.
///
/// Maps each distinct output value observed for one input vector to the number of times
/// it was observed. Zero counts are never stored.
///
/// # Example
///
/// ```
/// use evoscore_table::{Counter, Value};
///
/// let counter: Counter = [(Value::from(true), 3), (Value::from(false), 1)]
///     .into_iter()
///     .collect();
/// assert_eq!(counter.get(&Value::from(true)), 3);
/// assert_eq!(counter.total_count(), 4);
/// assert_eq!(counter.max_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    counts: BTreeMap<Value, u64>,
}

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` observations of `value`.
    pub fn add(&mut self, value: Value, count: u64) {
        if count > 0 {
            *self.counts.entry(value).or_default() += count;
        }
    }

    /// Merges every observation of `other` into `self`.
    pub fn merge(&mut self, other: &Counter) {
        for (value, count) in other.iter() {
            self.add(value.clone(), count);
        }
    }

    /// Returns the number of observations of `value`.
    #[must_use]
    pub fn get(&self, value: &Value) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Returns the total number of observations.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Returns the count of the most frequent value (zero when empty).
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Returns the most frequent value and its count.
    ///
    /// Ties are broken toward the smallest value.
    #[must_use]
    pub fn most_common(&self) -> Option<(&Value, u64)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&Value, u64)>, (v, &c)| match best {
                Some((_, bc)) if bc >= c => best,
                _ => Some((v, c)),
            })
    }

    /// Returns the number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(value, count)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, u64)> + '_ {
        self.counts.iter().map(|(v, c)| (v, *c))
    }
}

impl FromIterator<(Value, u64)> for Counter {
    fn from_iter<T: IntoIterator<Item = (Value, u64)>>(iter: T) -> Self {
        let mut counter = Self::new();
        for (value, count) in iter {
            counter.add(value, count);
        }
        counter
    }
}

impl FromIterator<Value> for Counter {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        iter.into_iter().map(|v| (v, 1)).collect()
    }
}

impl IntoIterator for Counter {
    type Item = (Value, u64);
    type IntoIter = btree_map::IntoIter<Value, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_counts_are_dropped() {
        let mut counter = Counter::new();
        counter.add(Value::from("a"), 0);
        assert!(counter.is_empty());
        assert_eq!(counter.most_common(), None);
    }

    #[test]
    fn test_most_common_prefers_smallest_on_tie() {
        let counter: Counter = ["b", "a", "b", "a", "c"]
            .into_iter()
            .map(Value::from)
            .collect();
        assert_eq!(counter.most_common(), Some((&Value::from("a"), 2)));
        assert_eq!(counter.len(), 3);
    }

    #[test]
    fn test_merge() {
        let mut left: Counter = [Value::from(1.0)].into_iter().collect();
        let right: Counter = [(Value::from(1.0), 2), (Value::from(2.0), 1)]
            .into_iter()
            .collect();
        left.merge(&right);
        assert_eq!(left.get(&Value::from(1.0)), 3);
        assert_eq!(left.total_count(), 4);
    }
}
