//! Outcome tags - named counters riding along with a rolled value.
//!
//! A tag marks how an outcome came about ("crit", "fumble") rather than what
//! it is worth. Combining two outcomes adds their counters, so the sum of two
//! natural 20s carries `crit: 2`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Outcome;

/// Additive tag counters attached to one outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, u32>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding `tag` once.
    pub fn single(tag: impl Into<String>) -> Self {
        let mut counters = BTreeMap::new();
        counters.insert(tag.into(), 1);
        Self(counters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many times `tag` was applied; zero when absent.
    pub fn count(&self, tag: &str) -> u32 {
        self.0.get(tag).copied().unwrap_or(0)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    /// (tag, count) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.0.iter().map(|(tag, &count)| (tag.as_str(), count))
    }

    /// Returns a copy with `tag` applied once more.
    pub fn with_added(&self, tag: &str) -> Self {
        let mut next = self.clone();
        let counter = next.0.entry(tag.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
        next
    }

    /// Counter-wise sum of both sets.
    pub fn merged(&self, other: &TagSet) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut next = self.clone();
        for (tag, &count) in &other.0 {
            let counter = next.0.entry(tag.clone()).or_insert(0);
            *counter = counter.saturating_add(count);
        }
        next
    }

    /// Returns a copy without `tags`; an empty list clears every tag.
    pub fn without(&self, tags: &[String]) -> Self {
        if tags.is_empty() {
            return Self::new();
        }
        Self(
            self.0
                .iter()
                .filter(|(tag, _)| !tags.contains(tag))
                .map(|(tag, &count)| (tag.clone(), count))
                .collect(),
        )
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(tag, count)| {
                if count == 1 {
                    tag.to_string()
                } else {
                    format!("{}x{}", tag, count)
                }
            })
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(TagSet::new(), |tags, tag| {
            let tag: String = tag.into();
            tags.with_added(&tag)
        })
    }
}

/// An outcome value together with its tags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaggedOutcome {
    pub value: Outcome,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
}

impl TaggedOutcome {
    pub fn new(value: Outcome, tags: TagSet) -> Self {
        Self { value, tags }
    }

    /// An outcome with no tags.
    pub fn plain(value: Outcome) -> Self {
        Self::new(value, TagSet::new())
    }
}
