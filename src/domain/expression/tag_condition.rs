//! Conditions over an outcome's tags, used by tag rules.

use serde::{Deserialize, Serialize};

use crate::domain::distribution::TagSet;

/// A test applied to the tags of a single outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagCondition {
    /// The tag was applied at least once.
    Has { tag: String },
    /// The tag was applied at least `count` times.
    AtLeast { tag: String, count: u32 },
    /// No tag at all.
    Untagged,
    All { conditions: Vec<TagCondition> },
    Any { conditions: Vec<TagCondition> },
    Not { inner: Box<TagCondition> },
}

impl TagCondition {
    pub fn has(tag: impl Into<String>) -> Self {
        TagCondition::Has { tag: tag.into() }
    }

    pub fn at_least(tag: impl Into<String>, count: u32) -> Self {
        TagCondition::AtLeast {
            tag: tag.into(),
            count,
        }
    }

    /// Inverts this condition.
    pub fn negate(self) -> Self {
        TagCondition::Not {
            inner: Box::new(self),
        }
    }

    pub fn holds(&self, tags: &TagSet) -> bool {
        match self {
            TagCondition::Has { tag } => tags.contains(tag),
            TagCondition::AtLeast { tag, count } => tags.count(tag) >= *count,
            TagCondition::Untagged => tags.is_empty(),
            TagCondition::All { conditions } => conditions.iter().all(|c| c.holds(tags)),
            TagCondition::Any { conditions } => conditions.iter().any(|c| c.holds(tags)),
            TagCondition::Not { inner } => !inner.holds(tags),
        }
    }

    /// Tag names this condition refers to.
    pub fn tag_names(&self) -> Vec<&str> {
        match self {
            TagCondition::Has { tag } | TagCondition::AtLeast { tag, .. } => vec![tag.as_str()],
            TagCondition::Untagged => Vec::new(),
            TagCondition::All { conditions } | TagCondition::Any { conditions } => {
                conditions.iter().flat_map(TagCondition::tag_names).collect()
            }
            TagCondition::Not { inner } => inner.tag_names(),
        }
    }
}
