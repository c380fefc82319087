//! Tie handling for opposed rolls.

use serde::{Deserialize, Serialize};

/// How an opposed roll resolves equal results.
///
/// There is deliberately no `Default`: game systems disagree on ties, so
/// every caller names the rule it plays by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Ties go to the first roller (e.g. the attacker).
    FirstWins,
    /// Ties go to the second roller (e.g. the defender).
    SecondWins,
    /// Ties are reported as their own outcome.
    KeepTie,
    /// Both sides roll again until the tie breaks.
    Reroll,
}

impl TiePolicy {
    /// Returns the display label for this policy.
    pub fn label(&self) -> &'static str {
        match self {
            TiePolicy::FirstWins => "first_wins",
            TiePolicy::SecondWins => "second_wins",
            TiePolicy::KeepTie => "keep_tie",
            TiePolicy::Reroll => "reroll",
        }
    }
}
