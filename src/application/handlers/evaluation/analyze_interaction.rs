//! AnalyzeInteractionHandler - Evaluates two trees and compares them.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::{ComparisonResult, InteractionAnalyzer, InteractionResult, TiePolicy};
use crate::domain::distribution::OutcomeDistribution;
use crate::domain::evaluator::Evaluator;
use crate::domain::expression::{ComparisonOperator, Expr};
use crate::domain::foundation::DomainError;

/// Command to analyze `first` against `second`, e.g. an attack roll
/// against a defence roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeInteractionCommand {
    pub first: Expr,
    pub second: Expr,
    /// How ties resolve; there is no default.
    pub tie_policy: TiePolicy,
    /// Extra comparison to report alongside the opposed roll.
    #[serde(default)]
    pub comparison: Option<ComparisonOperator>,
}

/// Result of an interaction analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeInteractionResult {
    pub first: OutcomeDistribution,
    pub second: OutcomeDistribution,
    pub interaction: InteractionResult,
    pub comparison: Option<ComparisonResult>,
}

/// Handler for interaction analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeInteractionHandler {
    evaluator: Evaluator,
    analyzer: InteractionAnalyzer,
}

impl AnalyzeInteractionHandler {
    pub fn new(evaluator: Evaluator) -> Self {
        let analyzer = InteractionAnalyzer::new(*evaluator.limits());
        Self {
            evaluator,
            analyzer,
        }
    }

    pub fn handle(
        &self,
        cmd: AnalyzeInteractionCommand,
    ) -> Result<AnalyzeInteractionResult, DomainError> {
        // The two sides are independent trees.
        let (first, second) = rayon::join(
            || self.evaluator.evaluate(&cmd.first),
            || self.evaluator.evaluate(&cmd.second),
        );
        let (first, second) = (first?, second?);

        let interaction = self.analyzer.interact(&first, &second, cmd.tie_policy)?;
        let comparison = cmd
            .comparison
            .map(|operator| self.analyzer.compare(&first, &second, operator));

        Ok(AnalyzeInteractionResult {
            first,
            second,
            interaction,
            comparison,
        })
    }
}
