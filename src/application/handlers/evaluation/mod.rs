//! Evaluation handlers.
//!
//! Synchronous command handlers over the evaluator and analyzer.

mod aggregate_expressions;
mod analyze_interaction;
mod evaluate_batch;
mod evaluate_expression;

pub use aggregate_expressions::{
    AggregateExpressionsCommand, AggregateExpressionsHandler, AggregateExpressionsResult,
};
pub use analyze_interaction::{
    AnalyzeInteractionCommand, AnalyzeInteractionHandler, AnalyzeInteractionResult,
};
pub use evaluate_batch::{
    BatchEntry, EvaluateBatchCommand, EvaluateBatchHandler, EvaluateBatchResult, NamedExpression,
};
pub use evaluate_expression::{
    evaluator_from_config, EvaluateExpressionCommand, EvaluateExpressionHandler,
    EvaluateExpressionResult,
};
