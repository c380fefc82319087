//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod evaluation;

pub use evaluation::{
    evaluator_from_config, AggregateExpressionsCommand, AggregateExpressionsHandler,
    AggregateExpressionsResult, AnalyzeInteractionCommand, AnalyzeInteractionHandler,
    AnalyzeInteractionResult, BatchEntry, EvaluateBatchCommand, EvaluateBatchHandler,
    EvaluateBatchResult, EvaluateExpressionCommand, EvaluateExpressionHandler,
    EvaluateExpressionResult, NamedExpression,
};
