//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and wires ports into the
//! evaluator. Handlers are synchronous: every computation is CPU-bound.

pub mod handlers;

pub use handlers::{
    AggregateExpressionsCommand, AggregateExpressionsHandler, AggregateExpressionsResult,
    AnalyzeInteractionCommand, AnalyzeInteractionHandler, AnalyzeInteractionResult,
    EvaluateBatchCommand, EvaluateBatchHandler, EvaluateBatchResult, EvaluateExpressionCommand,
    EvaluateExpressionHandler, EvaluateExpressionResult, NamedExpression,
};
