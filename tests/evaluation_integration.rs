//! Integration tests for the evaluation pipeline.
//!
//! These tests drive the public surface end to end:
//! 1. Rule expressions evaluate to the exact tables players know
//! 2. Handlers compose evaluation and interaction analysis
//! 3. A shared cache can be used by evaluations running on the rayon pool
//! 4. Results serialize for chart and report consumers

use num_traits::Zero;
use serde_json::json;
use std::sync::Arc;

use rpg_stat_calculator::adapters::cache::InMemoryDistributionCache;
use rpg_stat_calculator::application::handlers::evaluation::{
    AggregateExpressionsCommand, AggregateExpressionsHandler, AnalyzeInteractionCommand,
    AnalyzeInteractionHandler, EvaluateBatchCommand, EvaluateBatchHandler,
    EvaluateExpressionCommand, EvaluateExpressionHandler, NamedExpression,
};
use rpg_stat_calculator::config::EvaluationConfig;
use rpg_stat_calculator::domain::analysis::{Reducer, TiePolicy};
use rpg_stat_calculator::domain::distribution::OutcomeDistribution;
use rpg_stat_calculator::domain::evaluator::{EvaluationLimits, Evaluator};
use rpg_stat_calculator::domain::expression::{
    ComparisonOperator, Expr, Predicate, Rounding, TagCondition, Transform,
};
use rpg_stat_calculator::domain::foundation::{BoundedOperator, ErrorCode, Probability};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn evaluate(expr: &Expr) -> OutcomeDistribution {
    Evaluator::default().evaluate(expr).unwrap()
}

fn shared_evaluator() -> (Evaluator, Arc<InMemoryDistributionCache>) {
    let cache = Arc::new(InMemoryDistributionCache::new());
    let evaluator = Evaluator::default().with_shared_cache(cache.clone());
    (evaluator, cache)
}

// =============================================================================
// Rule Tables
// =============================================================================

#[test]
fn ability_score_roll_matches_known_table() {
    let dist = evaluate(&Expr::keep_highest(3, 4, Expr::die(6)));

    assert_eq!(dist.min_outcome(), 3);
    assert_eq!(dist.max_outcome(), 18);
    assert_eq!(dist.probability_of(18), Probability::ratio(21, 1296));
    assert_eq!(dist.probability_of(3), Probability::ratio(1, 1296));
    assert!(dist.total_probability().is_one());
}

#[test]
fn attack_bonus_shifts_the_whole_distribution() {
    let plain = evaluate(&Expr::die(20));
    let bonus = evaluate(&(Expr::die(20) + 5));

    assert_eq!(bonus.min_outcome(), plain.min_outcome() + 5);
    assert_eq!(bonus.max_outcome(), plain.max_outcome() + 5);
    assert_eq!(bonus.probability_of(25), plain.probability_of(20));
}

#[test]
fn fate_dice_are_symmetric() {
    let fate = Expr::dice(4, Expr::faces([-1, -1, 0, 0, 1, 1]));
    let dist = evaluate(&fate);

    assert_eq!(dist.min_outcome(), -4);
    assert_eq!(dist.max_outcome(), 4);
    assert_eq!(dist.probability_of(4), dist.probability_of(-4));
    assert_eq!(dist.probability_of(4), Probability::ratio(1, 81));
    assert!(dist.expected_value().is_zero());
}

#[test]
fn great_weapon_style_reroll_raises_the_mean() {
    let plain = evaluate(&Expr::dice(2, Expr::die(6)));
    let rerolled = evaluate(&Expr::dice(
        2,
        Expr::die(6).reroll(Predicate::at_most(2), 1),
    ));

    assert!(rerolled.expected_value() > plain.expected_value());
    // Both dice carry the same warning; it is reported once.
    let warnings = rerolled.truncation_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].operator, BoundedOperator::Reroll);
    assert_eq!(warnings[0].residual, Probability::ratio(1, 9));
}

#[test]
fn exploding_d6_reports_its_cut_off_mass() {
    let dist = evaluate(&Expr::die(6).explode(Predicate::Maximum, 2));

    assert_eq!(dist.max_outcome(), 18);
    assert_eq!(dist.probability_of(18), Probability::ratio(1, 216));
    assert_eq!(dist.probability_of(6), Probability::zero());
    assert!(dist.total_probability().is_one());

    let warning = &dist.truncation_warnings()[0];
    assert_eq!(warning.operator, BoundedOperator::Explode);
    assert_eq!(warning.bound, 2);
    assert_eq!(warning.residual, Probability::ratio(1, 216));
}

#[test]
fn halved_damage_rounds_down() {
    let halved = Expr::dice(2, Expr::die(6)).map(Transform::Divide {
        divisor: 2,
        rounding: Rounding::Floor,
    });
    let dist = evaluate(&halved);

    assert_eq!(dist.min_outcome(), 1);
    assert_eq!(dist.max_outcome(), 6);
    // 2d6 of 2 or 3 both halve to 1.
    assert_eq!(dist.probability_of(1), Probability::ratio(3, 36));
}

#[test]
fn saving_throw_success_is_an_indicator() {
    let save = (Expr::die(20) + 3).at_least(Expr::constant(15));
    let dist = evaluate(&save);

    assert_eq!(dist.outcomes().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(dist.probability_of(1), Probability::ratio(9, 20));
}

#[test]
fn natural_twenty_doubles_the_attack_total() {
    let attack = (Expr::die(20).tag("crit", Predicate::equals(20)) + 5)
        .tag_rule(TagCondition::has("crit"), Transform::Scale { factor: 2 });
    let dist = evaluate(&attack);

    assert_eq!(dist.max_outcome(), 50);
    assert_eq!(dist.probability_of(50), Probability::ratio(1, 20));
    assert_eq!(dist.probability_of(25), Probability::zero());
    assert_eq!(dist.tag_probability("crit"), Probability::ratio(1, 20));

    let hit = evaluate(&attack.at_least(Expr::constant(15)));
    assert_eq!(hit.probability_of(1), Probability::ratio(11, 20));
    assert_eq!(
        hit.probability_where_tagged(|value, tags| value == 1 && tags.contains("crit")),
        Probability::ratio(1, 20)
    );
}

#[test]
fn crits_count_across_a_damage_pool() {
    let die = Expr::die(6).tag("max", Predicate::Maximum);
    let dist = evaluate(&Expr::dice(3, die).remove_tags(Vec::<String>::new()));
    assert!(!dist.is_tagged());

    let counted = evaluate(&Expr::dice(3, Expr::die(6).tag("max", Predicate::Maximum)));
    assert_eq!(
        counted.probability_where_tagged(|_, tags| tags.count("max") == 3),
        Probability::ratio(1, 216)
    );
    assert_eq!(counted.pairs(), evaluate(&Expr::dice(3, Expr::die(6))).pairs());
}

#[test]
fn wide_keep_highest_pool_is_exact() {
    let dist = evaluate(&Expr::keep_highest(15, 30, Expr::die(20)));
    assert_eq!(dist.min_outcome(), 15);
    assert_eq!(dist.max_outcome(), 300);
    assert!(dist.total_probability().is_one());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn malformed_trees_fail_before_any_work() {
    let evaluator = Evaluator::default();

    let oversized_keep = Expr::keep_highest(5, 4, Expr::die(6));
    let err = evaluator.evaluate(&oversized_keep).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidExpression);

    let bad_die = Expr::dice(3, Expr::die(6)) + Expr::die(0);
    let err = evaluator.evaluate(&bad_die).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidExpression);

    let zero_divisor = Expr::die(6) / Expr::constant(0);
    let err = evaluator.evaluate(&zero_divisor).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidExpression);
}

#[test]
fn divisor_that_can_roll_zero_is_rejected() {
    let divisor = Expr::faces([0, 1, 2]);
    let err = Evaluator::default()
        .evaluate(&(Expr::die(6) / divisor))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidExpression);
}

#[test]
fn outcome_ceiling_is_enforced() {
    let evaluator = Evaluator::new(EvaluationLimits::new(10, 8));
    let err = evaluator
        .evaluate(&Expr::dice(3, Expr::die(6)))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
}

#[test]
fn selection_state_ceiling_is_enforced() {
    let evaluator = Evaluator::new(EvaluationLimits::new(1_000, 64));
    let err = evaluator
        .evaluate(&Expr::keep_highest(15, 30, Expr::die(20)))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
}

#[test]
fn aggregate_ceiling_is_enforced() {
    let handler = AggregateExpressionsHandler::new(Evaluator::new(EvaluationLimits::new(1_000, 64)));
    let err = handler
        .handle(AggregateExpressionsCommand {
            expressions: vec![
                Expr::faces((0..40).map(|i| i * 1_000)),
                Expr::faces(0..40),
            ],
            reducer: Reducer::Sum,
            threshold: None,
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
}

#[test]
fn bound_ceiling_is_enforced() {
    let evaluator = Evaluator::new(EvaluationLimits::new(10_000, 3));
    let err = evaluator
        .evaluate(&Expr::die(6).explode(Predicate::Maximum, 4))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidExpression);
}

// =============================================================================
// Handlers
// =============================================================================

#[test]
fn evaluate_handler_accepts_json_trees() {
    let command: EvaluateExpressionCommand = serde_json::from_value(json!({
        "expression": {
            "op": "select_lowest",
            "keep": 1,
            "pool": [
                { "op": "uniform_die", "sides": 20 },
                { "op": "uniform_die", "sides": 20 }
            ]
        }
    }))
    .unwrap();

    let result = EvaluateExpressionHandler::new(Evaluator::default())
        .handle(command)
        .unwrap();
    assert_eq!(result.distribution.probability_of(1), Probability::ratio(39, 400));
    assert_eq!(result.stats.nodes, 3);
}

#[test]
fn interaction_handler_reports_opposed_roll() {
    let handler = AnalyzeInteractionHandler::new(Evaluator::default());
    let result = handler
        .handle(AnalyzeInteractionCommand {
            first: Expr::die(20) + 2,
            second: Expr::die(20),
            tie_policy: TiePolicy::FirstWins,
            comparison: Some(ComparisonOperator::GreaterOrEqual),
        })
        .unwrap();

    let interaction = &result.interaction;
    let total = interaction.win_probability.clone()
        + interaction.loss_probability.clone()
        + interaction.tie_probability.clone();
    assert!(total.is_one());
    assert_eq!(
        interaction.opposed.first_wins,
        interaction.win_probability.clone() + interaction.tie_probability.clone()
    );
    assert_eq!(
        result.comparison.unwrap().success_probability(),
        interaction.opposed.first_wins
    );
}

#[test]
fn aggregate_handler_scores_best_of_three() {
    let handler = AggregateExpressionsHandler::new(Evaluator::default());
    let result = handler
        .handle(AggregateExpressionsCommand {
            expressions: vec![Expr::die(20), Expr::die(20), Expr::die(20)],
            reducer: Reducer::Max,
            threshold: Some(19),
        })
        .unwrap();

    // 1 - (19/20)^3
    assert_eq!(
        result.exceeds_threshold.unwrap(),
        Probability::ratio(1141, 8000)
    );
}

#[test]
fn batch_keeps_successes_when_one_entry_fails() {
    let (evaluator, _) = shared_evaluator();
    let handler = EvaluateBatchHandler::new(evaluator, true);
    let result = handler.handle(EvaluateBatchCommand {
        expressions: vec![
            NamedExpression::new("longsword", Expr::die(8) + 3),
            NamedExpression::new("broken", Expr::keep_highest(3, 2, Expr::die(6))),
            NamedExpression::new("greatsword", Expr::dice(2, Expr::die(6)) + 3),
        ],
    });

    assert_eq!(result.succeeded().count(), 2);
    let failed: Vec<_> = result.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "broken");
    assert_eq!(failed[0].1.code, ErrorCode::InvalidExpression);

    let greatsword = result.get("greatsword").unwrap();
    let dist = &greatsword.outcome.as_ref().unwrap().distribution;
    assert_eq!(dist.max_outcome(), 15);
}

// =============================================================================
// Shared Cache
// =============================================================================

#[test]
fn shared_cache_serves_repeated_subtrees_across_evaluations() {
    let (evaluator, cache) = shared_evaluator();
    let fireball = Expr::dice(8, Expr::die(6));

    let first = evaluator.evaluate(&fireball).unwrap();
    let (second, stats) = evaluator.evaluate_with_stats(&fireball).unwrap();

    assert_eq!(first, second);
    assert!(stats.shared_cache_hits >= 1);
    assert!(cache.stats().hits >= 1);
    assert!(cache.stats().entries >= 1);
}

#[test]
fn shared_cache_is_consistent_under_parallel_batches() {
    let (evaluator, cache) = shared_evaluator();
    let handler = EvaluateBatchHandler::new(evaluator, true);
    let expressions = (0..16)
        .map(|i| NamedExpression::new(format!("build-{i}"), Expr::dice(4, Expr::die(6)) + i))
        .collect();

    let result = handler.handle(EvaluateBatchCommand { expressions });

    assert_eq!(result.succeeded().count(), 16);
    let expected = evaluate(&Expr::dice(4, Expr::die(6)));
    for (label, entry) in result.succeeded() {
        let offset: i64 = label.trim_start_matches("build-").parse().unwrap();
        assert_eq!(
            entry.distribution.probability_of(4 + offset),
            expected.probability_of(4)
        );
    }
    // Every distinct root was published once.
    assert!(cache.stats().entries >= 16);
}

#[test]
fn config_switch_controls_cache_wiring() {
    let cache = Arc::new(InMemoryDistributionCache::new());
    let config = EvaluationConfig {
        shared_cache: false,
        ..EvaluationConfig::default()
    };
    let handler = EvaluateExpressionHandler::from_config(&config, cache.clone());
    handler
        .handle(EvaluateExpressionCommand {
            expression: Expr::dice(3, Expr::die(6)),
        })
        .unwrap();
    assert_eq!(cache.stats().entries, 0);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn view_serializes_exact_and_float_forms() {
    let dist = evaluate(&Expr::die(6).explode(Predicate::Maximum, 1));
    let json = serde_json::to_value(dist.view()).unwrap();

    let first = &json["outcomes"][0];
    assert_eq!(first["outcome"], 1);
    assert_eq!(first["probability"], "1/6");
    assert!(json["expected_value"].as_f64().unwrap() > 3.5);
    assert_eq!(json["truncation"][0]["operator"], "explode");
    assert_eq!(json["truncation"][0]["residual"], "1/36");
}

#[test]
fn tagged_view_lists_joint_rows() {
    let dist = evaluate(&Expr::die(2).tag("crit", Predicate::Maximum));
    let json = serde_json::to_value(dist.view()).unwrap();

    assert_eq!(json["tagged"][0], json!({ "outcome": 1, "tags": {}, "probability": "1/2" }));
    assert_eq!(json["tagged"][1]["tags"]["crit"], 1);
    assert_eq!(json["outcomes"][1]["probability"], "1/2");
}

#[test]
fn expressions_survive_a_json_round_trip() {
    let expr = Expr::keep_highest(3, 4, Expr::die(6).reroll(Predicate::equals(1), 1)) + 2;
    let json = serde_json::to_string(&expr).unwrap();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expr);
    assert_eq!(evaluate(&back), evaluate(&expr));
}
