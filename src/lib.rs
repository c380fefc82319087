//! RPG Stat Calculator - Exact dice probability engine
//!
//! Rule catalogs describe dice mechanics as expression trees ("4d6 drop
//! lowest", "d20 with advantage", "exploding d10s"). This crate reduces
//! those trees to exact outcome distributions using rational arithmetic and
//! compares independent results (attack versus defence, best of several).
//!
//! ```
//! use rpg_stat_calculator::domain::evaluator::Evaluator;
//! use rpg_stat_calculator::domain::expression::Expr;
//! use rpg_stat_calculator::domain::foundation::Probability;
//!
//! let dist = Evaluator::default()
//!     .evaluate(&Expr::keep_highest(1, 2, Expr::die(6)))
//!     .unwrap();
//! assert_eq!(dist.probability_of(6), Probability::ratio(11, 36));
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
