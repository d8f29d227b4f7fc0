pub mod cancel;
pub mod cards;
pub mod cfr;
pub mod cli;
pub mod combinatorics;
pub mod config;
pub mod display;
pub mod equity;
pub mod error;
pub mod hand_evaluator;
pub mod math_engine;
pub mod range;
pub mod registry;
pub mod showdown_cache;
pub mod spot;
