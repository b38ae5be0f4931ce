//! Rule capability consumed by decision modules.

pub mod engine;

pub use engine::{PlayRules, StandardRules};
