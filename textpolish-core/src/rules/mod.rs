// Rule system: compiled line rules and edit-time validation
// - engine.rs: anchored pattern compilation, LineRule implementations, RuleEngine
// - validation.rs: report of empty or non-compiling patterns

pub mod engine;
pub mod validation;

pub use engine::*;
pub use validation::{validate_configuration, PatternProblem, RuleIssue, RuleValidationReport};
