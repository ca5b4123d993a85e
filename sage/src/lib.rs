//! # Sage Engine
//!
//! **Rules, questions and goals, decided in three values**
//!
//! Sage is the resolution core of an expert system shell. Given a knowledge
//! base of rules, questions a user can answer, and goals (facts to determine),
//! it derives each goal as `Yes`, `No` or `Maybe`, asking only the questions
//! the rules cannot settle on their own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sage::{Condition, Engine, Goal, KnowledgeDomain, Rule, SageResult};
//!
//! fn main() -> SageResult<()> {
//!     let mut domain = KnowledgeDomain::new();
//!     domain.rules.push(
//!         Rule::new("rain makes the street wet", Condition::fact("rain", "yes"))
//!             .then("street", "wet"),
//!     );
//!     domain.facts.insert("rain".to_string(), "yes".to_string());
//!     domain.goals.push(Goal::new("street", "Is the street wet?"));
//!
//!     let engine = Engine::new(domain)?;
//!     let mut state = engine.start();
//!
//!     // Answer every question with its first option
//!     engine.run(&mut state, |_question| Ok(Some(0)))?;
//!
//!     for answer in engine.goal_answers(&state)? {
//!         println!("{}: {:?}", answer.goal, answer.value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Facts and variables
//! Facts are named string values. A value written as `$other` is a variable:
//! it stands for whatever value `other` has.
//!
//! ### Conditions
//! Fact comparisons combined with negation and "at least N of". AND and OR
//! are the N = all and N = 1 cases.
//!
//! ### Chaining
//! Backward chaining works a goal stack, pursuing whichever unknown fact is
//! most responsible for a goal being undecided. Forward chaining fires every
//! rule it can until nothing changes.

pub mod condition;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod logger;
pub mod negate;
pub mod resource_limits;
pub mod solver;
pub mod state;
pub mod truth;

pub use condition::{Condition, FactCondition, Test};
pub use engine::{Engine, GoalAnswer};
pub use error::SageError;
pub use knowledge::{
    Algorithm, Answer, Choice, Consequences, Goal, KnowledgeDomain, KnowledgeItem,
    PendingQuestion, Question, Reason, Rule,
};
pub use logger::{Logger, Severity, TracingLogger};
pub use negate::{negate, simplify, ValueDomain};
pub use resource_limits::ResourceLimits;
pub use solver::{Outcome, Solution, Solver};
pub use state::{Conflict, KnowledgeState, Resolution, UNDEFINED};
pub use truth::{Factor, Truth, TruthState};

/// Result type for sage operations
pub type SageResult<T> = Result<T, SageError>;

#[cfg(test)]
mod tests;
