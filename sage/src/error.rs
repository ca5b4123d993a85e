use thiserror::Error;

/// Error types for the sage resolution core
///
/// None of these are raised for an ordinary "cannot decide" situation. A goal
/// that no rule or question can establish is recovered by marking it
/// undefined; everything here signals a broken knowledge base or a caller bug.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SageError {
    /// A chain of variables refers back to itself
    #[error("Cyclic indirection: {}", .chain.join(" -> "))]
    CyclicIndirection { chain: Vec<String> },

    /// A fact condition names a test that does not exist
    #[error("Unknown test '{0}' (expected one of eq, gt, gte, lt, lte)")]
    UnknownTest(String),

    /// An at-least-N condition asks for more children than it has
    #[error("Threshold {threshold} exceeds the number of conditions ({conditions})")]
    ThresholdExceeded { threshold: usize, conditions: usize },

    /// A variable (`$name`) was passed where a plain fact name is required
    #[error("Expected a fact name, got variable '{0}'; resolve it first")]
    VariableName(String),

    /// A goal was popped as decided but its value still cannot be read
    #[error("Goal '{0}' was marked as solved but has no value")]
    UnsolvedGoal(String),

    /// The solver loop ran more iterations than allowed
    #[error("Solver exceeded {limit} steps")]
    StepLimitExceeded { limit: usize },

    /// The goal stack grew beyond the configured depth
    #[error("Goal stack exceeded {limit} entries while pursuing '{goal}'")]
    GoalStackOverflow { limit: usize, goal: String },

    /// The caller picked an option that the question does not have
    #[error("Option {index} is out of range for a question with {options} options")]
    ChoiceOutOfRange { index: usize, options: usize },

    /// A knowledge domain could not be read from JSON
    #[error("Invalid knowledge domain: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SageError {
    fn from(err: serde_json::Error) -> Self {
        SageError::Json(err.to_string())
    }
}
