/// Limits that keep a malformed knowledge base from running away
///
/// Both limits are far above what real knowledge bases need: the goal stack
/// never grows beyond the number of distinct facts, and every solver step
/// either asks a question, settles a fact or pushes a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum iterations of a single chaining call
    /// Real usage: ~100, Limit: 100_000
    pub max_solver_steps: usize,

    /// Maximum number of goals pursued at once
    /// Real usage: ~10 levels, Limit: 1_000
    pub max_goal_stack_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_solver_steps: 100_000,
            max_goal_stack_depth: 1_000,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}
