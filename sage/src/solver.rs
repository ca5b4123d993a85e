//! Backward and forward chaining
//!
//! Solving never blocks on a user. When a question has to be asked, the
//! chaining call returns [`Outcome::Pending`]; the caller records the answer
//! in the [`KnowledgeState`] and calls the same entry point again.

use crate::knowledge::{
    Algorithm, KnowledgeDomain, KnowledgeItem, PendingQuestion, Rule,
};
use crate::logger::{Logger, Severity};
use crate::state::{KnowledgeState, Resolution};
use crate::truth::{Factor, Truth, TruthState};
use crate::{ResourceLimits, SageError, SageResult};
use std::fmt;

/// Result of a chaining call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing left to do: every goal is decided or assumed undefined
    Decided,
    /// Suspended until the caller answers (or skips) this question
    Pending(PendingQuestion),
}

/// Result of trying to settle a single goal
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// The goal has a value
    Known(KnowledgeItem),
    /// The goal is blocked; the state says on what
    Unknown(TruthState),
    /// The goal can only be settled by asking
    Ask(PendingQuestion),
}

/// Drives resolution of a knowledge state against a domain
#[derive(Default)]
pub struct Solver {
    logger: Option<Box<dyn Logger>>,
    limits: ResourceLimits,
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("logger", &self.logger.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub(crate) fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        if let Some(logger) = &self.logger {
            logger.log(severity, message);
        }
    }

    /// Run the chaining algorithm the domain asks for
    pub fn step(&self, domain: &KnowledgeDomain, state: &mut KnowledgeState) -> SageResult<Outcome> {
        match domain.algorithm {
            Algorithm::BackwardChaining => self.backward_chain(domain, state),
            Algorithm::ForwardChaining => self.forward_chain(domain, state),
        }
    }

    /// Work the goal stack until it is empty or a question must be asked
    ///
    /// A goal that cannot be decided yet pushes the fact most responsible for
    /// that on top of the stack. When nothing more can be pursued for it, the
    /// goal is assumed undefined and popped.
    pub fn backward_chain(
        &self,
        domain: &KnowledgeDomain,
        state: &mut KnowledgeState,
    ) -> SageResult<Outcome> {
        let mut steps = 0;

        while let Some(goal) = state.top_goal().map(str::to_string) {
            steps += 1;
            if steps > self.limits.max_solver_steps {
                return Err(SageError::StepLimitExceeded {
                    limit: self.limits.max_solver_steps,
                });
            }

            match self.solve(domain, state, &goal)? {
                Solution::Ask(pending) => return Ok(Outcome::Pending(pending)),
                Solution::Unknown(maybe) => self.pursue(state, &goal, &maybe)?,
                Solution::Known(item) => match state.resolve(&item.value)? {
                    Resolution::Pending(maybe) => self.pursue(state, &goal, &maybe)?,
                    Resolution::Fact(value) => {
                        state.pop_goal();
                        if state.lookup(&goal)?.is_none() {
                            return Err(SageError::UnsolvedGoal(goal));
                        }
                        self.log(
                            Severity::Debug,
                            format_args!("Solved '{}' = '{}', popped from goal stack", goal, value),
                        );
                    }
                },
            }
        }

        Ok(Outcome::Decided)
    }

    /// Push the first cause of `maybe` not already being pursued, or give up
    /// on `goal` and mark it undefined
    fn pursue(&self, state: &mut KnowledgeState, goal: &str, maybe: &TruthState) -> SageResult<()> {
        let causes = maybe.unknown_facts();
        self.log(
            Severity::Debug,
            format_args!("'{}' is undecided, waiting on {:?}", goal, causes),
        );

        if let Some(cause) = causes.into_iter().find(|c| !state.is_pursuing(c)) {
            if state.goal_stack().len() >= self.limits.max_goal_stack_depth {
                return Err(SageError::GoalStackOverflow {
                    limit: self.limits.max_goal_stack_depth,
                    goal: cause,
                });
            }
            self.log(
                Severity::Debug,
                format_args!("Pushed '{}' on goal stack to decide '{}'", cause, goal),
            );
            state.push_goal(cause);
            return Ok(());
        }

        state.pop_goal();
        match state.resolve(goal)? {
            Resolution::Fact(fact) => {
                self.log(
                    Severity::Info,
                    format_args!(
                        "No rule or question left to decide '{}', assuming it is undefined",
                        fact
                    ),
                );
                if let Some(conflict) = state.mark_undefined(&fact) {
                    self.log(
                        Severity::Warning,
                        format_args!(
                            "Could not mark '{}' undefined, it is already '{}'",
                            conflict.fact, conflict.existing
                        ),
                    );
                }
            }
            Resolution::Pending(_) => self.log(
                Severity::Warning,
                format_args!("Dropped '{}' from goal stack, its variable cannot be resolved", goal),
            ),
        }

        Ok(())
    }

    /// Try to settle one goal
    ///
    /// A known fact is returned as is. Otherwise every rule inferring the goal
    /// is evaluated and the first one that holds fires. Undecided rules take
    /// priority over questions; a question is only asked when no rule can
    /// still settle the goal.
    pub fn solve(
        &self,
        domain: &KnowledgeDomain,
        state: &mut KnowledgeState,
        goal: &str,
    ) -> SageResult<Solution> {
        let goal = match state.resolve(goal)? {
            Resolution::Fact(name) => name,
            Resolution::Pending(maybe) => return Ok(Solution::Unknown(maybe)),
        };

        if let Some(item) = state.item(&goal) {
            return Ok(Solution::Known(item.clone()));
        }

        let mut maybes = Vec::new();
        let mut relevant_rules = 0;
        for rule in domain.rules_inferring(&goal) {
            relevant_rules += 1;
            let truth = rule.condition.evaluate(state)?;
            self.log(
                Severity::Debug,
                format_args!("{} evaluates to {}", rule, truth),
            );

            match truth.value {
                Truth::Yes => {
                    self.fire(state, rule, truth);
                    let item = state
                        .item(&goal)
                        .cloned()
                        .ok_or_else(|| SageError::UnsolvedGoal(goal.clone()))?;
                    return Ok(Solution::Known(item));
                }
                Truth::No => {}
                Truth::Maybe => maybes.push(Factor::State(truth)),
            }
        }

        if !maybes.is_empty() {
            return Ok(Solution::Unknown(TruthState::maybe(maybes)));
        }

        let relevant_questions: Vec<usize> = state
            .remaining_questions()
            .iter()
            .enumerate()
            .filter(|(_, q)| q.infers(&goal))
            .map(|(index, _)| index)
            .collect();

        self.log(
            Severity::Debug,
            format_args!(
                "'{}': {} rule(s) ruled out, {} question(s) available",
                goal,
                relevant_rules,
                relevant_questions.len()
            ),
        );

        if let Some(&first) = relevant_questions.first() {
            let skippable = relevant_questions.len() > 1;
            let question = state.take_question(first);
            self.log(
                Severity::Info,
                format_args!(
                    "Asking '{}' to decide '{}'{}",
                    question.description,
                    goal,
                    if skippable { " (skippable)" } else { "" }
                ),
            );
            return Ok(Solution::Ask(PendingQuestion {
                question,
                skippable,
            }));
        }

        Ok(Solution::Unknown(TruthState::maybe(Vec::new())))
    }

    /// Saturate the state with every rule that can fire
    ///
    /// Fired and falsified rules leave the state's working set. When no rule
    /// can fire any more, a question that settles an undecided rule's most
    /// responsible fact is asked; without one the fixpoint is final.
    pub fn forward_chain(
        &self,
        _domain: &KnowledgeDomain,
        state: &mut KnowledgeState,
    ) -> SageResult<Outcome> {
        let mut steps = 0;

        'scan: loop {
            steps += 1;
            if steps > self.limits.max_solver_steps {
                return Err(SageError::StepLimitExceeded {
                    limit: self.limits.max_solver_steps,
                });
            }

            let mut candidate: Option<(usize, String)> = None;
            let mut index = 0;

            while index < state.remaining_rules().len() {
                let truth = state.remaining_rules()[index].condition.evaluate(state)?;

                match truth.value {
                    Truth::Yes => {
                        let rule = state.remove_rule(index);
                        self.log(Severity::Debug, format_args!("{} fires: {}", rule, truth));
                        self.fire(state, &rule, truth);
                        continue 'scan;
                    }
                    Truth::No => {
                        let rule = state.remove_rule(index);
                        self.log(Severity::Debug, format_args!("{} ruled out: {}", rule, truth));
                    }
                    Truth::Maybe => {
                        if candidate.is_none() {
                            candidate = self.question_for(state, &truth);
                        }
                        index += 1;
                    }
                }
            }

            let Some((question_index, fact)) = candidate else {
                self.log(
                    Severity::Debug,
                    format_args!(
                        "Fixpoint reached with {} undecided rule(s)",
                        state.remaining_rules().len()
                    ),
                );
                return Ok(Outcome::Decided);
            };

            let alternatives = state
                .remaining_questions()
                .iter()
                .enumerate()
                .any(|(i, q)| i != question_index && q.infers(&fact))
                || state.remaining_rules().iter().any(|r| r.infers(&fact));
            let question = state.take_question(question_index);
            self.log(
                Severity::Info,
                format_args!("Asking '{}' to decide '{}'", question.description, fact),
            );
            return Ok(Outcome::Pending(PendingQuestion {
                question,
                skippable: alternatives,
            }));
        }
    }

    /// First remaining question that settles one of `maybe`'s causes, heaviest
    /// cause first
    fn question_for(&self, state: &KnowledgeState, maybe: &TruthState) -> Option<(usize, String)> {
        maybe.unknown_facts().into_iter().find_map(|fact| {
            state
                .remaining_questions()
                .iter()
                .position(|q| q.infers(&fact))
                .map(|index| (index, fact))
        })
    }

    fn fire(&self, state: &mut KnowledgeState, rule: &Rule, truth: TruthState) {
        for conflict in state.apply_rule(rule, truth) {
            self.log(
                Severity::Warning,
                format_args!(
                    "{} concludes '{}' = '{}', but it is already '{}'; keeping the recorded value",
                    rule, conflict.fact, conflict.rejected, conflict.existing
                ),
            );
        }
    }
}
