use crate::logger::Severity;
use crate::state::Conflict;
use crate::{
    KnowledgeDomain, KnowledgeState, Outcome, PendingQuestion, SageError, SageResult, Solver,
};

/// A goal together with the answer its current value maps to
#[derive(Debug, Clone, PartialEq)]
pub struct GoalAnswer {
    pub goal: String,
    pub description: String,
    /// Resolved value of the goal, `None` if it was never decided
    pub value: Option<String>,
    /// Answer text with variables substituted
    pub answer: Option<String>,
}

/// The sage engine.
///
/// Owns a checked knowledge domain and a solver. A run is a
/// [`KnowledgeState`] obtained from [`Engine::start`] and advanced with
/// [`Engine::step`]; the engine itself is never mutated, so one engine can
/// serve any number of independent runs.
#[derive(Debug)]
pub struct Engine {
    domain: KnowledgeDomain,
    solver: Solver,
}

impl Engine {
    pub fn new(domain: KnowledgeDomain) -> SageResult<Self> {
        domain.check()?;
        Ok(Self {
            domain,
            solver: Solver::new(),
        })
    }

    pub fn from_json(json: &str) -> SageResult<Self> {
        Self::new(KnowledgeDomain::from_json(json)?)
    }

    /// Replace the solver, e.g. to attach a logger or custom limits
    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn domain(&self) -> &KnowledgeDomain {
        &self.domain
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Fresh state with the domain's goals on the goal stack
    pub fn start(&self) -> KnowledgeState {
        KnowledgeState::from_domain(&self.domain)
    }

    /// Advance a run until it is decided or needs an answer
    pub fn step(&self, state: &mut KnowledgeState) -> SageResult<Outcome> {
        self.solver.step(&self.domain, state)
    }

    /// Record the option at `index` as the answer to a pending question
    pub fn answer(
        &self,
        state: &mut KnowledgeState,
        pending: &PendingQuestion,
        index: usize,
    ) -> SageResult<Vec<Conflict>> {
        let choice = pending
            .question
            .options
            .get(index)
            .ok_or(SageError::ChoiceOutOfRange {
                index,
                options: pending.question.options.len(),
            })?;
        Ok(state.apply_answer(&pending.question, choice))
    }

    /// Leave a pending question unanswered
    ///
    /// The question was already withdrawn from the state when it was handed
    /// out, so stepping again moves on to the next route to the same fact.
    pub fn skip(&self, pending: &PendingQuestion) {
        let severity = if pending.skippable {
            Severity::Info
        } else {
            Severity::Warning
        };
        self.solver.log(
            severity,
            format_args!("Skipped '{}'", pending.question.description),
        );
    }

    /// Drive a run to completion
    ///
    /// `ask` receives every pending question and returns the index of the
    /// chosen option, or `None` to skip it.
    pub fn run<F>(&self, state: &mut KnowledgeState, mut ask: F) -> SageResult<()>
    where
        F: FnMut(&PendingQuestion) -> SageResult<Option<usize>>,
    {
        while let Outcome::Pending(pending) = self.step(state)? {
            match ask(&pending)? {
                Some(index) => {
                    self.answer(state, &pending, index)?;
                }
                None => self.skip(&pending),
            }
        }
        Ok(())
    }

    /// Every domain goal with the answer its value maps to
    pub fn goal_answers(&self, state: &KnowledgeState) -> SageResult<Vec<GoalAnswer>> {
        let mut answers = Vec::with_capacity(self.domain.goals.len());
        for goal in &self.domain.goals {
            let answer = goal
                .answer(state)?
                .map(|a| state.substitute_variables(&a.description));
            answers.push(GoalAnswer {
                goal: goal.name.clone(),
                description: state.substitute_variables(&goal.description),
                value: state.lookup(&goal.name)?,
                answer,
            });
        }
        Ok(answers)
    }
}
