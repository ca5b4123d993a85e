//! Run-time knowledge state
//!
//! Holds the fact store, the goal stack, the questions that have not been
//! asked yet and the working set of rules used by forward chaining. The state
//! is plain data: a caller can serialize it while waiting for an answer and
//! resume later.

use crate::knowledge::{
    Choice, Consequences, KnowledgeDomain, KnowledgeItem, Question, Reason, Rule,
};
use crate::truth::TruthState;
use crate::{SageError, SageResult};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Value given to facts nobody can establish, and the name of the built-in
/// constant fact holding it
pub const UNDEFINED: &str = "undefined";

/// Returns the referenced fact name if `text` is a variable (`$name`)
pub fn variable_name(text: &str) -> Option<&str> {
    text.strip_prefix('$').filter(|name| !name.is_empty())
}

pub fn is_variable(text: &str) -> bool {
    variable_name(text).is_some()
}

/// Outcome of following a chain of variables
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The chain ended in a literal
    Fact(String),
    /// Some link in the chain is not known yet
    Pending(TruthState),
}

/// A consequence that was not applied because the fact already had a
/// different value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub fact: String,
    pub existing: String,
    pub rejected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeState {
    facts: BTreeMap<String, KnowledgeItem>,
    rules: Vec<Rule>,
    questions: Vec<Question>,
    goal_stack: Vec<String>,
}

impl Default for KnowledgeState {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeState {
    /// An empty state holding only the built-in `undefined` constant
    pub fn new() -> Self {
        let mut facts = BTreeMap::new();
        facts.insert(
            UNDEFINED.to_string(),
            KnowledgeItem::new(
                UNDEFINED,
                Arc::new(Reason::PredefinedConstant {
                    explanation: "Built-in constant for facts that cannot be determined".to_string(),
                }),
            ),
        );

        Self {
            facts,
            rules: Vec::new(),
            questions: Vec::new(),
            goal_stack: Vec::new(),
        }
    }

    /// Initial state for solving `domain`
    ///
    /// The goal stack is seeded so the first declared goal is pursued first.
    /// Variables used as answer values are pushed above their goal so they are
    /// known by the time the answer is presented.
    pub fn from_domain(domain: &KnowledgeDomain) -> Self {
        let mut state = Self::new();
        state.rules = domain.rules.clone();
        state.questions = domain.questions.clone();

        let predefined = Reason::PredefinedConstant {
            explanation: "Defined in the knowledge base".to_string(),
        };
        let facts: Consequences = domain.facts.clone();
        state.apply(&facts, predefined);

        for goal in domain.goals.iter().rev() {
            state.push_goal_once(&goal.name);
            for answer in &goal.answers {
                if let Some(target) = answer.value.as_deref().and_then(variable_name) {
                    state.push_goal_once(target);
                }
            }
        }

        state
    }

    fn push_goal_once(&mut self, name: &str) {
        if !self.is_pursuing(name) {
            self.goal_stack.push(name.to_string());
        }
    }

    // Facts

    pub fn facts(&self) -> &BTreeMap<String, KnowledgeItem> {
        &self.facts
    }

    pub fn item(&self, name: &str) -> Option<&KnowledgeItem> {
        self.facts.get(name)
    }

    pub fn knows(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Follow variables until a literal is reached
    ///
    /// A plain name resolves to itself. `$a` resolves to the value of `a`,
    /// which is followed again if it is a variable too. A missing link yields
    /// `Pending` citing that fact; a loop is an error naming the chain.
    pub fn resolve(&self, name: &str) -> SageResult<Resolution> {
        let mut current = name.to_string();
        let mut chain: Vec<String> = Vec::new();

        while let Some(target) = variable_name(&current).map(str::to_string) {
            if chain.contains(&current) {
                chain.push(current);
                return Err(SageError::CyclicIndirection { chain });
            }
            chain.push(current);

            match self.facts.get(&target) {
                Some(item) => current = item.value.clone(),
                None => return Ok(Resolution::Pending(TruthState::missing(target))),
            }
        }

        Ok(Resolution::Fact(current))
    }

    /// The resolved value of a fact, `None` if it is not known (yet)
    pub fn value(&self, name: &str) -> SageResult<Option<String>> {
        if is_variable(name) {
            return Err(SageError::VariableName(name.to_string()));
        }

        let Some(item) = self.facts.get(name) else {
            return Ok(None);
        };

        match self.resolve(&item.value)? {
            Resolution::Fact(value) => Ok(Some(value)),
            Resolution::Pending(_) => Ok(None),
        }
    }

    /// Like [`Self::value`], but accepts a variable as the name
    pub fn lookup(&self, name: &str) -> SageResult<Option<String>> {
        match self.resolve(name)? {
            Resolution::Fact(name) => self.value(&name),
            Resolution::Pending(_) => Ok(None),
        }
    }

    /// Record consequences with a shared reason
    ///
    /// Facts are single-assignment: a consequence contradicting a recorded
    /// value is skipped and reported, the remaining ones still apply. Repeating
    /// a recorded value keeps the original reason.
    pub fn apply(&mut self, consequences: &Consequences, reason: Reason) -> Vec<Conflict> {
        let reason = Arc::new(reason);
        let mut conflicts = Vec::new();

        for (fact, value) in consequences {
            match self.facts.get(fact) {
                Some(existing) if existing.value != *value => conflicts.push(Conflict {
                    fact: fact.clone(),
                    existing: existing.value.clone(),
                    rejected: value.clone(),
                }),
                Some(_) => {}
                None => {
                    self.facts
                        .insert(fact.clone(), KnowledgeItem::new(value.clone(), reason.clone()));
                }
            }
        }

        conflicts
    }

    /// Record a fired rule's consequences
    pub fn apply_rule(&mut self, rule: &Rule, truth: TruthState) -> Vec<Conflict> {
        self.apply(
            &rule.consequences,
            Reason::InferredRule {
                rule: rule.clone(),
                truth,
            },
        )
    }

    /// Record the consequences of the option a user chose
    pub fn apply_answer(&mut self, question: &Question, choice: &Choice) -> Vec<Conflict> {
        self.apply(
            &choice.consequences,
            Reason::AnsweredQuestion {
                question: question.clone(),
                choice: choice.clone(),
            },
        )
    }

    /// Give a single fact a value stated by the caller
    pub fn define(&mut self, fact: impl Into<String>, value: impl Into<String>) -> Option<Conflict> {
        let mut consequences = Consequences::new();
        consequences.insert(fact.into(), value.into());
        self.apply(
            &consequences,
            Reason::PredefinedConstant {
                explanation: "Given".to_string(),
            },
        )
        .pop()
    }

    /// Closed-world fallback for a fact no rule or question can establish
    pub fn mark_undefined(&mut self, fact: &str) -> Option<Conflict> {
        let mut consequences = Consequences::new();
        consequences.insert(fact.to_string(), UNDEFINED.to_string());
        self.apply(
            &consequences,
            Reason::PredefinedConstant {
                explanation: format!(
                    "No rule or question could determine '{}', so it is assumed undefined",
                    fact
                ),
            },
        )
        .pop()
    }

    // Text

    /// Replace `$name` placeholders with resolved fact values
    ///
    /// Placeholders that cannot be resolved are left untouched.
    pub fn substitute_variables(&self, text: &str) -> String {
        self.substitute_variables_with(text, str::to_string)
    }

    /// Like [`Self::substitute_variables`], passing every substituted value
    /// through `format` (e.g. to escape it for the output medium)
    pub fn substitute_variables_with<F>(&self, text: &str, format: F) -> String
    where
        F: Fn(&str) -> String,
    {
        placeholder()
            .replace_all(text, |caps: &Captures| match self.lookup(&caps[1]) {
                Ok(Some(value)) => format(&value),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }

    // Goal stack

    pub fn goal_stack(&self) -> &[String] {
        &self.goal_stack
    }

    pub fn top_goal(&self) -> Option<&str> {
        self.goal_stack.last().map(String::as_str)
    }

    pub fn push_goal(&mut self, name: impl Into<String>) {
        self.goal_stack.push(name.into());
    }

    pub fn pop_goal(&mut self) -> Option<String> {
        self.goal_stack.pop()
    }

    pub fn is_pursuing(&self, name: &str) -> bool {
        self.goal_stack.iter().any(|goal| goal == name)
    }

    // Remaining work

    /// Rules forward chaining has not fired or falsified yet
    pub fn remaining_rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn remove_rule(&mut self, index: usize) -> Rule {
        self.rules.remove(index)
    }

    pub fn remaining_questions(&self) -> &[Question] {
        &self.questions
    }

    /// Remove a question so it is never offered again
    pub(crate) fn take_question(&mut self, index: usize) -> Question {
        self.questions.remove(index)
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid placeholder pattern"))
}
