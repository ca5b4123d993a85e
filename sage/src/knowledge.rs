//! The knowledge base data model
//!
//! A [`KnowledgeDomain`] is produced once by whatever reads the knowledge base
//! and is never mutated by the solver. Facts derived at run time live in a
//! [`crate::KnowledgeState`], each paired with the [`Reason`] it was derived.

use crate::condition::Condition;
use crate::state::{KnowledgeState, Resolution};
use crate::truth::TruthState;
use crate::SageResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Consequences written when a rule fires or an option is chosen
pub type Consequences = BTreeMap<String, String>;

/// A rule: when `condition` evaluates to Yes, `consequences` become facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub description: String,
    pub condition: Condition,
    pub consequences: Consequences,
    /// Presentation only; the solver does not order by it
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl Rule {
    pub fn new(description: impl Into<String>, condition: Condition) -> Self {
        Self {
            description: description.into(),
            condition,
            consequences: Consequences::new(),
            priority: 0,
            line_number: None,
        }
    }

    /// Builder-style consequence
    pub fn then(mut self, fact: impl Into<String>, value: impl Into<String>) -> Self {
        self.consequences.insert(fact.into(), value.into());
        self
    }

    pub fn infers(&self, fact: &str) -> bool {
        self.consequences.contains_key(fact)
    }

    pub fn inferred_facts(&self) -> impl Iterator<Item = &str> {
        self.consequences.keys().map(String::as_str)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "[Rule \"{}\" (line {})]", self.description, line),
            None => write!(f, "[Rule \"{}\"]", self.description),
        }
    }
}

/// One possible answer to a [`Question`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub description: String,
    pub consequences: Consequences,
}

impl Choice {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            consequences: Consequences::new(),
        }
    }

    pub fn then(mut self, fact: impl Into<String>, value: impl Into<String>) -> Self {
        self.consequences.insert(fact.into(), value.into());
        self
    }
}

/// A question the caller can put to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub description: String,
    pub options: Vec<Choice>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl Question {
    pub fn new(description: impl Into<String>, options: Vec<Choice>) -> Self {
        Self {
            description: description.into(),
            options,
            priority: 0,
            line_number: None,
        }
    }

    pub fn infers(&self, fact: &str) -> bool {
        self.options.iter().any(|o| o.consequences.contains_key(fact))
    }

    /// Facts any option can establish, without duplicates
    pub fn inferred_facts(&self) -> Vec<&str> {
        let mut facts: Vec<&str> = Vec::new();
        for option in &self.options {
            for fact in option.consequences.keys() {
                if !facts.contains(&fact.as_str()) {
                    facts.push(fact);
                }
            }
        }
        facts
    }
}

/// A question handed back to the caller while solving is suspended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub question: Question,
    /// Another rule or question can still settle the same fact
    pub skippable: bool,
}

/// Text presented for a particular value of a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// `None` marks the fallback answer
    #[serde(default)]
    pub value: Option<String>,
    pub description: String,
}

/// A fact the caller wants determined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Goal {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            answers: Vec::new(),
        }
    }

    pub fn with_answer(mut self, value: Option<&str>, description: impl Into<String>) -> Self {
        self.answers.push(Answer {
            value: value.map(str::to_string),
            description: description.into(),
        });
        self
    }

    /// The answer matching the goal's current value
    ///
    /// Answer values written as variables are resolved first. When nothing
    /// matches, the first answer without a value is used.
    pub fn answer(&self, state: &KnowledgeState) -> SageResult<Option<&Answer>> {
        let value = state.lookup(&self.name)?;

        if let Some(value) = &value {
            for answer in &self.answers {
                let Some(expected) = &answer.value else {
                    continue;
                };
                if let Resolution::Fact(expected) = state.resolve(expected)? {
                    if &expected == value {
                        return Ok(Some(answer));
                    }
                }
            }
        }

        Ok(self.answers.iter().find(|a| a.value.is_none()))
    }
}

/// Why a fact has the value it has
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reason {
    AnsweredQuestion { question: Question, choice: Choice },
    InferredRule { rule: Rule, truth: TruthState },
    PredefinedConstant { explanation: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::AnsweredQuestion { question, choice } => write!(
                f,
                "the question '{}' was answered with '{}'",
                question.description, choice.description
            ),
            Reason::InferredRule { rule, truth } => write!(
                f,
                "the rule '{}' was applicable because {}",
                rule.description, truth
            ),
            Reason::PredefinedConstant { explanation } => write!(f, "{}", explanation),
        }
    }
}

/// A fact value together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub value: String,
    pub reason: Arc<Reason>,
}

impl KnowledgeItem {
    pub fn new(value: impl Into<String>, reason: Arc<Reason>) -> Self {
        Self {
            value: value.into(),
            reason,
        }
    }
}

/// Which chaining strategy a knowledge base is solved with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    BackwardChaining,
    ForwardChaining,
}

/// An immutable, parsed knowledge base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDomain {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Facts given by the knowledge base itself
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
}

impl KnowledgeDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a domain from its JSON form and check it
    pub fn from_json(json: &str) -> SageResult<Self> {
        let domain: KnowledgeDomain = serde_json::from_str(json)?;
        domain.check()?;
        Ok(domain)
    }

    /// Verify invariants serde cannot enforce on its own
    pub fn check(&self) -> SageResult<()> {
        self.rules.iter().try_for_each(|r| r.condition.check())
    }

    pub fn rules_inferring<'a>(&'a self, fact: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.infers(fact))
    }
}
