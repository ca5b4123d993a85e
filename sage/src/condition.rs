//! Conditions: small expression trees evaluated to three-valued results
//!
//! AND and OR are both an "at least N of" combinator: AND is N = number of
//! children, OR is N = 1. Evaluation is a pure function of the knowledge state.

use crate::state::{KnowledgeState, Resolution};
use crate::truth::{Factor, TruthState};
use crate::{SageError, SageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a fact's value is compared against the expected value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Test {
    /// String identity
    #[default]
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Test {
    /// Apply the test; ordering tests only hold between two integers
    pub fn holds(self, actual: &str, expected: &str) -> bool {
        if self == Test::Eq {
            return actual == expected;
        }

        let (Ok(a), Ok(b)) = (actual.trim().parse::<i64>(), expected.trim().parse::<i64>()) else {
            return false;
        };

        match self {
            Test::Eq => a == b,
            Test::Gt => a > b,
            Test::Gte => a >= b,
            Test::Lt => a < b,
            Test::Lte => a <= b,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Test::Eq => "=",
            Test::Gt => ">",
            Test::Gte => ">=",
            Test::Lt => "<",
            Test::Lte => "<=",
        }
    }
}

impl FromStr for Test {
    type Err = SageError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "eq" => Ok(Test::Eq),
            "gt" => Ok(Test::Gt),
            "gte" => Ok(Test::Gte),
            "lt" => Ok(Test::Lt),
            "lte" => Ok(Test::Lte),
            other => Err(SageError::UnknownTest(other.to_string())),
        }
    }
}

/// Compares one fact against a value
///
/// Both `name` and `value` may be variables (`$other`), which are resolved
/// against the knowledge state before comparing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactCondition {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub test: Test,
}

impl FactCondition {
    pub fn new(name: impl Into<String>, value: impl Into<String>, test: Test) -> Self {
        Self {
            name: name.into().trim().to_string(),
            value: value.into().trim().to_string(),
            test,
        }
    }

    pub fn evaluate(&self, state: &KnowledgeState) -> SageResult<TruthState> {
        let name = match state.resolve(&self.name)? {
            Resolution::Fact(name) => name,
            Resolution::Pending(maybe) => return Ok(maybe),
        };

        let Some(item) = state.item(&name) else {
            return Ok(TruthState::missing(name));
        };

        let actual = match state.resolve(&item.value)? {
            Resolution::Fact(value) => value,
            Resolution::Pending(maybe) => return Ok(maybe),
        };

        let expected = match state.resolve(&self.value)? {
            Resolution::Fact(value) => value,
            Resolution::Pending(maybe) => return Ok(maybe),
        };

        let factors = vec![Factor::Cause(item.reason.clone())];
        if self.test.holds(&actual, &expected) {
            Ok(TruthState::yes(factors))
        } else {
            Ok(TruthState::no(factors))
        }
    }
}

impl fmt::Display for FactCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.test.symbol(), self.value)
    }
}

/// A condition over facts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ConditionRepr", try_from = "ConditionRepr")]
pub enum Condition {
    Fact(FactCondition),
    Negation(Box<Condition>),
    /// Holds when at least `threshold` of `conditions` hold
    WhenSome {
        threshold: usize,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// `name = value`
    pub fn fact(name: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Fact(FactCondition::new(name, value, Test::Eq))
    }

    /// `name <test> value`
    pub fn compare(name: impl Into<String>, test: Test, value: impl Into<String>) -> Self {
        Condition::Fact(FactCondition::new(name, value, test))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Negation(Box::new(condition))
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::WhenSome {
            threshold: conditions.len(),
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::WhenSome {
            threshold: 1,
            conditions,
        }
    }

    pub fn some(threshold: usize, conditions: Vec<Condition>) -> SageResult<Self> {
        if threshold > conditions.len() {
            return Err(SageError::ThresholdExceeded {
                threshold,
                conditions: conditions.len(),
            });
        }
        Ok(Condition::WhenSome {
            threshold,
            conditions,
        })
    }

    /// True for a `WhenSome` that needs every child
    pub fn is_all(&self) -> bool {
        matches!(self, Condition::WhenSome { threshold, conditions } if *threshold == conditions.len())
    }

    /// True for a `WhenSome` that needs a single child
    pub fn is_any(&self) -> bool {
        matches!(self, Condition::WhenSome { threshold: 1, .. })
    }

    pub fn evaluate(&self, state: &KnowledgeState) -> SageResult<TruthState> {
        match self {
            Condition::Fact(fact) => fact.evaluate(state),
            Condition::Negation(condition) => Ok(condition.evaluate(state)?.negate()),
            Condition::WhenSome {
                threshold,
                conditions,
            } => {
                let mut results = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    results.push(condition.evaluate(state)?);
                }

                let yes = results.iter().filter(|r| r.is_yes()).count();
                let maybe = results.iter().filter(|r| r.is_maybe()).count();

                if yes >= *threshold {
                    Ok(TruthState::yes(
                        results.into_iter().filter(|r| r.is_yes()).map(Factor::State).collect(),
                    ))
                } else if yes + maybe >= *threshold {
                    Ok(TruthState::maybe(
                        results.into_iter().filter(|r| r.is_maybe()).map(Factor::State).collect(),
                    ))
                } else {
                    Ok(TruthState::no(results.into_iter().map(Factor::State).collect()))
                }
            }
        }
    }

    /// Every fact name this condition mentions, in order of appearance
    pub fn facts(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_facts(&mut names);
        names
    }

    fn collect_facts(&self, names: &mut Vec<String>) {
        match self {
            Condition::Fact(fact) => {
                if !names.contains(&fact.name) {
                    names.push(fact.name.clone());
                }
            }
            Condition::Negation(condition) => condition.collect_facts(names),
            Condition::WhenSome { conditions, .. } => {
                for condition in conditions {
                    condition.collect_facts(names);
                }
            }
        }
    }

    /// Verify every threshold in the tree is satisfiable
    pub fn check(&self) -> SageResult<()> {
        match self {
            Condition::Fact(_) => Ok(()),
            Condition::Negation(condition) => condition.check(),
            Condition::WhenSome {
                threshold,
                conditions,
            } => {
                if *threshold > conditions.len() {
                    return Err(SageError::ThresholdExceeded {
                        threshold: *threshold,
                        conditions: conditions.len(),
                    });
                }
                conditions.iter().try_for_each(Condition::check)
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Fact(fact) => write!(f, "{}", fact),
            Condition::Negation(condition) => write!(f, "not ({})", condition),
            Condition::WhenSome {
                threshold,
                conditions,
            } => {
                let joined = |separator: &str| {
                    conditions
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(separator)
                };
                if conditions.len() == 1 && *threshold == 1 {
                    write!(f, "{}", conditions[0])
                } else if self.is_all() {
                    write!(f, "({})", joined(" and "))
                } else if self.is_any() {
                    write!(f, "({})", joined(" or "))
                } else {
                    write!(f, "at least {} of ({})", threshold, joined(", "))
                }
            }
        }
    }
}

/// Serialized form: `all` and `any` are spelled out, other thresholds use `some`
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ConditionRepr {
    Fact(FactCondition),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    #[serde(rename = "some")]
    AtLeast {
        threshold: usize,
        conditions: Vec<Condition>,
    },
}

impl From<Condition> for ConditionRepr {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Fact(fact) => ConditionRepr::Fact(fact),
            Condition::Negation(inner) => ConditionRepr::Not(inner),
            Condition::WhenSome {
                threshold,
                conditions,
            } => {
                if threshold == conditions.len() {
                    ConditionRepr::All(conditions)
                } else if threshold == 1 {
                    ConditionRepr::Any(conditions)
                } else {
                    ConditionRepr::AtLeast {
                        threshold,
                        conditions,
                    }
                }
            }
        }
    }
}

impl TryFrom<ConditionRepr> for Condition {
    type Error = SageError;

    fn try_from(repr: ConditionRepr) -> Result<Self, Self::Error> {
        match repr {
            ConditionRepr::Fact(fact) => Ok(Condition::Fact(fact)),
            ConditionRepr::Not(inner) => Ok(Condition::Negation(inner)),
            ConditionRepr::All(conditions) => Ok(Condition::all(conditions)),
            ConditionRepr::Any(conditions) => Ok(Condition::any(conditions)),
            ConditionRepr::AtLeast {
                threshold,
                conditions,
            } => Condition::some(threshold, conditions),
        }
    }
}
