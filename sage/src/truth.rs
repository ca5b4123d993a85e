//! Three-valued truth states and their provenance
//!
//! Every evaluation produces a [`TruthState`]: a verdict (`Yes`, `No` or
//! `Maybe`) plus the factors that led to it. Factors form a DAG of "why":
//! nested truth states, the reasons recorded for facts, or the bare names of
//! facts that are not known yet.

use crate::knowledge::Reason;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A three-valued verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Truth {
    Yes,
    No,
    Maybe,
}

impl Truth {
    pub fn negate(self) -> Self {
        match self {
            Truth::Yes => Truth::No,
            Truth::No => Truth::Yes,
            Truth::Maybe => Truth::Maybe,
        }
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Truth::Yes => write!(f, "Yes"),
            Truth::No => write!(f, "No"),
            Truth::Maybe => write!(f, "Maybe"),
        }
    }
}

/// One element of a truth state's provenance trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// A fact that has no value yet
    Fact(String),
    /// A sub-result, e.g. one child of an AND
    State(TruthState),
    /// The recorded reason a fact has its value
    Cause(Arc<Reason>),
}

impl Factor {
    /// Whether deriving more knowledge could still change this factor
    fn is_actionable(&self) -> bool {
        match self {
            Factor::Fact(_) => true,
            Factor::State(state) => state.value == Truth::Maybe,
            Factor::Cause(_) => false,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::Fact(name) => write!(f, "{}", name),
            Factor::State(state) => write!(f, "{}", state),
            Factor::Cause(reason) => write!(f, "{}", reason),
        }
    }
}

/// The result of evaluating a condition against a knowledge state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthState {
    pub value: Truth,
    pub factors: Vec<Factor>,
}

impl TruthState {
    pub fn because(value: Truth, factors: Vec<Factor>) -> Self {
        Self { value, factors }
    }

    pub fn yes(factors: Vec<Factor>) -> Self {
        Self::because(Truth::Yes, factors)
    }

    pub fn no(factors: Vec<Factor>) -> Self {
        Self::because(Truth::No, factors)
    }

    pub fn maybe(factors: Vec<Factor>) -> Self {
        Self::because(Truth::Maybe, factors)
    }

    /// A `Maybe` that only cites a missing fact
    pub fn missing(fact: impl Into<String>) -> Self {
        Self::maybe(vec![Factor::Fact(fact.into())])
    }

    pub fn is_yes(&self) -> bool {
        self.value == Truth::Yes
    }

    pub fn is_no(&self) -> bool {
        self.value == Truth::No
    }

    pub fn is_maybe(&self) -> bool {
        self.value == Truth::Maybe
    }

    /// Flip the verdict, keeping the original as the only factor
    pub fn negate(self) -> Self {
        let value = self.value.negate();
        Self::because(value, vec![Factor::State(self)])
    }

    /// Weighted attribution of this state to the facts it is waiting on
    ///
    /// A unit of responsibility is split evenly among the actionable factors
    /// (unknown fact names and nested `Maybe` states). Nested states subdivide
    /// their share among their own actionable factors. The totals per fact are
    /// returned heaviest first; equal weights keep first-encountered order.
    pub fn causes(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        divide_among(1.0, &self.factors, &mut totals);
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        totals
    }

    /// Unknown facts ordered by how much they are responsible for this state
    pub fn unknown_facts(&self) -> Vec<String> {
        self.causes().into_iter().map(|(name, _)| name).collect()
    }
}

fn divide_among(share: f64, factors: &[Factor], totals: &mut Vec<(String, f64)>) {
    let actionable: Vec<&Factor> = factors.iter().filter(|f| f.is_actionable()).collect();
    if actionable.is_empty() {
        return;
    }

    let per_factor = share / actionable.len() as f64;
    for factor in actionable {
        match factor {
            Factor::Fact(name) => match totals.iter_mut().find(|(known, _)| known == name) {
                Some((_, weight)) => *weight += per_factor,
                None => totals.push((name.clone(), per_factor)),
            },
            Factor::State(state) => divide_among(per_factor, &state.factors, totals),
            Factor::Cause(_) => {}
        }
    }
}

impl fmt::Display for TruthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.value)?;
        if !self.factors.is_empty() {
            write!(f, " because ")?;
            for (i, factor) in self.factors.iter().enumerate() {
                if i > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{}", factor)?;
            }
        }
        write!(f, "]")
    }
}
