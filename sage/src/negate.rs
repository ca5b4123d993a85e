//! Best-effort complement of a condition
//!
//! Negating `light = red` into `light = yellow or light = green` only works
//! if every value `light` can take is known. [`ValueDomain`] gathers those
//! values heuristically from a knowledge base, so the result is only as
//! complete as the knowledge base is. None of this is used when evaluating.

use crate::condition::{Condition, Test};
use crate::knowledge::KnowledgeDomain;
use crate::state::is_variable;
use std::collections::BTreeMap;

/// Values seen per fact, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueDomain {
    values: BTreeMap<String, Vec<String>>,
}

impl ValueDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect values from conditions, consequences, options and predefined
    /// facts
    pub fn from_domain(domain: &KnowledgeDomain) -> Self {
        let mut values = Self::new();

        for rule in &domain.rules {
            values.collect(&rule.condition);
            for (fact, value) in &rule.consequences {
                values.insert(fact, value);
            }
        }
        for question in &domain.questions {
            for option in &question.options {
                for (fact, value) in &option.consequences {
                    values.insert(fact, value);
                }
            }
        }
        for (fact, value) in &domain.facts {
            values.insert(fact, value);
        }

        values
    }

    pub fn insert(&mut self, fact: &str, value: &str) {
        if is_variable(fact) || is_variable(value) {
            return;
        }
        let known = self.values.entry(fact.to_string()).or_default();
        if !known.iter().any(|v| v == value) {
            known.push(value.to_string());
        }
    }

    pub fn values(&self, fact: &str) -> &[String] {
        self.values.get(fact).map(Vec::as_slice).unwrap_or(&[])
    }

    fn collect(&mut self, condition: &Condition) {
        match condition {
            Condition::Fact(fact) if fact.test == Test::Eq => self.insert(&fact.name, &fact.value),
            Condition::Fact(_) => {}
            Condition::Negation(inner) => self.collect(inner),
            Condition::WhenSome { conditions, .. } => {
                for condition in conditions {
                    self.collect(condition);
                }
            }
        }
    }
}

/// The complement of `condition` over the values in `domain`
///
/// "At least k of n" becomes "at least n-k+1 of the negated children", a
/// double negation is removed, and an `eq` test becomes a choice between the
/// other known values. Anything else is wrapped in a plain negation.
pub fn negate(condition: &Condition, domain: &ValueDomain) -> Condition {
    match condition {
        Condition::Negation(inner) => (**inner).clone(),
        Condition::WhenSome {
            threshold,
            conditions,
        } if *threshold > 0 => Condition::WhenSome {
            threshold: conditions.len() - threshold + 1,
            conditions: conditions.iter().map(|c| negate(c, domain)).collect(),
        },
        Condition::Fact(fact)
            if fact.test == Test::Eq && !is_variable(&fact.name) && !is_variable(&fact.value) =>
        {
            let others: Vec<Condition> = domain
                .values(&fact.name)
                .iter()
                .filter(|v| **v != fact.value)
                .map(|v| Condition::fact(fact.name.clone(), v.clone()))
                .collect();
            if others.is_empty() {
                Condition::not(condition.clone())
            } else {
                Condition::any(others)
            }
        }
        _ => Condition::not(condition.clone()),
    }
}

/// Structural clean-up of a condition tree
///
/// Removes double negations and single-child groups, flattens nested AND/OR,
/// drops duplicate children, and intersects `eq` alternatives on the same fact
/// inside an AND.
pub fn simplify(condition: &Condition) -> Condition {
    match condition {
        Condition::Fact(_) => condition.clone(),
        Condition::Negation(inner) => match simplify(inner) {
            Condition::Negation(doubly) => *doubly,
            other => Condition::not(other),
        },
        Condition::WhenSome {
            threshold,
            conditions,
        } => simplify_group(*threshold, conditions.iter().map(simplify).collect()),
    }
}

fn simplify_group(threshold: usize, children: Vec<Condition>) -> Condition {
    if threshold == 1 && children.len() == 1 {
        return children.into_iter().next().unwrap_or_else(|| Condition::any(Vec::new()));
    }

    let all = threshold == children.len();
    let any = threshold == 1;
    if !all && !any {
        return Condition::WhenSome {
            threshold,
            conditions: children,
        };
    }

    let mut flat: Vec<Condition> = Vec::with_capacity(children.len());
    for child in children {
        let merge = (all && child.is_all()) || (any && child.is_any());
        match child {
            Condition::WhenSome { conditions, .. } if merge => {
                for grandchild in conditions {
                    if !flat.contains(&grandchild) {
                        flat.push(grandchild);
                    }
                }
            }
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }

    if flat.len() == 1 {
        return flat.into_iter().next().unwrap_or_else(|| Condition::any(Vec::new()));
    }

    if all {
        if let Some(intersection) = intersect_alternatives(&flat) {
            return intersection;
        }
        Condition::all(flat)
    } else {
        Condition::any(flat)
    }
}

/// `(a = x or a = y) and (a = y or a = z)` is `a = y`
fn intersect_alternatives(children: &[Condition]) -> Option<Condition> {
    let mut sets = children.iter().map(eq_alternatives);
    let (fact, mut values) = sets.next()??;

    for set in sets {
        let (other_fact, other_values) = set?;
        if other_fact != fact {
            return None;
        }
        values.retain(|v| other_values.contains(v));
    }

    match values.len() {
        0 => None,
        1 => Some(Condition::fact(fact, values.remove(0))),
        _ => Some(Condition::any(
            values
                .into_iter()
                .map(|v| Condition::fact(fact.clone(), v))
                .collect(),
        )),
    }
}

/// The fact and values if `condition` is `eq` tests on one fact joined by OR
fn eq_alternatives(condition: &Condition) -> Option<(String, Vec<String>)> {
    let plain_eq = |c: &Condition| match c {
        Condition::Fact(fact)
            if fact.test == Test::Eq && !is_variable(&fact.name) && !is_variable(&fact.value) =>
        {
            Some((fact.name.clone(), fact.value.clone()))
        }
        _ => None,
    };

    if let Some((fact, value)) = plain_eq(condition) {
        return Some((fact, vec![value]));
    }

    match condition {
        Condition::WhenSome { conditions, .. } if condition.is_any() && !conditions.is_empty() => {
            let mut fact_name: Option<String> = None;
            let mut values = Vec::new();
            for child in conditions {
                let (fact, value) = plain_eq(child)?;
                match &fact_name {
                    Some(name) if *name != fact => return None,
                    Some(_) => {}
                    None => fact_name = Some(fact),
                }
                values.push(value);
            }
            fact_name.map(|fact| (fact, values))
        }
        _ => None,
    }
}
