use crate::{
    Choice, Condition, Goal, KnowledgeDomain, KnowledgeState, Logger, Outcome, Question, Reason,
    ResourceLimits, Rule, SageError, Severity, Solution, Solver, Truth, UNDEFINED,
};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<(Severity, String)>>,
}

impl RecordingLogger {
    fn count(&self, severity: Severity, needle: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, message)| *s == severity && message.contains(needle))
            .count()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        self.events.lock().unwrap().push((severity, message.to_string()));
    }
}

fn yes_no(description: &str, fact: &str) -> Question {
    Question::new(
        description,
        vec![
            Choice::new("Yes").then(fact, "yes"),
            Choice::new("No").then(fact, "no"),
        ],
    )
}

fn street_domain() -> KnowledgeDomain {
    let mut domain = KnowledgeDomain::new();
    domain.rules.push(
        Rule::new("rain makes the street wet", Condition::fact("rain", "yes"))
            .then("street", "wet"),
    );
    domain.goals.push(Goal::new("street", "Is the street wet?"));
    domain
}

fn pending(outcome: Outcome) -> crate::PendingQuestion {
    match outcome {
        Outcome::Pending(pending) => pending,
        Outcome::Decided => panic!("expected a pending question"),
    }
}

#[test]
fn test_goal_without_rules_or_questions_is_undefined() {
    let mut domain = KnowledgeDomain::new();
    domain.goals.push(Goal::new("mystery", "Unknowable"));

    let mut state = KnowledgeState::from_domain(&domain);
    let outcome = Solver::new().backward_chain(&domain, &mut state).unwrap();

    assert_eq!(outcome, Outcome::Decided);
    assert_eq!(state.value("mystery").unwrap(), Some(UNDEFINED.to_string()));
    assert!(state.goal_stack().is_empty());
}

#[test]
fn test_rule_fires_from_known_facts() {
    let mut domain = street_domain();
    domain.facts.insert("rain".to_string(), "yes".to_string());

    let mut state = KnowledgeState::from_domain(&domain);
    let outcome = Solver::new().backward_chain(&domain, &mut state).unwrap();

    assert_eq!(outcome, Outcome::Decided);
    let item = state.item("street").unwrap();
    assert_eq!(item.value, "wet");
    match &*item.reason {
        Reason::InferredRule { rule, truth } => {
            assert_eq!(rule.description, "rain makes the street wet");
            assert_eq!(truth.value, Truth::Yes);
        }
        other => panic!("unexpected reason {:?}", other),
    }
}

#[test]
fn test_question_suspends_and_resumes() {
    let mut domain = street_domain();
    domain.questions.push(yes_no("Is it raining?", "rain"));

    let solver = Solver::new();
    let mut state = KnowledgeState::from_domain(&domain);

    let question = pending(solver.backward_chain(&domain, &mut state).unwrap());
    assert_eq!(question.question.description, "Is it raining?");
    assert!(!question.skippable);
    assert_eq!(state.goal_stack(), ["street", "rain"]);
    assert!(state.remaining_questions().is_empty());

    state.apply_answer(&question.question, &question.question.options[0]);

    let outcome = solver.backward_chain(&domain, &mut state).unwrap();
    assert_eq!(outcome, Outcome::Decided);
    assert_eq!(state.value("street").unwrap(), Some("wet".to_string()));
}

#[test]
fn test_answer_that_falsifies_the_rule() {
    let mut domain = street_domain();
    domain.questions.push(yes_no("Is it raining?", "rain"));

    let solver = Solver::new();
    let mut state = KnowledgeState::from_domain(&domain);
    let question = pending(solver.backward_chain(&domain, &mut state).unwrap());
    state.apply_answer(&question.question, &question.question.options[1]);

    solver.backward_chain(&domain, &mut state).unwrap();
    assert_eq!(state.value("street").unwrap(), Some(UNDEFINED.to_string()));
}

#[test]
fn test_question_is_skippable_only_with_alternatives() {
    let mut domain = street_domain();
    domain.questions.push(yes_no("Is it raining?", "rain"));
    domain.questions.push(yes_no("Are people carrying umbrellas?", "rain"));

    let solver = Solver::new();
    let mut state = KnowledgeState::from_domain(&domain);

    let first = pending(solver.backward_chain(&domain, &mut state).unwrap());
    assert_eq!(first.question.description, "Is it raining?");
    assert!(first.skippable);

    // Skip: record nothing and step again
    let second = pending(solver.backward_chain(&domain, &mut state).unwrap());
    assert_eq!(second.question.description, "Are people carrying umbrellas?");
    assert!(!second.skippable);

    let outcome = solver.backward_chain(&domain, &mut state).unwrap();
    assert_eq!(outcome, Outcome::Decided);
    assert_eq!(state.value("rain").unwrap(), Some(UNDEFINED.to_string()));
    assert_eq!(state.value("street").unwrap(), Some(UNDEFINED.to_string()));
}

#[test]
fn test_undecided_rules_take_priority_over_questions() {
    let mut domain = KnowledgeDomain::new();
    domain
        .rules
        .push(Rule::new("derive x", Condition::fact("y", "yes")).then("x", "yes"));
    domain.questions.push(yes_no("Is x true?", "x"));
    domain.questions.push(yes_no("Is y true?", "y"));
    domain.goals.push(Goal::new("x", "x"));

    let mut state = KnowledgeState::from_domain(&domain);
    let question = pending(Solver::new().backward_chain(&domain, &mut state).unwrap());

    assert_eq!(question.question.description, "Is y true?");
    assert_eq!(state.goal_stack(), ["x", "y"]);
}

#[test]
fn test_heaviest_cause_is_pursued_first() {
    let mut domain = KnowledgeDomain::new();
    domain.rules.push(
        Rule::new(
            "weighted",
            Condition::all(vec![
                Condition::any(vec![Condition::fact("b", "yes"), Condition::fact("c", "yes")]),
                Condition::fact("a", "yes"),
            ]),
        )
        .then("goal", "reached"),
    );
    domain.questions.push(yes_no("b?", "b"));
    domain.questions.push(yes_no("c?", "c"));
    domain.questions.push(yes_no("a?", "a"));
    domain.goals.push(Goal::new("goal", "goal"));

    let mut state = KnowledgeState::from_domain(&domain);
    let question = pending(Solver::new().backward_chain(&domain, &mut state).unwrap());

    assert_eq!(question.question.description, "a?");
}

#[test]
fn test_solving_a_known_goal_does_not_reevaluate() {
    let mut domain = street_domain();
    domain.facts.insert("rain".to_string(), "yes".to_string());

    let logger = Arc::new(RecordingLogger::default());
    let solver = Solver::new().with_logger(Box::new(logger.clone()));
    let mut state = KnowledgeState::from_domain(&domain);

    solver.backward_chain(&domain, &mut state).unwrap();
    let evaluations = logger.count(Severity::Debug, "evaluates to");
    assert_eq!(evaluations, 1);

    let solution = solver.solve(&domain, &mut state, "street").unwrap();
    match solution {
        Solution::Known(item) => assert_eq!(item.value, "wet"),
        other => panic!("expected a known solution, got {:?}", other),
    }
    assert_eq!(solver.backward_chain(&domain, &mut state).unwrap(), Outcome::Decided);
    assert_eq!(logger.count(Severity::Debug, "evaluates to"), evaluations);
}

#[test]
fn test_conflicting_consequence_is_logged_and_skipped() {
    let mut domain = street_domain();
    domain.rules[0] = domain.rules[0].clone().then("puddles", "yes");
    domain.facts.insert("rain".to_string(), "yes".to_string());
    domain.facts.insert("puddles".to_string(), "no".to_string());

    let logger = Arc::new(RecordingLogger::default());
    let solver = Solver::new().with_logger(Box::new(logger.clone()));
    let mut state = KnowledgeState::from_domain(&domain);

    solver.backward_chain(&domain, &mut state).unwrap();

    assert_eq!(state.value("street").unwrap(), Some("wet".to_string()));
    assert_eq!(state.value("puddles").unwrap(), Some("no".to_string()));
    assert_eq!(logger.count(Severity::Warning, "puddles"), 1);
}

#[test]
fn test_step_limit() {
    let mut domain = street_domain();
    domain.questions.push(yes_no("Is it raining?", "rain"));

    let limits = ResourceLimits {
        max_solver_steps: 1,
        ..ResourceLimits::default()
    };
    let mut state = KnowledgeState::from_domain(&domain);
    let result = Solver::new()
        .with_limits(limits)
        .backward_chain(&domain, &mut state);

    assert_eq!(result, Err(SageError::StepLimitExceeded { limit: 1 }));
}

#[test]
fn test_goal_stack_limit() {
    let mut domain = street_domain();
    domain.questions.push(yes_no("Is it raining?", "rain"));

    let limits = ResourceLimits {
        max_goal_stack_depth: 1,
        ..ResourceLimits::default()
    };
    let mut state = KnowledgeState::from_domain(&domain);
    let result = Solver::new()
        .with_limits(limits)
        .backward_chain(&domain, &mut state);

    assert_eq!(
        result,
        Err(SageError::GoalStackOverflow {
            limit: 1,
            goal: "rain".to_string()
        })
    );
}

#[test]
fn test_mutually_dependent_rules_terminate() {
    let mut domain = KnowledgeDomain::new();
    domain
        .rules
        .push(Rule::new("a from b", Condition::fact("b", "yes")).then("a", "yes"));
    domain
        .rules
        .push(Rule::new("b from a", Condition::fact("a", "yes")).then("b", "yes"));
    domain.goals.push(Goal::new("a", "a"));

    let mut state = KnowledgeState::from_domain(&domain);
    let outcome = Solver::new().backward_chain(&domain, &mut state).unwrap();

    assert_eq!(outcome, Outcome::Decided);
    assert_eq!(state.value("a").unwrap(), Some(UNDEFINED.to_string()));
    assert_eq!(state.value("b").unwrap(), Some(UNDEFINED.to_string()));
}
