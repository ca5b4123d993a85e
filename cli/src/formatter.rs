use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use sage::{
    Consequences, Factor, GoalAnswer, KnowledgeDomain, KnowledgeState, Reason, Resolution,
    TruthState,
};

enum LineType {
    Rule,
    Verdict,
    Unknown,
    Given,
}

impl LineType {
    fn format_line(&self, base_prefix: &str, content: &str) -> String {
        let symbol = match self {
            LineType::Rule => "├─",
            LineType::Verdict => "├─ =",
            LineType::Unknown => "×",
            LineType::Given => "└─",
        };
        format!("{}{} {}\n", base_prefix, symbol, content)
    }
}

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_answers(&self, answers: &[GoalAnswer]) -> String {
        if answers.is_empty() {
            return "No goals to determine\n".to_string();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Goal").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Left),
            Cell::new("Answer").set_alignment(CellAlignment::Left),
        ]));

        for answer in answers {
            let goal = if answer.description.is_empty() {
                &answer.goal
            } else {
                &answer.description
            };
            let value = answer.value.as_deref().unwrap_or("?");
            let text = answer.answer.as_deref().unwrap_or("");
            table.add_row(Row::from(vec![goal.as_str(), value, text]));
        }

        format!("{}\n", table)
    }

    /// Provenance tree of a goal's value
    pub fn format_explanation(&self, state: &KnowledgeState, goal: &str) -> String {
        let name = match state.resolve(goal) {
            Ok(Resolution::Fact(name)) => name,
            _ => goal.to_string(),
        };

        let mut output = String::new();
        match state.item(&name) {
            Some(item) => {
                output.push_str(&format!("{} = {}\n", name, item.value));
                self.format_reason(&item.reason, 0, &mut output);
            }
            None => output.push_str(&format!("{} is unknown\n", name)),
        }
        output
    }

    fn format_reason(&self, reason: &Reason, depth: usize, output: &mut String) {
        let indent = "│  ".repeat(depth);

        match reason {
            Reason::InferredRule { rule, truth } => {
                output.push_str(&LineType::Rule.format_line(
                    &indent,
                    &format!("{}: {}", rule, rule.condition),
                ));
                self.format_truth(truth, depth + 1, output);
            }
            Reason::AnsweredQuestion { question, choice } => {
                output.push_str(&LineType::Given.format_line(
                    &indent,
                    &format!("\"{}\" answered \"{}\"", question.description, choice.description),
                ));
            }
            Reason::PredefinedConstant { explanation } => {
                output.push_str(&LineType::Given.format_line(&indent, explanation));
            }
        }
    }

    fn format_truth(&self, truth: &TruthState, depth: usize, output: &mut String) {
        let indent = "│  ".repeat(depth);
        output.push_str(&LineType::Verdict.format_line(&indent, &truth.value.to_string()));

        for factor in &truth.factors {
            match factor {
                Factor::Fact(name) => {
                    let indent = "│  ".repeat(depth + 1);
                    output.push_str(
                        &LineType::Unknown.format_line(&indent, &format!("{} is unknown", name)),
                    );
                }
                Factor::State(state) => self.format_truth(state, depth + 1, output),
                Factor::Cause(reason) => self.format_reason(reason, depth + 1, output),
            }
        }
    }

    pub fn format_domain(&self, domain: &KnowledgeDomain) -> String {
        let mut output = String::new();
        if !domain.title.is_empty() {
            output.push_str(&format!("{}\n", domain.title));
        }
        if let Some(description) = &domain.description {
            output.push_str(&format!("{}\n", description));
        }
        output.push_str(&format!(
            "{} rules, {} questions, {} goals\n\n",
            domain.rules.len(),
            domain.questions.len(),
            domain.goals.len()
        ));

        if !domain.rules.is_empty() {
            let mut table = self.table(&["Rule", "When", "Then"]);
            for rule in &domain.rules {
                table.add_row(Row::from(vec![
                    rule.to_string(),
                    rule.condition.to_string(),
                    format_consequences(&rule.consequences),
                ]));
            }
            output.push_str(&format!("{}\n\n", table));
        }

        if !domain.questions.is_empty() {
            let mut table = self.table(&["Question", "Options"]);
            for question in &domain.questions {
                let options: Vec<String> = question
                    .options
                    .iter()
                    .map(|o| format!("{} ({})", o.description, format_consequences(&o.consequences)))
                    .collect();
                table.add_row(Row::from(vec![question.description.clone(), options.join("\n")]));
            }
            output.push_str(&format!("{}\n\n", table));
        }

        if !domain.goals.is_empty() {
            let mut table = self.table(&["Goal", "Description", "Answers"]);
            for goal in &domain.goals {
                let answers: Vec<String> = goal
                    .answers
                    .iter()
                    .map(|a| match &a.value {
                        Some(value) => format!("{}: {}", value, a.description),
                        None => format!("otherwise: {}", a.description),
                    })
                    .collect();
                table.add_row(Row::from(vec![
                    goal.name.clone(),
                    goal.description.clone(),
                    answers.join("\n"),
                ]));
            }
            output.push_str(&format!("{}\n", table));
        }

        output
    }

    fn table(&self, header: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(
            header
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left))
                .collect::<Vec<_>>(),
        ));
        table
    }
}

fn format_consequences(consequences: &Consequences) -> String {
    consequences
        .iter()
        .map(|(fact, value)| format!("{} = {}", fact, value))
        .collect::<Vec<_>>()
        .join(", ")
}
