mod formatter;
mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::Formatter;
use sage::{Engine, Goal, KnowledgeDomain, Outcome, Solver, TracingLogger};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sage")]
#[command(about = "Rules, questions and goals, decided in three values.")]
#[command(
    long_about = "Sage is an expert system shell. A knowledge base lists rules, questions a user can answer and goals to determine.\nThe CLI asks only the questions the rules cannot settle on their own and prints what it concluded."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the goals of a knowledge base, asking questions as needed
    ///
    /// Loads a JSON knowledge base and runs backward or forward chaining,
    /// whichever the knowledge base asks for. Questions are asked on the
    /// terminal; questions with another route to the same fact can be
    /// answered with "I don't know".
    Run {
        /// Knowledge base to load (JSON)
        file: PathBuf,
        /// Goals to determine instead of the ones the knowledge base declares
        ///
        /// Examples: diagnosis, $favourite
        goals: Vec<String>,
        /// Log every solver step (overridden by RUST_LOG)
        #[arg(short, long)]
        verbose: bool,
        /// Show why each goal has the value it has
        #[arg(short, long)]
        explain: bool,
    },
    /// Show the rules, questions and goals of a knowledge base
    Show {
        /// Knowledge base to load (JSON)
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run {
            file,
            goals,
            verbose,
            explain,
        } => run_command(file, goals, *verbose, *explain),
        Commands::Show { file } => show_command(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "sage=debug" } else { "sage=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn run_command(file: &Path, goals: &[String], verbose: bool, explain: bool) -> Result<()> {
    init_tracing(verbose);

    let mut domain = load_domain(file)?;
    if !goals.is_empty() {
        domain.goals = select_goals(&domain, goals);
    }

    let engine =
        Engine::new(domain)?.with_solver(Solver::new().with_logger(Box::new(TracingLogger)));
    let mut state = engine.start();

    while let Outcome::Pending(pending) = engine.step(&mut state)? {
        match interactive::ask(&pending, &state)? {
            Some(index) => {
                for conflict in engine.answer(&mut state, &pending, index)? {
                    tracing::warn!(
                        "Answer sets '{}' = '{}', but it is already '{}'",
                        conflict.fact,
                        conflict.rejected,
                        conflict.existing
                    );
                }
            }
            None => engine.skip(&pending),
        }
    }

    let formatter = Formatter::default();
    print!("{}", formatter.format_answers(&engine.goal_answers(&state)?));

    if explain {
        for goal in &engine.domain().goals {
            println!();
            print!("{}", formatter.format_explanation(&state, &goal.name));
        }
    }

    Ok(())
}

fn show_command(file: &Path) -> Result<()> {
    let domain = load_domain(file)?;

    let formatter = Formatter::default();
    print!("{}", formatter.format_domain(&domain));

    Ok(())
}

fn load_domain(file: &Path) -> Result<KnowledgeDomain> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    KnowledgeDomain::from_json(&json).with_context(|| format!("Failed to load {}", file.display()))
}

/// Goals named on the command line, keeping declared answers where they exist
fn select_goals(domain: &KnowledgeDomain, names: &[String]) -> Vec<Goal> {
    names
        .iter()
        .map(|name| {
            domain
                .goals
                .iter()
                .find(|goal| goal.name == *name)
                .cloned()
                .unwrap_or_else(|| Goal::new(name.clone(), name.clone()))
        })
        .collect()
}
