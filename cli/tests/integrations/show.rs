use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_show_lists_knowledge_base() {
    let temp_dir = TempDir::new().unwrap();
    let kb = temp_dir.path().join("weather.json");

    fs::write(
        &kb,
        r#"{
            "title": "Weather",
            "rules": [{
                "description": "rain makes the street wet",
                "condition": {"not": {"fact": {"name": "rain", "value": "no"}}},
                "consequences": {"street": "wet"}
            }],
            "questions": [{
                "description": "Is it raining?",
                "options": [
                    {"description": "Yes", "consequences": {"rain": "yes"}},
                    {"description": "No", "consequences": {"rain": "no"}}
                ]
            }],
            "goals": [{"name": "street", "description": "Is the street wet?"}]
        }"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("show").arg(&kb);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Weather"))
        .stdout(predicate::str::contains("1 rules, 1 questions, 1 goals"))
        .stdout(predicate::str::contains("not (rain = no)"))
        .stdout(predicate::str::contains("Is it raining?"))
        .stdout(predicate::str::contains("Is the street wet?"));
}

#[test]
fn test_cli_show_nonexistent_file() {
    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("show").arg("does-not-exist.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
