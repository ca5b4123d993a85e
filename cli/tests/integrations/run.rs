use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PET_SHOP: &str = r#"{
    "title": "Pet shop",
    "rules": [
        {
            "description": "Small flat and little time",
            "condition": {"all": [
                {"fact": {"name": "space", "value": "small"}},
                {"fact": {"name": "time", "value": "little"}}
            ]},
            "consequences": {"pet": "$small_pet"}
        },
        {
            "description": "Lots of space",
            "condition": {"fact": {"name": "space", "value": "large"}},
            "consequences": {"pet": "dog"}
        }
    ],
    "goals": [
        {
            "name": "pet",
            "description": "Which pet suits you?",
            "answers": [
                {"value": "dog", "description": "Get a dog"},
                {"description": "Get a $pet"}
            ]
        },
        {"name": "space", "description": "How much space"}
    ],
    "facts": {"space": "small", "time": "little", "small_pet": "goldfish"}
}"#;

fn write_kb(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("kb.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_run_prints_goal_answers() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(&temp_dir, PET_SHOP);

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Which pet suits you?"))
        .stdout(predicate::str::contains("goldfish"))
        .stdout(predicate::str::contains("Get a goldfish"))
        .stdout(predicate::str::contains("How much space"));
}

#[test]
fn test_cli_run_selected_goal_only() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(&temp_dir, PET_SHOP);

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb).arg("pet");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Get a goldfish"))
        .stdout(predicate::str::contains("How much space").not());
}

#[test]
fn test_cli_run_undeclared_goal() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(&temp_dir, PET_SHOP);

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb).arg("colour");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("colour"))
        .stdout(predicate::str::contains("undefined"));
}

#[test]
fn test_cli_run_explain() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(&temp_dir, PET_SHOP);

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb).arg("pet").arg("--explain");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pet = $small_pet"))
        .stdout(predicate::str::contains("Small flat and little time"))
        .stdout(predicate::str::contains("Defined in the knowledge base"));
}

#[test]
fn test_cli_run_nonexistent_file() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(temp_dir.path().join("missing.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_cli_run_invalid_knowledge_base() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(
        &temp_dir,
        r#"{"rules": [{"condition": {"fact": {"name": "a", "value": "1", "test": "near"}}, "consequences": {}}]}"#,
    );

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid knowledge domain"));
}

#[test]
fn test_cli_run_cyclic_variables() {
    let temp_dir = TempDir::new().unwrap();
    let kb = write_kb(
        &temp_dir,
        r#"{"goals": [{"name": "$a"}], "facts": {"a": "$b", "b": "$a"}}"#,
    );

    let mut cmd = Command::cargo_bin("sage").unwrap();
    cmd.arg("run").arg(&kb);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic indirection: $a -> $b -> $a"));
}
