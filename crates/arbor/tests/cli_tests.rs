//! End-to-end CLI tests for the arbor binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn arbor() -> Command {
    Command::new(env!("CARGO_BIN_EXE_arbor"))
}

fn task_file(definition: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(definition.as_bytes()).expect("write definition");
    file
}

#[test]
fn help_flag() {
    arbor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("behavior-tree task pipelines"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn version_flag() {
    arbor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn no_args_shows_usage() {
    arbor()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_file_exits_2() {
    arbor()
        .arg("/no/such/task.json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reading"));
}

#[test]
fn malformed_definition_exits_2() {
    let file = task_file("{ not json }");
    arbor()
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("parsing"));
}

#[test]
fn unknown_task_exits_2() {
    let file = task_file(r#"{ "task": "Teleporter", "args": {} }"#);
    arbor()
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown task type"));
}

#[test]
fn succeeding_job_exits_0() {
    let file = task_file(r#"{ "task": "Succeeder", "args": {} }"#);
    arbor().arg(file.path()).assert().success();
}

#[test]
fn failing_job_exits_1() {
    let file = task_file(r#"{ "task": "Failer", "args": {} }"#);
    arbor().arg(file.path()).assert().code(1);
}

#[test]
fn verbose_dumps_definition_and_blackboard() {
    let file = task_file(r#"{ "task": "Succeeder", "args": { "name": "greet" } }"#);
    arbor()
        .arg(file.path())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"task\": \"Succeeder\""))
        .stdout(predicate::str::contains("\"status\": \"succeeded\""))
        .stdout(predicate::str::contains("greet:"));
}

#[test]
fn command_pipeline_runs() {
    let file = task_file(
        r#"{
            "task": "Sequence",
            "args": {
                "children": [
                    { "task": "CmdTask", "args": { "cmd": "echo building" } },
                    { "task": "CmdTask", "args": { "cmd": "echo testing" } }
                ]
            }
        }"#,
    );
    arbor()
        .arg(file.path())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("building"))
        .stdout(predicate::str::contains("testing"));
}

#[test]
fn failing_command_fails_the_job() {
    let file = task_file(r#"{ "task": "CmdTask", "args": { "cmd": "exit 7" } }"#);
    arbor().arg(file.path()).assert().code(1);
}
