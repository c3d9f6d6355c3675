//! End-to-end tests that drive the compiled interpreter through pipes.

#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn run_interpreter(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_hsh"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn interpreter");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(input.as_bytes())
        .expect("write input");
    child.wait_with_output().expect("collect output")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write an executable script into a unique temp path.
fn write_script(tag: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("hsh_{}_{}_{}", tag, std::process::id(), nanos));
    fs::write(&path, body).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

#[test]
fn end_of_input_prints_one_newline_and_exits_zero() {
    let output = run_interpreter(&[], "");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "$ \n");
}

#[test]
fn blank_lines_are_noops() {
    let output = run_interpreter(&[], "\n   \t \n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "$ $ $ \n");
}

#[test]
fn reports_the_exit_status_of_the_child() {
    let script = write_script("exit42", "#!/bin/sh\nexit 42\n");
    let output = run_interpreter(&[], &format!("{}\n", script.display()));
    let _ = fs::remove_file(&script);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_of(&output),
        "$ Child exited with status 42\n$ \n"
    );
}

#[test]
fn running_the_same_command_twice_reports_two_outcomes() {
    let script = write_script("twice", "#!/bin/sh\nexit 7\n");
    let line = format!("{}\n", script.display());
    let output = run_interpreter(&[], &format!("{}{}", line, line));
    let _ = fs::remove_file(&script);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_of(&output),
        "$ Child exited with status 7\n$ Child exited with status 7\n$ \n"
    );
}

#[test]
fn unknown_command_is_diagnosed_and_the_interpreter_survives() {
    let output = run_interpreter(&[], "hsh-no-such-command-xyz\ntrue\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("hsh-no-such-command-xyz"));
    // the interpreter went on to execute the second command
    assert!(stdout_of(&output).contains("Child exited with status 0"));
}

#[test]
fn signal_termination_is_reported() {
    let script = write_script("sigkill", "#!/bin/sh\nkill -9 $$\n");
    let output = run_interpreter(&[], &format!("{}\n", script.display()));
    let _ = fs::remove_file(&script);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Child terminated by signal 9"));
}

#[test]
fn overlong_line_is_rejected_and_the_interpreter_survives() {
    let long = "a".repeat(5000);
    let output = run_interpreter(&[], &format!("{}\ntrue\n", long));

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("line too long"));
    assert!(stdout_of(&output).contains("Child exited with status 0"));
}

#[test]
fn too_many_arguments_terminates_with_status_one() {
    let line = vec!["true"; 65].join(" ");
    let output = run_interpreter(&[], &format!("{}\n", line));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("too many arguments"));
    assert!(!stdout_of(&output).contains("Child exited"));
}

#[test]
fn exit_builtin_terminates_without_a_further_prompt() {
    let output = run_interpreter(&[], "exit\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "$ ");
}

#[test]
fn exit_builtin_propagates_its_status_operand() {
    let output = run_interpreter(&[], "exit 3\n");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn cd_builtin_changes_the_directory_of_children() {
    let output = run_interpreter(&[], "cd /\npwd\n");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_of(&output),
        "$ $ /\nChild exited with status 0\n$ \n"
    );
}

#[test]
fn setenv_is_visible_through_the_env_builtin() {
    let output = run_interpreter(&[], "setenv HSH_TEST_VAR sentinel\nenv\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("HSH_TEST_VAR=sentinel"));
}

#[test]
fn setenv_is_visible_to_children() {
    let script = write_script("readvar", "#!/bin/sh\necho \"var=$HSH_CHILD_VAR\"\n");
    let output = run_interpreter(
        &[],
        &format!("setenv HSH_CHILD_VAR from-parent\n{}\n", script.display()),
    );
    let _ = fs::remove_file(&script);

    assert!(stdout_of(&output).contains("var=from-parent"));
}

#[test]
fn unsetenv_removes_a_variable_from_children() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_hsh"))
        .env("HSH_DROP_VAR", "should-disappear")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn interpreter");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(b"unsetenv HSH_DROP_VAR\nenv\n")
        .expect("write input");
    let output = child.wait_with_output().expect("collect output");

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout_of(&output).contains("HSH_DROP_VAR"));
}

#[test]
fn alias_expansion_reaches_the_launcher() {
    let output = run_interpreter(&[], "alias greet=echo\ngreet hello\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("hello\n"));
    assert!(stdout_of(&output).contains("Child exited with status 0"));
}

#[test]
fn alias_listing_is_sorted() {
    let output = run_interpreter(&[], "alias b=pwd\nalias a=ls\nalias\n");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "$ $ $ a='ls'\nb='pwd'\n$ \n");
}

#[test]
fn via_shell_policy_hands_the_line_to_sh() {
    let output = run_interpreter(&["--via-shell"], "true && exit 7\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Child exited with status 7"));
}
