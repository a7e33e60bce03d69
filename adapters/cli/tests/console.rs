use std::process::{Command, Output};

fn run_console(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rampart"))
        .args(args)
        .output()
        .expect("failed to run the rampart binary")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("console output is utf-8")
}

fn demo_transfer_line() -> String {
    let output = run_console(&[]);
    assert!(output.status.success(), "demo session exits cleanly");
    stdout_of(&output)
        .lines()
        .find_map(|line| line.strip_prefix("deployment: "))
        .expect("demo session prints a transfer line")
        .to_owned()
}

#[test]
fn demo_session_narrates_both_deployments() {
    let output = run_console(&[]);
    assert!(output.status.success(), "demo session exits cleanly");

    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("Rampart deployment console."));
    assert!(stdout.contains("unit placed: vanguard #0 at (5, 5)"));
    assert!(stdout.contains("facing committed: unit #0 down"));
    assert!(stdout.contains("unit placed: marksman #1 at (7, 3)"));
    assert!(stdout.contains("facing committed: unit #1 left"));
    assert!(stdout.contains("unit inspected: #0 at (5, 5)"));
    assert!(demo_transfer_line().starts_with("rampart:v1:10x10:"));
}

#[test]
fn decode_round_trips_the_demo_transfer_line() {
    let transfer = demo_transfer_line();

    let output = run_console(&["--decode", &transfer]);
    assert!(output.status.success(), "decode exits cleanly");

    let stdout = stdout_of(&output);
    assert!(stdout.contains("deployment on a 10x10 grid, 2 unit(s):"));
    assert!(stdout.contains("vanguard at (5, 5) facing down"));
    assert!(stdout.contains("marksman at (7, 3) facing left"));
}

#[test]
fn decode_rejects_an_unsupported_transfer_version() {
    let output = run_console(&["--decode", "rampart:v9:10x10:e30"]);
    assert!(!output.status.success(), "unsupported versions must fail");
}
