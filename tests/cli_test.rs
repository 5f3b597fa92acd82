use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use assert_cmd::Command;

#[test]
fn test_cli_prints_menu_and_exits() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.write_stdin("0\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1. Create an account"))
        .stdout(predicate::str::contains("Bye!"));
}

#[test]
fn test_cli_creates_account() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.write_stdin("1\n0\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Your card has been created"))
        .stdout(predicate::str::contains("Your card number:"))
        .stdout(predicate::str::contains("Your card PIN:"));
}

#[test]
fn test_cli_reprompts_on_garbage() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.write_stdin("banana\n0\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Input is incorrect. Please try again."))
        .stdout(predicate::str::contains("Bye!"));
}

#[test]
fn test_cli_handles_end_of_input_without_exit_command() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.write_stdin("1\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Your card has been created"));
}
