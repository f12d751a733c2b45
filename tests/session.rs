use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// A launch directory holding `users.txt`, doubling as `$HOME` so the user
/// config points the shell's root at a scratch directory.
fn sandbox() -> (TempDir, TempDir) {
    let home = tempdir().expect("tempdir");
    let root = tempdir().expect("tempdir");
    fs::write(home.path().join("users.txt"), "alice:secret\nbob:hunter2\n").expect("users");
    let config_dir = home.path().join(".config").join("minishell");
    fs::create_dir_all(&config_dir).expect("config dir");
    fs::write(
        config_dir.join("config.toml"),
        format!("[shell]\nroot_dir = '{}'\nhistory = false\n", root.path().display()),
    )
    .expect("config");
    (home, root)
}

fn shell(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("minishell").expect("bin");
    cmd.current_dir(home).env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn three_bad_logins_exit_with_failure() {
    let (home, _root) = sandbox();
    let assert = shell(home.path())
        .write_stdin("alice\nwrong\nbob\nsecret\nmallory\nx\n")
        .assert()
        .failure();
    let out = stdout_of(assert.get_output());
    assert!(out.contains("Welcome to the Shell"), "{out}");
    assert_eq!(out.matches("Invalid username or password").count(), 3, "{out}");
    assert!(out.contains("Maximum login attempts exceeded. Exiting."), "{out}");
    assert!(!out.contains("Login successful!"), "{out}");
}

#[test]
fn closed_input_during_login_fails() {
    let (home, _root) = sandbox();
    shell(home.path()).write_stdin("alice\n").assert().failure();
}

#[test]
fn redirected_echo_lands_in_root_dir() {
    let (home, root) = sandbox();
    let assert = shell(home.path())
        .write_stdin("bob\nhunter2\necho hi   there > out.txt\necho more >> out.txt\nexit\n")
        .assert()
        .success();
    let out = stdout_of(assert.get_output());
    assert!(out.contains("Login successful!"), "{out}");
    assert!(out.contains("Type 'help' to see available commands."), "{out}");
    assert_eq!(
        fs::read_to_string(root.path().join("out.txt")).expect("out.txt"),
        "hi there\r\nmore\r\n"
    );
}

#[test]
fn end_of_input_ends_the_session() {
    let (home, root) = sandbox();
    shell(home.path())
        .write_stdin("alice\nsecret\ndir > listing.txt\n")
        .assert()
        .success();
    let listing = fs::read_to_string(root.path().join("listing.txt")).expect("listing");
    assert!(listing.contains("listing.txt\r\n"), "{listing}");
}

#[test]
fn second_attempt_can_succeed() {
    let (home, _root) = sandbox();
    let assert = shell(home.path())
        .write_stdin("alice\nnope\nalice\nsecret\nhelp\nexit\n")
        .assert()
        .success();
    let out = stdout_of(assert.get_output());
    assert_eq!(out.matches("Invalid username or password").count(), 1, "{out}");
    assert!(out.contains("Type program names and arguments, and hit enter."), "{out}");
}
