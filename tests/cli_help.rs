use std::process::Command;

#[test]
fn test_help_lists_all_commands() {
    let bin = env!("CARGO_BIN_EXE_vault");

    let output = Command::new(bin).arg("--help").output().unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in [
        "init", "publish", "update", "list", "tags", "check", "import", "status",
    ] {
        assert!(
            stdout.contains(command),
            "help output should mention '{}'; got:\n{}",
            command,
            stdout
        );
    }
}

#[test]
fn test_version_flag() {
    let bin = env!("CARGO_BIN_EXE_vault");

    let output = Command::new(bin).arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
