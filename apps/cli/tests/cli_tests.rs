//! dobot-cli 集成测试
//!
//! 只覆盖不需要真实机械臂的路径：参数解析、配置文件、连接前的输入检查。

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("dobot-cli").unwrap()
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("move"))
        .stdout(predicate::str::contains("suction"))
        .stdout(predicate::str::contains("gripper"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dobot-cli"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");

    cli()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "--port", "/dev/ttyUSB3"])
        .assert()
        .success();

    cli()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/dev/ttyUSB3"));

    let content = std::fs::read_to_string(&config).unwrap();
    assert!(content.contains("port = \"/dev/ttyUSB3\""));
}

#[test]
fn test_config_get_unknown_key() {
    let dir = tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["config", "get", "speed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_check_rejects_invalid_profile() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let profile = dir.path().join("profile.toml");
    std::fs::write(&profile, "[ptp_common]\nacceleration_ratio = 250.0\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--profile")
        .arg(&profile)
        .args(["config", "set"])
        .assert()
        .success();

    cli()
        .arg("--config")
        .arg(&config)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("acceleration_ratio"));
}

#[test]
fn test_move_rejects_nan_before_connecting() {
    let dir = tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["move", "--x", "NaN", "--y", "0", "--z", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NaN"))
        .stdout(predicate::str::contains("Connecting").not());
}

#[test]
fn test_suction_requires_on_or_off() {
    cli().args(["suction", "maybe"]).assert().failure();
}

#[test]
fn test_run_missing_script() {
    let dir = tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["run", "/nonexistent/script.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}
