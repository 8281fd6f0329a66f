//! CLI integration tests
//!
//! These tests verify the command-line interface behavior, including:
//! - Subcommand parsing
//! - Output formats
//! - Exit codes for invalid input

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TARGET_VARS: &[&str] = &[
    "ECRPIPE_ACCOUNT",
    "CDK_DEPLOY_ACCOUNT",
    "CDK_DEFAULT_ACCOUNT",
    "ECRPIPE_REGION",
    "CDK_DEPLOY_REGION",
    "CDK_DEFAULT_REGION",
];

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs the binary with the deploy-target variables cleared
fn ecrpipe(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ecrpipe"));
    for var in TARGET_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .env_remove("ECRPIPE_LOG_LEVEL")
        .envs(envs.iter().copied())
        .args(args)
        .output()
        .expect("Failed to execute ecrpipe")
}

fn write_input(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("pipeline.yaml");
    fs::write(&path, contents).expect("Failed to write pipeline input");
    path
}

#[test]
fn test_cli_help() {
    let output = ecrpipe(&["--help"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ecrpipe"));
    assert!(stdout.contains("synth"));
    assert!(stdout.contains("validate"));
}

#[test]
fn test_synth_yaml_output() {
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_yaml::Value = serde_yaml::from_str(&stdout).expect("Invalid YAML output");
    assert_eq!(parsed["name"].as_str(), Some("repo-dev"));
    assert_eq!(parsed["stage"].as_str(), Some("dev"));
}

#[test]
fn test_synth_json_output() {
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(&["synth", config.to_str().unwrap(), "--format", "json"], &[]);

    assert_eq!(output.status.code(), Some(0));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
    assert_eq!(parsed["stages"].as_array().map(|s| s.len()), Some(2));
    assert_eq!(
        parsed["image_repository"]["uri"],
        "123456789012.dkr.ecr.us-east-1.amazonaws.com/repo-dev"
    );
}

#[test]
fn test_synth_buildspec_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buildspec.yml");
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(
        &[
            "synth",
            config.to_str().unwrap(),
            "--buildspec",
            "-o",
            out.to_str().unwrap(),
        ],
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    let written = fs::read_to_string(&out).expect("Output file not written");
    assert!(written.starts_with("version: '0.2'"));

    let spec: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
    assert_eq!(spec["phases"]["install"]["commands"][0].as_str(), Some("cd handler"));
    let docker_build = spec["phases"]["build"]["commands"][0].as_str().unwrap();
    assert!(docker_build.contains("--build-arg=API_KEY=\"$API_KEY\""));
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
}

#[test]
fn test_synth_human_output() {
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(&["synth", config.to_str().unwrap(), "-f", "human"], &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pipeline repo-dev"));
    assert!(stdout.contains("Forwarded secrets: API_KEY"));
}

#[test]
fn test_synth_target_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: prod\nrepository:\n  name: Org/Repo\n  secret: github-token\n",
    );
    let output = ecrpipe(
        &["synth", config.to_str().unwrap(), "-f", "json"],
        &[
            ("CDK_DEFAULT_ACCOUNT", "210987654321"),
            ("CDK_DEFAULT_REGION", "ap-southeast-2"),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        parsed["image_repository"]["arn"],
        "arn:aws:ecr:ap-southeast-2:210987654321:repository/repo-prod"
    );
}

#[test]
fn test_synth_missing_target_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: dev\nrepository:\n  name: Org/Repo\n  secret: github-token\n",
    );
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("account"));
}

#[test]
fn test_synth_invalid_stage_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: staging\nrepository:\n  name: Org/Repo\n  secret: github-token\nenv:\n  account: \"123456789012\"\n  region: us-east-1\n",
    );
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_synth_missing_file_fails() {
    let output = ecrpipe(&["synth", "/nonexistent/pipeline.yaml"], &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_validate_ok() {
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(&["validate", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Org/Repo on dev (branch deploy/dev)"));
}

#[test]
fn test_validate_quiet() {
    let config = fixture("dev-pipeline.yaml");
    let output = ecrpipe(&["-q", "validate", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_validate_bad_repository() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: dev\nrepository:\n  name: just-a-name\n  secret: github-token\n",
    );
    let output = ecrpipe(&["validate", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("just-a-name"));
}

const COLLIDING_INPUT: &str = "stage: dev
repository:
  name: Org/Repo
  secret: github-token
additional_build_env:
  API_KEY: plain
additional_build_secrets:
  API_KEY: prod/api-key
env:
  account: \"123456789012\"
  region: us-east-1
";

#[test]
fn test_synth_colliding_build_variable_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let config = write_input(&dir, COLLIDING_INPUT);
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("API_KEY"));
}

#[test]
fn test_validate_colliding_build_variable_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let config = write_input(&dir, COLLIDING_INPUT);
    let output = ecrpipe(&["validate", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_log_level_rejected() {
    let config = fixture("dev-pipeline.yaml");
    for command in ["synth", "validate"] {
        let output = ecrpipe(
            &[command, config.to_str().unwrap()],
            &[("ECRPIPE_LOG_LEVEL", "LOUD")],
        );
        assert_eq!(output.status.code(), Some(1), "{} accepted LOUD", command);
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn test_synth_reports_stage_before_missing_target() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: staging\nrepository:\n  name: Org/Repo\n  secret: github-token\n",
    );
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid stage: \"staging\""));
    assert!(!stderr.contains("Target account not specified"));
}

#[test]
fn test_synth_invalid_image_repository_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "stage: dev\nrepository:\n  name: Org/Repo\n  secret: github-token\nimage_repository: My Repo\nenv:\n  account: \"123456789012\"\n  region: us-east-1\n",
    );
    let output = ecrpipe(&["synth", config.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("image_repository"));
}
