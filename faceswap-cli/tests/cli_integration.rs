mod common;

use common::{cli_in_scratch, contains, fixture};

#[test]
fn help_lists_the_swap_options() {
    let (mut cmd, _scratch) = cli_in_scratch();
    let assertion = cmd.arg("--help").assert().success();
    let output = assertion.get_output();
    for flag in ["--source", "--target", "--quality", "--output", "--all-faces"] {
        assert!(contains(&output.stdout, flag), "help is missing {flag}");
    }
}

#[test]
fn missing_source_image_fails_with_exit_code_one() {
    let (mut cmd, scratch) = cli_in_scratch();
    let output = cmd
        .args(["-s", "nowhere.png", "-t"])
        .arg(fixture("images/test_pattern.png"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "nowhere.png"));
    assert!(!scratch.path().join("output").exists());
}

#[test]
fn undecodable_target_is_reported() {
    let (mut cmd, _scratch) = cli_in_scratch();
    let output = cmd
        .arg("-s")
        .arg(fixture("images/test_pattern.png"))
        .arg("-t")
        .arg(fixture("images/not_an_image.png"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "unsupported or unreadable image"));
}

#[test]
fn missing_models_are_reported_as_unavailable() {
    let (mut cmd, scratch) = cli_in_scratch();
    let output = cmd
        .arg("-s")
        .arg(fixture("images/test_pattern.png"))
        .arg("-t")
        .arg(fixture("images/test_pattern.png"))
        .arg("--models-dir")
        .arg(scratch.path().join("no-models"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "model unavailable"));
}

#[test]
fn unknown_quality_is_rejected() {
    let (mut cmd, _scratch) = cli_in_scratch();
    let output = cmd
        .args(["-s", "a.png", "-t", "b.png", "-q", "8k"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "unknown quality level"));
}

#[test]
fn missing_required_flag_exits_with_one() {
    let (mut cmd, _scratch) = cli_in_scratch();
    let output = cmd.arg("-t").arg(fixture("images/test_pattern.png")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "--source"));
}

#[test]
fn malformed_config_file_fails() {
    let (mut cmd, scratch) = cli_in_scratch();
    let config = scratch.path().join("broken.json");
    std::fs::write(&config, "{ not json").unwrap();
    let output = cmd
        .arg("-s")
        .arg(fixture("images/test_pattern.png"))
        .arg("-t")
        .arg(fixture("images/test_pattern.png"))
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "failed to parse settings JSON"));
}

#[test]
fn blank_canvas_target_reports_no_face() {
    let models = require_models!();
    let (mut cmd, scratch) = cli_in_scratch();
    let output = cmd
        .arg("-s")
        .arg(fixture("images/blank_canvas.png"))
        .arg("-t")
        .arg(fixture("images/blank_canvas.png"))
        .arg("--models-dir")
        .arg(models)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(contains(&output.stderr, "No face could be found"));
    assert!(!scratch.path().join("output").exists());
}
