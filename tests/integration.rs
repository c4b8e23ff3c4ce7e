use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Builds a `best-of` command isolated from the user's config file and colors.
/// The returned temp dir holds the (absent) config and must be kept alive.
fn best_of_cmd() -> (Command, TempDir) {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("best-of").unwrap();
    cmd.env("BEST_OF_CONFIG", tmp.path().join("config.toml"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("BEST_OF_LOG");
    (cmd, tmp)
}

fn parse_json(stdout: &[u8]) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

// ---- Usage ----

#[test]
fn no_command_prints_usage() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Measure execution time of commands"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn unknown_unit_is_a_usage_error() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-o", "hours", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hours"));
}

// ---- Text format ----

#[test]
fn text_output_lists_basic_stats() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "3", "-q", "--", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best: "))
        .stdout(predicate::str::contains("Worst: "))
        .stdout(predicate::str::contains("Average: "))
        .stdout(predicate::str::contains(" seconds"))
        .stdout(predicate::str::contains("Median").not());
}

#[test]
fn text_output_with_percentiles() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "4", "-p", "-q", "-o", "ms", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let labels: Vec<&str> = stdout
        .lines()
        .map(|line| line.split(':').next().unwrap())
        .collect();
    assert_eq!(
        labels,
        [
            "Best",
            "Worst",
            "Average",
            "Median",
            "90th percentile",
            "95th percentile",
            "99th percentile"
        ]
    );
    assert!(stdout.lines().all(|line| line.ends_with(" milliseconds")));
}

#[test]
fn child_output_is_forwarded_unless_quiet() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "2", "--", "echo", "hello-from-child"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-from-child"));

    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "2", "-q", "--", "echo", "hello-from-child"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-from-child").not());
}

#[test]
fn trailing_command_without_separator() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "1", "echo", "-n", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abc"));
}

// ---- JSON / CSV ----

#[test]
fn json_output_valid() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "3", "-q", "--json", "-o", "ns", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed = parse_json(&output.stdout);
    let object = parsed.as_object().expect("Should be a JSON object");
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert_eq!(keys, ["Best", "Worst", "Average"]);

    let best = object["Best"].as_f64().unwrap();
    let average = object["Average"].as_f64().unwrap();
    let worst = object["Worst"].as_f64().unwrap();
    assert!(best > 0.0);
    assert!(best <= average && average <= worst);
}

#[test]
fn json_takes_precedence_over_csv() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "1", "-q", "--json", "--csv", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let _parsed = parse_json(&output.stdout);
}

#[test]
fn csv_output() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "2", "-q", "-p", "--csv", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Label,Value");
    assert_eq!(lines.len(), 8);
    assert!(lines[1].starts_with("Best,"));
    assert!(lines[7].starts_with("99th percentile,"));
}

// ---- Failures ----

#[test]
fn zero_runs_is_fatal() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "0", "--", "true"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Run count must be at least 1"));
}

#[test]
fn zero_concurrency_is_fatal() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-c", "0", "--", "true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Concurrency must be at least 1"));
}

#[test]
fn missing_program_still_reports() {
    let (mut cmd, _tmp) = best_of_cmd();
    cmd.args(["-n", "3", "-c", "2", "--json", "--", "best-of-no-such-program"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Failed to run command best-of-no-such-program",
        ))
        .stderr(predicate::str::contains("3 of 3 trials failed"));
}

#[test]
fn non_zero_exit_still_reports() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "4", "-c", "4", "--json", "--", "false"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Command false exited with error").count(), 4);
    assert!(stderr.contains("4 of 4 trials failed"));

    let parsed = parse_json(&output.stdout);
    assert_eq!(parsed.as_object().unwrap().len(), 3);
}

// ---- Timing ----

#[test]
fn sleep_stub_end_to_end() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "4", "-c", "2", "-p", "--json", "-o", "ms", "--", "sleep", "0.05"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed = parse_json(&output.stdout);
    for label in ["Best", "Worst", "Average", "Median"] {
        let value = parsed[label].as_f64().unwrap();
        assert!(value >= 50.0, "{} = {}", label, value);
        assert!(value < 2000.0, "{} = {}", label, value);
    }
}

#[test]
fn wait_is_not_measured() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "2", "-w", "300ms", "--json", "-o", "ms", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed = parse_json(&output.stdout);
    assert!(parsed["Worst"].as_f64().unwrap() < 300.0);
}

#[test]
fn progress_bar_stays_off_piped_output() {
    let (mut cmd, _tmp) = best_of_cmd();
    let output = cmd
        .args(["-n", "4", "-c", "2", "-q", "--progress", "--csv", "--", "true"])
        .output()
        .unwrap();
    assert!(output.status.success());

    // Neither stream is a terminal here, so the bar is not drawn at all.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("%"), "{}", stderr);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Label,Value"));
    assert_eq!(stdout.lines().count(), 4);
}

// ---- Config file ----

#[test]
fn config_file_supplies_defaults() {
    let (mut cmd, tmp) = best_of_cmd();
    tmp.child("config.toml")
        .write_str("percentiles = true\nquiet = true\nunit = \"ms\"\n")
        .unwrap();

    cmd.args(["-n", "2", "--", "echo", "hidden"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden").not())
        .stdout(predicate::str::contains("Median: "))
        .stdout(predicate::str::contains(" milliseconds"));
}

#[test]
fn invalid_config_file_is_fatal() {
    let (mut cmd, tmp) = best_of_cmd();
    tmp.child("config.toml").write_str("unit = \"hours\"\n").unwrap();

    cmd.args(["-n", "2", "--", "true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}
