//! End-to-end tests for the `scope-rules` binary.

use std::error::Error;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

const ENV_VARS: [&str; 3] = [
    "SCOPE_RULES_LOG_LEVEL",
    "SCOPE_RULES_MAX_DEPTH",
    "SCOPE_RULES_MAX_LENGTH",
];

fn scope_rules() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("scope-rules")?;
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    Ok(cmd)
}

fn json_file(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn activities_file() -> Result<NamedTempFile, Box<dyn Error>> {
    json_file(
        r#"[
            {"title": "Mangrove planting", "tagKeys": ["mangrove", "planting"]},
            {"title": "Reef survey", "tagKeys": ["reef", "open_data"]},
            {"title": "Mangrove census", "description": "Yearly count", "tagKeys": ["mangrove", "open_data"]}
        ]"#,
    )
}

fn catalog_file() -> Result<NamedTempFile, Box<dyn Error>> {
    json_file(
        r#"[
            {"key": "mangrove", "label": "Mangrove", "kind": "ecosystem"},
            {"key": "reef", "label": "Coral Reef", "kind": "ecosystem"},
            {"key": "open_data", "label": "Open Data", "kind": "data"}
        ]"#,
    )
}

#[rstest]
#[case(&["--tag", "a"], "true\n")]
#[case(&["--tag", "a", "--tag", "c"], "false\n")]
#[case(&[], "false\n")]
fn eval_prints_verdict(#[case] tags: &[&str], #[case] expected: &str) -> TestResult {
    scope_rules()?
        .args(["eval", r#"scope.hasAny(["a","b"]) && !scope.has("c")"#])
        .args(tags)
        .assert()
        .success()
        .stdout(expected.to_string());
    Ok(())
}

#[test]
fn eval_degrades_malformed_rules_to_false() -> TestResult {
    scope_rules()?
        .args(["eval", r#"scope.hasAll(["a""#, "--tag", "a"])
        .assert()
        .success()
        .stdout("false\n")
        .stderr(predicate::str::contains("rule expression failed"));
    Ok(())
}

#[test]
fn strict_eval_fails_on_malformed_rules() -> TestResult {
    scope_rules()?
        .args(["eval", "--strict", r#"scope.hasAll(["a""#])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("invalid rule"));
    Ok(())
}

#[test]
fn build_prints_synthesised_rule() -> TestResult {
    scope_rules()?
        .args(["build", "--all", "a", "--any", "c", "--all", "b", "--exclude", "d"])
        .assert()
        .success()
        .stdout("scope.hasAll([\"a\",\"b\"]) && scope.hasAny([\"c\"]) && !scope.has(\"d\")\n");
    Ok(())
}

#[test]
fn build_without_selections_prints_empty_line() -> TestResult {
    scope_rules()?.arg("build").assert().success().stdout("\n");
    Ok(())
}

#[test]
fn keys_lists_literals_once() -> TestResult {
    scope_rules()?
        .args(["keys", r#"scope.hasAny(["b","a"]) || !scope.has("b")"#])
        .assert()
        .success()
        .stdout("b\na\n");
    Ok(())
}

#[test]
fn check_prints_canonical_form() -> TestResult {
    scope_rules()?
        .args(["check", r#"( scope.hasAll([ 'a' ,"b" ]) )"#])
        .assert()
        .success()
        .stdout("scope.hasAll([\"a\",\"b\"])\n");
    Ok(())
}

#[rstest]
#[case(r#"scope.has("a") &&"#, "missing an operand")]
#[case(r#"scope.nope("a")"#, "invalid rule")]
fn check_rejects_invalid_rules(#[case] expression: &str, #[case] message: &str) -> TestResult {
    scope_rules()?
        .args(["check", expression])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(message));
    Ok(())
}

#[test]
fn depth_limit_flag_overrides_default() -> TestResult {
    let rule = r#"!!scope.has("a")"#;
    scope_rules()?.args(["check", rule]).assert().success();
    scope_rules()?
        .args(["check", rule, "--max-depth", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nests deeper than 1 levels"));
    Ok(())
}

#[test]
fn length_limit_reads_environment() -> TestResult {
    scope_rules()?
        .env("SCOPE_RULES_MAX_LENGTH", "8")
        .args(["check", r#"scope.has("a")"#])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exceeding the limit of 8"));
    Ok(())
}

#[test]
fn invalid_environment_exits_with_code_two() -> TestResult {
    scope_rules()?
        .env("SCOPE_RULES_MAX_DEPTH", "deep")
        .args(["keys", r#"scope.has("a")"#])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("invalid configuration"));
    Ok(())
}

#[test]
fn explain_prints_clauses_with_catalog_labels() -> TestResult {
    let catalog = catalog_file()?;
    scope_rules()?
        .args(["explain", r#"scope.has("mangrove") && scope.has("reef")"#])
        .args(["--tag", "mangrove", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "no match (1 of 2 clauses matched)\n",
        ))
        .stdout(predicate::str::contains("matched: Mangrove"))
        .stdout(predicate::str::contains("missing: Coral Reef"));
    Ok(())
}

#[test]
fn explain_emits_json() -> TestResult {
    let output = scope_rules()?
        .args(["explain", r#"scope.has("a") || scope.has("b")"#, "--tag", "b", "--json"])
        .output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value.get("matches"), Some(&serde_json::json!(true)));
    assert_eq!(
        value.pointer("/clauses/1/matchedTags"),
        Some(&serde_json::json!(["b"]))
    );
    Ok(())
}

#[test]
fn filter_lists_matching_titles() -> TestResult {
    let activities = activities_file()?;
    scope_rules()?
        .args(["filter", r#"scope.has("open_data")"#, "--activities"])
        .arg(activities.path())
        .assert()
        .success()
        .stdout("Reef survey\nMangrove census\n2 of 3 activities match\n");
    Ok(())
}

#[test]
fn filter_reports_missing_files() -> TestResult {
    scope_rules()?
        .args(["filter", r#"scope.has("a")"#, "--activities", "does/not/exist.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read activities file"));
    Ok(())
}

#[test]
fn stats_summarises_tags_and_kinds() -> TestResult {
    let activities = activities_file()?;
    let catalog = catalog_file()?;
    scope_rules()?
        .args(["stats", "--activities"])
        .arg(activities.path())
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("3 activities\ntag frequency:\n"))
        .stdout(predicate::str::contains("  Mangrove    2\n"))
        .stdout(predicate::str::contains("  ecosystem   3\n"))
        .stdout(predicate::str::contains("  data        2\n"));
    Ok(())
}
