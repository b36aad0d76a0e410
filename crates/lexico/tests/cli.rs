//! CLI integration tests for lexico commands.
//!
//! These tests focus on exit codes and result sets, not on exact output formatting which may
//! change.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Launch records shared by the search tests.
const LAUNCHES: &str = r#"[
  {"mission_name": "Falcon Heavy Test Flight", "year": 2018, "rocket": {"name": "Falcon Heavy"}, "reused": false},
  {"mission_name": "CRS-20", "year": 2020, "rocket": {"name": "Falcon 9"}, "reused": true},
  {"mission_name": "Demo-2", "year": 2020, "rocket": {"name": "Falcon 9"}, "crew": "Dragon"},
  {"mission_name": "FalconSat", "year": 2006, "rocket": {"name": "Falcon 1"}}
]"#;

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a lexico command.
fn lexico() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("lexico").unwrap()
}

/// Helper to run `lexico` with HOME isolated to the provided directory.
fn lexico_with_home(home: &Path) -> Command {
    let mut cmd = lexico();
    cmd.env("HOME", home);
    cmd.env_remove("LEXICO_LOG");
    cmd
}

/// Strips ANSI escape sequences from a string.
fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            output.push(ch);
        }
    }

    output
}

/// Creates a directory holding `launches.json` and a `root = true` config.
fn setup_data_dir() -> tempfile::TempDir {
    let dir = temp_dir();
    fs::write(dir.path().join("launches.json"), LAUNCHES).unwrap();
    fs::write(dir.path().join(".lexico.toml"), "root = true\n").unwrap();
    dir
}

/// Runs `lexico search --json` in `dir` and returns the result positions.
fn search_positions(dir: &Path, args: &[&str]) -> Vec<u64> {
    let output = lexico_with_home(dir)
        .current_dir(dir)
        .arg("search")
        .args(args)
        .args(["--data", "launches.json", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "search failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["position"].as_u64().unwrap())
        .collect()
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = temp_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success();

        let config_path = dir.path().join(".lexico.toml");
        assert!(config_path.exists());

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# [search]"));
    }

    #[test]
    fn fails_if_config_exists() {
        let dir = temp_dir();
        fs::write(dir.path().join(".lexico.toml"), "existing").unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn force_overwrites_existing() {
        let dir = temp_dir();
        fs::write(dir.path().join(".lexico.toml"), "old content").unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".lexico.toml")).unwrap();
        assert!(contents.contains("# [search]"));
    }

    #[test]
    fn global_writes_to_home() {
        let home = temp_dir();
        let work = temp_dir();

        lexico_with_home(home.path())
            .current_dir(work.path())
            .args(["init", "--global"])
            .assert()
            .success();

        assert!(home.path().join(".lexico.toml").exists());
        assert!(!work.path().join(".lexico.toml").exists());
    }

    #[test]
    fn prints_config_preview() {
        let dir = temp_dir();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success();

        let stdout = strip_ansi(&String::from_utf8_lossy(&assert.get_output().stdout));
        assert!(stdout.contains("Configuration written:"));
        assert!(stdout.contains("comparator"));
    }
}

mod check {
    use super::*;

    #[test]
    fn succeeds_without_config() {
        let dir = temp_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No configuration files found"));
    }

    #[test]
    fn succeeds_with_valid_config() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\ncomparator = \"fuzzy\"\nindex = \"mission_name\"\n",
        )
        .unwrap();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success();

        let stdout = strip_ansi(&String::from_utf8_lossy(&assert.get_output().stdout));
        assert!(stdout.contains(".lexico.toml"));
        assert!(stdout.contains("No issues found."));
    }

    #[test]
    fn warns_on_index_with_binary_comparator() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\nindex = [\"mission_name\"]\n",
        )
        .unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("ignored by the binary comparator"));
    }

    #[test]
    fn fails_on_invalid_toml() {
        let dir = temp_dir();
        fs::write(dir.path().join(".lexico.toml"), "root = true\n[search\n").unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }

    #[test]
    fn fails_on_unknown_comparator() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\ncomparator = \"trie\"\n",
        )
        .unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("search.comparator"));
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_effective_settings() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\nlimit = 7\n",
        )
        .unwrap();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .arg("config")
            .assert()
            .success();

        let stdout = strip_ansi(&String::from_utf8_lossy(&assert.get_output().stdout));
        assert!(stdout.contains("[search]"));
        assert!(stdout.contains("limit = 7"));
        assert!(stdout.contains("[fuzzy]"));
    }
}

mod parse {
    use super::*;

    #[test]
    fn prints_parse_tree() {
        let dir = temp_dir();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "mission_name:heavy !dragon"])
            .assert()
            .success();

        let stdout = strip_ansi(&String::from_utf8_lossy(&assert.get_output().stdout));
        assert!(stdout.contains("Parse tree:"));
        assert!(stdout.contains("Group"));
        assert!(stdout.contains("mission_name : heavy ! dragon"));
    }

    #[test]
    fn strict_reports_expected_tokens() {
        let dir = temp_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "mission_name:", "--strict"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("search term"));
    }

    #[test]
    fn lenient_parse_repairs_query() {
        let dir = temp_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "(falcon heavy"])
            .assert()
            .success();
    }

    #[test]
    fn config_can_disable_recovery() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\nerror_recovery = false\n",
        )
        .unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "(falcon heavy"])
            .assert()
            .failure();
    }

    #[test]
    fn lists_tokens() {
        let dir = temp_dir();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "year:>2010", "--tokens"])
            .assert()
            .success();

        let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
        assert!(stdout.contains("GroupTerminator"));
        assert!(stdout.contains("Gt"));
        assert!(stdout.contains("2010"));
    }
}

mod search {
    use super::*;

    #[test]
    fn finds_matching_records() {
        let dir = setup_data_dir();
        assert_eq!(search_positions(dir.path(), &["heavy"]), vec![0]);
    }

    #[test]
    fn scoped_nested_path() {
        let dir = setup_data_dir();
        assert_eq!(search_positions(dir.path(), &["rocket.name:9"]), vec![1, 2]);
    }

    #[test]
    fn numeric_comparison() {
        let dir = setup_data_dir();
        assert_eq!(search_positions(dir.path(), &["year:>2010"]), vec![0, 1, 2]);
    }

    #[test]
    fn negation_excludes_results() {
        let dir = setup_data_dir();
        assert_eq!(search_positions(dir.path(), &["!falcon"]), vec![1, 2]);
    }

    #[test]
    fn or_finds_either_term() {
        let dir = setup_data_dir();
        assert_eq!(
            search_positions(dir.path(), &["crew:dragon OR mission_name:sat"]),
            vec![2, 3]
        );
    }

    #[test]
    fn recovered_query_still_searches() {
        let dir = setup_data_dir();
        assert_eq!(search_positions(dir.path(), &["(falcon heavy"]), vec![0]);
    }

    #[test]
    fn strict_rejects_malformed_query() {
        let dir = setup_data_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "mission_name:", "--strict", "-d", "launches.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("query syntax error"));
    }

    #[test]
    fn respects_limit() {
        let dir = setup_data_dir();

        let output = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "falcon", "-d", "launches.json", "--json", "-n", "1"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["total_matches"], 2);
        assert_eq!(json["results"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn reads_stdin() {
        let dir = setup_data_dir();

        let output = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "demo", "--json"])
            .write_stdin(LAUNCHES)
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["results"][0]["record"]["mission_name"], "Demo-2");
    }

    #[test]
    fn table_output_lists_records() {
        let dir = setup_data_dir();

        let assert = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "crs", "-d", "launches.json"])
            .assert()
            .success();

        let stdout = strip_ansi(&String::from_utf8_lossy(&assert.get_output().stdout));
        assert!(stdout.contains("CRS-20"));
        assert!(stdout.contains("1 results (binary)"));
    }

    #[test]
    fn returns_no_results_message() {
        let dir = setup_data_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "starship", "-d", "launches.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No results found."));
    }

    #[test]
    fn fuzzy_ranks_closest_first() {
        let dir = setup_data_dir();
        let positions = search_positions(
            dir.path(),
            &["falcn hevy", "--fuzzy", "--index", "mission_name"],
        );

        assert_eq!(positions.len(), 4);
        assert_eq!(positions[0], 0);
    }

    #[test]
    fn fuzzy_from_config() {
        let dir = setup_data_dir();
        fs::write(
            dir.path().join(".lexico.toml"),
            "root = true\n[search]\ncomparator = \"fuzzy\"\n",
        )
        .unwrap();

        let output = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "mission_name:demo", "-d", "launches.json", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["comparator"], "fuzzy");
        assert_eq!(json["results"][0]["position"], 2);
    }

    #[test]
    fn index_with_binary_comparator_fails() {
        let dir = setup_data_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "falcon", "-d", "launches.json", "--index", "mission_name"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("binary"));
    }

    #[test]
    fn fails_on_missing_data_file() {
        let dir = setup_data_dir();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "falcon", "-d", "missing.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read"));
    }

    #[test]
    fn fails_on_non_array_data() {
        let dir = setup_data_dir();
        fs::write(dir.path().join("object.json"), "{\"a\": 1}").unwrap();

        lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "a", "-d", "object.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected a JSON array"));
    }

    #[test]
    fn verbose_logs_go_to_stderr() {
        let dir = setup_data_dir();

        let output = lexico_with_home(dir.path())
            .current_dir(dir.path())
            .args(["search", "heavy", "-d", "launches.json", "--json", "-v"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["total_matches"], 1);
        assert!(String::from_utf8_lossy(&output.stderr).contains("query evaluated"));
    }
}
