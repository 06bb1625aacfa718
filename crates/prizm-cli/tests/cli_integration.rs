use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

const TRELLO: &str = r#"{
  "name": "Sprint Board",
  "lists": [
    {"id": "l1", "name": "To Do", "pos": 1},
    {"id": "l2", "name": "Done", "pos": 2}
  ],
  "labels": [{"id": "g", "name": "Bug", "color": "red"}],
  "members": [{"id": "m1", "username": "ann", "fullName": "Ann Lee"}],
  "cards": [
    {"id": "c1", "name": "Fix crash", "idList": "l1", "pos": 1, "idLabels": ["g"], "idMembers": ["m1"]},
    {"id": "c2", "name": "Ship", "idList": "l2", "pos": 1}
  ]
}"#;

const JIRA_CSV: &str = "Summary,Issue key,Status,Priority\n\
Fix login bug,PROJ-1,To Do,High\n\
Add dark mode,PROJ-2,In Progress,Medium\n";

const GENERIC_CSV: &str = "Ticket,Stage,Owner\n\
Write docs,Doing,ann@example.com\n\
Release,Done,\n";

fn prizm() -> Command {
    let mut cmd = Command::cargo_bin("prizm").unwrap();
    cmd.env_remove("PRIZM_DEBUG_LOG").env_remove("PRIZM_CONFIG");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod detect_tests {
    use super::*;

    #[test]
    fn test_detect_trello() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "board.json", TRELLO);

        let output = prizm()
            .args(["detect", file.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["data"]["source"], "trello");
        assert!(json["data"]["confidence"].as_f64().unwrap() >= 0.5);
        assert_eq!(json["data"]["candidates"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_detect_jira_csv() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "export.csv", JIRA_CSV);

        let output = prizm()
            .args(["detect", file.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(parse_json_output(&output)["data"]["source"], "jira");
    }

    #[test]
    fn test_detect_unknown_fails() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "data.json", r#"{"hello": "world"}"#);

        prizm()
            .args(["detect", file.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not detect"));
    }

    #[test]
    fn test_detect_missing_file_fails() {
        prizm()
            .args(["detect", "/nonexistent/board.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read file"));
    }
}

mod import_tests {
    use super::*;

    #[test]
    fn test_import_trello() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "board.json", TRELLO);

        let output = prizm()
            .args(["import", file.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(json["success"].as_bool().unwrap());
        let data = &json["data"];
        assert_eq!(data["source"], "trello");
        assert_eq!(data["board"]["name"], "Sprint Board");
        assert_eq!(data["stats"]["columns"], 2);
        assert_eq!(data["stats"]["tasks"], 2);
        assert_eq!(data["stats"]["labels"], 1);
    }

    #[test]
    fn test_import_with_forced_format() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "issues.txt", JIRA_CSV);

        let output = prizm()
            .args(["import", file.to_str().unwrap(), "--format", "jira"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["source"], "jira");
        assert_eq!(json["data"]["tasks"][0]["external_id"], "PROJ-1");
    }

    #[test]
    fn test_import_rejects_unknown_format_flag() {
        prizm()
            .args(["import", "board.json", "--format", "monday"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown import format"));
    }

    #[test]
    fn test_import_with_header_mapping() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "tasks.csv", GENERIC_CSV);

        let output = prizm()
            .args([
                "import",
                file.to_str().unwrap(),
                "--map",
                "Ticket=title",
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["source"], "csv");
        assert_eq!(json["data"]["tasks"][0]["title"], "Write docs");
        assert_eq!(json["data"]["tasks"][0]["column"], "In Progress");
        assert_eq!(json["data"]["tasks"][1]["completed"], true);
    }

    #[test]
    fn test_import_without_mapping_fails_on_unknown_headers() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "tasks.csv", GENERIC_CSV);

        let output = prizm()
            .args(["import", file.to_str().unwrap(), "--format", "csv"])
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(!json["success"].as_bool().unwrap());
        assert!(json["error"].as_str().unwrap().contains("title"));
        assert!(!json["data"]["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_import_malformed_json_fails() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "board.json", "{ invalid json }");

        let output = prizm()
            .args(["import", file.to_str().unwrap(), "--format", "trello"])
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(!json["success"].as_bool().unwrap());
        assert!(json["error"].as_str().unwrap().contains("Invalid JSON"));
    }

    #[test]
    fn test_import_empty_file_fails() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "empty.csv", "");

        prizm()
            .args(["import", file.to_str().unwrap()])
            .assert()
            .failure()
            .stdout(predicate::str::contains("empty"));
    }

    #[test]
    fn test_import_matches_users() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "board.json", TRELLO);
        let users = write_file(
            &dir,
            "users.json",
            r#"[{"id": "3f6c1a52-8d5e-4c1b-9a7e-2b1f0c9d8e71", "username": "ann", "email": "ann@example.com"}]"#,
        );

        let output = prizm()
            .args([
                "import",
                file.to_str().unwrap(),
                "--users",
                users.to_str().unwrap(),
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["stats"]["users_matched"], 1);
        assert_eq!(
            json["data"]["tasks"][0]["assignee_user_id"],
            "3f6c1a52-8d5e-4c1b-9a7e-2b1f0c9d8e71"
        );
    }

    #[test]
    fn test_organization_requires_users() {
        prizm()
            .args([
                "import",
                "board.json",
                "--organization",
                "3f6c1a52-8d5e-4c1b-9a7e-2b1f0c9d8e71",
            ])
            .assert()
            .failure();
    }

    #[test]
    fn test_import_writes_native_export() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "board.json", TRELLO);
        let out = dir.path().join("native.json");

        prizm()
            .args([
                "import",
                file.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
            ])
            .assert()
            .success();

        let exported: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(exported["prizm_export_version"], "1.0");
        assert_eq!(exported["board"]["name"], "Sprint Board");

        let output = prizm()
            .args(["import", out.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&output);
        assert_eq!(json["data"]["source"], "native");
        assert_eq!(json["data"]["stats"]["tasks"], 2);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_field_overrides_apply() {
        let dir = tempdir().unwrap();
        let file = write_file(&dir, "tasks.csv", GENERIC_CSV);
        let config = write_file(
            &dir,
            "config.toml",
            "[import]\nmax_title_length = 5\n\n[import.field_overrides]\nTicket = \"title\"\n",
        );

        let output = prizm()
            .args([
                "--config",
                config.to_str().unwrap(),
                "import",
                file.to_str().unwrap(),
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["tasks"][0]["title"], "Write");
    }

    #[test]
    fn test_invalid_config_fails() {
        let dir = tempdir().unwrap();
        let config = write_file(&dir, "config.toml", "[import]\nmin_confidence = 3.0\n");

        prizm()
            .args(["--config", config.to_str().unwrap(), "formats"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load config"));
    }
}

mod misc_tests {
    use super::*;

    #[test]
    fn test_formats_lists_all_sources() {
        let output = prizm()
            .arg("formats")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["count"], 5);
        assert_eq!(json["data"]["items"][0]["id"], "native");
        assert_eq!(json["data"]["items"][4]["name"], "CSV");
    }

    #[test]
    fn test_completions() {
        prizm()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("prizm"));
    }
}
