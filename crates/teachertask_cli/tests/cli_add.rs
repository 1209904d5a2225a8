use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use teachertask_core::storage::history_store::today_key;

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("teachertask-{nanos}-{file_name}"))
}

fn teachertask(store_path: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_teachertask"));
    command
        .env("TEACHERTASK_STORE_PATH", store_path)
        .env("TEACHERTASK_CONFIG_PATH", store_path.with_extension("config.json"))
        .env("TEACHERTASK_DISABLE_NOTIFICATIONS", "1")
        .env_remove("TEACHERTASK_EXTRACTION_FILE")
        .env_remove("TEACHERTASK_API_KEY")
        .env_remove("GEMINI_API_KEY");
    command
}

fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn add_command_extracts_and_stores_tasks() {
    let store_path = temp_path("cli-add.json");
    let replay_path = temp_path("cli-add-replay.json");
    std::fs::write(
        &replay_path,
        r#"```json
{"tasks": [
  {"description": "grade exams", "time": "10:00", "importance": "high"},
  {"description": "call parents", "time": "no fixed time", "importance": "URGENT"}
]}
```"#,
    )
    .unwrap();

    let output = teachertask(&store_path)
        .args(["add", "grade", "exams", "at", "10", "call", "parents"])
        .env("TEACHERTASK_EXTRACTION_FILE", &replay_path)
        .output()
        .expect("failed to run add command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&replay_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: grade exams – 10:00 [high]"));
    assert!(stdout.contains("Added task: call parents – no fixed time [medium]"));

    let records = stored.as_array().expect("history array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["date"], today_key().unwrap());
    let tasks = records[0]["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1]["importance"], "medium");
    assert_eq!(tasks[1]["completed"], false);
    assert!(tasks[0]["id"].as_str().unwrap().starts_with("task-"));
}

#[test]
fn add_command_without_backend_adds_nothing() {
    let store_path = temp_path("cli-add-offline.json");

    let output = teachertask(&store_path)
        .args(["add", "grade exams"])
        .output()
        .expect("failed to run add command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks extracted."));
    assert!(stored[0]["tasks"].as_array().unwrap().is_empty());
}

#[test]
fn add_command_with_malformed_output_adds_nothing() {
    let store_path = temp_path("cli-add-malformed.json");
    let replay_path = temp_path("cli-add-malformed-replay.json");
    std::fs::write(&replay_path, "Sure! Here are your tasks: grade exams").unwrap();

    let output = teachertask(&store_path)
        .args(["--json", "add", "grade exams"])
        .env("TEACHERTASK_EXTRACTION_FILE", &replay_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&replay_path).ok();

    assert!(output.status.success());
    let added: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(added, serde_json::json!([]));
}

#[test]
fn add_command_show_history_opens_history() {
    let store_path = temp_path("cli-add-history.json");
    std::fs::write(
        &store_path,
        serde_json::json!([
            {
                "date": "2020-01-02",
                "tasks": [
                    {
                        "id": "task-1",
                        "description": "old task",
                        "time": "09:00",
                        "importance": "low",
                        "timestamp": 1,
                        "completed": false
                    }
                ]
            }
        ])
        .to_string(),
    )
    .unwrap();

    let output = teachertask(&store_path)
        .args(["add", "please", "Show", "History"])
        .output()
        .expect("failed to run add command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2020-01-02"));
    assert!(stdout.contains("old task – 09:00"));
    assert!(!stdout.contains("Added task"));
    assert_eq!(stored.as_array().unwrap().len(), 2);
    assert!(stored[0]["tasks"].as_array().unwrap().is_empty());
}

#[test]
fn add_command_rejects_missing_text() {
    let store_path = temp_path("cli-add-missing.json");
    let output = teachertask(&store_path)
        .args(["add"])
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn new_command_adds_manual_task() {
    let store_path = temp_path("cli-new.json");
    let output = teachertask(&store_path)
        .args([
            "--json",
            "new",
            "print worksheets",
            "--time",
            "07:30",
            "--importance",
            "high",
        ])
        .output()
        .expect("failed to run new command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task["description"], "print worksheets");
    assert_eq!(task["time"], "07:30");
    assert_eq!(task["importance"], "high");
    assert_eq!(stored[0]["tasks"][0]["id"], task["id"]);
}

#[test]
fn new_command_defaults_time_and_importance() {
    let store_path = temp_path("cli-new-defaults.json");
    let output = teachertask(&store_path)
        .args(["--json", "new", "tidy classroom"])
        .output()
        .expect("failed to run new command");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task["time"], "no fixed time");
    assert_eq!(task["importance"], "medium");
}

#[test]
fn add_command_honors_json_flag_after_text() {
    let store_path = temp_path("cli-add-trailing-json.json");
    let replay_path = temp_path("cli-add-trailing-json-replay.json");
    std::fs::write(
        &replay_path,
        r#"{"tasks": [{"description": "grade exams", "time": "10:00", "importance": "high"}]}"#,
    )
    .unwrap();

    let output = teachertask(&store_path)
        .args(["add", "grade", "exams", "--json"])
        .env("TEACHERTASK_EXTRACTION_FILE", &replay_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&replay_path).ok();

    assert!(output.status.success());
    let added: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(added[0]["description"], "grade exams");
    assert_eq!(added[0]["importance"], "high");
}
