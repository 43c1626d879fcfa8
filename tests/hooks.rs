#![cfg(unix)]

mod support;

use predicates::str::contains;
use support::Workspace;

fn single_task(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1, "expected one JSON line, got {text:?}");
    serde_json::from_str(lines[0]).expect("task json")
}

#[test]
fn on_add_defaults_priority_and_refreshes_filter() {
    let ws = Workspace::new();
    ws.write_config("priority.span=2\n");
    ws.install_task([0; 6], "[]");

    let assert = ws
        .command("on-add-need-priority")
        .write_stdin("{\"uuid\":\"abc-1\",\"description\":\"buy milk\",\"status\":\"pending\"}\n")
        .assert()
        .success();
    let task = single_task(&assert.get_output().stdout);
    assert_eq!(task["priority"], "4");
    assert_eq!(task["description"], "buy milk");
    assert_eq!(task["status"], "pending");

    // The uncommitted task itself makes level 4 the lowest pending level.
    let config = ws.read_config();
    assert!(config.starts_with("priority.span=2\n"));
    assert!(config.contains("context.need.read=( pri.after:6 ) or ( scheduled.before:today+2d"));
    assert!(ws.calls().lines().all(|call| call.starts_with("rc.hooks=off ")));
}

#[test]
fn on_add_applies_first_matching_rule() {
    let ws = Workspace::new();
    ws.write_config("priority.1.auto=+urgent\npriority.3.auto=proj:work\n");
    ws.install_task([0; 6], "[]");

    let assert = ws
        .command("on-add-need-priority")
        .write_stdin(
            "{\"uuid\":\"abc-2\",\"description\":\"call\",\"project\":\"work\",\"tags\":[\"urgent\"]}\n",
        )
        .assert()
        .success();
    assert_eq!(single_task(&assert.get_output().stdout)["priority"], "1");
}

#[test]
fn on_add_keeps_existing_priority() {
    let ws = Workspace::new();
    ws.write_config("priority.1.auto=+urgent\n");
    ws.install_task([0; 6], "[]");

    let assert = ws
        .command("on-add-need-priority")
        .write_stdin("{\"uuid\":\"abc-3\",\"description\":\"x\",\"tags\":[\"urgent\"],\"priority\":\"5\"}\n")
        .assert()
        .success();
    assert_eq!(single_task(&assert.get_output().stdout)["priority"], "5");
}

#[test]
fn on_add_echoes_unparsable_input() {
    let ws = Workspace::new();
    ws.write_config("priority.span=2\n");
    ws.install_task([0; 6], "[]");

    // Exit 0 so Taskwarrior still accepts the add.
    ws.command("on-add-need-priority")
        .write_stdin("not json\n")
        .assert()
        .success()
        .stdout("not json\n");
    let log = std::fs::read_to_string(ws.log_dir().join("on-add.log")).expect("log");
    assert!(log.contains("FATAL ERROR"));
    assert_eq!(ws.read_config(), "priority.span=2\n");
}

#[test]
fn on_add_logs_to_file() {
    let ws = Workspace::new();
    ws.write_config("");
    ws.install_task([0; 6], "[]");

    ws.command("on-add-need-priority")
        .write_stdin("{\"uuid\":\"abc-4\",\"description\":\"log me\"}\n")
        .assert()
        .success();
    let log = std::fs::read_to_string(ws.log_dir().join("on-add.log")).expect("log");
    assert!(log.contains("Processing task: log me"));
    assert!(log.contains("No rule matched"));
}

#[test]
fn on_exit_refreshes_filter_silently() {
    let ws = Workspace::new();
    ws.write_config("priority.span=2\ncontext.need.read=stale\n");
    ws.install_task([0, 0, 1, 0, 0, 0], "[]");

    ws.command("on-exit-need-priority")
        .write_stdin("{\"uuid\":\"abc-5\",\"description\":\"done\"}\n")
        .assert()
        .success()
        .stdout("");
    assert_eq!(
        ws.read_config(),
        "priority.span=2\ncontext.need.read=( pri.after:5 ) or ( scheduled.before:today+2d and scheduled.after:today-1w ) or ( due.before:today+2d and due.after:today-1w )\n"
    );
}

#[test]
fn on_exit_clears_filter_when_nothing_pending() {
    let ws = Workspace::new();
    ws.write_config("context.need.read=stale\n");
    ws.install_task([0; 6], "[]");

    ws.command("on-exit-need-priority").assert().success();
    assert_eq!(ws.read_config(), "context.need.read=\n");
}

#[test]
fn on_exit_without_config_fails() {
    let ws = Workspace::new();
    ws.install_task([1, 0, 0, 0, 0, 0], "[]");

    ws.command("on-exit-need-priority").assert().code(1);
    let log = std::fs::read_to_string(ws.log_dir().join("on-exit.log")).expect("log");
    assert!(log.contains("Error updating context"));
}

#[test]
fn migrate_dry_run_changes_nothing() {
    let ws = Workspace::new();
    ws.install_task(
        [0; 6],
        r#"[{"uuid":"aaaaaaaa-1111","description":"legacy high","priority":"H"},
            {"uuid":"bbbbbbbb-2222","description":"numeric","priority":"3"},
            {"uuid":"cccccccc-3333","description":"none"}]"#,
    );

    ws.command("need-migrate")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("Mapping: H:2,M:4,L:5"))
        .stdout(contains("Would migrate: aaaaaaaa | H -> pri:2"))
        .stdout(contains("Would migrate: cccccccc | (none) -> pri:4"));
    assert!(!ws.calls().contains("modify"));
}

#[test]
fn migrate_applies_custom_mapping() {
    let ws = Workspace::new();
    ws.install_task(
        [0; 6],
        r#"[{"uuid":"aaaaaaaa-1111","description":"legacy high","priority":"H"},
            {"uuid":"bbbbbbbb-2222","description":"numeric","priority":"3"}]"#,
    );

    ws.command("need-migrate")
        .args(["--mapping", "H:1"])
        .assert()
        .success()
        .stdout(contains("Migrated: aaaaaaaa | H -> pri:1"));
    let calls = ws.calls();
    assert!(calls.contains("rc.hooks=off aaaaaaaa-1111 modify priority:1"));
    assert!(!calls.contains("bbbbbbbb-2222 modify"));
}

#[test]
fn migrate_sends_unknown_priority_to_default() {
    let ws = Workspace::new();
    ws.install_task(
        [0; 6],
        r#"[{"uuid":"aaaaaaaa-1111","description":"legacy high","priority":"H"},
            {"uuid":"dddddddd-4444","description":"odd value","priority":"7"}]"#,
    );

    ws.command("need-migrate")
        .assert()
        .success()
        .stdout(contains("Migrated: aaaaaaaa | H -> pri:2"))
        .stdout(contains("Migrated: dddddddd | 7 -> pri:4"));
    let calls = ws.calls();
    assert!(calls.contains("rc.hooks=off aaaaaaaa-1111 modify priority:2"));
    assert!(calls.contains("rc.hooks=off dddddddd-4444 modify priority:4"));
}

#[test]
fn migrate_rejects_bad_mapping() {
    let ws = Workspace::new();
    ws.install_task([0; 6], "[]");

    ws.command("need-migrate")
        .args(["--mapping", "H:9"])
        .assert()
        .code(1);
    assert!(ws.calls().is_empty());
}
