use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_assessd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn assessd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("assessd-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let csv_out = workspace.join("smoke-submissions.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "assess.score",
        json!({
            "kind": "mchat",
            "answers": [
                { "questionId": 1, "answer": "no" },
                { "questionId": 2, "answer": "yes" }
            ]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "assess.validate",
        json!({
            "kind": "motorSkills",
            "answers": [
                { "questionId": 1, "answer": "good", "ageGroup": "3-4" }
            ]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "assess.recommendations",
        json!({ "kind": "socialSkills", "riskLevel": "medium" }),
    );

    let created = request(
        &mut stdin,
        &mut reader,
        "6",
        "children.create",
        json!({ "lastName": "Smoke", "firstName": "Child", "birthDate": "2021-06-15" }),
    );
    let child_id = created
        .get("result")
        .and_then(|v| v.get("childId"))
        .and_then(|v| v.as_str())
        .expect("childId")
        .to_string();

    let _ = request(&mut stdin, &mut reader, "7", "children.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "children.update",
        json!({
            "childId": child_id,
            "patch": { "firstName": "Updated" }
        }),
    );

    let recorded = request(
        &mut stdin,
        &mut reader,
        "9",
        "submissions.record",
        json!({
            "childId": child_id,
            "kind": "speechLanguage",
            "answers": [
                { "questionId": 1, "answer": "often", "category": "expressive", "ageGroup": "3-4" },
                { "questionId": 2, "answer": "sometimes", "category": "receptive", "ageGroup": "3-4" }
            ]
        }),
    );
    let submission_id = recorded
        .get("result")
        .and_then(|v| v.get("submissionId"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "submissions.list",
        json!({ "childId": child_id }),
    );
    if !submission_id.is_empty() {
        let _ = request(
            &mut stdin,
            &mut reader,
            "11",
            "submissions.get",
            json!({ "submissionId": submission_id }),
        );
    }
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "exchange.exportSubmissionsCsv",
        json!({ "outPath": csv_out.to_string_lossy() }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "backup.exportWorkspaceBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "outPath": bundle_out.to_string_lossy()
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "14",
        "backup.importWorkspaceBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "inPath": bundle_out.to_string_lossy()
        }),
    );
    if !submission_id.is_empty() {
        let _ = request(
            &mut stdin,
            &mut reader,
            "15",
            "submissions.delete",
            json!({ "submissionId": submission_id }),
        );
    }
    let _ = request(
        &mut stdin,
        &mut reader,
        "16",
        "children.delete",
        json!({ "childId": child_id }),
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
