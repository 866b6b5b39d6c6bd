/// End-to-end MCP sessions over an in-memory transport
use habit_store::mcp::McpServer;
use habit_store::*;
use serde_json::{json, Value};
use tempfile::tempdir;

/// Feed `requests` to a fresh server and collect the responses
async fn session(server: &mut McpServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut output = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_full_session_persists() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("habits.db");

    let server = HabitTrackerServer::new(db_path.clone(), false).unwrap();
    let mut mcp = McpServer::new(server);

    let responses = session(
        &mut mcp,
        &[
            json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            tool_call(1, "habit_create", json!({
                "name": "Gym",
                "category": "Exercise",
                "frequency": "weekly",
                "target_days": [1, 3, 5]
            })),
            tool_call(2, "habit_create", json!({"name": "", "category": "Exercise"})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1]["result"]["isError"], json!(false));
    assert!(tool_text(&responses[1]).contains("Created habit 'Gym'"));
    assert_eq!(responses[2]["result"]["isError"], json!(true));

    let habit_id = mcp.habit_tracker().store().habits()[0].id.to_string();
    let responses = session(
        &mut mcp,
        &[
            tool_call(3, "habit_toggle", json!({"habit_id": habit_id, "notes": "leg day"})),
            tool_call(4, "habit_status", json!({})),
        ],
    )
    .await;
    assert!(tool_text(&responses[0]).contains("Marked 'Gym' done"));
    assert!(tool_text(&responses[1]).contains("1 of 1 habits done today"));
    drop(mcp);

    let reopened = HabitTrackerServer::new(db_path, false).unwrap();
    let store = reopened.store();
    assert_eq!(store.habits()[0].target_days, vec![1, 3, 5]);
    assert_eq!(store.today_completed_count(), 1);
}

#[tokio::test]
async fn test_data_tools_round_trip() {
    let dir = tempdir().unwrap();
    let server = HabitTrackerServer::new(dir.path().join("habits.db"), false).unwrap();
    let mut mcp = McpServer::new(server);

    let responses = session(
        &mut mcp,
        &[
            tool_call(1, "habit_create", json!({"name": "Read", "category": "Learning"})),
            tool_call(2, "settings_update", json!({"theme": "dark"})),
            tool_call(3, "data_export", json!({})),
        ],
    )
    .await;

    let text = tool_text(&responses[2]);
    let body: Value = serde_json::from_str(text.split_once("\n\n").unwrap().1).unwrap();
    let document = body["document"].to_string();

    let responses = session(
        &mut mcp,
        &[
            tool_call(4, "data_clear", json!({"confirm": true})),
            tool_call(5, "habit_list", json!({})),
            tool_call(6, "data_import", json!({"data": document})),
            tool_call(7, "settings_get", json!({})),
        ],
    )
    .await;

    assert!(tool_text(&responses[1]).contains("No habits yet"));
    assert!(tool_text(&responses[2]).contains("Imported 1 habits"));
    assert!(tool_text(&responses[3]).contains("\"theme\": \"dark\""));
    assert_eq!(mcp.habit_tracker().store().habits()[0].name, "Read");
}

#[tokio::test]
async fn test_reconnect_triggers_single_backup() {
    let dir = tempdir().unwrap();
    let server = HabitTrackerServer::new(dir.path().join("habits.db"), false).unwrap();
    let mut mcp = McpServer::new(server);

    let offline = json!({"jsonrpc": "2.0", "method": "notifications/connectivity", "params": {"online": false}});
    let online = json!({"jsonrpc": "2.0", "method": "notifications/connectivity", "params": {"online": true}});

    session(&mut mcp, &[tool_call(1, "habit_create", json!({"name": "Read", "category": "Learning"}))]).await;
    let responses = session(&mut mcp, &[offline, online.clone()]).await;
    assert!(responses.is_empty());

    let backup = mcp.habit_tracker().store().read_backup().unwrap().unwrap();
    assert_eq!(backup.habits.len(), 1);
    let first_sync = backup.last_sync;

    // Already online: no new backup
    session(&mut mcp, &[tool_call(2, "habit_create", json!({"name": "Run", "category": "Exercise"}))]).await;
    session(&mut mcp, &[online]).await;
    let backup = mcp.habit_tracker().store().read_backup().unwrap().unwrap();
    assert_eq!(backup.habits.len(), 1);
    assert_eq!(backup.last_sync, first_sync);
}
