/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC messages from the client
/// 2. Routes tool calls to the habit store
/// 3. Writes JSON-RPC responses back, one per line
///
/// It also listens for `notifications/connectivity`, and runs the offline
/// sync whenever the client reports that the device came back online.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::domain::SUGGESTED_CATEGORIES;
use crate::mcp::protocol::*;
use crate::store::{Connectivity, ConnectivityMonitor};
use crate::tools::{self, ToolError};
use crate::{HabitTrackerServer, ServerError};

/// Arguments of tools that take none
#[derive(Debug, Deserialize)]
struct NoArguments {}

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
    /// Last connectivity reported by the client
    connectivity: ConnectivityMonitor,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
            connectivity: ConnectivityMonitor::default(),
        }
    }

    pub fn habit_tracker(&self) -> &HabitTrackerServer {
        &self.habit_tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader` until it is exhausted
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                warn!("Malformed JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request or notification
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest { id, method, params, .. } = request;

        let outcome = match method.as_str() {
            "initialize" => self.handle_initialize(params),
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                Ok(Value::Null)
            }
            "notifications/connectivity" => self.handle_connectivity(params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(params),
            _ => Err(JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
            )),
        };

        let Some(id) = id else {
            if let Err(e) = outcome {
                debug!("Notification '{}' failed: {}", method, e.message);
            }
            return None;
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e),
        })
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(params) => parse_params(params)?,
            None => InitializeParams::default(),
        };

        match &params.client_info {
            Some(client) => info!(
                "MCP client connected: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            ),
            None => info!("MCP client connected"),
        }
        if let Some(version) = &params.protocol_version {
            debug!("Client protocol version: {}", version);
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Store".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_json(&result)
    }

    /// Record connectivity and sync on an offline-to-online transition
    fn handle_connectivity(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ConnectivityParams = parse_params(params.unwrap_or(Value::Null))?;
        let now = Connectivity::from_online(params.online);

        if !self.connectivity.observe(now) {
            debug!("Connectivity is now {:?}, no sync needed", now);
            return Ok(json!({ "synced": false }));
        }

        info!("Device is back online, syncing offline data");
        match self.habit_tracker.store_mut().sync_offline_data(Connectivity::Online) {
            Ok(outcome) => Ok(json!({ "synced": true, "outcome": outcome })),
            Err(e) => {
                error!("Offline data sync failed: {}", e);
                Err(JsonRpcError::new(error_codes::STORAGE_ERROR, e.to_string()))
            }
        }
    }

    /// Handle tools/call request
    fn handle_tools_call(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let Some(params) = params else {
            return Err(JsonRpcError::new(error_codes::INVALID_PARAMS, "Missing parameters"));
        };
        let ToolCallParams { name, arguments } = parse_params(params)?;

        match name.as_str() {
            "habit_create" => self.run_tool(&name, arguments, |s, p| tools::create_habit(s.store_mut(), p)),
            "habit_update" => self.run_tool(&name, arguments, |s, p| tools::update_habit(s.store_mut(), p)),
            "habit_delete" => self.run_tool(&name, arguments, |s, p| tools::delete_habit(s.store_mut(), p)),
            "habit_toggle" => self.run_tool(&name, arguments, |s, p| tools::toggle_completion(s.store_mut(), p)),
            "habit_list" => self.run_tool(&name, arguments, |s, p| tools::list_habits(s.store(), s.analytics(), p)),
            "habit_status" => self.run_tool(&name, arguments, |s, p| tools::get_habit_status(s.store(), s.analytics(), p)),
            "habit_stats" => self.run_tool(&name, arguments, |s, p| tools::get_stats(s.store(), s.analytics(), p)),
            "habit_sync" => self.run_tool(&name, arguments, |s, p| tools::sync_data(s.store_mut(), p)),
            "settings_get" => self.run_tool(&name, arguments, |s, _: NoArguments| tools::get_settings(s.store())),
            "settings_update" => self.run_tool(&name, arguments, |s, p| tools::update_settings(s.store_mut(), p)),
            "data_export" => self.run_tool(&name, arguments, |s, _: NoArguments| tools::export_data(s.store())),
            "data_import" => self.run_tool(&name, arguments, |s, p| tools::import_data(s.store_mut(), p)),
            "data_clear" => self.run_tool(&name, arguments, |s, p| tools::clear_data(s.store_mut(), p)),
            "logs_prune" => self.run_tool(&name, arguments, |s, _: NoArguments| tools::prune_logs(s.store_mut())),
            _ => to_json(&ToolCallResult::error(format!("Unknown tool: {}", name))),
        }
    }

    /// Deserialize arguments, run one tool and wrap its response
    ///
    /// Arguments that do not deserialize fail the JSON-RPC call. Every other
    /// failure comes back as a tool result with `isError` set.
    fn run_tool<P, R>(
        &mut self,
        name: &str,
        arguments: Map<String, Value>,
        tool: impl FnOnce(&mut HabitTrackerServer, P) -> Result<R, ToolError>,
    ) -> Result<Value, JsonRpcError>
    where
        P: DeserializeOwned,
        R: Serialize,
    {
        let params: P = serde_json::from_value(Value::Object(arguments)).map_err(|e| {
            JsonRpcError::new(
                error_codes::INVALID_PARAMS,
                format!("Invalid arguments for {}: {}", name, e),
            )
        })?;

        let result = match tool(&mut self.habit_tracker, params) {
            Ok(response) => ToolCallResult::success(render_response(&response)?),
            Err(e @ ToolError::Store(_)) => {
                error!("Tool {} failed ({}): {}", name, tool_error_code(&e), e);
                ToolCallResult::error(e.to_string())
            }
            Err(e) => {
                debug!("Tool {} rejected input ({}): {}", name, tool_error_code(&e), e);
                ToolCallResult::error(e.to_string())
            }
        };

        to_json(&result)
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid parameters: {}", e))
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}

/// The response's `message` on the first line, then the full response as JSON
fn render_response<R: Serialize>(response: &R) -> Result<String, JsonRpcError> {
    let value = to_json(response)?;
    let body = serde_json::to_string_pretty(&value)
        .map_err(|e| JsonRpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))?;

    Ok(match value.get("message").and_then(Value::as_str) {
        Some(message) => format!("{}\n\n{}", message, body),
        None => body,
    })
}

fn tool_definitions() -> Vec<ToolDefinition> {
    let category_help = format!(
        "Category, one of: {} (use 'Other' together with custom_category)",
        SUGGESTED_CATEGORIES.join(", ")
    );

    vec![
        ToolDefinition::new(
            "habit_create",
            "Create a new habit to track",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name of the habit"},
                    "description": {"type": "string", "description": "Optional longer description"},
                    "category": {"type": "string", "description": category_help},
                    "custom_category": {"type": "string", "description": "Category name to use when category is 'Other'"},
                    "frequency": {"type": "string", "enum": ["daily", "weekly", "monthly"], "description": "How often (default: daily)"},
                    "target_days": {"type": "array", "items": {"type": "integer", "minimum": 0, "maximum": 6}, "description": "Weekdays for weekly habits, 0 = Sunday"},
                    "color": {"type": "string", "description": "Display color, e.g. #3b82f6"},
                    "is_active": {"type": "boolean", "description": "Whether the habit starts active (default: true)"}
                },
                "required": ["name", "category"]
            }),
        ),
        ToolDefinition::new(
            "habit_update",
            "Change fields of an existing habit, or pause and reactivate it",
            json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit to update"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "category": {"type": "string"},
                    "frequency": {"type": "string", "enum": ["daily", "weekly", "monthly"]},
                    "target_days": {"type": "array", "items": {"type": "integer", "minimum": 0, "maximum": 6}},
                    "color": {"type": "string"},
                    "is_active": {"type": "boolean"}
                },
                "required": ["habit_id"]
            }),
        ),
        ToolDefinition::new(
            "habit_delete",
            "Delete a habit and all of its completion records",
            json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit to delete"}
                },
                "required": ["habit_id"]
            }),
        ),
        ToolDefinition::new(
            "habit_toggle",
            "Mark a habit done for a day, or undo it if it was already done",
            json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit"},
                    "date": {"type": "string", "description": "Day to toggle (YYYY-MM-DD, optional - defaults to today)"},
                    "notes": {"type": "string", "description": "Optional notes for this day"}
                },
                "required": ["habit_id"]
            }),
        ),
        ToolDefinition::new(
            "habit_list",
            "List habits with streaks and recent progress, optionally filtered",
            json!({
                "type": "object",
                "properties": {
                    "search": {"type": "string", "description": "Match against name or description"},
                    "category": {"type": "string", "description": "Only habits in this category"},
                    "status": {"type": "string", "enum": ["all", "active", "inactive"], "description": "Default: all"},
                    "window_days": {"type": "integer", "minimum": 0, "description": "Days covered by the progress figure (default: 7)"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "habit_status",
            "Check today's progress and streaks for one habit or every active habit",
            json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of specific habit (optional - shows all active habits if omitted)"},
                    "window_days": {"type": "integer", "minimum": 0, "description": "Days covered by the progress figure (default: 7)"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "habit_stats",
            "Statistics: average progress, best streak, daily completion series and category breakdown",
            json!({
                "type": "object",
                "properties": {
                    "window_days": {"type": "integer", "minimum": 0, "description": "Days covered by progress figures (default: 30)"},
                    "days": {"type": "integer", "minimum": 0, "maximum": 365, "description": "Length of the daily series (default: 14, capped at 365)"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "habit_sync",
            "Verify stored data, back it up when online, and recover from the backup if data is corrupt",
            json!({
                "type": "object",
                "properties": {
                    "online": {"type": "boolean", "description": "Whether the device is online (default: true)"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "settings_get",
            "Show the current settings",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolDefinition::new(
            "settings_update",
            "Change one or more settings",
            json!({
                "type": "object",
                "properties": {
                    "theme": {"type": "string", "enum": ["light", "dark"]},
                    "notifications": {"type": "boolean"},
                    "week_starts_on": {"type": "string", "enum": ["sunday", "monday"]}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "data_export",
            "Export all habits, completion records and settings as a JSON document",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolDefinition::new(
            "data_import",
            "Replace all data with a previously exported JSON document",
            json!({
                "type": "object",
                "properties": {
                    "data": {"type": "string", "description": "The exported JSON document"}
                },
                "required": ["data"]
            }),
        ),
        ToolDefinition::new(
            "data_clear",
            "Delete all habits, completion records and settings",
            json!({
                "type": "object",
                "properties": {
                    "confirm": {"type": "boolean", "description": "Must be true"}
                },
                "required": ["confirm"]
            }),
        ),
        ToolDefinition::new(
            "logs_prune",
            "Remove completion records that belong to deleted habits",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::clock::FixedClock;
    use crate::domain::HabitId;
    use crate::storage::{BlobStore, SqliteBlobStore, BACKUP_KEY};
    use crate::store::HabitStore;

    fn server() -> McpServer {
        let storage = SqliteBlobStore::open_in_memory().unwrap();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let store = HabitStore::load(storage, clock).unwrap();
        McpServer::new(HabitTrackerServer::from_store(store))
    }

    async fn call(server: &mut McpServer, line: Value) -> Value {
        let response = server.process_line(&line.to_string()).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    async fn call_tool(server: &mut McpServer, name: &str, arguments: Value) -> Value {
        call(
            server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": name, "arguments": arguments}
            }),
        )
        .await
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server();
        let response = call(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1"}
            }}),
        )
        .await;
        assert_eq!(response["result"]["protocolVersion"], json!(MCP_VERSION));

        let ack = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(ack.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_tools_list_names() {
        let mut server = server();
        let response = call(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 14);
        assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
    }

    #[tokio::test]
    async fn test_create_and_toggle_through_tools() {
        let mut server = server();
        call_tool(&mut server, "habit_create", json!({"name": "Read", "category": "Learning"})).await;
        let habit_id = server.habit_tracker().store().habits()[0].id.to_string();

        let response = call_tool(&mut server, "habit_toggle", json!({"habit_id": habit_id})).await;
        assert_eq!(response["result"]["isError"], json!(false));
        let habit_id = HabitId::from_string(habit_id);
        assert_eq!(server.habit_tracker().store().streak_for_habit(&habit_id), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_is_tool_error() {
        let mut server = server();
        let response = call_tool(
            &mut server,
            "habit_create",
            json!({"name": "Gym", "category": "Exercise", "frequency": "weekly", "target_days": []}),
        )
        .await;

        assert_eq!(response["result"]["isError"], json!(true));
        assert!(server.habit_tracker().store().habits().is_empty());
    }

    #[tokio::test]
    async fn test_bad_arguments_are_invalid_params() {
        let mut server = server();
        let response = call_tool(&mut server, "habit_toggle", json!({})).await;
        assert_eq!(response["error"]["code"], json!(error_codes::INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_json() {
        let mut server = server();
        let response = call(&mut server, json!({"jsonrpc": "2.0", "id": 3, "method": "nope"})).await;
        assert_eq!(response["error"]["code"], json!(error_codes::METHOD_NOT_FOUND));
        assert_eq!(response["id"], json!(3));

        let response = server.process_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_coming_online_triggers_backup() {
        let mut server = server();
        let offline = json!({"jsonrpc": "2.0", "method": "notifications/connectivity", "params": {"online": false}});
        let online = json!({"jsonrpc": "2.0", "method": "notifications/connectivity", "params": {"online": true}});

        assert!(server.process_line(&offline.to_string()).await.is_none());
        let storage = server.habit_tracker().store().storage();
        assert!(storage.get(BACKUP_KEY).unwrap().is_none());

        assert!(server.process_line(&online.to_string()).await.is_none());
        let storage = server.habit_tracker().store().storage();
        assert!(storage.get(BACKUP_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_serve_reads_until_eof() {
        let mut server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
        );
        let mut output = Vec::new();

        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], json!(1));
        assert_eq!(lines[1]["id"], json!(2));
    }
}
