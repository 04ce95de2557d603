//! Line-based JSON-RPC client over a child process's stdin/stdout.
//!
//! The server is not reentrant, so one request is in flight at a time: the
//! whole write-then-read exchange happens under an async mutex. Lines that
//! are not JSON, or that answer a different request id, are skipped.

use super::error::{McpError, Result};
use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use futures::StreamExt;
use serde_json::Value;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, trace};

/// Longest response line accepted from the server (16 MB)
const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

struct ServerIo {
    // held so kill_on_drop fires when the client goes away
    _child: Child,
    stdin: ChildStdin,
    lines: FramedRead<ChildStdout, LinesCodec>,
}

/// JSON-RPC client bound to one tool server process
pub struct JsonRpcClient {
    io: Mutex<ServerIo>,
    next_id: AtomicU64,
    request_timeout: Duration,
}

impl JsonRpcClient {
    /// Spawn `command args...` and connect to its stdio.
    pub fn spawn(command: &str, args: &[String], request_timeout: Duration) -> Result<Self> {
        let program =
            which::which(command).map_err(|_| McpError::CommandNotFound(command.to_string()))?;
        debug!(command, ?args, "Spawning tool server");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(McpError::SpawnError)?;
        let stdin = child.stdin.take().ok_or_else(|| {
            McpError::SpawnError(std::io::Error::other("Failed to capture stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::SpawnError(std::io::Error::other("Failed to capture stdout"))
        })?;

        Ok(Self {
            io: Mutex::new(ServerIo {
                _child: child,
                stdin,
                lines: FramedRead::new(stdout, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            }),
            next_id: AtomicU64::new(1),
            request_timeout,
        })
    }

    /// Send one request and wait for the response with the same id.
    ///
    /// Returns the `result` member (`null` when absent).
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let mut io = self.io.lock().await;
        let exchange = async {
            trace!(id, method, "Sending request");
            io.stdin.write_all(line.as_bytes()).await?;
            io.stdin.flush().await?;

            loop {
                let incoming = match io.lines.next().await {
                    Some(incoming) => incoming?,
                    None => return Err(McpError::TransportClosed),
                };
                let response: JsonRpcResponse = match serde_json::from_str(&incoming) {
                    Ok(response) => response,
                    Err(_) => {
                        trace!(line = %incoming, "Skipping non-JSON line");
                        continue;
                    }
                };
                if response.id != Some(id) {
                    trace!(expected = id, got = ?response.id, "Skipping unrelated response");
                    continue;
                }
                if let Some(error) = response.error {
                    return Err(McpError::RpcError {
                        code: error.code,
                        message: error.message,
                    });
                }
                return Ok(response.result.unwrap_or(Value::Null));
            }
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout.as_secs()))?
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;

    /// Echo server: prints a noise line, a response for another id, then the
    /// real response carrying the request's method back.
    const ECHO_SERVER: &str = r#"
while IFS= read -r line; do
  id=$(printf '%s' "$line" | sed -n 's/.*"id":\([0-9]*\).*/\1/p')
  echo "server starting"
  echo "{\"jsonrpc\":\"2.0\",\"id\":999,\"result\":{}}"
  case "$line" in
    *fail*) echo "{\"jsonrpc\":\"2.0\",\"id\":$id,\"error\":{\"code\":-32601,\"message\":\"Method not found\"}}" ;;
    *) echo "{\"jsonrpc\":\"2.0\",\"id\":$id,\"result\":{\"output\":\"pong $id\"}}" ;;
  esac
done
"#;

    fn echo_client(timeout: Duration) -> JsonRpcClient {
        JsonRpcClient::spawn("sh", &["-c".to_string(), ECHO_SERVER.to_string()], timeout).unwrap()
    }

    #[tokio::test]
    async fn test_request_matches_response_id() {
        let client = echo_client(Duration::from_secs(5));

        let first = client.request("ping", None).await.unwrap();
        let second = client.request("ping", Some(json!({}))).await.unwrap();

        assert_eq!(first, json!({"output": "pong 1"}));
        assert_eq!(second, json!({"output": "pong 2"}));
    }

    #[tokio::test]
    async fn test_rpc_error_is_reported() {
        let client = echo_client(Duration::from_secs(5));

        let err = client.request("fail", None).await.unwrap_err();

        match err {
            McpError::RpcError { code, message } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let client = JsonRpcClient::spawn(
            "sh",
            &["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(200),
        )
        .unwrap();

        let err = client.request("ping", None).await.unwrap_err();
        assert!(matches!(err, McpError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_exited_server_closes_transport() {
        let client = JsonRpcClient::spawn(
            "sh",
            &["-c".to_string(), "read line; exit 0".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.request("ping", None).await.unwrap_err();
        assert!(matches!(err, McpError::TransportClosed));
    }

    #[test]
    fn test_missing_command() {
        let result = JsonRpcClient::spawn("definitely-not-a-real-tool-server", &[], Duration::from_secs(1));
        assert!(matches!(result, Err(McpError::CommandNotFound(_))));
    }
}
