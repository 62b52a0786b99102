//! Tool client backed by the external `dx` CLI.
//!
//! Each entry point spawns the CLI with piped output capture, fails with the
//! captured stderr on a non-zero exit, and otherwise parses stdout: JSON
//! first, falling back to non-empty lines. Every invocation is bounded by a
//! timeout so a hung CLI cannot suspend the caller indefinitely.

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

/// External program the client shells out to.
pub const DEFAULT_PROGRAM: &str = "dx";

/// Upper bound on a single CLI invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for client invocations.
#[derive(Debug)]
pub enum ClientError {
    /// The CLI process could not be spawned.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The CLI exited with a non-zero status; carries the captured stderr.
    NonZeroExit {
        operation: &'static str,
        status: i32,
        stderr: String,
    },
    /// The CLI did not finish within the configured timeout.
    TimedOut {
        operation: &'static str,
        limit: Duration,
    },
    /// The operation is declared but not implemented by this client.
    Unsupported(&'static str),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Spawn { program, source } => {
                write!(f, "Failed to spawn `{program}`: {source}")
            }
            ClientError::NonZeroExit {
                operation,
                status,
                stderr,
            } => write!(f, "MCP {operation} failed (status {status}): {stderr}"),
            ClientError::TimedOut { operation, limit } => {
                write!(f, "MCP {operation} timed out after {}s", limit.as_secs())
            }
            ClientError::Unsupported(operation) => {
                write!(f, "MCP {operation} is not implemented in this client")
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A filesystem operation the client can request from the CLI.
///
/// `Write` is part of the contract but deliberately unsupported here; the
/// exhaustive match in [`DxCli::fs`] keeps that decision explicit.
#[derive(Debug, Clone)]
pub enum FsOperation<'a> {
    Read(&'a str),
    Write { path: &'a str, content: &'a str },
    List(&'a str),
}

/// Client for the external `dx` CLI.
#[derive(Debug, Clone)]
pub struct DxCli {
    program: String,
    timeout: Duration,
}

impl Default for DxCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl DxCli {
    /// Create a client that invokes the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search documentation. Any JSON stdout is authoritative: its `results`
    /// array is returned, or an empty list when that key is absent. Only
    /// non-JSON stdout falls back to splitting into non-empty lines.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, ClientError> {
        let stdout = self
            .run("search", &["mcp", "search", query, "--format=json"])
            .await?;

        match serde_json::from_str::<Value>(&stdout) {
            Ok(value) => Ok(value
                .get("results")
                .and_then(Value::as_array)
                .map(|results| {
                    results
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()),
            Err(_) => Ok(non_empty_lines(&stdout)),
        }
    }

    /// Execute a SQL statement with no result set (INSERT, UPDATE, CREATE).
    pub async fn db_exec(&self, sql: &str) -> Result<(), ClientError> {
        self.run("database exec", &["mcp", "db", sql]).await?;
        Ok(())
    }

    /// Execute a SELECT query and return its rows. Falls back to one string
    /// row per non-empty stdout line when the output is not a JSON array.
    pub async fn db_query(&self, sql: &str) -> Result<Vec<Value>, ClientError> {
        let stdout = self.run("database query", &["mcp", "db", sql]).await?;
        match serde_json::from_str::<Vec<Value>>(&stdout) {
            Ok(rows) => Ok(rows),
            Err(_) => Ok(non_empty_lines(&stdout).into_iter().map(Value::String).collect()),
        }
    }

    /// Single-call database access kept for backward compatibility.
    #[deprecated(note = "use `db_exec` for statements and `db_query` for queries")]
    pub async fn db(&self, sql: &str) -> Result<Vec<Value>, ClientError> {
        self.db_query(sql).await
    }

    /// Run a filesystem operation and return the trimmed output.
    ///
    /// `Write` fails immediately with [`ClientError::Unsupported`].
    pub async fn fs(&self, operation: FsOperation<'_>) -> Result<String, ClientError> {
        let args: Vec<&str> = match operation {
            FsOperation::Read(path) => vec!["mcp", "fs", "read", path],
            FsOperation::Write { .. } => {
                return Err(ClientError::Unsupported("filesystem write"));
            }
            FsOperation::List(path) => vec!["mcp", "fs", "ls", path],
        };

        let stdout = self.run("filesystem operation", &args).await?;
        Ok(stdout.trim().to_string())
    }

    /// Spawn the CLI with piped capture of both streams and wait for exit,
    /// bounded by the configured timeout.
    async fn run(&self, operation: &'static str, args: &[&str]) -> Result<String, ClientError> {
        debug!("Invoking `{}` for {}: {:?}", self.program, operation, args);

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ClientError::TimedOut {
                operation,
                limit: self.timeout,
            })?
            .map_err(|source| ClientError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ClientError::NonZeroExit {
                operation,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Trim the output as a whole, then split it into non-empty lines.
/// Interior lines keep their own whitespace.
fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_write_is_unsupported() {
        let cli = DxCli::default();
        let err = cli
            .fs(FsOperation::Write {
                path: "out.txt",
                content: "data",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unsupported(_)));
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn non_empty_lines_drops_blanks() {
        assert_eq!(non_empty_lines("a\nb\nc\n"), vec!["a", "b", "c"]);
        assert_eq!(non_empty_lines("\n\n"), Vec::<String>::new());
        // Only the output as a whole is trimmed, so the leading blank line
        // disappears but a middle line would keep its padding.
        assert_eq!(non_empty_lines("  \n one \n"), vec!["one"]);
        assert_eq!(non_empty_lines("a\n b \nc"), vec!["a", " b ", "c"]);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Write an executable shell script standing in for the `dx` CLI.
        fn fake_cli(dir: &TempDir, body: &str) -> String {
            let path = dir.path().join("fake-dx");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_str().unwrap().to_string()
        }

        #[tokio::test]
        async fn search_parses_plain_lines() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "printf 'a\\nb\\nc\\n'"));

            let results = cli.search("anything").await.unwrap();
            assert_eq!(results, vec!["a", "b", "c"]);
        }

        #[tokio::test]
        async fn search_prefers_json_results() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(
                &dir,
                r#"printf '{"results": ["first", "second"]}'"#,
            ));

            let results = cli.search("anything").await.unwrap();
            assert_eq!(results, vec!["first", "second"]);
        }

        #[tokio::test]
        async fn search_treats_any_json_as_authoritative() {
            // JSON without a `results` array means no results, not a fall
            // back to line splitting.
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, r#"printf '["stray", "array"]'"#));
            assert_eq!(cli.search("anything").await.unwrap(), Vec::<String>::new());

            let cli = DxCli::new(fake_cli(&dir, r#"printf '{"count": 2}'"#));
            assert_eq!(cli.search("anything").await.unwrap(), Vec::<String>::new());
        }

        #[tokio::test]
        async fn search_failure_carries_stderr() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "printf 'boom' >&2\nexit 1"));

            let err = cli.search("anything").await.unwrap_err();
            assert!(matches!(
                err,
                ClientError::NonZeroExit { status: 1, .. }
            ));
            assert!(err.to_string().contains("boom"));
        }

        #[tokio::test]
        async fn db_query_parses_json_rows() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(
                &dir,
                r#"printf '[{"id": 1}, {"id": 2}]'"#,
            ));

            let rows = cli.db_query("SELECT * FROM t").await.unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0]["id"], 1);
        }

        #[tokio::test]
        async fn db_query_falls_back_to_string_rows() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "printf 'row1\\nrow2\\n'"));

            let rows = cli.db_query("SELECT * FROM t").await.unwrap();
            assert_eq!(rows, vec![Value::String("row1".into()), Value::String("row2".into())]);
        }

        #[tokio::test]
        async fn db_exec_succeeds_silently() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "exit 0"));
            cli.db_exec("CREATE TABLE t (id INT)").await.unwrap();
        }

        #[tokio::test]
        async fn fs_read_trims_output() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "printf 'contents\\n'"));

            let out = cli.fs(FsOperation::Read("some/file.txt")).await.unwrap();
            assert_eq!(out, "contents");
        }

        #[tokio::test]
        async fn hung_cli_times_out() {
            let dir = TempDir::new().unwrap();
            let cli = DxCli::new(fake_cli(&dir, "sleep 30"))
                .with_timeout(Duration::from_millis(100));

            let err = cli.search("anything").await.unwrap_err();
            assert!(matches!(err, ClientError::TimedOut { .. }));
        }

        #[tokio::test]
        async fn missing_program_is_a_spawn_error() {
            let cli = DxCli::new("/nonexistent/definitely-not-a-program");
            let err = cli.search("anything").await.unwrap_err();
            assert!(matches!(err, ClientError::Spawn { .. }));
        }
    }
}
