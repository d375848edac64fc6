//! Shell command execution.
//!
//! Deployment actions and probes shell out to the user's own tooling
//! (deploy scripts, `forge`/`cast` invocations, anything executable). This
//! module runs those commands with captured output, a merged environment,
//! and an enforced wall-clock deadline.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{ConvoyError, Result};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or deadline).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed at its deadline.
    pub timed_out: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Wall-clock deadline (None = no deadline).
    pub timeout: Option<Duration>,
}

/// How often the deadline loop polls a running child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Execute a shell command, capturing output.
///
/// When a deadline is set and exceeded, the child is killed and the result
/// comes back with `timed_out = true` and `success = false`; the caller
/// decides how to surface that (the step runner maps it to a timeout
/// failure, never to "already applied").
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(shell_program());
    cmd.arg(shell_flag());
    cmd.arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| ConvoyError::Execution {
        step: command.to_string(),
        message: format!("failed to spawn: {}", e),
    })?;

    // Drain pipes on reader threads so a chatty child can't deadlock
    // against a full pipe buffer while we poll for the deadline.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_handle = thread::spawn(move || read_to_string_lossy(stdout_pipe));
    let stderr_handle = thread::spawn(move || read_to_string_lossy(stderr_pipe));

    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if let Some(deadline) = options.timeout {
            if start.elapsed() >= deadline {
                timed_out = true;
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    let duration = start.elapsed();

    let exit_code = status.and_then(|s| s.code());
    let success = status.map(|s| s.success()).unwrap_or(false) && !timed_out;

    Ok(CommandResult {
        exit_code,
        stdout,
        stderr,
        duration,
        success,
        timed_out,
    })
}

fn read_to_string_lossy(pipe: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn shell_program() -> &'static str {
    if cfg!(target_os = "windows") {
        "cmd"
    } else {
        "sh"
    }
}

fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn execute_captures_stdout() {
        let result = execute("echo hello", &CommandOptions::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
        assert!(!result.timed_out);
    }

    #[test]
    fn execute_reports_failure_exit_code() {
        let result = execute("exit 3", &CommandOptions::default()).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    #[cfg(unix)]
    fn execute_captures_stderr() {
        let result = execute("echo oops >&2", &CommandOptions::default()).unwrap();
        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn execute_merges_env() {
        let mut env = HashMap::new();
        env.insert("CONVOY_TEST_VAR".to_string(), "shell_value".to_string());

        let options = CommandOptions {
            env,
            ..Default::default()
        };
        let result = execute(
            if cfg!(target_os = "windows") {
                "echo %CONVOY_TEST_VAR%"
            } else {
                "echo $CONVOY_TEST_VAR"
            },
            &options,
        )
        .unwrap();
        assert!(result.stdout.contains("shell_value"));
    }

    #[test]
    fn execute_runs_in_cwd() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();

        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let result = execute(
            if cfg!(target_os = "windows") {
                "if exist marker.txt (exit 0) else (exit 1)"
            } else {
                "test -f marker.txt"
            },
            &options,
        )
        .unwrap();
        assert!(result.success);
    }

    #[test]
    #[cfg(unix)]
    fn execute_kills_at_deadline() {
        let options = CommandOptions {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let start = Instant::now();
        let result = execute("sleep 30", &options).unwrap();

        assert!(result.timed_out);
        assert!(!result.success);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

}
