//! External command execution with captured output.
//!
//! The calling thread waits on the child and collects its output. Both pipes
//! are drained on helper threads and handed back over channels, so neither
//! can fill up and stall the child, and a descendant that keeps a pipe open
//! cannot hold the caller past the deadline.

use crate::result::{ProbeError, ProbeResult};
use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often the child is polled for exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time the pipes get to reach end-of-file once the child has exited
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the child was ended by a signal
    pub status: Option<i32>,
    /// Everything written to stdout
    pub stdout: String,
    /// Everything written to stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Exit code 0
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

fn command_line<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

// Reader threads are detached: they end when the last writer closes the pipe.
fn spawn_stdout_reader(child: &mut Child) -> mpsc::Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    match child.stdout.take() {
        Some(mut pipe) => {
            let _ = thread::spawn(move || {
                let mut out = Vec::new();
                let _ = tx.send(pipe.read_to_end(&mut out).map(|_| out));
            });
        }
        None => {
            let _ = tx.send(Ok(Vec::new()));
        }
    }
    rx
}

fn spawn_stderr_reader(child: &mut Child) -> Option<mpsc::Receiver<String>> {
    let stderr = child.stderr.take()?;
    let (tx, rx) = mpsc::channel();
    let _ = thread::spawn(move || {
        let mut reader = BufReader::new(stderr);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(String::from_utf8_lossy(&line).into_owned()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    Some(rx)
}

fn timed_out(command: String, timeout: Duration) -> ProbeError {
    ProbeError::Command {
        command,
        message: format!("timed out after {:.3}s", timeout.as_secs_f64()),
    }
}

/// Run `program` with `args`, killing it if it is still running after
/// `timeout`.
///
/// The call returns within `timeout` plus a short grace for the pipes to
/// close, even when the child leaves descendants holding them open.
///
/// # Errors
///
/// [`ProbeError::Command`] when the program cannot be started, is killed on
/// timeout, or its output is still open when the time runs out;
/// [`ProbeError::Io`] when its output cannot be read.
pub fn run_command<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> ProbeResult<CommandOutput> {
    let line = command_line(program, args);
    debug!(command = %line, timeout_ms = timeout.as_millis() as u64, "spawning");
    let start = Instant::now();
    let deadline = start + timeout;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProbeError::Command {
            command: line.clone(),
            message: e.to_string(),
        })?;

    let stdout_rx = spawn_stdout_reader(&mut child);
    let stderr_rx = spawn_stderr_reader(&mut child);

    let status = loop {
        let now = Instant::now();
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if now >= deadline => {
                if let Err(e) = child.kill() {
                    warn!(error = %e, "could not kill timed out command");
                }
                let _ = child.wait();
                warn!(command = %line, "killed after timeout");
                return Err(timed_out(line, timeout));
            }
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL.min(deadline - now)),
            Err(e) => {
                let _ = child.kill();
                return Err(e.into());
            }
        }
    };

    let output_deadline = deadline.max(Instant::now() + OUTPUT_GRACE);
    let remaining = || output_deadline.saturating_duration_since(Instant::now());
    let out = match stdout_rx.recv_timeout(remaining()) {
        Ok(read) => read?,
        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
            warn!(command = %line, "stdout still open after exit");
            return Err(timed_out(line, timeout));
        }
    };

    let mut err = String::new();
    if let Some(rx) = stderr_rx {
        loop {
            match rx.recv_timeout(remaining()) {
                Ok(chunk) => err.push_str(&chunk),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(command = %line, "stderr still open after exit, keeping partial output");
                    break;
                }
            }
        }
    }

    debug!(
        command = %line,
        status = ?status.code(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "finished"
    );
    Ok(CommandOutput {
        status: status.code(),
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: err,
    })
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;

    #[test]
    fn test_captures_both_streams_and_status() {
        let output = run_command(
            "sh",
            &["-c", "echo out; echo err1 >&2; echo err2 >&2; exit 3"],
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err1\nerr2\n");
    }

    #[test]
    fn test_large_stderr_does_not_block() {
        let output = run_command(
            "sh",
            &["-c", "i=0; while [ $i -lt 20000 ]; do echo line$i >&2; i=$((i+1)); done; echo done"],
            Duration::from_secs(30),
        )
        .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "done\n");
        assert_eq!(output.stderr.lines().count(), 20000);
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = run_command("sleep", &["5"], Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Command);
        assert!(err.to_string().contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_not_held_by_forked_child() {
        // `sleep` is forked, not exec'd, and keeps both pipes after the
        // shell is killed.
        let start = Instant::now();
        let err = run_command("sh", &["-c", "sleep 4; echo x"], Duration::from_millis(200))
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_background_child_holding_stdout_is_bounded() {
        let start = Instant::now();
        let err = run_command("sh", &["-c", "sleep 4 & echo started"], Duration::from_millis(300))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Command);
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_missing_program() {
        let err = run_command("definitely-not-a-program-xyz", &[] as &[&str], Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Command);
    }
}
