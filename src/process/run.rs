use std::io::{BufRead, ErrorKind};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{CheckError, Result};

use super::types::{OutputLine, ToolCommand, ToolResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn a tool and return a channel that streams its output.
///
/// The caller receives [`OutputLine::Stdout`]/[`OutputLine::Stderr`] as they
/// arrive, followed by exactly one [`OutputLine::Done`] carrying the result.
/// A program that cannot be found maps to [`CheckError::ToolMissing`].
pub fn spawn(cmd: ToolCommand) -> Result<Receiver<OutputLine>> {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in &cmd.envs {
        command.env(key, value);
    }
    if let Some(dir) = &cmd.current_dir {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| spawn_error(&cmd.program, e))?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        return Err(CheckError::ToolFailed {
            tool: cmd.program,
            reason: "output pipes were not captured".into(),
        });
    };

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        supervise(child, stdout, stderr, tx, cmd.timeout);
    });

    Ok(rx)
}

/// Run a tool to completion, logging each output line at debug level.
pub fn run(cmd: ToolCommand) -> Result<ToolResult> {
    let program = cmd.program.clone();
    tracing::debug!("Running: {}", cmd.display());

    for line in spawn(cmd)? {
        match line {
            OutputLine::Stdout(l) | OutputLine::Stderr(l) => tracing::debug!("[{program}] {l}"),
            OutputLine::Done(result) => {
                if result.timed_out {
                    tracing::warn!("{program} timed out and was killed");
                }
                return Ok(result);
            }
        }
    }

    Err(CheckError::ToolFailed {
        tool: program,
        reason: "tool supervisor exited without a result".into(),
    })
}

fn spawn_error(program: &str, err: std::io::Error) -> CheckError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => CheckError::ToolMissing {
            tool: program.to_string(),
            reason: format!("could not start `{program}`: {err} (is it installed and on PATH?)"),
        },
        _ => CheckError::ToolFailed {
            tool: program.to_string(),
            reason: err.to_string(),
        },
    }
}

fn supervise(
    mut child: std::process::Child,
    stdout: std::process::ChildStdout,
    stderr: std::process::ChildStderr,
    tx: Sender<OutputLine>,
    timeout: Option<Duration>,
) {
    let log_buf = Arc::new(Mutex::new(String::new()));

    let stdout_handle = forward_lines(stdout, tx.clone(), log_buf.clone(), OutputLine::Stdout);
    let stderr_handle = forward_lines(stderr, tx.clone(), log_buf.clone(), OutputLine::Stderr);

    let start = Instant::now();
    let mut timed_out = false;

    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(_) => break None,
        }

        if let Some(limit) = timeout
            && start.elapsed() > limit
        {
            timed_out = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }

        std::thread::sleep(POLL_INTERVAL);
    };

    // A killed tool may leave grandchildren holding the pipes open.
    if !timed_out {
        let _ = stdout_handle.join();
        let _ = stderr_handle.join();
    }

    let exit_code = exit_status.and_then(|s| s.code());
    let log = log_buf.lock().map(|b| b.clone()).unwrap_or_default();

    let _ = tx.send(OutputLine::Done(ToolResult {
        success: exit_code == Some(0),
        exit_code,
        log,
        timed_out,
    }));
}

fn forward_lines<R>(
    reader: R,
    tx: Sender<OutputLine>,
    buf: Arc<Mutex<String>>,
    wrap: fn(String) -> OutputLine,
) -> std::thread::JoinHandle<()>
where
    R: std::io::Read + Send + 'static,
{
    std::thread::spawn(move || {
        let reader = std::io::BufReader::new(reader);
        for line in reader.lines() {
            let Ok(l) = line else { break };
            if let Ok(mut buf) = buf.lock() {
                buf.push_str(&l);
                buf.push('\n');
            }
            // Receiver may be gone; output is still kept in the buffer.
            let _ = tx.send(wrap(l));
        }
    })
}
