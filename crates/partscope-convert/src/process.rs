//! Running external converters with a deadline.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How an external process ended.
#[derive(Debug)]
pub(crate) struct Finished {
    /// `None` when the process was killed at the deadline.
    pub status: Option<ExitStatus>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl Finished {
    /// Last non-blank line of output, for diagnostics.
    pub fn last_line(&self) -> Option<&str> {
        self.output.lines().rev().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Spawn `command` and wait for it, killing it once `timeout` elapses.
///
/// Output is captured in an anonymous temp file so a chatty child cannot
/// block on a full pipe while we poll.
pub(crate) fn run_with_timeout(command: &mut Command, timeout: Duration) -> io::Result<Finished> {
    let mut log: File = tempfile::tempfile()?;
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(log.try_clone()?))
        .stderr(Stdio::from(log.try_clone()?))
        .spawn()?;

    let start = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break Some(status),
            None => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    debug!(pid = child.id(), ?timeout, "killing converter at deadline");
                    if let Err(e) = child.kill() {
                        debug!(error = %e, "kill failed, process may have just exited");
                    }
                    child.wait()?;
                    break None;
                }
                thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
            }
        }
    };

    log.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    log.read_to_end(&mut bytes)?;
    Ok(Finished {
        status,
        output: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
