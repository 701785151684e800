//! Bounded execution of the control utility.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::RndcError;
use crate::collector::traits::CommandRunner;

/// How often the child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs real processes with stdout and stderr merged into one pipe.
///
/// Output is drained on a helper thread so a chatty child never blocks on a
/// full pipe; the child is killed when the timeout expires.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Kills the child and waits for it so no process outlives the pass.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill of pid {} failed: {}", child.id(), e);
    }
    let _ = child.wait();
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[&str], timeout: Duration) -> Result<String, RndcError> {
        let launch_error = |e: std::io::Error| RndcError::Launch {
            program: program.display().to_string(),
            reason: e.to_string(),
        };

        let (mut reader, writer) = std::io::pipe().map_err(launch_error)?;

        // The command owns the parent's copies of the write end; it must be
        // dropped right after spawning or the reader never sees EOF.
        let mut child = {
            let mut cmd = Command::new(program);
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(launch_error)?)
                .stderr(writer);
            cmd.spawn().map_err(launch_error)?
        };
        debug!("spawned {} (pid {})", program.display(), child.id());

        let (tx, rx) = flume::bounded(1);
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = reader.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("{} exited with {}", program.display(), status);
                    break;
                }
                Ok(None) if Instant::now() >= deadline => {
                    reap(&mut child);
                    return Err(RndcError::Timeout(timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    reap(&mut child);
                    return Err(RndcError::Io(e.to_string()));
                }
            }
        }

        // A grandchild may still hold the pipe open; do not wait past the deadline.
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining.max(POLL_INTERVAL)) {
            Ok(Ok(buf)) => Ok(String::from_utf8_lossy(&buf).into_owned()),
            Ok(Err(e)) => Err(RndcError::Io(e.to_string())),
            Err(_) => Err(RndcError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-rndc");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_merges_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "echo \"worker threads: 2\"\necho \"query logging is ON\" 1>&2");

        let output = ProcessRunner::new()
            .run(&path, &["status"], Duration::from_secs(5))
            .unwrap();
        assert!(output.contains("worker threads: 2"));
        assert!(output.contains("query logging is ON"));
    }

    #[test]
    fn test_passes_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "echo \"arg: $1\"");

        let output = ProcessRunner::new()
            .run(&path, &["status"], Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.trim_end(), "arg: status");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let err = ProcessRunner::new()
            .run(
                Path::new("/nonexistent/sbin/rndc"),
                &["status"],
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, RndcError::Launch { .. }));
    }

    #[test]
    fn test_hung_program_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 30");

        let start = Instant::now();
        let err = ProcessRunner::new()
            .run(&path, &["status"], Duration::from_millis(200))
            .unwrap_err();
        assert_eq!(err, RndcError::Timeout(Duration::from_millis(200)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_reap_kills_and_collects_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        reap(&mut child);

        let status = child.try_wait().unwrap().expect("child already reaped");
        assert!(!status.success());
    }
}
