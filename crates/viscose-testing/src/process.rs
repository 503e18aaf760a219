//! Background process management for long-running commands.
//!
//! Provides utilities for:
//! - Starting `viscose watch` in the background
//! - Reading its output line by line
//! - Capturing stderr so a chatty child never blocks on a full pipe
//! - Interrupting it the way Ctrl+C would

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A background process handle.
pub struct BackgroundProcess {
    child: Child,
    stderr: Arc<Mutex<String>>,
    stderr_reader: Option<JoinHandle<()>>,
}

impl BackgroundProcess {
    /// Spawn a new background process with piped stdout and stderr.
    ///
    /// Stderr is drained on a thread from the start; read it with
    /// [`BackgroundProcess::stderr_text`].
    pub fn spawn_piped(mut command: Command) -> std::io::Result<Self> {
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        let mut child = command.spawn()?;

        let stderr = Arc::new(Mutex::new(String::new()));
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            let sink = Arc::clone(&stderr);
            std::thread::spawn(move || {
                let mut chunk = [0u8; 4096];
                while let Ok(n) = pipe.read(&mut chunk) {
                    if n == 0 {
                        break;
                    }
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push_str(&String::from_utf8_lossy(&chunk[..n]));
                }
            })
        });

        Ok(Self {
            child,
            stderr,
            stderr_reader,
        })
    }

    /// Everything the process has written to stderr so far.
    pub fn stderr_text(&self) -> String {
        self.stderr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the process to exit, then return its complete stderr.
    pub fn finish_stderr(&mut self, timeout: Duration) -> std::io::Result<String> {
        self.wait_timeout(timeout)?;
        if let Some(reader) = self.stderr_reader.take() {
            let _ = reader.join();
        }
        Ok(self.stderr_text())
    }

    /// Move stdout to a reader thread and receive its lines on a channel.
    pub fn stdout_lines(&mut self) -> Option<Receiver<String>> {
        let stdout: ChildStdout = self.child.stdout.take()?;
        let (tx, rx) = channel();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Some(rx)
    }

    /// Wait for the process to exit with a timeout.
    pub fn wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        let start = Instant::now();
        loop {
            match self.child.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start.elapsed() > timeout {
                        return Ok(None);
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
            }
        }
    }

    /// Send SIGINT, as a terminal Ctrl+C would.
    #[cfg(unix)]
    pub fn interrupt(&self) -> std::io::Result<()> {
        let pid = libc::pid_t::try_from(self.child.id())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        // SAFETY: kill(2) with a pid we spawned and a valid signal number.
        let rc = unsafe { libc::kill(pid, libc::SIGINT) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

}

impl Drop for BackgroundProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Wait until a line satisfying `pred` arrives, up to `timeout`.
pub fn wait_for_line<F>(rx: &Receiver<String>, timeout: Duration, mut pred: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        match rx.recv_timeout(remaining) {
            Ok(line) if pred(&line) => return Some(line),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_large_stderr_does_not_block_the_child() {
        // Far more than a pipe buffer holds.
        let mut command = Command::new("sh");
        command.args(["-c", "i=0; while [ $i -lt 4000 ]; do echo 'warning: retrying sheet write' >&2; i=$((i+1)); done; echo done"]);
        let mut proc = BackgroundProcess::spawn_piped(command).unwrap();
        let lines = proc.stdout_lines().unwrap();

        let done = wait_for_line(&lines, Duration::from_secs(10), |l| l == "done");
        assert_eq!(done.as_deref(), Some("done"));

        let stderr = proc.finish_stderr(Duration::from_secs(5)).unwrap();
        assert_eq!(stderr.lines().count(), 4000);
    }
}
