use crate::model::TopicNode;
use regex::Regex;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Error, Debug)]
pub enum ReorganizeError {
    #[error("No reorganize command configured")]
    NotConfigured,
    #[error("Failed to run reorganize command: {0}")]
    Spawn(#[from] io::Error),
    #[error("Reorganize command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Reorganize command timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Reorganize command did not print a JSON object")]
    NoJson,
    #[error("Reorganize command printed invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An opaque transform proposing a replacement tree that files the pending
/// ideas into the current one. Runs off the UI thread, hence `Send`.
pub trait Reorganizer: Send {
    fn transform(&mut self, tree: &TopicNode, ideas: &[String])
        -> Result<TopicNode, ReorganizeError>;
}

#[derive(Serialize)]
struct Request<'a> {
    map: &'a TopicNode,
    ideas: &'a [String],
}

/// Runs a shell command, feeding `{"map": ..., "ideas": [...]}` on stdin and
/// taking the first `{...}` span of its stdout as the new tree. Text around
/// the object (as chat-style tools tend to print) is ignored.
///
/// Stdin is written and stdout/stderr are drained on their own threads, so
/// commands that stream their output never deadlock on a full pipe. A
/// command still running after `timeout` is killed.
#[derive(Debug, Clone)]
pub struct CommandReorganizer {
    command: Option<String>,
    timeout: Duration,
}

impl CommandReorganizer {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }
}

impl Reorganizer for CommandReorganizer {
    fn transform(
        &mut self,
        tree: &TopicNode,
        ideas: &[String],
    ) -> Result<TopicNode, ReorganizeError> {
        let command = self.command.as_deref().ok_or(ReorganizeError::NotConfigured)?;
        let request = serde_json::to_vec(&Request { map: tree, ideas })?;

        let mut child = shell(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let writer = child.stdin.take().map(|stdin| feed(stdin, request));
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match wait_with_timeout(&mut child, self.timeout)? {
            Some(status) => status,
            None => {
                tracing::warn!(command, timeout = ?self.timeout, "reorganize command timed out");
                return Err(ReorganizeError::TimedOut(self.timeout));
            }
        };

        if let Some(writer) = writer {
            match join(writer)? {
                // The command may answer without reading its input.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            return Err(ReorganizeError::Failed {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&stdout);
        tracing::debug!(bytes = stdout.len(), "reorganize command answered");
        parse_response(&stdout)
    }
}

fn feed(mut stdin: ChildStdin, request: Vec<u8>) -> JoinHandle<io::Result<()>> {
    // Dropping stdin at the end closes the pipe so the command sees EOF.
    thread::spawn(move || stdin.write_all(&request))
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> Result<io::Result<T>, ReorganizeError> {
    handle
        .join()
        .map_err(|_| ReorganizeError::Spawn(io::Error::other("reorganize pipe thread panicked")))
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, ReorganizeError> {
    match handle {
        Some(handle) => Ok(join(handle)??),
        None => Ok(Vec::new()),
    }
}

/// Waits for `child` to exit. `None` means it was still running at the
/// deadline and has been killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Extracts the outermost JSON object from free-form output.
pub fn parse_response(output: &str) -> Result<TopicNode, ReorganizeError> {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    let object = OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    let found = object.find(output).ok_or(ReorganizeError::NoJson)?;
    Ok(serde_json::from_str(found.as_str())?)
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
