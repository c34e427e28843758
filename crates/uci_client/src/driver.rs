//! The engine driver
//!
//! [`UciEngine`] owns the engine child process and mediates
//! command/response over its stdin/stdout pipes.
//!
//! # Single-flight request protocol
//!
//! Every request takes the send lock (a `tokio::sync::Mutex` that also
//! owns the stdin handle and the receive buffer) for its whole
//! duration, so commands leave the driver in program order. Under the
//! lock a request first drains stale lines left over from its
//! predecessor, installs the completion token, the expected sentinel
//! and a one-shot channel, guarded by a separate short-held lock -
//! writes the command, and races the one-shot against the deadline.
//! The token is cleared and the lock released on every exit path.
//!
//! # Line ingestion
//!
//! Background tasks read stdout and stderr line by line. Each trimmed
//! line is enqueued into an unbounded MPSC buffer and then compared
//! against the pending sentinel: a case-insensitive equality or prefix
//! match completes the one-shot with that line. Completion is
//! idempotent, the one-shot sender is `take()`n, so the first writer
//! wins and stale lines cannot complete a later request's token.
//!
//! When stdout reaches end-of-file the process is gone: any pending
//! wait resolves as "no result" so callers never hang on a dead
//! engine.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::best_move::{parse_bestmove, parse_info_score, BestMove, Score};
use crate::error::{EngineError, EngineResult};
use crate::options::{OptionValue, UciOption};

/// Extra slack on top of `movetime` before a `go` request is declared
/// timed out; the engine legitimately uses the whole movetime budget.
const GO_DEADLINE_GRACE_MS: u64 = 1000;

/// How long `stop` waits for a voluntary exit before killing.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Engine process and request configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub executable: PathBuf,
    /// Thinking budget per `go movetime` request, in milliseconds.
    pub movetime_ms: u64,
    /// Deadline for handshake sentinels (`uciok`, `readyok`).
    pub handshake_timeout_ms: u64,
}

impl EngineConfig {
    pub fn new(executable: impl Into<PathBuf>) -> EngineConfig {
        EngineConfig {
            executable: executable.into(),
            movetime_ms: 2000,
            handshake_timeout_ms: 5000,
        }
    }
}

/// Driver lifecycle, coarse-grained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Spawning,
    Handshaking,
    Ready,
    Working,
    Quitting,
    Terminated,
}

/// Expected completion line for a pending request.
#[derive(Clone, Debug)]
enum Sentinel {
    /// Case-insensitive full-line match (`uciok`, `readyok`).
    Exact(&'static str),
    /// Case-insensitive prefix match (`bestmove …`).
    Prefix(&'static str),
}

impl Sentinel {
    fn matches(&self, line: &str) -> bool {
        match self {
            Sentinel::Exact(expected) => line.eq_ignore_ascii_case(expected),
            Sentinel::Prefix(expected) => {
                line.to_ascii_lowercase().starts_with(expected)
            }
        }
    }
}

/// The completion token: three fields behind one short-held lock.
///
/// The wait itself never holds this lock; it is taken only to install,
/// complete, or clear the token.
struct WaitState {
    sentinel: Option<Sentinel>,
    done: Option<oneshot::Sender<Option<String>>>,
    generation: u64,
}

/// What the send lock owns: the write end and the receive buffer.
struct Pipe {
    stdin: ChildStdin,
    lines: mpsc::UnboundedReceiver<String>,
}

/// A completed sentinel exchange: the matching line plus everything
/// buffered before (and including) it.
struct Reply {
    matched: String,
    lines: Vec<String>,
}

/// Parsed `id name` / `id author` handshake lines.
#[derive(Default)]
struct Identity {
    name: String,
    author: String,
}

/// Asynchronous client for one engine process.
pub struct UciEngine {
    config: EngineConfig,
    /// Send lock; held across send + wait, serializing all requests.
    pipe: Mutex<Option<Pipe>>,
    wait: Arc<StdMutex<WaitState>>,
    state: Arc<StdMutex<DriverState>>,
    /// Owned child handle, disposed exactly once in `stop`.
    child: StdMutex<Option<Child>>,
    identity: StdMutex<Identity>,
    options: StdMutex<Vec<UciOption>>,
}

impl UciEngine {
    pub fn new(config: EngineConfig) -> UciEngine {
        UciEngine {
            config,
            pipe: Mutex::new(None),
            wait: Arc::new(StdMutex::new(WaitState {
                sentinel: None,
                done: None,
                generation: 0,
            })),
            state: Arc::new(StdMutex::new(DriverState::Idle)),
            child: StdMutex::new(None),
            identity: StdMutex::new(Identity::default()),
            options: StdMutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        *self.state.lock().unwrap()
    }

    /// Engine name from `id name …`; empty until the handshake ran.
    pub fn name(&self) -> String {
        self.identity.lock().unwrap().name.clone()
    }

    /// Engine author from `id author …`; empty until the handshake ran.
    pub fn author(&self) -> String {
        self.identity.lock().unwrap().author.clone()
    }

    /// The option schema advertised during the handshake.
    pub fn options(&self) -> Vec<UciOption> {
        self.options.lock().unwrap().clone()
    }

    /// Spawn the engine and complete the UCI handshake.
    ///
    /// Sends `uci`, waits for `uciok` while harvesting `id` and
    /// `option` lines, then `ucinewgame` + `isready` and waits for
    /// `readyok`. Fails if the executable is missing, the spawn fails,
    /// or either sentinel times out; on failure the process is torn
    /// down again.
    pub async fn start(&self) -> EngineResult<()> {
        if self.pipe.lock().await.is_some() {
            return Err(EngineError::Unavailable {
                reason: "engine already running".to_string(),
            });
        }
        self.set_state(DriverState::Spawning);

        if let Err(err) = std::fs::metadata(&self.config.executable) {
            self.set_state(DriverState::Idle);
            return Err(EngineError::Unavailable {
                reason: format!("{}: {err}", self.config.executable.display()),
            });
        }

        let mut child = Command::new(&self.config.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                self.set_state(DriverState::Idle);
                EngineError::Unavailable {
                    reason: format!("failed to spawn {}: {err}", self.config.executable.display()),
                }
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(EngineError::NotRunning)?;
        let stderr = child.stderr.take().ok_or(EngineError::NotRunning)?;

        let (line_tx, line_rx) = mpsc::unbounded_channel();

        // stdout feeds the receive buffer and detects process exit.
        spawn_reader(stdout, line_tx.clone(), Arc::clone(&self.wait), Some(Arc::clone(&self.state)));
        // stderr lines are buffered the same way; engines log there.
        spawn_reader(stderr, line_tx, Arc::clone(&self.wait), None);

        *self.child.lock().unwrap() = Some(child);
        *self.pipe.lock().await = Some(Pipe {
            stdin,
            lines: line_rx,
        });

        self.set_state(DriverState::Handshaking);
        let handshake = Duration::from_millis(self.config.handshake_timeout_ms);

        let reply = match self.send_and_wait("uci", Sentinel::Exact("uciok"), handshake).await {
            Ok(reply) => reply,
            Err(err) => {
                self.stop().await;
                return Err(err);
            }
        };
        self.harvest_handshake(&reply);

        if let Err(err) = self.send_command("ucinewgame").await {
            self.stop().await;
            return Err(err);
        }
        if let Err(err) = self
            .send_and_wait("isready", Sentinel::Exact("readyok"), handshake)
            .await
        {
            self.stop().await;
            return Err(err);
        }

        self.set_state(DriverState::Ready);
        info!(
            engine = %self.name(),
            options = self.options.lock().unwrap().len(),
            "engine handshake complete"
        );
        Ok(())
    }

    /// Best-effort shutdown: `quit`, close stdin, give the process one
    /// second to leave, then kill it. Always releases the child handle.
    pub async fn stop(&self) {
        self.set_state(DriverState::Quitting);

        {
            let mut guard = self.pipe.lock().await;
            if let Some(pipe) = guard.as_mut() {
                let _ = pipe.stdin.write_all(b"quit\n").await;
                let _ = pipe.stdin.flush().await;
            }
            // Dropping the pipe closes the engine's stdin.
            *guard = None;
        }

        let child = self.child.lock().unwrap().take();
        if let Some(mut child) = child {
            match timeout(QUIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!(?status, "engine exited"),
                Ok(Err(err)) => warn!(%err, "waiting for engine exit failed"),
                Err(_) => {
                    warn!("engine ignored quit, killing");
                    let _ = child.kill().await;
                }
            }
        }

        complete_pending(&self.wait, None);
        self.set_state(DriverState::Terminated);
    }

    /// Send `setoption` for a named option.
    ///
    /// Buttons are sent without a value; everything else as
    /// `setoption name <N> value <V>`. When a descriptor with that name
    /// exists, its current value is updated locally.
    pub async fn set_option(&self, name: &str, value: &str) -> EngineResult<()> {
        let is_button = self
            .options
            .lock()
            .unwrap()
            .iter()
            .any(|option| {
                option.name.eq_ignore_ascii_case(name)
                    && matches!(option.value, OptionValue::Button { .. })
            });

        let command = if is_button {
            format!("setoption name {name}")
        } else {
            format!("setoption name {name} value {value}")
        };
        self.send_command(&command).await?;

        let mut options = self.options.lock().unwrap();
        if let Some(option) = options
            .iter_mut()
            .find(|option| option.name.eq_ignore_ascii_case(name))
        {
            option.record_current(value);
        }
        Ok(())
    }

    /// `ucinewgame` followed by an `isready`/`readyok` barrier.
    pub async fn new_game(&self) -> EngineResult<()> {
        self.send_command("ucinewgame").await?;
        let handshake = Duration::from_millis(self.config.handshake_timeout_ms);
        self.send_and_wait("isready", Sentinel::Exact("readyok"), handshake)
            .await?;
        Ok(())
    }

    /// `position fen <F>`. No sentinel follows.
    pub async fn position_from_fen(&self, fen: &str) -> EngineResult<()> {
        self.send_command(&format!("position fen {fen}")).await
    }

    /// `position startpos [moves m1 m2 …]`. No sentinel follows.
    pub async fn position_from_moves(&self, moves: &[String]) -> EngineResult<()> {
        let command = if moves.is_empty() {
            "position startpos".to_string()
        } else {
            format!("position startpos moves {}", moves.join(" "))
        };
        self.send_command(&command).await
    }

    /// `debug on|off`.
    pub async fn set_debug(&self, on: bool) -> EngineResult<()> {
        self.send_command(if on { "debug on" } else { "debug off" })
            .await
    }

    /// Ask for the engine's move: `go movetime <T>`, completed by the
    /// `bestmove` prefix sentinel.
    ///
    /// The buffered `info …` lines are scanned for the last
    /// `score cp <n>` / `score mate <n>` pair on the way.
    pub async fn best_move(&self) -> EngineResult<BestMove> {
        if self.state() == DriverState::Ready {
            self.set_state(DriverState::Working);
        }
        let deadline = Duration::from_millis(self.config.movetime_ms + GO_DEADLINE_GRACE_MS);
        let command = format!("go movetime {}", self.config.movetime_ms);

        let outcome = self
            .send_and_wait(&command, Sentinel::Prefix("bestmove"), deadline)
            .await;
        if self.state() == DriverState::Working {
            self.set_state(DriverState::Ready);
        }
        let reply = outcome?;

        let (uci, ponder) = parse_bestmove(&reply.matched).ok_or(EngineError::Protocol {
            line: reply.matched.clone(),
        })?;

        let mut score: Option<Score> = None;
        for line in &reply.lines {
            if let Some(parsed) = parse_info_score(line) {
                score = Some(parsed);
            }
        }

        debug!(%uci, ?score, "engine best move");
        Ok(BestMove { uci, ponder, score })
    }

    fn set_state(&self, state: DriverState) {
        *self.state.lock().unwrap() = state;
    }

    fn harvest_handshake(&self, reply: &Reply) {
        let mut identity = self.identity.lock().unwrap();
        let mut options = self.options.lock().unwrap();
        options.clear();

        for line in &reply.lines {
            if let Some(name) = line.strip_prefix("id name ") {
                identity.name = name.trim().to_string();
            } else if let Some(author) = line.strip_prefix("id author ") {
                identity.author = author.trim().to_string();
            } else if line.starts_with("option ") {
                options.push(UciOption::parse(line));
            }
        }
    }

    /// Fire-and-forget command: drain stale lines, write, flush.
    async fn send_command(&self, command: &str) -> EngineResult<()> {
        let mut guard = self.pipe.lock().await;
        let pipe = guard.as_mut().ok_or(EngineError::NotRunning)?;
        drain(&mut pipe.lines);
        write_line(&mut pipe.stdin, command).await
    }

    /// Sentinel exchange under the send lock.
    async fn send_and_wait(
        &self,
        command: &str,
        sentinel: Sentinel,
        deadline: Duration,
    ) -> EngineResult<Reply> {
        // The guard is held until this function returns, so the whole
        // exchange is serialized and the lock is released on every
        // path.
        let mut guard = self.pipe.lock().await;
        let pipe = guard.as_mut().ok_or(EngineError::NotRunning)?;

        // Stale lines belong to a previous request.
        drain(&mut pipe.lines);

        let done = self.install_wait(sentinel);
        if let Err(err) = write_line(&mut pipe.stdin, command).await {
            self.clear_wait();
            return Err(err);
        }

        let outcome = timeout(deadline, done).await;
        self.clear_wait();

        match outcome {
            Err(_) => Err(EngineError::Timeout {
                command: command.to_string(),
                timeout_ms: deadline.as_millis() as u64,
            }),
            Ok(Err(_)) | Ok(Ok(None)) => Err(EngineError::Exited),
            Ok(Ok(Some(matched))) => Ok(Reply {
                matched,
                lines: drain(&mut pipe.lines),
            }),
        }
    }

    fn install_wait(&self, sentinel: Sentinel) -> oneshot::Receiver<Option<String>> {
        let (tx, rx) = oneshot::channel();
        let mut wait = self.wait.lock().unwrap();
        wait.generation += 1;
        debug!(generation = wait.generation, ?sentinel, "await sentinel");
        wait.sentinel = Some(sentinel);
        wait.done = Some(tx);
        rx
    }

    fn clear_wait(&self) {
        let mut wait = self.wait.lock().unwrap();
        wait.sentinel = None;
        wait.done = None;
    }
}

/// Append every trimmed line of `stream` to the receive buffer, then
/// test it against the pending sentinel. The task owning stdout also
/// resolves a pending wait and marks the driver terminated when the
/// stream ends, the process is gone at that point.
fn spawn_reader<R>(
    stream: R,
    queue: mpsc::UnboundedSender<String>,
    wait: Arc<StdMutex<WaitState>>,
    exit_state: Option<Arc<StdMutex<DriverState>>>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(raw)) => {
                    let line = raw.trim();
                    if line.is_empty() {
                        continue;
                    }
                    deliver(&queue, &wait, line.to_string());
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(%err, "engine pipe read failed");
                    break;
                }
            }
        }

        if let Some(state) = exit_state {
            debug!("engine stdout closed");
            *state.lock().unwrap() = DriverState::Terminated;
            complete_pending(&wait, None);
        }
    });
}

/// Enqueue a line, then complete the pending wait if it matches the
/// installed sentinel. Enqueue happens first so the matched line is
/// also visible in the buffer a request drains afterwards.
fn deliver(queue: &mpsc::UnboundedSender<String>, wait: &Arc<StdMutex<WaitState>>, line: String) {
    debug!(line = %line, "engine says");
    let _ = queue.send(line.clone());

    let mut wait = wait.lock().unwrap();
    let matched = wait
        .sentinel
        .as_ref()
        .map(|sentinel| sentinel.matches(&line))
        .unwrap_or(false);
    if matched {
        wait.sentinel = None;
        if let Some(done) = wait.done.take() {
            let _ = done.send(Some(line));
        }
    }
}

/// Resolve a pending wait as "no result". First writer wins; calling
/// this with nothing pending is a no-op.
fn complete_pending(wait: &Arc<StdMutex<WaitState>>, result: Option<String>) {
    let mut wait = wait.lock().unwrap();
    wait.sentinel = None;
    if let Some(done) = wait.done.take() {
        let _ = done.send(result);
    }
}

async fn write_line(stdin: &mut ChildStdin, command: &str) -> EngineResult<()> {
    debug!(%command, "send");
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

fn drain(lines: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut drained = Vec::new();
    while let Ok(line) = lines.try_recv() {
        drained.push(line);
    }
    drained
}
