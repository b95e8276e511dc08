//! Script-mode evaluation.
//!
//! In script mode the console hands raw lines to a [`ScriptEvaluator`]. The
//! evaluator decides when a construct is complete; while one is open, the
//! console routes every line to it, keywords included.

use crate::session::PID_ENV;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while evaluating a complete script chunk.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("cannot start interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script exited with status {0}")]
    Status(i32),

    #[error("script terminated by signal")]
    Killed,

    #[error("interpreter exited; its state was lost")]
    Exited,

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Evaluates script-mode input one line at a time.
pub trait ScriptEvaluator {
    /// Feeds one raw line. Returns `true` when more lines are needed to
    /// complete the current construct.
    fn push(&mut self, line: &str, out: &mut dyn Write) -> Result<bool, ScriptError>;

    /// Whether a construct is open.
    fn is_pending(&self) -> bool;

    /// Discards any partially entered construct.
    fn reset(&mut self);
}

/// Lines of the construct being entered.
#[derive(Debug, Clone, Default)]
struct ChunkBuffer {
    lines: Vec<String>,
}

impl ChunkBuffer {
    /// Adds a line. Returns the whole chunk once the construct closes.
    /// A blank line with nothing buffered is dropped.
    fn push(&mut self, line: &str) -> Option<String> {
        if self.lines.is_empty() && line.trim().is_empty() {
            return None;
        }
        self.lines.push(line.to_string());
        if needs_more(&self.lines) {
            return None;
        }
        let chunk = self.lines.join("\n");
        self.lines.clear();
        Some(chunk)
    }

    fn is_pending(&self) -> bool {
        !self.lines.is_empty()
    }

    fn clear(&mut self) {
        if !self.lines.is_empty() {
            debug!("Discarding {} buffered script line(s)", self.lines.len());
        }
        self.lines.clear();
    }
}

/// Runs complete chunks through an external interpreter, one process each.
///
/// A chunk stays open while its last line ends in a backslash, while
/// brackets are unbalanced, or, for blocks introduced by a line ending in
/// `:`, until a blank line. Each closed chunk is passed as the final
/// argument to the interpreter.
#[derive(Debug, Clone)]
pub struct ExternalEvaluator {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    buffer: ChunkBuffer,
}

impl ExternalEvaluator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
            buffer: ChunkBuffer::default(),
        }
    }

    /// Exposes the attached process id to scripts.
    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        if let Some(pid) = pid {
            self.env.push((PID_ENV.to_string(), pid.to_string()));
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn evaluate(&self, chunk: &str, out: &mut dyn Write) -> Result<(), ScriptError> {
        debug!("Evaluating {} byte chunk with {}", chunk.len(), self.program);
        let output = Process::new(&self.program)
            .args(&self.args)
            .arg(chunk)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|source| ScriptError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        out.write_all(&output.stdout)?;
        out.write_all(&output.stderr)?;
        out.flush()?;

        if output.status.success() {
            return Ok(());
        }
        info!("Interpreter exited with {}", output.status);
        match output.status.code() {
            Some(code) => Err(ScriptError::Status(code)),
            None => Err(ScriptError::Killed),
        }
    }
}

impl Default for ExternalEvaluator {
    fn default() -> Self {
        Self::new("python3", vec!["-c".to_string()])
    }
}

impl ScriptEvaluator for ExternalEvaluator {
    fn push(&mut self, line: &str, out: &mut dyn Write) -> Result<bool, ScriptError> {
        match self.buffer.push(line) {
            Some(chunk) => self.evaluate(&chunk, out).map(|()| false),
            None => Ok(self.buffer.is_pending()),
        }
    }

    fn is_pending(&self) -> bool {
        self.buffer.is_pending()
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Ends each chunk's output on the interpreter's stdout, followed by ` 0`
/// or ` 1` (whether the chunk raised).
const CHUNK_DONE: &str = "\x1edbgsh-chunk-done";

/// Reads length-prefixed chunks from stdin and runs them in one
/// `InteractiveConsole`, so names persist between chunks. Errors are
/// written to stdout to keep them in order with regular output. Ctrl-C is
/// ignored between chunks and raises `KeyboardInterrupt` inside one.
const PYTHON_DRIVER: &str = r#"
import code, signal, sys

class Console(code.InteractiveConsole):
    raised = False

    def write(self, data):
        self.raised = True
        sys.stdout.write(data)

marker = sys.argv[1]
sys.stderr = sys.stdout
console = Console({"__name__": "__console__", "__doc__": None})
stdin = sys.stdin.buffer
while True:
    signal.signal(signal.SIGINT, signal.SIG_IGN)
    header = stdin.readline()
    if not header:
        break
    source = stdin.read(int(header)).decode("utf-8", "replace")
    signal.signal(signal.SIGINT, signal.default_int_handler)
    console.raised = False
    console.runsource(source, "<console>", "exec")
    sys.stdout.write("%s %d\n" % (marker, 1 if console.raised else 0))
    sys.stdout.flush()
"#;

/// A running driver process.
#[derive(Debug)]
struct Interpreter {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Interpreter {
    fn spawn(program: &str, env: &[(String, String)]) -> Result<Self, ScriptError> {
        let spawn_err = |source| ScriptError::Spawn {
            program: program.to_string(),
            source,
        };
        let mut child = Process::new(program)
            .arg("-u")
            .arg("-c")
            .arg(PYTHON_DRIVER)
            .arg(CHUNK_DONE)
            .envs(env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let pipe_err = |what: &str| {
            spawn_err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("no {what} pipe"),
            ))
        };
        let stdin = child.stdin.take().ok_or_else(|| pipe_err("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| pipe_err("stdout"))?;
        info!("Started {program} (pid {})", child.id());
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Sends one chunk and copies its output to `out` until the chunk marker.
    fn run(&mut self, chunk: &str, out: &mut dyn Write) -> Result<(), ScriptError> {
        writeln!(self.stdin, "{}", chunk.len())?;
        self.stdin.write_all(chunk.as_bytes())?;
        self.stdin.flush()?;

        let marker = CHUNK_DONE.as_bytes();
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stdout.read_until(b'\n', &mut line)? == 0 {
                out.flush()?;
                return Err(ScriptError::Exited);
            }
            let Some(pos) = line.windows(marker.len()).position(|w| w == marker) else {
                out.write_all(&line)?;
                continue;
            };
            // Output without a trailing newline shares the marker's line.
            out.write_all(&line[..pos])?;
            out.flush()?;
            if String::from_utf8_lossy(&line[pos + marker.len()..]).trim() == "1" {
                debug!("Chunk raised an exception");
            }
            return Ok(());
        }
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("Interpreter already gone: {e}");
        }
        let _ = self.child.wait();
    }
}

/// Runs chunks in one long-lived Python interpreter, so names bound by one
/// chunk are visible to the next.
///
/// The interpreter starts on the first complete chunk. If it exits (for
/// example on `exit()`), the next chunk starts a fresh one.
#[derive(Debug)]
pub struct PythonEvaluator {
    program: String,
    env: Vec<(String, String)>,
    buffer: ChunkBuffer,
    interpreter: Option<Interpreter>,
}

impl PythonEvaluator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            env: Vec::new(),
            buffer: ChunkBuffer::default(),
            interpreter: None,
        }
    }

    /// Exposes the attached process id to scripts.
    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        if let Some(pid) = pid {
            self.env.push((PID_ENV.to_string(), pid.to_string()));
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn evaluate(&mut self, chunk: &str, out: &mut dyn Write) -> Result<(), ScriptError> {
        let interpreter = match &mut self.interpreter {
            Some(interpreter) => interpreter,
            slot => slot.insert(Interpreter::spawn(&self.program, &self.env)?),
        };
        debug!("Sending {} byte chunk to {}", chunk.len(), self.program);
        let result = interpreter.run(chunk, out);
        if let Err(e) = &result {
            warn!("Interpreter lost: {e}");
            self.interpreter = None;
        }
        result
    }
}

impl Default for PythonEvaluator {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl ScriptEvaluator for PythonEvaluator {
    fn push(&mut self, line: &str, out: &mut dyn Write) -> Result<bool, ScriptError> {
        match self.buffer.push(line) {
            Some(chunk) => self.evaluate(&chunk, out).map(|()| false),
            None => Ok(self.buffer.is_pending()),
        }
    }

    fn is_pending(&self) -> bool {
        self.buffer.is_pending()
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Whether the buffered lines form an incomplete construct.
fn needs_more(lines: &[String]) -> bool {
    let Some(last) = lines.last() else {
        return false;
    };
    if last.ends_with('\\') {
        return true;
    }
    if bracket_depth(lines) > 0 {
        return true;
    }
    // Colon blocks close on the first blank line.
    let opens_block = lines
        .first()
        .map(|l| l.trim_end().ends_with(':'))
        .unwrap_or(false);
    opens_block && !last.trim().is_empty()
}

/// Net count of open brackets, ignoring quoted text.
fn bracket_depth(lines: &[String]) -> i64 {
    let mut depth = 0i64;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in lines.iter().flat_map(|l| l.chars().chain(std::iter::once('\n'))) {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            _ => {}
        }
    }
    depth
}
