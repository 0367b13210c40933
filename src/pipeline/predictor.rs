use std::process::Stdio;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{watch, Mutex};

use crate::config::PredictorCommand;
use crate::error::AlignmentError;
use crate::pipeline::traits::{PredictionFuture, Predictor};
use crate::types::Prediction;

/// Cooperative cancellation signal shared between a caller and its in-flight requests.
#[derive(Debug, Clone)]
pub struct Cancellation {
    sender: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// One predictor shared by every aligner; calls are queued, never run in parallel.
#[derive(Clone)]
pub struct SharedPredictor {
    inner: Arc<dyn Predictor>,
    gate: Arc<Mutex<()>>,
}

impl SharedPredictor {
    pub fn new(predictor: impl Predictor + 'static) -> Self {
        Self::from_arc(Arc::new(predictor))
    }

    pub fn from_arc(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            inner: predictor,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn backend_label(&self) -> String {
        self.inner.backend_label()
    }

    pub async fn predict(
        &self,
        questions: &[String],
        context: &str,
    ) -> Result<Vec<Prediction>, AlignmentError> {
        let _turn = self.gate.lock().await;
        let predictions = self.inner.predict(questions, context).await?;
        if predictions.len() != questions.len() {
            return Err(AlignmentError::runtime(
                "predict",
                format!(
                    "backend '{}' returned {} predictions for {} questions",
                    self.inner.backend_label(),
                    predictions.len(),
                    questions.len()
                ),
            ));
        }
        Ok(predictions)
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    questions: &'a [String],
    context: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error: Option<String>,
}

struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl Session {
    async fn exchange(&mut self, request: &WireRequest<'_>) -> Result<WireResponse, AlignmentError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| AlignmentError::json("encode predictor request", e))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AlignmentError::io("write predictor request", e))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AlignmentError::io("flush predictor request", e))?;

        let reply = self
            .stdout
            .next_line()
            .await
            .map_err(|e| AlignmentError::io("read predictor reply", e))?
            .ok_or_else(|| {
                AlignmentError::runtime("read predictor reply", "predictor process closed its output")
            })?;
        serde_json::from_str(&reply).map_err(|e| AlignmentError::json("decode predictor reply", e))
    }

    /// Kills the child now and reaps it in the background.
    fn discard(self) {
        let Session { mut child, .. } = self;
        let _ = child.start_kill();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = child.wait().await;
            });
        }
    }
}

/// Discards the session of a call that did not finish cleanly.
///
/// Armed for the whole exchange, so a call dropped mid-flight (cancellation, timeout) kills
/// the child as soon as the future goes away.
struct ExchangeGuard<'s> {
    slot: &'s mut Option<Session>,
    program: &'s str,
    reason: Option<&'static str>,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        let Some(reason) = self.reason else {
            return;
        };
        if let Some(session) = self.slot.take() {
            tracing::warn!(program = self.program, reason, "discarding predictor session");
            session.discard();
        }
    }
}

/// Model hosted in a separate process speaking JSON lines over stdin/stdout.
///
/// Request: `{"questions": [..], "context": ".."}`.
/// Reply: `{"predictions": [{"score", "start", "end", "answer"}, ..]}` or `{"error": ".."}`.
///
/// The process is spawned lazily. A session whose call was dropped mid-flight, or whose
/// pipes failed, is killed at once and replaced on the next call.
pub struct ProcessPredictor {
    command: PredictorCommand,
    session: Mutex<Option<Session>>,
}

impl ProcessPredictor {
    pub fn new(command: PredictorCommand) -> Self {
        Self {
            command,
            session: Mutex::new(None),
        }
    }

    fn spawn(&self) -> Result<Session, AlignmentError> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AlignmentError::io("spawn predictor process", e))?;
        let stdin = child.stdin.take().ok_or_else(|| {
            AlignmentError::runtime("spawn predictor process", "stdin was not captured")
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AlignmentError::runtime("spawn predictor process", "stdout was not captured")
        })?;

        tracing::info!(
            program = %self.command.program,
            pid = child.id(),
            "predictor process spawned"
        );
        Ok(Session {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    async fn run(
        &self,
        questions: &[String],
        context: &str,
    ) -> Result<Vec<Prediction>, AlignmentError> {
        let mut slot = self.session.lock().await;
        if slot.is_none() {
            *slot = Some(self.spawn()?);
        }
        let mut guard = ExchangeGuard {
            slot: &mut slot,
            program: &self.command.program,
            reason: Some("call dropped before the reply arrived"),
        };
        let Some(session) = guard.slot.as_mut() else {
            return Err(AlignmentError::runtime("predict", "predictor session unavailable"));
        };

        let reply = session
            .exchange(&WireRequest { questions, context })
            .await;
        guard.reason = reply.is_err().then_some("predictor exchange failed");
        drop(guard);

        let reply = reply?;
        if let Some(message) = reply.error {
            return Err(AlignmentError::runtime("predictor backend", message));
        }
        Ok(reply.predictions)
    }
}

impl Predictor for ProcessPredictor {
    fn predict<'a>(&'a self, questions: &'a [String], context: &'a str) -> PredictionFuture<'a> {
        Box::pin(self.run(questions, context))
    }

    fn backend_label(&self) -> String {
        format!("process:{}", self.command.program)
    }
}
