//! # Submit Module - Attempt Packaging and the One-shot Latch
//!
//! When a session completes, its final metrics are packaged exactly once
//! into an [`AttemptSubmission`] and handed to an [`AttemptSink`] — the
//! external collaborator that carries the payload to the recording backend.
//! The engine itself performs no I/O; the sink is the seam where an
//! application plugs in its transport.
//!
//! Completion is edge-triggered and UI layers love to re-fire edges
//! (re-render storms), so the submitter is a one-shot latch: after the first
//! successful record, further calls are no-ops. A failed record leaves the
//! latch open so the caller may retry.
//!
#![doc = simple_mermaid::mermaid!("../diagrams/submission_flow.mmd")]

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::clock::Clock;
use crate::session::TypingSession;

/// The scored session modes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Free practice against any snippet.
    Practice,
    /// The shared snippet-of-the-day, capped per user per UTC day.
    Daily,
    /// Drills without a fixed snippet.
    TrickyChars,
}

/// The wire payload for one completed attempt.
///
/// Constructed once per completed session and never mutated afterwards. The
/// field names are the fixed submission contract between client and server;
/// the server re-derives plausibility from these values alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSubmission {
    /// `None` only for modes without a fixed snippet.
    pub snippet_id: Option<String>,
    pub mode: Mode,
    /// Milliseconds from the first keystroke to completion.
    pub elapsed_ms: u64,
    pub wpm: f64,
    /// Percentage between 0.0 and 100.0.
    pub accuracy: f64,
    /// Total characters ever added to the input.
    pub keystrokes: u64,
    /// Wall-clock start of the session, epoch milliseconds.
    pub start_time: i64,
}

/// External collaborator that records a completed submission.
pub trait AttemptSink {
    type Error;

    fn record(&mut self, submission: &AttemptSubmission) -> Result<(), Self::Error>;
}

/// One-shot latch building and sending a session's submission.
#[derive(Debug, Clone, Default)]
pub struct AttemptSubmitter {
    submitted: bool,
}

impl AttemptSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission has already been recorded.
    pub const fn has_submitted(&self) -> bool {
        self.submitted
    }

    /// Build and record the submission for a completed session.
    ///
    /// Returns `Ok(None)` when the session is not complete yet, or when a
    /// submission was already recorded. Returns the built submission after a
    /// successful record. A sink error leaves the latch open, so the caller
    /// may retry on the next completion-edge poll.
    pub fn try_submit<C: Clock, S: AttemptSink>(
        &mut self,
        session: &TypingSession<C>,
        snippet_id: Option<&str>,
        mode: Mode,
        sink: &mut S,
    ) -> Result<Option<AttemptSubmission>, S::Error> {
        if self.submitted || !session.is_complete() {
            return Ok(None);
        }

        let (Some(elapsed), Some(accuracy)) = (session.elapsed(), session.accuracy()) else {
            // A complete session has always started and typed at least one
            // character; this arm is unreachable in practice.
            return Ok(None);
        };

        let elapsed_ms = elapsed.as_millis() as u64;
        let submission = AttemptSubmission {
            snippet_id: snippet_id.map(str::to_string),
            mode,
            elapsed_ms,
            wpm: session.wpm(),
            accuracy,
            keystrokes: session.keys_pressed() as u64,
            start_time: session.clock().epoch_millis() - elapsed_ms as i64,
        };

        sink.record(&submission)?;
        self.submitted = true;

        Ok(Some(submission))
    }
}
