//! Plausibility validation for submitted attempts.
//!
//! The validator is a pure function of the wire payload and the server's
//! receipt time: it never consults the client session, so a fabricated or
//! replayed submission has to survive every gate on its own numbers. The
//! gates run in a fixed order and the first failure is terminal for the
//! submission:
//!
//! 1. mode/snippet schema, 2. absolute bounds, 3. time-vs-WPM consistency,
//! 4. server-clock timing, then clamping and the advisory suspicion flag.
//!
//! Rejection reasons are internal: handlers log them and answer with a
//! generic message (see [`crate::error::AppError`]).

use cadence::Mode;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::RecordAttemptRequest;

/// Shortest believable attempt.
pub const MIN_ELAPSED_MS: i64 = 1_000;
/// Longest believable attempt (10 minutes).
pub const MAX_ELAPSED_MS: i64 = 600_000;
/// Hard ceiling on claimed speed.
pub const MAX_WPM: f64 = 300.0;
/// Allowed disagreement between the server clock and the claimed elapsed
/// time, tolerating network latency.
pub const CLOCK_SKEW_TOLERANCE_MS: i64 = 5_000;

/// Why a submission was refused. Internal only — never echoed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid mode")]
    InvalidMode,
    #[error("missing snippet_id")]
    MissingSnippetId,
    #[error("impossible time duration")]
    ImpossibleDuration,
    #[error("impossible WPM")]
    ImpossibleWpm,
    #[error("impossible accuracy")]
    ImpossibleAccuracy,
    #[error("time/WPM mismatch detected")]
    TimeWpmMismatch,
    #[error("timing manipulation detected")]
    TimingManipulation,
}

/// A submission that passed every gate, with defaults applied and numeric
/// noise clamped into range.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAttempt {
    pub snippet_id: Option<String>,
    pub mode: Mode,
    pub elapsed_ms: i64,
    pub wpm: f64,
    pub accuracy: f64,
    pub keystrokes: i64,
    /// Epoch milliseconds; defaults to the receipt time when absent.
    pub start_time: i64,
    /// Advisory flag: statistically unlikely speed/accuracy combination.
    /// Flagged attempts are still accepted and scored.
    pub suspicious: bool,
}

/// Validate one submission against the receipt time.
pub fn validate(
    request: &RecordAttemptRequest,
    received_at: DateTime<Utc>,
) -> Result<ValidAttempt, Rejection> {
    // Schema: the mode must be known, and only tricky_chars may omit the
    // snippet id.
    let mode: Mode = request.mode.parse().map_err(|_| Rejection::InvalidMode)?;

    if request.snippet_id.is_none() && mode != Mode::TrickyChars {
        return Err(Rejection::MissingSnippetId);
    }

    // Absolute bounds.
    if !(MIN_ELAPSED_MS..=MAX_ELAPSED_MS).contains(&request.elapsed_ms) {
        return Err(Rejection::ImpossibleDuration);
    }

    if !(0.0..=MAX_WPM).contains(&request.wpm) {
        return Err(Rejection::ImpossibleWpm);
    }

    if !(0.0..=100.0).contains(&request.accuracy) {
        return Err(Rejection::ImpossibleAccuracy);
    }

    // Cross-field consistency: a lower bound on how long ~5 words take at
    // the claimed speed. Defeats high-WPM claims with implausibly short
    // elapsed times.
    let expected_min_ms = if request.wpm > 0.0 {
        (300_000.0 / request.wpm).max(MIN_ELAPSED_MS as f64)
    } else {
        10_000.0
    };

    if (request.elapsed_ms as f64) < 0.7 * expected_min_ms {
        return Err(Rejection::TimeWpmMismatch);
    }

    // Server-clock timing: the claimed window must roughly end at the
    // receipt time. Bounds how much a client can lie about when it started.
    let start_time = request
        .start_time
        .unwrap_or_else(|| received_at.timestamp_millis());
    let server_elapsed_ms = received_at.timestamp_millis() - start_time;

    if (server_elapsed_ms - request.elapsed_ms).abs() > CLOCK_SKEW_TOLERANCE_MS {
        return Err(Rejection::TimingManipulation);
    }

    // Clamping, not rejection, for near-boundary numeric noise.
    let wpm = request.wpm.clamp(0.0, MAX_WPM);
    let accuracy = request.accuracy.clamp(0.0, 100.0);

    Ok(ValidAttempt {
        snippet_id: request.snippet_id.clone(),
        mode,
        elapsed_ms: request.elapsed_ms,
        wpm,
        accuracy,
        keystrokes: request.keystrokes.unwrap_or(0).max(0),
        start_time,
        suspicious: is_suspicious(wpm, accuracy),
    })
}

/// Advisory heuristic: combinations of near-perfect accuracy and elite
/// speed are worth a second look, but never a rejection.
fn is_suspicious(wpm: f64, accuracy: f64) -> bool {
    wpm >= 180.0 && accuracy >= 99.0
}
