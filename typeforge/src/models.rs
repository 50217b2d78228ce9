use serde::{Deserialize, Serialize};

/// Wire request for `POST /api/v1/attempts`.
///
/// Optional fields carry explicit defaults instead of implicit coercions:
/// a missing `keystrokes` becomes 0, a missing `start_time` becomes the
/// server's receipt time. `mode` is kept as a raw string here so an unknown
/// value surfaces as a validator rejection rather than a deserialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAttemptRequest {
    #[serde(default)]
    pub snippet_id: Option<String>,
    pub mode: String,
    /// Client-reported elapsed time in milliseconds.
    pub elapsed_ms: i64,
    pub wpm: f64,
    /// Percentage between 0.0 and 100.0.
    pub accuracy: f64,
    #[serde(default)]
    pub keystrokes: Option<i64>,
    /// Client-reported session start, epoch milliseconds.
    #[serde(default)]
    pub start_time: Option<i64>,
}

/// One persisted attempt — a row of the `attempts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    pub snippet_id: Option<String>,
    pub mode: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_ms: i64,
    pub keystrokes: i64,
    /// Advisory review flag; a flagged attempt is still scored.
    pub suspicious: bool,
    /// ISO-8601 UTC timestamp, set from the server's receipt time.
    pub created_at: String,
}

/// Success response for a recorded attempt.
#[derive(Debug, Serialize)]
pub struct RecordAttemptResponse {
    pub success: bool,
    pub attempt_id: String,
    pub xp_earned: i64,
}
