//! Admission control for scored attempts.
//!
//! Two guards run before an attempt row is written, both scoped by the
//! server clock and both executed on the same connection as the insert so
//! the whole check-then-insert sequence shares one transaction:
//!
//! - the **daily quota**: `daily`-mode attempts must reference today's
//!   challenge snippet and stay under the per-user cap for the current UTC
//!   day, and
//! - the **burst guard**: a per-user ceiling on submissions of any mode
//!   inside a short sliding window, answered with HTTP 429.
//!
//! There is no explicit reset: counting always scopes its query to the
//! current UTC day, so the quota renews itself at midnight UTC.

use cadence::Mode;
use chrono::{DateTime, Days, Duration, NaiveTime, SecondsFormat, Utc};
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::db;
use crate::error::AppError;

/// Submissions allowed per user inside the burst window, any mode.
pub const BURST_CAP: i64 = 10;
/// Length of the burst window in seconds.
pub const BURST_WINDOW_SECONDS: i64 = 60;

/// Quota refusals. Unlike validator rejections these are expected,
/// non-adversarial user-facing state, so their messages are surfaced
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("invalid daily snippet")]
    WrongSnippet,
    #[error("daily attempts exhausted")]
    Exhausted,
    #[error("rate limit exceeded")]
    RateLimited,
}

/// Render a timestamp the way attempt rows store `created_at`, so string
/// comparison in SQL matches chronological order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The `[midnight, next midnight)` window of the UTC day containing `at`.
pub fn day_bounds(at: DateTime<Utc>) -> (String, String) {
    let day = at.date_naive();
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = (day + Days::new(1)).and_time(NaiveTime::MIN).and_utc();

    (timestamp(start), timestamp(end))
}

/// Check the submitted snippet against today's challenge and the user's
/// remaining daily slots.
pub async fn check_daily(
    conn: &mut SqliteConnection,
    user_id: &str,
    snippet_id: Option<&str>,
    received_at: DateTime<Utc>,
    cap: i64,
) -> Result<(), AppError> {
    let day_key = received_at.date_naive().to_string();
    let challenge = db::daily_challenge(conn, &day_key).await?;

    match (challenge.as_deref(), snippet_id) {
        (Some(challenge), Some(snippet)) if challenge == snippet => {}
        _ => return Err(QuotaError::WrongSnippet.into()),
    }

    let (start, end) = day_bounds(received_at);
    let daily = Mode::Daily.to_string();
    let count =
        db::count_attempts_in_window(conn, user_id, Some(daily.as_str()), &start, &end).await?;

    if count >= cap {
        return Err(QuotaError::Exhausted.into());
    }

    Ok(())
}

/// Reject a user submitting faster than any human retries.
pub async fn check_burst(
    conn: &mut SqliteConnection,
    user_id: &str,
    received_at: DateTime<Utc>,
) -> Result<(), AppError> {
    let start = timestamp(received_at - Duration::seconds(BURST_WINDOW_SECONDS));
    let end = timestamp(received_at + Duration::seconds(1));
    let count = db::count_attempts_in_window(conn, user_id, None, &start, &end).await?;

    if count >= BURST_CAP {
        return Err(QuotaError::RateLimited.into());
    }

    Ok(())
}
