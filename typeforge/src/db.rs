//! Database queries for attempts, daily challenges and XP totals.
//!
//! Every function takes a plain connection so callers decide the
//! transaction scope; the record-attempt flow runs its quota counts and the
//! insert on one transaction.

use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::Attempt;

/// Persist one accepted attempt.
pub async fn insert_attempt(
    conn: &mut SqliteConnection,
    attempt: &Attempt,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO attempts
            (id, user_id, snippet_id, mode, wpm, accuracy, elapsed_ms,
             keystrokes, suspicious, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&attempt.id)
    .bind(&attempt.user_id)
    .bind(&attempt.snippet_id)
    .bind(&attempt.mode)
    .bind(attempt.wpm)
    .bind(attempt.accuracy)
    .bind(attempt.elapsed_ms)
    .bind(attempt.keystrokes)
    .bind(attempt.suspicious)
    .bind(&attempt.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Fetch one attempt by id.
pub async fn get_attempt(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Attempt>, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, snippet_id, mode, wpm, accuracy, elapsed_ms,
               keystrokes, suspicious, created_at
        FROM attempts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(attempt)
}

/// Count a user's attempts with `created_at` inside `[start, end)`,
/// optionally restricted to one mode.
pub async fn count_attempts_in_window(
    conn: &mut SqliteConnection,
    user_id: &str,
    mode: Option<&str>,
    start: &str,
    end: &str,
) -> Result<i64, AppError> {
    let count: i64 = match mode {
        Some(mode) => {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM attempts
                WHERE user_id = ? AND mode = ? AND created_at >= ? AND created_at < ?
                "#,
            )
            .bind(user_id)
            .bind(mode)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM attempts
                WHERE user_id = ? AND created_at >= ? AND created_at < ?
                "#,
            )
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    Ok(count)
}

/// The snippet bound to the challenge of the given UTC day (`YYYY-MM-DD`).
pub async fn daily_challenge(
    conn: &mut SqliteConnection,
    day: &str,
) -> Result<Option<String>, AppError> {
    let snippet_id = sqlx::query_scalar(
        r#"
        SELECT snippet_id FROM daily_challenges WHERE day = ?
        "#,
    )
    .bind(day)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(snippet_id)
}

/// Bind a snippet to a day's challenge, replacing any previous binding.
pub async fn set_daily_challenge(
    conn: &mut SqliteConnection,
    day: &str,
    snippet_id: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO daily_challenges (day, snippet_id)
        VALUES (?, ?)
        ON CONFLICT(day) DO UPDATE SET snippet_id = excluded.snippet_id
        "#,
    )
    .bind(day)
    .bind(snippet_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Add XP to a user's running total, creating the row on first award.
pub async fn award_xp(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: i64,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, xp)
        VALUES (?, ?)
        ON CONFLICT(id) DO UPDATE SET xp = xp + excluded.xp
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// A user's XP total, `None` if nothing was ever awarded.
pub async fn user_xp(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<i64>, AppError> {
    let xp = sqlx::query_scalar(
        r#"
        SELECT xp FROM users WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(xp)
}
