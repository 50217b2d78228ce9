use cadence::Mode;
use sqlx::SqlitePool;

use crate::db;

/// XP granted for an accepted attempt: a flat base plus speed and accuracy
/// shares, doubled for the daily challenge.
pub fn xp_for(mode: Mode, wpm: f64, accuracy: f64) -> i64 {
    let base = 10.0 + wpm / 10.0 + accuracy / 10.0;
    let amount = if mode == Mode::Daily { base * 2.0 } else { base };

    amount.floor() as i64
}

/// Award XP after an accepted attempt.
///
/// Best-effort only: the attempt is already recorded, so a failure here is
/// logged and swallowed rather than failing the request.
pub async fn award_best_effort(pool: &SqlitePool, user_id: &str, amount: i64) {
    let result = async {
        let mut conn = pool.acquire().await?;
        db::award_xp(&mut conn, user_id, amount).await
    }
    .await;

    if let Err(error) = result {
        tracing::warn!("failed to award {amount} xp to {user_id}: {error}");
    }
}
