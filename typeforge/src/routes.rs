//! HTTP surface: one scoring endpoint plus a health check.

use axum::{
    Json, Router,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    routing::{get, post},
};
use cadence::Mode;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Attempt, RecordAttemptRequest, RecordAttemptResponse};
use crate::{db, quota, validator, xp};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    /// Maximum scored daily-mode attempts per user per UTC day.
    pub daily_cap: i64,
}

/// JSON extractor whose rejection matches the `{"error": ...}` body shape
/// of every other response.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Malformed(rejection.to_string())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/attempts", post(record_attempt))
        .route("/api/v1/health", get(health))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// `GET /api/v1/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/v1/attempts` — validate, admit, persist and score one
/// submitted attempt.
pub async fn record_attempt(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<RecordAttemptRequest>,
) -> Result<Json<RecordAttemptResponse>, AppError> {
    record(&state, &user, &request, Utc::now()).await.map(Json)
}

/// The record-attempt service, separated from the handler so tests can
/// inject the receipt time.
pub async fn record(
    state: &AppState,
    user: &AuthUser,
    request: &RecordAttemptRequest,
    received_at: DateTime<Utc>,
) -> Result<RecordAttemptResponse, AppError> {
    let valid = validator::validate(request, received_at)?;

    if valid.suspicious {
        tracing::warn!(
            user_id = %user.user_id,
            wpm = valid.wpm,
            accuracy = valid.accuracy,
            "suspicious attempt flagged for review"
        );
    }

    // Admission checks and the insert share one transaction, closing the
    // window where two in-flight submissions could both pass the count.
    let mut tx = state.pool.begin().await?;

    quota::check_burst(&mut tx, &user.user_id, received_at).await?;

    if valid.mode == Mode::Daily {
        quota::check_daily(
            &mut tx,
            &user.user_id,
            valid.snippet_id.as_deref(),
            received_at,
            state.daily_cap,
        )
        .await?;
    }

    let attempt = Attempt {
        id: Uuid::now_v7().to_string(),
        user_id: user.user_id.clone(),
        snippet_id: valid.snippet_id.clone(),
        mode: valid.mode.to_string(),
        wpm: valid.wpm,
        accuracy: valid.accuracy,
        elapsed_ms: valid.elapsed_ms,
        keystrokes: valid.keystrokes,
        suspicious: valid.suspicious,
        created_at: quota::timestamp(received_at),
    };

    db::insert_attempt(&mut tx, &attempt).await?;
    tx.commit().await?;

    // XP is best-effort: the attempt is recorded either way.
    let xp_earned = xp::xp_for(valid.mode, valid.wpm, valid.accuracy);
    xp::award_best_effort(&state.pool, &user.user_id, xp_earned).await;

    tracing::info!(
        user_id = %user.user_id,
        attempt_id = %attempt.id,
        mode = %attempt.mode,
        wpm = attempt.wpm,
        "attempt recorded"
    );

    Ok(RecordAttemptResponse {
        success: true,
        attempt_id: attempt.id,
        xp_earned,
    })
}
