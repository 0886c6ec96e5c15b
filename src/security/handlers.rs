use axum::{extract::State, Json};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    security::{
        dto::{SecurityRecord, TrendsResponse, UpdateDashboardRequest},
        generator::{generate, DASHBOARD_TREND_DAYS},
        repo::SecurityRecordRow,
    },
    state::AppState,
};

/// GET /api/security/dashboard
///
/// Every read generates a fresh snapshot and overwrites the stored record;
/// the dashboard is intentionally not stable across reads.
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SecurityRecord>, ApiError> {
    let record = generate(OffsetDateTime::now_utc(), DASHBOARD_TREND_DAYS);
    let row = SecurityRecordRow::upsert(&state.db, user_id, &record).await?;
    Ok(Json(row.into_record()))
}

/// PUT /api/security/update
///
/// Merges the caller-supplied sections onto the stored record (or an empty
/// one) after range validation, then persists and returns the full record.
#[instrument(skip(state, payload))]
pub async fn update_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateDashboardRequest>,
) -> Result<Json<SecurityRecord>, ApiError> {
    payload.validate()?;

    let now = OffsetDateTime::now_utc();
    let mut record = SecurityRecordRow::find_by_user(&state.db, user_id)
        .await?
        .map(SecurityRecordRow::into_record)
        .unwrap_or_else(|| SecurityRecord::empty(now));

    payload.apply(&mut record);
    record.last_updated = now;

    let row = SecurityRecordRow::upsert(&state.db, user_id, &record).await?;
    info!(user_id = %user_id, "security record updated");
    Ok(Json(row.into_record()))
}

/// GET /api/security/trends
///
/// Read-only: returns the stored trend series, or an empty list when the
/// user has no record. Never triggers generation.
#[instrument(skip(state))]
pub async fn get_trends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TrendsResponse>, ApiError> {
    let trends = SecurityRecordRow::find_by_user(&state.db, user_id)
        .await?
        .map(|row| row.incident_trends.0)
        .unwrap_or_default();
    Ok(Json(TrendsResponse { trends }))
}
