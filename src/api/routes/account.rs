//! Account data API endpoints

use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::server::AppState;
use crate::services::balance_history::parse_days;
use crate::types::{AccountSummary, BalanceSnapshot, Position, Trade};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Query parameters for balance history
#[derive(Debug, Deserialize)]
pub struct BalanceHistoryQuery {
    /// Window in days; defaults to 30 when missing or unusable
    pub days: Option<String>,
}

/// Query parameters for trade history
#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    /// YYYY-MM-DD, defaults to today (UTC)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceHistoryResponse {
    pub history: Vec<BalanceSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub trades: Vec<Trade>,
    /// Same list as `trades`, kept for older dashboard builds
    pub today: Vec<Trade>,
    pub date: NaiveDate,
    pub total_trades: usize,
}

/// Account summary; also records a balance snapshot for the caller
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<AccountSummary>, ApiError> {
    let summary = state.account.summary()?;

    // History is best-effort, the dashboard still gets its numbers
    if let Err(e) = state.balance_history.record(&claims.user_id, &summary).await {
        error!("Error saving balance snapshot: {:#}", e);
    }

    Ok(Json(summary))
}

pub async fn balance_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<BalanceHistoryQuery>,
) -> Result<Json<BalanceHistoryResponse>, ApiError> {
    let days = parse_days(query.days.as_deref());
    let history = state.balance_history.history(&claims.user_id, days).await?;

    Ok(Json(BalanceHistoryResponse { history }))
}

pub async fn positions(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<PositionsResponse>, ApiError> {
    let positions = state.account.positions()?;
    Ok(Json(PositionsResponse { positions }))
}

pub async fn trades(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TradesQuery>,
) -> Result<Json<TradesResponse>, ApiError> {
    let date = match query.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::Validation(format!("Invalid date {:?}, expected YYYY-MM-DD", raw)))?,
        None => Utc::now().date_naive(),
    };

    let trades = state.account.trades(date)?;
    let total_trades = trades.len();

    Ok(Json(TradesResponse {
        today: trades.clone(),
        trades,
        date,
        total_trades,
    }))
}
