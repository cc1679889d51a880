//! Bot control API endpoints

use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::server::AppState;
use crate::services::{BotCommand, BotStatus};
use crate::types::OrderIntent;
use axum::{body::Bytes, extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Optional launch overrides for `/bot/start`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBotRequest {
    pub bot_path: Option<String>,
    pub python_cmd: Option<String>,
}

/// Start/stop response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotControlResponse {
    pub message: String,
    #[serde(flatten)]
    pub status: BotStatus,
}

/// Accepted command response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAcceptedResponse {
    pub message: String,
    pub command_id: String,
    pub issued_at: DateTime<Utc>,
}

impl CommandAcceptedResponse {
    fn new(message: &str, command: BotCommand) -> Self {
        Self {
            message: message.to_string(),
            command_id: command.id,
            issued_at: command.issued_at,
        }
    }
}

/// Current bot state, re-checked against the OS
pub async fn status(State(state): State<AppState>, _user: AuthUser) -> Json<BotStatus> {
    Json(state.bot.status().await)
}

/// Launch the bot process
pub async fn start(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    body: Bytes,
) -> Result<Json<BotControlResponse>, ApiError> {
    // No body means launch with the configured defaults
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        StartBotRequest::default()
    } else {
        let Json(req) = Json::<StartBotRequest>::from_bytes(&body)
            .map_err(|e: JsonRejection| ApiError::Validation(e.body_text()))?;
        req
    };
    let (bot_path, python_cmd) = state
        .config
        .resolve_launch(req.bot_path.as_deref(), req.python_cmd.as_deref());

    info!("User {} requested bot start", claims.email);
    let status = state.bot.start(&bot_path, &python_cmd).await?;

    Ok(Json(BotControlResponse {
        message: "Bot started successfully".to_string(),
        status,
    }))
}

/// Terminate the bot process
pub async fn stop(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<BotControlResponse>, ApiError> {
    info!("User {} requested bot stop", claims.email);
    let status = state.bot.stop().await?;

    Ok(Json(BotControlResponse {
        message: "Bot stopped successfully".to_string(),
        status,
    }))
}

/// Forward an order intent to the bot
pub async fn open_position(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<OrderIntent>, JsonRejection>,
) -> Result<(StatusCode, Json<CommandAcceptedResponse>), ApiError> {
    let Json(order) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let command = state.commands.open_position(&claims.user_id, order).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CommandAcceptedResponse::new("Position sent to bot", command)),
    ))
}

/// Ask the bot to flatten every open position
pub async fn close_all_positions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<(StatusCode, Json<CommandAcceptedResponse>), ApiError> {
    let command = state.commands.close_all_positions(&claims.user_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CommandAcceptedResponse::new("Close-all request sent to bot", command)),
    ))
}
