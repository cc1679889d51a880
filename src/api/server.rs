//! Axum server setup and configuration

use crate::api::routes;
use crate::auth::{TokenService, UserStore};
use crate::services::{AccountGateway, BalanceHistory, BotCommander, BotSupervisor, StaticAccountGateway};
use crate::Config;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
    /// Owner of the one tracked bot process
    pub bot: Arc<BotSupervisor>,
    pub account: Arc<dyn AccountGateway>,
    pub balance_history: Arc<BalanceHistory>,
    pub commands: Arc<BotCommander>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let users = UserStore::new(config.users_file.clone());
        let tokens = TokenService::new(&config.jwt_secret);
        let bot = BotSupervisor::new(config.bot_dir.clone());
        let balance_history = BalanceHistory::new(config.balance_history_file.clone());

        let commands = match &config.bot_api_url {
            Some(url) => {
                info!("Forwarding bot commands to {}", url);
                BotCommander::http(reqwest::Client::new(), url)
            }
            None => {
                info!("Writing bot commands to {}", config.bot_commands_file.display());
                BotCommander::file(config.bot_commands_file.clone())
            }
        };

        Self {
            config: Arc::new(config),
            users: Arc::new(users),
            tokens: Arc::new(tokens),
            bot: Arc::new(bot),
            account: Arc::new(StaticAccountGateway::new()),
            balance_history: Arc::new(balance_history),
            commands: Arc::new(commands),
        }
    }

    /// Swap the account data source
    pub fn with_account_gateway(mut self, gateway: Arc<dyn AccountGateway>) -> Self {
        self.account = gateway;
        self
    }
}

/// Create the Axum application with all routes
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // API routes; everything except health/signup/login takes an AuthUser
    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Auth routes
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/verify", get(routes::auth::verify))
        // Bot control routes
        .route("/bot/status", get(routes::bot::status))
        .route("/bot/start", post(routes::bot::start))
        .route("/bot/stop", post(routes::bot::stop))
        .route("/bot/open-position", post(routes::bot::open_position))
        .route("/bot/close-all-positions", post(routes::bot::close_all_positions))
        // Account data routes
        .route("/account/summary", get(routes::account::summary))
        .route("/account/balance-history", get(routes::account::balance_history))
        .route("/account/positions", get(routes::account::positions))
        .route("/account/trades", get(routes::account::trades));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Bot Manager API is running",
    })
}
