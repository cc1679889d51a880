//! Forwarding of dashboard order intents to the trading bot
//!
//! Commands go to the bot's HTTP API when one is configured, otherwise they
//! are appended as JSON lines to a file the bot tails. Delivery is
//! fire-and-forget: the bot never confirms execution back to the dashboard.

use crate::types::{OrderIntent, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Command forwarding errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// The intent itself is unacceptable
    #[error("{0}")]
    Rejected(String),

    #[error("bot API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("bot API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What the bot is asked to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BotCommandKind {
    OpenPosition { order: OrderIntent },
    CloseAllPositions,
}

/// Envelope delivered to the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotCommand {
    pub id: String,
    pub issued_at: DateTime<Utc>,
    /// User id of the dashboard user who issued it
    pub issued_by: String,
    #[serde(flatten)]
    pub kind: BotCommandKind,
}

enum CommandSink {
    Http { client: reqwest::Client, url: String },
    File { path: PathBuf, lock: Mutex<()> },
}

/// Delivers [`BotCommand`]s to the bot
pub struct BotCommander {
    sink: CommandSink,
}

impl BotCommander {
    /// POST commands to `{base_url}/commands`
    pub fn http(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            sink: CommandSink::Http {
                client,
                url: format!("{}/commands", base_url.trim_end_matches('/')),
            },
        }
    }

    /// Append commands to a JSON-lines file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: CommandSink::File {
                path: path.into(),
                lock: Mutex::new(()),
            },
        }
    }

    /// Forward an order intent.
    ///
    /// Pending intents belong to the browser and are refused.
    pub async fn open_position(&self, issued_by: &str, order: OrderIntent) -> Result<BotCommand, CommandError> {
        if order.symbol.trim().is_empty() {
            return Err(CommandError::Rejected("Symbol is required".to_string()));
        }
        if order.status == OrderStatus::Pending {
            return Err(CommandError::Rejected(
                "Pending orders are kept client-side until activated or cancelled".to_string(),
            ));
        }

        let mut order = order;
        order.symbol = order.symbol.trim().to_uppercase();

        info!(
            "Forwarding {} order for {} ({})",
            order.action.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            order.symbol,
            order.status
        );
        self.send(issued_by, BotCommandKind::OpenPosition { order }).await
    }

    pub async fn close_all_positions(&self, issued_by: &str) -> Result<BotCommand, CommandError> {
        info!("Forwarding close-all-positions from user {}", issued_by);
        self.send(issued_by, BotCommandKind::CloseAllPositions).await
    }

    async fn send(&self, issued_by: &str, kind: BotCommandKind) -> Result<BotCommand, CommandError> {
        let command = BotCommand {
            id: Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
            issued_by: issued_by.to_string(),
            kind,
        };

        match &self.sink {
            CommandSink::Http { client, url } => {
                let resp = client.post(url).json(&command).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(CommandError::Upstream {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
            CommandSink::File { path, lock } => {
                let mut line = serde_json::to_string(&command)?;
                line.push('\n');

                let _guard = lock.lock().await;
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await?;
                file.write_all(line.as_bytes()).await?;
                file.flush().await?;
            }
        }

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TradeAction;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;
    use std::sync::Arc;

    fn temp_commander() -> (BotCommander, PathBuf) {
        let path = std::env::temp_dir().join(format!("bot-commands-{}.jsonl", Uuid::new_v4()));
        (BotCommander::file(path.clone()), path)
    }

    fn order(status: OrderStatus) -> OrderIntent {
        OrderIntent {
            symbol: " aapl ".to_string(),
            action: Some(TradeAction::Buy),
            trade_type: Some("MKT".to_string()),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_active_order_written_as_line() {
        let (commander, path) = temp_commander();

        let sent = commander
            .open_position("user-1", order(OrderStatus::Active))
            .await
            .unwrap();
        commander.close_all_positions("user-1").await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: BotCommand = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, sent);
        match first.kind {
            BotCommandKind::OpenPosition { order } => assert_eq!(order.symbol, "AAPL"),
            other => panic!("unexpected command {:?}", other),
        }

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["command"], "close_all_positions");
        assert_eq!(second["issuedBy"], "user-1");
    }

    #[tokio::test]
    async fn test_pending_order_refused() {
        let (commander, path) = temp_commander();

        let result = commander.open_position("user-1", order(OrderStatus::Pending)).await;
        assert!(matches!(result, Err(CommandError::Rejected(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_symbol_refused() {
        let (commander, _) = temp_commander();
        let mut intent = order(OrderStatus::Cancelled);
        intent.symbol = "  ".to_string();

        let result = commander.open_position("user-1", intent).await;
        assert!(matches!(result, Err(CommandError::Rejected(msg)) if msg == "Symbol is required"));
    }

    /// Local stand-in for the bot's API; answers every command with `status`
    async fn bot_api(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/commands",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().await.push(body);
                    (status, "bot busy")
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), received)
    }

    #[tokio::test]
    async fn test_http_non_success_is_upstream_error() {
        let (url, received) = bot_api(StatusCode::SERVICE_UNAVAILABLE).await;
        let commander = BotCommander::http(reqwest::Client::new(), &url);

        let result = commander.close_all_positions("user-1").await;
        match result {
            Err(CommandError::Upstream { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "bot busy");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert_eq!(received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_http_delivers_command_envelope() {
        let (url, received) = bot_api(StatusCode::OK).await;
        // Trailing slash on the base URL must not double up
        let commander = BotCommander::http(reqwest::Client::new(), &format!("{}/", url));

        let sent = commander
            .open_position("user-1", order(OrderStatus::Active))
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        let body = &received[0];
        assert_eq!(body["command"], "open_position");
        assert_eq!(body["id"], sent.id.as_str());
        assert_eq!(body["issuedBy"], "user-1");
        assert_eq!(body["order"]["symbol"], "AAPL");
        assert_eq!(body["order"]["status"], "ACTIVE");
    }

    #[tokio::test]
    async fn test_http_unreachable_bot() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let commander = BotCommander::http(reqwest::Client::new(), &format!("http://{}", addr));
        let result = commander.close_all_positions("user-1").await;
        assert!(matches!(result, Err(CommandError::Http(_))));
    }
}
