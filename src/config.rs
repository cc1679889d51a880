//! Configuration management for the dashboard backend

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Signing secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Bot script used when neither env nor request names one
pub const DEFAULT_BOT_PATH: &str = "bot.py";

/// Interpreter used when neither env nor request names one
pub const DEFAULT_PYTHON_CMD: &str = "python";

/// Dashboard configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,

    /// HS256 secret for bearer tokens
    pub jwt_secret: String,

    /// Bot script forced by the environment (overrides request bodies)
    pub bot_path: Option<String>,

    /// Interpreter forced by the environment (overrides request bodies)
    pub python_cmd: Option<String>,

    /// Working directory for the bot process
    pub bot_dir: PathBuf,

    /// Flat-file credential store
    pub users_file: PathBuf,

    /// Flat-file balance history
    pub balance_history_file: PathBuf,

    /// Bot HTTP API for forwarded commands (optional)
    pub bot_api_url: Option<String>,

    /// JSON-lines command file used when no bot API is configured
    pub bot_commands_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            bot_path: None,
            python_cmd: None,
            bot_dir: PathBuf::from("."),
            users_file: PathBuf::from("users.json"),
            balance_history_file: PathBuf::from("balance_history.json"),
            bot_api_url: None,
            bot_commands_file: PathBuf::from("bot_commands.jsonl"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", v))?,
            Err(_) => defaults.port,
        };

        let jwt_secret = match env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set, using the built-in development secret");
                defaults.jwt_secret
            }
        };

        let bot_path = env::var("BOT_PATH").ok().filter(|s| !s.is_empty());
        let python_cmd = env::var("PYTHON_CMD").ok().filter(|s| !s.is_empty());

        let bot_dir = match env::var("BOT_DIR").ok().filter(|s| !s.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir().unwrap_or(defaults.bot_dir),
        };

        let users_file = env::var("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.users_file);

        let balance_history_file = env::var("BALANCE_HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.balance_history_file);

        let bot_api_url = env::var("BOT_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/').to_string());

        let bot_commands_file = env::var("BOT_COMMANDS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.bot_commands_file);

        Ok(Self {
            port,
            jwt_secret,
            bot_path,
            python_cmd,
            bot_dir,
            users_file,
            balance_history_file,
            bot_api_url,
            bot_commands_file,
        })
    }

    /// Resolve the bot launch command.
    ///
    /// Environment settings win over the request, the request wins over the
    /// built-in defaults.
    pub fn resolve_launch(
        &self,
        requested_path: Option<&str>,
        requested_cmd: Option<&str>,
    ) -> (String, String) {
        let path = self
            .bot_path
            .as_deref()
            .or(requested_path.filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_BOT_PATH)
            .to_string();
        let cmd = self
            .python_cmd
            .as_deref()
            .or(requested_cmd.filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_PYTHON_CMD)
            .to_string();
        (path, cmd)
    }
}
