//! IBKR Dashboard Backend
//!
//! REST backend for a dashboard that monitors an IBKR account and controls an
//! external trading bot:
//!
//! 1. **Auth**: flat-file users with Argon2id hashes, stateless 7-day JWTs.
//! 2. **Bot supervisor**: starts, stops and health-checks one bot process.
//! 3. **Account data**: summary, positions and trades, with every summary
//!    fetch recorded into a 90-day balance history.

pub mod api;
pub mod auth;
pub mod config;
pub mod services;
pub mod types;

pub use auth::{AuthError, Claims, TokenService, UserPublic, UserStore};
pub use config::Config;
pub use services::{BalanceHistory, BotCommander, BotStatus, BotSupervisor};
pub use types::{AccountSummary, BalanceSnapshot, OrderIntent, OrderStatus, Position, Trade, TradeAction};
