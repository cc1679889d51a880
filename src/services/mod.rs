//! Services behind the dashboard API

pub mod account_gateway;
pub mod balance_history;
pub mod bot_commands;
pub mod bot_supervisor;

pub use account_gateway::{AccountGateway, StaticAccountGateway};
pub use balance_history::{BalanceHistory, DEFAULT_HISTORY_DAYS, RETENTION_DAYS};
pub use bot_commands::{BotCommand, BotCommandKind, BotCommander, CommandError};
pub use bot_supervisor::{BotError, BotStatus, BotSupervisor};
