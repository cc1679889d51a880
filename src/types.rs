//! Core types for the IBKR dashboard

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account summary as shown on the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub total_balance: Decimal,
    pub net_liquidation: Decimal,
    pub buying_power: Decimal,
    pub cash_balance: Decimal,
    pub open_positions_count: u32,
    pub closed_positions_count: u32,
    pub daily_profit: Decimal,
    pub daily_profit_percent: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percent: Decimal,
    pub currency: String,
    pub last_update: DateTime<Utc>,
}

/// An open position held by the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: i64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_percent: Decimal,
    /// Exchange-local entry time, no offset
    pub entry_time: String,
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// A filled trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: i64,
    pub price: Decimal,
    /// HH:MM:SS
    pub time: String,
    pub date: NaiveDate,
    pub profit: Decimal,
}

/// A point-in-time copy of the balance fields of an [`AccountSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub total_balance: Decimal,
    pub net_liquidation: Decimal,
    pub cash_balance: Decimal,
    pub buying_power: Decimal,
    pub daily_profit: Decimal,
}

/// Lifecycle of an order intent entered on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Held in the browser, never sent to the bot
    #[default]
    Pending,
    Active,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Active => write!(f, "ACTIVE"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Trade intent submitted from the new-position form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntent {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub action: Option<TradeAction>,
    /// e.g. "MKT", "Limit Order"
    #[serde(default)]
    pub trade_type: Option<String>,
    /// Stop-loss mode, "Custom" uses `custom_stop_loss_value`
    #[serde(default)]
    pub stop_loss: Option<String>,
    #[serde(default)]
    pub custom_stop_loss_value: Option<String>,
    /// Risk/reward ratio such as "1:1"
    #[serde(default, alias = "profit")]
    pub take_profit: Option<String>,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub time_frame: Option<String>,
    #[serde(default)]
    pub time_in_force: Option<String>,
    #[serde(default)]
    pub break_even: bool,
    #[serde(default)]
    pub replay: bool,
    #[serde(default)]
    pub cancel: bool,
    #[serde(default)]
    pub status: OrderStatus,
}
