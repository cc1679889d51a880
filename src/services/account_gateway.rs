//! Account data gateway
//!
//! The dashboard reads summary, positions and trades through [`AccountGateway`].
//! [`StaticAccountGateway`] serves fixed sample data until a broker or bot
//! feed is wired in.

use crate::types::{AccountSummary, Position, Trade, TradeAction};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Source of account data
pub trait AccountGateway: Send + Sync {
    fn summary(&self) -> Result<AccountSummary>;

    fn positions(&self) -> Result<Vec<Position>>;

    /// Trades executed on `date`
    fn trades(&self, date: NaiveDate) -> Result<Vec<Trade>>;
}

/// Fixed sample account
#[derive(Debug, Clone, Default)]
pub struct StaticAccountGateway;

impl StaticAccountGateway {
    pub fn new() -> Self {
        Self
    }
}

impl AccountGateway for StaticAccountGateway {
    fn summary(&self) -> Result<AccountSummary> {
        Ok(AccountSummary {
            total_balance: dec!(125000.50),
            net_liquidation: dec!(125000.50),
            buying_power: dec!(50000.00),
            cash_balance: dec!(75000.00),
            open_positions_count: 8,
            closed_positions_count: 24,
            daily_profit: dec!(1250.25),
            daily_profit_percent: dec!(1.01),
            total_profit: dec!(15250.75),
            total_profit_percent: dec!(13.88),
            currency: "USD".to_string(),
            last_update: Utc::now(),
        })
    }

    fn positions(&self) -> Result<Vec<Position>> {
        Ok(vec![
            position("AAPL", 100, dec!(150.25), dec!(175.50), dec!(16.81), "2024-01-15T09:30:00"),
            position("MSFT", 50, dec!(300.00), dec!(380.25), dec!(26.75), "2024-01-15T10:15:00"),
            position("GOOGL", 75, dec!(140.00), dec!(145.75), dec!(4.11), "2024-01-15T11:00:00"),
            position("TSLA", 200, dec!(250.00), dec!(245.50), dec!(-1.80), "2024-01-15T13:20:00"),
        ])
    }

    fn trades(&self, date: NaiveDate) -> Result<Vec<Trade>> {
        // Sample fills are always dated today
        let today = Utc::now().date_naive();
        let trades = vec![
            trade("GOOGL", TradeAction::Buy, 25, dec!(120.00), "09:30:00", today, dec!(125.50)),
            trade("TSLA", TradeAction::Sell, 10, dec!(250.50), "14:15:00", today, dec!(-50.25)),
            trade("AAPL", TradeAction::Buy, 50, dec!(175.25), "10:45:00", today, dec!(87.50)),
            trade("MSFT", TradeAction::Sell, 15, dec!(380.75), "15:20:00", today, dec!(225.00)),
            trade("NVDA", TradeAction::Buy, 20, dec!(450.00), "11:30:00", today, dec!(150.00)),
        ];

        Ok(trades.into_iter().filter(|t| t.date == date).collect())
    }
}

fn position(
    symbol: &str,
    quantity: i64,
    avg_price: Decimal,
    current_price: Decimal,
    unrealized_pnl_percent: Decimal,
    entry_time: &str,
) -> Position {
    let qty = Decimal::from(quantity);
    Position {
        symbol: symbol.to_string(),
        quantity,
        avg_price,
        current_price,
        market_value: current_price * qty,
        unrealized_pnl: (current_price - avg_price) * qty,
        unrealized_pnl_percent,
        entry_time: entry_time.to_string(),
    }
}

fn trade(
    symbol: &str,
    action: TradeAction,
    quantity: i64,
    price: Decimal,
    time: &str,
    date: NaiveDate,
    profit: Decimal,
) -> Trade {
    Trade {
        symbol: symbol.to_string(),
        action,
        quantity,
        price,
        time: time.to_string(),
        date,
        profit,
    }
}
