//! Balance history recorder
//!
//! Every account summary fetch appends one snapshot to a JSON file. Each write
//! also prunes entries older than [`RETENTION_DAYS`].

use crate::types::{AccountSummary, BalanceSnapshot};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Snapshots older than this are dropped on write
pub const RETENTION_DAYS: i64 = 90;

/// Window used when the caller gives no usable `days`
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Flat-file balance history
pub struct BalanceHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BalanceHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append a snapshot of `summary` for `user_id`
    pub async fn record(&self, user_id: &str, summary: &AccountSummary) -> Result<BalanceSnapshot> {
        self.record_at(user_id, summary, Utc::now()).await
    }

    pub(crate) async fn record_at(
        &self,
        user_id: &str,
        summary: &AccountSummary,
        now: DateTime<Utc>,
    ) -> Result<BalanceSnapshot> {
        let _guard = self.write_lock.lock().await;

        let mut history = self.load().await?;
        let snapshot = BalanceSnapshot {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            timestamp: now,
            total_balance: summary.total_balance,
            net_liquidation: summary.net_liquidation,
            cash_balance: summary.cash_balance,
            buying_power: summary.buying_power,
            daily_profit: summary.daily_profit,
        };
        history.push(snapshot.clone());

        let cutoff = now - Duration::days(RETENTION_DAYS);
        let before = history.len();
        history.retain(|entry| entry.timestamp >= cutoff);
        if history.len() < before {
            debug!("Pruned {} balance snapshots older than {} days", before - history.len(), RETENTION_DAYS);
        }

        self.save(&history).await?;
        Ok(snapshot)
    }

    /// Snapshots for `user_id` from the last `days` days, oldest first
    pub async fn history(&self, user_id: &str, days: i64) -> Result<Vec<BalanceSnapshot>> {
        self.history_at(user_id, days, Utc::now()).await
    }

    pub(crate) async fn history_at(
        &self,
        user_id: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<BalanceSnapshot>> {
        // A window reaching past the representable range means everything
        let cutoff = Duration::try_days(days)
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut entries: Vec<BalanceSnapshot> = self
            .load()
            .await?
            .into_iter()
            .filter(|entry| entry.user_id == user_id && entry.timestamp >= cutoff)
            .collect();
        entries.sort_by_key(|entry| entry.timestamp);

        Ok(entries)
    }

    async fn load(&self) -> Result<Vec<BalanceSnapshot>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(Vec::new()),
            Ok(data) => serde_json::from_str(&data)
                .with_context(|| format!("Corrupt balance history file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).context("Failed to read balance history"),
        }
    }

    async fn save(&self, history: &[BalanceSnapshot]) -> Result<()> {
        let data = serde_json::to_vec_pretty(history)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data)
            .await
            .context("Failed to write balance history")?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("Failed to replace balance history")?;
        Ok(())
    }
}

/// Parse the `days` query value, falling back to [`DEFAULT_HISTORY_DAYS`]
pub fn parse_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_HISTORY_DAYS)
}
