use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartLedger {
    Latest,
    Sequence(u64),
}

#[derive(Clone, Debug)]
pub struct HorizonConfig {
    pub enabled: bool,
    pub horizon_url: String,
    pub contract_ids: Vec<String>,
    pub poll_interval: Duration,
    pub start_ledger: StartLedger,
}

impl HorizonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let enabled = match lookup("HORIZON_LISTENER_ENABLED") {
            Some(raw) => parse_bool(&raw).context("HORIZON_LISTENER_ENABLED must be true or false")?,
            None => false,
        };

        let horizon_url = lookup("HORIZON_URL")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_HORIZON_URL.to_string());

        let contract_ids = lookup("CONTRACT_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let poll_interval_ms = match lookup("POLL_INTERVAL_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("POLL_INTERVAL_MS must be a positive integer")?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };
        if poll_interval_ms == 0 {
            bail!("POLL_INTERVAL_MS must be greater than zero");
        }

        let start_ledger = match lookup("HORIZON_START_LEDGER") {
            Some(raw) if !raw.trim().eq_ignore_ascii_case("latest") && !raw.trim().is_empty() => {
                StartLedger::Sequence(
                    raw.trim()
                        .parse::<u64>()
                        .context("HORIZON_START_LEDGER must be 'latest' or a ledger number")?,
                )
            }
            _ => StartLedger::Latest,
        };

        Ok(Self {
            enabled,
            horizon_url,
            contract_ids,
            poll_interval: Duration::from_millis(poll_interval_ms),
            start_ledger,
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("unrecognised boolean '{other}'"),
    }
}
