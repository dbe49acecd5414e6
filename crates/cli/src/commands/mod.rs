//! CLI command handlers

pub mod attest;
pub mod claims;
pub mod disclose;
pub mod keys;
pub mod ledger;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::path::Path;

/// `now` shifted by a day count taken from the command line
pub(crate) fn days_from(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| anyhow!("{} days is out of range", days))
}

/// Read and parse a JSON file
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Print pretty JSON to stdout, or write it to `output`
pub(crate) fn emit_json(value: &Value, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            println!("✅ Written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
