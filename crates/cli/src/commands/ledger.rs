//! Ledger inspection

use anyhow::Result;
use veil_compliance::ComplianceClient;

/// Print ledger events starting at line `from`
pub fn show(client: &ComplianceClient, from: usize, limit: Option<usize>, json: bool) -> Result<()> {
    let events = client.ledger().read_from(from)?;
    let shown = limit.unwrap_or(events.len()).min(events.len());

    if json {
        for event in &events[..shown] {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(());
    }

    if events.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }

    println!("📒 Compliance ledger");
    if let Some(path) = client.ledger().path() {
        println!("   File: {}", path.display());
    }
    println!();
    for (offset, event) in events[..shown].iter().enumerate() {
        println!(
            "{:>5}  {}  {:<22} {}",
            from + offset,
            event.timestamp().to_rfc3339(),
            event.event_type(),
            event.id()
        );
    }
    if shown < events.len() {
        println!("   ... {} more", events.len() - shown);
    }

    Ok(())
}
